//! Deployment configuration.

use std::env;
use std::time::Duration;

/// Tunables for the deployment pipeline.
///
/// The stack poll settings implement the bounded exponential backoff the
/// pipeline uses while waiting for a stack operation to reach a terminal
/// state: polling starts at `poll_initial_interval`, doubles on every
/// poll up to `poll_max_interval`, and the whole wait is capped at
/// `stack_max_wait`.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// First describe-stack poll delay.
    pub poll_initial_interval: Duration,
    /// Upper bound for a single poll delay.
    pub poll_max_interval: Duration,
    /// Overall cap on waiting for one stack operation.
    pub stack_max_wait: Duration,
    /// Memory size applied to the function configuration, in MiB.
    pub function_memory_mb: i32,
    /// Invocation timeout applied to the function configuration, in seconds.
    pub function_timeout_secs: i32,
}

impl DeployConfig {
    /// Create configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `RUSTSHIP_POLL_INITIAL_SECS` | `2` |
    /// | `RUSTSHIP_POLL_MAX_SECS` | `30` |
    /// | `RUSTSHIP_STACK_MAX_WAIT_SECS` | `900` |
    /// | `RUSTSHIP_FUNCTION_MEMORY_MB` | `512` |
    /// | `RUSTSHIP_FUNCTION_TIMEOUT_SECS` | `30` |
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            poll_initial_interval: Duration::from_secs(env_u64("RUSTSHIP_POLL_INITIAL_SECS", 2)),
            poll_max_interval: Duration::from_secs(env_u64("RUSTSHIP_POLL_MAX_SECS", 30)),
            stack_max_wait: Duration::from_secs(env_u64("RUSTSHIP_STACK_MAX_WAIT_SECS", 900)),
            function_memory_mb: env_i32("RUSTSHIP_FUNCTION_MEMORY_MB", 512),
            function_timeout_secs: env_i32("RUSTSHIP_FUNCTION_TIMEOUT_SECS", 30),
        }
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            poll_initial_interval: Duration::from_secs(2),
            poll_max_interval: Duration::from_secs(30),
            stack_max_wait: Duration::from_secs(900),
            function_memory_mb: 512,
            function_timeout_secs: 30,
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_i32(key: &str, default: i32) -> i32 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
