//! Integration tests for the RustShip deployment pipeline.
//!
//! Every test runs the real [`DeploymentOrchestrator`] against the
//! in-memory provider services, so the full pipeline executes in-process
//! with no AWS credentials or network access.

use std::sync::{Arc, Once};
use std::time::Duration;

use rustship_core::{DeployConfig, Deployment, HttpMethod, Route};
use rustship_deploy::DeploymentOrchestrator;
use rustship_provider::memory::{
    InMemoryFunctionService, InMemoryRoutingService, InMemoryStackService,
};

mod test_failures;
mod test_pipeline;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A poll configuration with millisecond delays so poll loops stay fast.
#[must_use]
pub fn fast_config() -> DeployConfig {
    DeployConfig {
        poll_initial_interval: Duration::from_millis(1),
        poll_max_interval: Duration::from_millis(5),
        stack_max_wait: Duration::from_millis(500),
        ..DeployConfig::default()
    }
}

/// The orchestrator and the in-memory services it runs against.
#[derive(Debug)]
pub struct Pipeline {
    /// Stack service, shared with the orchestrator.
    pub stacks: Arc<InMemoryStackService>,
    /// Function service, shared with the orchestrator.
    pub functions: Arc<InMemoryFunctionService>,
    /// Routing service, shared with the orchestrator.
    pub routing: Arc<InMemoryRoutingService>,
    /// Orchestrator wired over the three services above.
    pub orchestrator: DeploymentOrchestrator,
}

/// Build a pipeline over fresh in-memory services.
#[must_use]
pub fn pipeline() -> Pipeline {
    pipeline_with_settle_polls(0)
}

/// Build a pipeline whose stack operations settle only after `n`
/// describe polls.
#[must_use]
pub fn pipeline_with_settle_polls(n: u32) -> Pipeline {
    init_tracing();

    let functions = Arc::new(InMemoryFunctionService::new());
    let stacks = Arc::new(
        InMemoryStackService::new("us-east-1")
            .with_function_service(Arc::clone(&functions))
            .with_settle_polls(n),
    );
    let routing = Arc::new(InMemoryRoutingService::new());
    let orchestrator = DeploymentOrchestrator::new(
        Arc::clone(&stacks) as _,
        Arc::clone(&functions) as _,
        Arc::clone(&routing) as _,
        fast_config(),
    );

    Pipeline {
        stacks,
        functions,
        routing,
        orchestrator,
    }
}

/// A deployment of `version` of the test artifact to `prod` in the
/// given region, exposing `GET /users` and `POST /users`.
#[must_use]
pub fn test_deployment(version: &str, region: &str) -> Deployment {
    Deployment::new(
        "com.example",
        "svc",
        version,
        "prod",
        region,
        vec![
            Route::new(HttpMethod::Get, "/users").expect("valid route"),
            Route::new(HttpMethod::Post, "/users").expect("valid route"),
        ],
    )
    .expect("valid deployment")
}
