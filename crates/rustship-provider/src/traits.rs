//! Capability traits for the three provider services.
//!
//! The traits use `#[async_trait]` because they must be object-safe for
//! dynamic dispatch (`Arc<dyn StackService>`); the pipeline is generic
//! over provider implementations, not over concrete SDK clients.

use std::collections::HashMap;

use async_trait::async_trait;

use rustship_core::Route;

use crate::error::ProviderResult;

/// A key/value template parameter for a stack operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackParameter {
    /// Parameter key as declared in the template.
    pub key: String,
    /// Parameter value.
    pub value: String,
}

impl StackParameter {
    /// Create a new parameter.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Lifecycle status of a stack, as reported by the stack service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackStatus {
    /// Creation has been submitted and is still running.
    CreateInProgress,
    /// Creation finished successfully.
    CreateComplete,
    /// Creation reached a terminal failure.
    CreateFailed,
    /// An update has been submitted and is still running.
    UpdateInProgress,
    /// Update finished successfully.
    UpdateComplete,
    /// Update reached a terminal failure.
    UpdateFailed,
    /// The provider is rolling the stack back after a failure.
    RollbackInProgress,
    /// Rollback finished; the operation that triggered it failed.
    RollbackComplete,
}

impl StackStatus {
    /// Whether the status is terminal (no further polling needed).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            Self::CreateInProgress | Self::UpdateInProgress | Self::RollbackInProgress
        )
    }

    /// Whether the status is a terminal success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::CreateComplete | Self::UpdateComplete)
    }
}

/// Point-in-time description of a stack.
#[derive(Debug, Clone)]
pub struct StackDescription {
    /// Current lifecycle status.
    pub status: StackStatus,
    /// Last status reason reported by the provider, if any.
    pub status_reason: Option<String>,
    /// Stack outputs, keyed by output name. Only populated once the
    /// stack reaches a successful terminal status.
    pub outputs: HashMap<String, String>,
}

/// Result of submitting a stack update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The update was accepted and is in progress.
    Updated,
    /// The provider reported there is nothing to change. The stack is
    /// already in the desired state; callers treat this as success.
    NoChanges,
}

/// Resource settings applied to a function configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionSettings {
    /// Memory size in MiB.
    pub memory_mb: i32,
    /// Invocation timeout in seconds.
    pub timeout_secs: i32,
}

/// Stack service: create/update/describe a named infrastructure stack.
#[async_trait]
pub trait StackService: Send + Sync + std::fmt::Debug {
    /// Describe a stack by name. Returns `None` if no such stack exists.
    async fn describe_stack(&self, name: &str) -> ProviderResult<Option<StackDescription>>;

    /// Submit creation of a new stack from a template. Returns on
    /// submission acknowledgment; callers poll [`Self::describe_stack`]
    /// until a terminal status.
    async fn create_stack(
        &self,
        name: &str,
        template_body: &str,
        parameters: &[StackParameter],
    ) -> ProviderResult<()>;

    /// Submit an update of an existing stack. A provider-reported
    /// "no changes to apply" maps to [`UpdateOutcome::NoChanges`].
    async fn update_stack(
        &self,
        name: &str,
        template_body: &str,
        parameters: &[StackParameter],
    ) -> ProviderResult<UpdateOutcome>;
}

/// Function service: configure a function and publish immutable versions.
#[async_trait]
pub trait FunctionService: Send + Sync + std::fmt::Debug {
    /// Apply resource settings to the function configuration.
    async fn configure_function(
        &self,
        function_arn: &str,
        settings: &FunctionSettings,
    ) -> ProviderResult<()>;

    /// Cut a new immutable version of the function and return the
    /// minted version number.
    async fn publish_version(&self, function_arn: &str, description: &str)
    -> ProviderResult<String>;
}

/// Routing service: bind routes to a function version and activate a stage.
///
/// Bindings are staged; nothing becomes visible to callers of the stage
/// until [`Self::activate_stage`] performs the atomic cutover.
#[async_trait]
pub trait RoutingService: Send + Sync + std::fmt::Debug {
    /// Ensure a route exists bound to the given version-qualified
    /// function ARN, with invocation granted through `execution_role`.
    async fn bind_route(
        &self,
        stage: &str,
        route: &Route,
        qualified_arn: &str,
        execution_role: &str,
    ) -> ProviderResult<()>;

    /// Atomically activate the full staged route set under `stage`,
    /// replacing whatever was previously active.
    async fn activate_stage(&self, stage: &str) -> ProviderResult<()>;
}
