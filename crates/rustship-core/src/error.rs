//! Error taxonomy for the deployment pipeline.
//!
//! Every variant is fatal to the run: no component retries internally,
//! and the orchestrator halts at the stage that produced the error.

/// Errors produced by the deployment pipeline components.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The requested region is not in the known AWS region catalog.
    #[error("{0} is not an AWS region. Please select a valid one.")]
    InvalidRegion(String),

    /// The deployment descriptor failed input validation.
    #[error("invalid deployment: {0}")]
    InvalidDeployment(String),

    /// A stack operation reached a terminal failure state.
    #[error("stack {stack_name} provisioning failed: {reason}")]
    Provisioning {
        /// Name of the stack that failed.
        stack_name: String,
        /// Last status reason reported by the provider.
        reason: String,
    },

    /// Publishing a new function version failed, or the function was not
    /// found.
    #[error("publishing version of function {function} failed: {reason}")]
    Publish {
        /// Function identifier the publish was attempted against.
        function: String,
        /// Provider-reported reason.
        reason: String,
    },

    /// A route binding failed before stage activation.
    #[error("endpoint deployment failed at {route}: {reason}")]
    Endpoint {
        /// The route (method + path) that failed to bind.
        route: String,
        /// Provider-reported reason.
        reason: String,
    },
}

/// Convenience result type for deployment operations.
pub type DeployResult<T> = Result<T, DeployError>;
