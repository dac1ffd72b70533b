//! The RustShip deployment pipeline.
//!
//! A deployment is a strictly linear, three-stage pipeline: provision
//! the infrastructure stack, publish a new immutable function version,
//! then bind and activate the HTTP endpoints. Each stage's output is a
//! hard precondition for the next; [`DeploymentOrchestrator`] sequences
//! the stages and translates any failure into a single
//! [`PipelineError`] carrying the stage it occurred at.

mod endpoints;
mod function;
mod orchestrator;
mod stack;
pub mod template;

pub use endpoints::EndpointDeployer;
pub use function::FunctionDeployer;
pub use orchestrator::{DeploymentOrchestrator, DeploymentReport, PipelineError, Stage};
pub use stack::StackManager;
