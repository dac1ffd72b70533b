//! Core types, configuration, and error taxonomy for RustShip.
//!
//! This crate provides the foundational building blocks shared across the
//! RustShip deployment pipeline: the immutable [`Deployment`] descriptor,
//! the values each pipeline stage produces ([`StackOutput`],
//! [`FunctionReference`]), the AWS region catalog, and the deployment
//! error taxonomy.

mod config;
pub mod contract;
mod error;
pub mod regions;
mod types;

pub use config::DeployConfig;
pub use error::{DeployError, DeployResult};
pub use types::{Deployment, FunctionReference, HttpMethod, Route, StackOutput};
