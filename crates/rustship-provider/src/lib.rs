//! Provider capability boundary for the RustShip pipeline.
//!
//! The pipeline talks to three opaque services: a stack service
//! (create/update/describe a named stack), a function service
//! (configure a function, publish immutable versions), and a routing
//! service (bind routes, activate a stage). This crate defines the
//! object-safe traits for that boundary and ships a complete in-memory
//! implementation used by `--local` runs and by the test suite.

mod error;
pub mod memory;
mod traits;

pub use error::{ProviderError, ProviderResult};
pub use traits::{
    FunctionService, FunctionSettings, RoutingService, StackDescription, StackParameter,
    StackService, StackStatus, UpdateOutcome,
};
