//! In-memory implementations of the provider traits.
//!
//! These back the `--local` mode of the CLI and the test suite. They
//! emulate the blocking/idempotence semantics of the real services:
//! stack operations settle asynchronously over a configurable number of
//! describe polls, updates with identical inputs report "no changes",
//! version publishes mint monotonically increasing numbers, and stage
//! activation is an atomic swap of the staged route set.
//!
//! Each service counts its calls and supports targeted failure
//! injection so tests can assert the pipeline's halt semantics.

mod function;
mod routing;
mod stack;

pub use function::InMemoryFunctionService;
pub use routing::{BoundRoute, InMemoryRoutingService};
pub use stack::InMemoryStackService;
