//! Lifecycle engine internals: mode dispatch, run context, signal routing,
//! and the orphan monitor.

mod context;
mod engine;
mod mode;
mod orphan;
pub(crate) mod shutdown;

pub use context::RunContext;
pub use engine::{Engine, EngineIo};
pub use mode::{InvalidInvocation, InvocationMode};
pub use orphan::OrphanMonitor;
pub use shutdown::{notify_teardown, register_teardown_handler};
