//! Port definitions (hexagonal architecture)
//!
//! The orchestrator depends only on these traits. The TigerGraph adapter is
//! the production implementation; the in-memory adapter stands in for it in
//! tests and dry experiments.

mod script_executor;
mod state_gateway;

pub use script_executor::ScriptExecutor;
pub use state_gateway::StateGateway;
