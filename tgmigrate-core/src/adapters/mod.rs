//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - TigerGraph HTTP client for StateGateway and ScriptExecutor
//! - In-memory store for both ports, used in tests
//! - Local filesystem for migration files

pub mod filesystem;
pub mod memory;
pub mod tigergraph;
