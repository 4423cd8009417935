//! tgmigrate core - versioned schema migrations for TigerGraph
//!
//! This crate follows a hexagonal architecture:
//!
//! - **domain**: Versions, directions, migration records and errors
//! - **ports**: Traits for the remote migration state and script execution
//! - **services**: The migration run orchestration
//! - **adapters**: TigerGraph HTTP client, in-memory store, migration files

pub mod adapters;
pub mod config;
pub mod context;
pub mod domain;
pub mod migrations;
pub mod ports;
pub mod services;

use std::sync::Arc;

use adapters::tigergraph::{TigerGraphClient, TigerGraphGateway, TigerGraphSettings};

// Re-export commonly used types at crate root
pub use context::{CancelHandle, RunContext};
pub use domain::result::{Error, Result};
pub use domain::{Direction, MigrationRecord, Version};
pub use services::{MigrateRequest, MigrationPlan, MigrationReport, MigrationService};

/// Build a migration service talking to the TigerGraph instance in `settings`.
///
/// The gateway is returned as well for calls outside the migration flow,
/// e.g. `ping` or loading jobs.
pub fn connect(settings: TigerGraphSettings) -> Result<(MigrationService, Arc<TigerGraphGateway>)> {
    let gateway = Arc::new(TigerGraphGateway::new(TigerGraphClient::new(settings)?));
    let service = MigrationService::new(gateway.clone(), gateway.clone());
    Ok((service, gateway))
}
