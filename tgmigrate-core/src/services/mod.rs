//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions.

pub mod migration;

pub use migration::{MigrateRequest, MigrationPlan, MigrationReport, MigrationService};
