//! Core domain types
//!
//! Pure data structures and arithmetic - no I/O or network access.

mod record;
pub mod result;
pub mod version;

pub use record::{current_version, MigrationRecord};
pub use version::{decrement, steps_between, Direction, Version};
