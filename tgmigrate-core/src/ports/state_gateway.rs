//! Remote state gateway port - where migration history lives

use crate::context::RunContext;
use crate::domain::result::Result;
use crate::domain::Direction;

/// Access to the remote migration tracking schema
///
/// The remote store is both source of truth and audit log. Implementations
/// perform one blocking round-trip per call and never retry.
pub trait StateGateway: Send + Sync {
    /// Whether the tracking schema exists.
    ///
    /// Returns `Ok(false)` only for the specific "not found" response; any
    /// other or ambiguous response is `UnknownInitializationFailure`.
    fn is_tracking_initialized(&self, ctx: &RunContext) -> Result<bool>;

    /// Effective current version for `target`, `None` if nothing was recorded
    fn latest_version(&self, ctx: &RunContext, target: &str) -> Result<Option<String>>;

    /// Append exactly one migration record.
    ///
    /// Fails with `CommitFailed` unless the store accepted exactly one record.
    fn commit(&self, ctx: &RunContext, target: &str, version: &str, direction: Direction)
        -> Result<()>;

    /// Create the tracking schema. Not idempotent: check
    /// `is_tracking_initialized` first.
    fn bootstrap(&self, ctx: &RunContext) -> Result<()>;
}
