//! Script execution port

use crate::context::RunContext;
use crate::domain::result::Result;

/// Runs a migration script body against the remote database
pub trait ScriptExecutor: Send + Sync {
    /// Execute `script` for `target`. Success means the remote reported the
    /// script as fully applied; anything else is an error carrying the
    /// remote diagnostic.
    fn execute(&self, ctx: &RunContext, target: &str, script: &str) -> Result<()>;
}
