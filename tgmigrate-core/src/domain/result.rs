//! Result and error types for the core library

use thiserror::Error;

use super::Direction;

/// Environment variable an operator sets to skip past a migration that ran
/// remotely but was never recorded.
pub const INIT_VERSION_ENV: &str = "TIGER_GRAPH_MIGRATION_INIT_VERSION";

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid migration version: {0:?}")]
    InvalidVersion(String),

    #[error("Invalid migration direction: {0:?}")]
    InvalidDirection(String),

    #[error("No migration file found for version {version} ({direction})")]
    MigrationNotFound { version: String, direction: Direction },

    #[error("Initialisation check failed for an unknown reason: {0}")]
    UnknownInitializationFailure(String),

    #[error("Failed to commit migration version: {0}")]
    CommitFailed(String),

    #[error("Failed to run migration script: {0}")]
    ScriptFailed(String),

    #[error("Transport error: {0}")]
    Transport(String),

    // Keep the variable name in step with INIT_VERSION_ENV
    #[error(
        "Failed to commit migration version {version} ({direction}) to the metadata graph.\n\
         IMPORTANT: this requires manual intervention. The migration ran successfully but its\n\
         record was not written. Set the init version to the migration version printed here so\n\
         the record is added and the version is skipped,\n\
         i.e. set TIGER_GRAPH_MIGRATION_INIT_VERSION={version} as an env var.\n\
         Original error: {source}"
    )]
    PartialFailure {
        version: String,
        direction: Direction,
        #[source]
        source: Box<Error>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid version error
    pub fn invalid_version(value: impl Into<String>) -> Self {
        Self::InvalidVersion(value.into())
    }

    /// Create a commit failure
    pub fn commit_failed(msg: impl Into<String>) -> Self {
        Self::CommitFailed(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a script failure
    pub fn script_failed(msg: impl Into<String>) -> Self {
        Self::ScriptFailed(msg.into())
    }

    /// Wrap a commit error raised after its script already ran remotely
    pub fn partial_failure(version: impl Into<String>, direction: Direction, source: Error) -> Self {
        Self::PartialFailure {
            version: version.into(),
            direction,
            source: Box::new(source),
        }
    }

    /// True for both plain commit failures and partial failures.
    ///
    /// A partial failure is a commit failure whose message carries the
    /// operator instructions; callers matching on kind treat them alike.
    pub fn is_commit_failure(&self) -> bool {
        matches!(self, Self::CommitFailed(_) | Self::PartialFailure { .. })
    }

    /// True when the run stopped with a schema change applied but unrecorded
    pub fn requires_manual_intervention(&self) -> bool {
        matches!(self, Self::PartialFailure { .. })
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
