//! In-memory state gateway and script executor
//!
//! Keeps migration records in a `Vec` and remembers every call, so the
//! orchestrator can be exercised without a TigerGraph instance. Failures can
//! be injected per operation.

use std::sync::{Mutex, MutexGuard};

use crate::context::RunContext;
use crate::domain::result::{Error, Result};
use crate::domain::{current_version, Direction};
use crate::ports::{ScriptExecutor, StateGateway};

/// How an injected commit failure surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitFailure {
    /// The store answered but accepted no record
    Rejected,
    /// The store could not be reached
    Transport,
}

/// A record as stored. `mode` is kept raw so invalid values can be seeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub target: String,
    pub version: String,
    pub mode: String,
}

/// A commit call as received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitCall {
    pub target: String,
    pub version: String,
    pub direction: Direction,
}

#[derive(Debug, Default)]
struct State {
    initialized: bool,
    records: Vec<StoredRecord>,
    executed: Vec<String>,
    commits: Vec<CommitCall>,
    bootstraps: usize,
    init_checks: usize,
    latest_calls: usize,
}

#[derive(Debug, Default)]
struct Failures {
    init_check: Option<String>,
    bootstrap: Option<String>,
    latest: Option<String>,
    execute_containing: Option<String>,
    commit: Option<(usize, CommitFailure)>,
}

#[derive(Debug, Default)]
pub struct InMemoryGateway {
    state: Mutex<State>,
    failures: Failures,
}

impl InMemoryGateway {
    /// An uninitialized store with no records
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the tracking schema as already created
    pub fn initialized(self) -> Self {
        self.with_state(|state| state.initialized = true)
    }

    /// Seed a record, as if committed by an earlier run
    pub fn with_record(self, target: &str, version: &str, mode: &str) -> Self {
        self.with_state(|state| {
            state.records.push(StoredRecord {
                target: target.to_string(),
                version: version.to_string(),
                mode: mode.to_string(),
            })
        })
    }

    /// Answer the initialization check with an unrecognized message
    pub fn failing_init_check(mut self, message: &str) -> Self {
        self.failures.init_check = Some(message.to_string());
        self
    }

    pub fn failing_bootstrap(mut self, message: &str) -> Self {
        self.failures.bootstrap = Some(message.to_string());
        self
    }

    /// Fail reading the latest record with a transport error
    pub fn failing_latest(mut self, message: &str) -> Self {
        self.failures.latest = Some(message.to_string());
        self
    }

    /// Fail executing any script containing `needle`
    pub fn failing_script(mut self, needle: &str) -> Self {
        self.failures.execute_containing = Some(needle.to_string());
        self
    }

    /// Fail the `nth` commit call (0-based)
    pub fn failing_commit(mut self, nth: usize, failure: CommitFailure) -> Self {
        self.failures.commit = Some((nth, failure));
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.state().map(|s| s.initialized).unwrap_or(false)
    }

    pub fn bootstrap_count(&self) -> usize {
        self.state().map(|s| s.bootstraps).unwrap_or(0)
    }

    pub fn init_check_count(&self) -> usize {
        self.state().map(|s| s.init_checks).unwrap_or(0)
    }

    pub fn latest_call_count(&self) -> usize {
        self.state().map(|s| s.latest_calls).unwrap_or(0)
    }

    /// Script bodies in execution order
    pub fn executed_scripts(&self) -> Vec<String> {
        self.state().map(|s| s.executed.clone()).unwrap_or_default()
    }

    /// Every commit call in order, including failed ones
    pub fn commit_calls(&self) -> Vec<CommitCall> {
        self.state().map(|s| s.commits.clone()).unwrap_or_default()
    }

    /// Records currently stored, oldest first
    pub fn records(&self) -> Vec<StoredRecord> {
        self.state().map(|s| s.records.clone()).unwrap_or_default()
    }

    fn with_state(self, f: impl FnOnce(&mut State)) -> Self {
        if let Ok(mut state) = self.state.lock() {
            f(&mut state);
        }
        self
    }

    fn state(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| Error::transport("in-memory state lock poisoned"))
    }
}

impl StateGateway for InMemoryGateway {
    fn is_tracking_initialized(&self, ctx: &RunContext) -> Result<bool> {
        ctx.check()?;
        let mut state = self.state()?;
        state.init_checks += 1;

        if let Some(message) = &self.failures.init_check {
            return Err(Error::UnknownInitializationFailure(message.clone()));
        }
        Ok(state.initialized)
    }

    fn latest_version(&self, ctx: &RunContext, target: &str) -> Result<Option<String>> {
        ctx.check()?;
        let mut state = self.state()?;
        state.latest_calls += 1;

        if let Some(message) = &self.failures.latest {
            return Err(Error::transport(message.clone()));
        }

        match state.records.iter().rev().find(|r| r.target == target) {
            Some(record) => current_version(&record.version, &record.mode).map(Some),
            None => Ok(None),
        }
    }

    fn commit(&self, ctx: &RunContext, target: &str, version: &str, direction: Direction) -> Result<()> {
        ctx.check()?;
        let mut state = self.state()?;

        let attempt = state.commits.len();
        state.commits.push(CommitCall {
            target: target.to_string(),
            version: version.to_string(),
            direction,
        });

        match self.failures.commit {
            Some((nth, CommitFailure::Rejected)) if nth == attempt => Err(Error::commit_failed(
                "upsert of migration vertex accepted 0 vertices, expected exactly 1",
            )),
            Some((nth, CommitFailure::Transport)) if nth == attempt => Err(Error::transport(
                "TigerGraph returned non-OK status code: HTTP 500",
            )),
            _ => {
                state.records.push(StoredRecord {
                    target: target.to_string(),
                    version: version.to_string(),
                    mode: direction.to_string(),
                });
                Ok(())
            }
        }
    }

    fn bootstrap(&self, ctx: &RunContext) -> Result<()> {
        ctx.check()?;
        let mut state = self.state()?;
        state.bootstraps += 1;

        if let Some(message) = &self.failures.bootstrap {
            return Err(Error::script_failed(message.clone()));
        }
        if state.initialized {
            return Err(Error::script_failed(
                "Semantic Check Fails: The graph ClientMetadata already exists",
            ));
        }

        state.initialized = true;
        Ok(())
    }
}

impl ScriptExecutor for InMemoryGateway {
    fn execute(&self, ctx: &RunContext, _target: &str, script: &str) -> Result<()> {
        ctx.check()?;
        let mut state = self.state()?;
        state.executed.push(script.to_string());

        match &self.failures.execute_containing {
            Some(needle) if script.contains(needle.as_str()) => Err(Error::script_failed(format!(
                "GSQL response did not contain expected success code. full response: {}",
                script
            ))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_reflects_last_record_for_target() {
        let ctx = RunContext::background();
        let store = InMemoryGateway::new()
            .initialized()
            .with_record("MyGraph", "002", "up")
            .with_record("Other", "009", "up")
            .with_record("MyGraph", "002", "down");

        assert_eq!(
            store.latest_version(&ctx, "MyGraph").unwrap().as_deref(),
            Some("001")
        );
        assert_eq!(
            store.latest_version(&ctx, "Other").unwrap().as_deref(),
            Some("009")
        );
        assert_eq!(store.latest_version(&ctx, "Empty").unwrap(), None);
    }

    #[test]
    fn test_bootstrap_is_not_idempotent() {
        let ctx = RunContext::background();
        let store = InMemoryGateway::new();

        assert!(!store.is_tracking_initialized(&ctx).unwrap());
        store.bootstrap(&ctx).unwrap();
        assert!(store.is_tracking_initialized(&ctx).unwrap());
        assert!(store.bootstrap(&ctx).is_err());
        assert_eq!(store.bootstrap_count(), 2);
        assert_eq!(store.init_check_count(), 2);
    }

    #[test]
    fn test_injected_commit_failure() {
        let ctx = RunContext::background();
        let store = InMemoryGateway::new().failing_commit(1, CommitFailure::Rejected);

        store.commit(&ctx, "MyGraph", "000", Direction::Up).unwrap();
        let err = store.commit(&ctx, "MyGraph", "001", Direction::Up).unwrap_err();

        assert!(matches!(err, Error::CommitFailed(_)));
        assert_eq!(store.commit_calls().len(), 2);
        assert_eq!(store.records().len(), 1);
    }
}
