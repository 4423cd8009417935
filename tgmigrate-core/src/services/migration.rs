//! Migration service - moves a graph's schema to a desired version
//!
//! A run checks whether the tracking schema exists (creating it and
//! fast-forwarding to the initial version if not), reads the current version,
//! then executes and records each step strictly in order. The first failure
//! stops the run; steps before it stay committed.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::adapters::filesystem::MigrationDirectory;
use crate::context::RunContext;
use crate::domain::result::{Error, Result};
use crate::domain::{steps_between, Direction};
use crate::ports::{ScriptExecutor, StateGateway};

/// Parameters of a single migration run
#[derive(Debug, Clone)]
pub struct MigrateRequest {
    /// Graph whose migration history is tracked
    pub target: String,
    pub desired: String,
    /// Versions recorded as applied, without running them, when the tracking
    /// schema is created. Ignored on later runs.
    pub initial_version: Option<String>,
    pub migration_dir: PathBuf,
    pub dry_run: bool,
}

/// Outcome of a migration run
#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrationReport {
    pub target: String,
    pub desired: String,
    /// Whether this run created the tracking schema
    pub bootstrapped: bool,
    /// Versions recorded during bootstrap without executing their scripts
    pub fast_forwarded: Vec<String>,
    /// Effective version before any step ran
    pub current: Option<String>,
    pub direction: Direction,
    /// Steps between `current` and `desired`, in execution order
    pub steps: Vec<String>,
    /// Steps executed and committed
    pub applied: Vec<String>,
    pub dry_run: bool,
}

impl MigrationReport {
    /// True when the graph was already at the desired version
    pub fn is_up_to_date(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Steps a run would take, without touching the remote schema
#[derive(Debug, Clone, Serialize)]
pub struct MigrationPlan {
    pub current: Option<String>,
    pub direction: Direction,
    pub steps: Vec<String>,
}

/// Service running migrations through the state gateway and script executor
pub struct MigrationService {
    gateway: Arc<dyn StateGateway>,
    executor: Arc<dyn ScriptExecutor>,
}

impl MigrationService {
    pub fn new(gateway: Arc<dyn StateGateway>, executor: Arc<dyn ScriptExecutor>) -> Self {
        Self { gateway, executor }
    }

    /// Run migrations until `request.target` is at `request.desired`.
    ///
    /// A dry run resolves the steps and their migration files but never
    /// bootstraps, executes or commits.
    pub fn migrate(&self, ctx: &RunContext, request: &MigrateRequest) -> Result<MigrationReport> {
        let target = request.target.as_str();
        let mut report = MigrationReport {
            target: target.to_string(),
            desired: request.desired.clone(),
            dry_run: request.dry_run,
            ..Default::default()
        };

        let initialized = self.gateway.is_tracking_initialized(ctx)?;
        tracing::debug!(graph = %target, initialized, "Checked tracking schema");

        // Where the fast-forward leaves a dry run that skipped it
        let mut assumed_current = None;

        if !initialized {
            let initial = request
                .initial_version
                .as_deref()
                .filter(|v| !v.is_empty());

            if request.dry_run {
                tracing::warn!(graph = %target, "Dry run: tracking schema missing, bootstrap skipped");
                if let Some(initial) = initial {
                    let (versions, _) = steps_between(None, initial)?;
                    report.fast_forwarded = versions.iter().map(|v| v.to_string()).collect();
                    assumed_current = report.fast_forwarded.last().cloned();
                }
            } else {
                self.bootstrap(ctx, target, initial, &mut report)?;
            }
        }

        let current = if request.dry_run && !initialized {
            assumed_current
        } else {
            self.gateway.latest_version(ctx, target)?
        };

        let (steps, direction) = steps_between(current.as_deref(), &request.desired)?;
        report.current = current;
        report.direction = direction;
        report.steps = steps.iter().map(|v| v.to_string()).collect();

        tracing::info!(
            graph = %target,
            current = report.current.as_deref().unwrap_or("none"),
            desired = %request.desired,
            %direction,
            steps = report.steps.len(),
            "Resolved migration steps"
        );

        let dir = MigrationDirectory::new(&request.migration_dir);
        for version in &report.steps {
            ctx.check()?;
            let script = read_script(&dir, version, direction)?;

            if request.dry_run {
                tracing::warn!(graph = %target, version = %version, %direction, "Dry run: migration not applied");
                continue;
            }

            self.executor.execute(ctx, target, &script)?;
            self.gateway
                .commit(ctx, target, version, direction)
                .map_err(|e| {
                    tracing::warn!(graph = %target, version = %version, %direction, error = %e, "Migration ran but was not recorded");
                    Error::partial_failure(version.clone(), direction, e)
                })?;

            tracing::info!(graph = %target, version = %version, %direction, "Applied migration");
            report.applied.push(version.clone());
        }

        Ok(report)
    }

    /// Resolve the steps a run would take, without bootstrapping.
    ///
    /// An uninitialized tracking schema counts as nothing applied.
    pub fn plan(&self, ctx: &RunContext, target: &str, desired: &str) -> Result<MigrationPlan> {
        let current = self.current_version(ctx, target)?;
        let (steps, direction) = steps_between(current.as_deref(), desired)?;

        Ok(MigrationPlan {
            current,
            direction,
            steps: steps.iter().map(|v| v.to_string()).collect(),
        })
    }

    /// Effective current version of `target`, `None` if nothing was recorded
    /// or the tracking schema does not exist yet
    pub fn current_version(&self, ctx: &RunContext, target: &str) -> Result<Option<String>> {
        if !self.gateway.is_tracking_initialized(ctx)? {
            return Ok(None);
        }
        self.latest_version(ctx, target)
    }

    /// Effective current version of `target` when the tracking schema is
    /// known to exist
    pub fn latest_version(&self, ctx: &RunContext, target: &str) -> Result<Option<String>> {
        self.gateway.latest_version(ctx, target)
    }

    /// Whether the tracking schema exists
    pub fn is_initialized(&self, ctx: &RunContext) -> Result<bool> {
        self.gateway.is_tracking_initialized(ctx)
    }

    /// Create the tracking schema and record versions up to `initial` as
    /// applied. Any failure here aborts the run; nothing is executed.
    fn bootstrap(
        &self,
        ctx: &RunContext,
        target: &str,
        initial: Option<&str>,
        report: &mut MigrationReport,
    ) -> Result<()> {
        tracing::info!(graph = %target, "Creating migration tracking schema");
        self.gateway.bootstrap(ctx)?;
        report.bootstrapped = true;

        let Some(initial) = initial else {
            return Ok(());
        };

        let (versions, direction) = steps_between(None, initial)?;
        for version in versions {
            ctx.check()?;
            let version = version.to_string();
            self.gateway.commit(ctx, target, &version, direction)?;
            tracing::info!(graph = %target, version = %version, "Recorded as already applied");
            report.fast_forwarded.push(version);
        }

        Ok(())
    }
}

fn read_script(dir: &MigrationDirectory, version: &str, direction: Direction) -> Result<String> {
    let bytes = dir.resolve(version, direction)?;
    String::from_utf8(bytes).map_err(|_| {
        Error::script_failed(format!(
            "migration file for version {} ({}) is not valid UTF-8",
            version, direction
        ))
    })
}
