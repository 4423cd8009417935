//! CLI command implementations

pub mod migrate;
pub mod ping;
pub mod status;

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use fs2::FileExt;
use tgmigrate_core::config::{Config, CONFIG_FILE_NAME};
use tgmigrate_core::RunContext;

/// Lock file created in the migrations directory for the duration of a run
pub const LOCK_FILE_NAME: &str = ".tgmigrate.lock";

/// Flags shared by commands that talk to TigerGraph
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConnectionArgs {
    /// Graph whose migrations are tracked
    #[arg(long, short)]
    pub graph: Option<String>,
    /// Directory containing migration files
    #[arg(long, short)]
    pub dir: Option<PathBuf>,
    /// Per-request timeout in seconds
    #[arg(long)]
    pub request_timeout: Option<u64>,
}

/// Settings file to read: `--config`, else `./tgmigrate.json`, else the
/// user config directory
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir().map(|dir| dir.join("tgmigrate").join(CONFIG_FILE_NAME))
}

/// Load configuration and apply command-line overrides
pub fn load_config(explicit: Option<&Path>, args: &ConnectionArgs) -> Result<Config> {
    if let Some(path) = explicit {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }
    }

    let mut config = Config::load(config_path(explicit).as_deref())?;
    if let Some(graph) = &args.graph {
        config.graph = Some(graph.clone());
    }
    if let Some(dir) = &args.dir {
        config.migrations_dir = Some(dir.clone());
    }
    if let Some(secs) = args.request_timeout {
        config.timeout_secs = Some(secs);
    }
    Ok(config)
}

/// Run context honouring an optional overall deadline in seconds
pub fn run_context(timeout_secs: Option<u64>) -> RunContext {
    match timeout_secs {
        Some(secs) => RunContext::with_timeout(Duration::from_secs(secs)),
        None => RunContext::background(),
    }
}

/// Exclusive advisory lock on a migrations directory, released on drop
#[derive(Debug)]
pub struct RunLock {
    file: File,
    path: PathBuf,
}

impl RunLock {
    /// Take the lock without waiting. Fails if another run holds it.
    pub fn acquire(dir: &Path) -> Result<Self> {
        let path = dir.join(LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .with_context(|| format!("Failed to open lock file {}", path.display()))?;

        if file.try_lock_exclusive().is_err() {
            bail!(
                "Another migration run holds {}. Wait for it to finish and try again.",
                path.display()
            );
        }

        tracing::debug!(lock = %path.display(), "Acquired migration lock");
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}
