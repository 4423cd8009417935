//! Configuration management
//!
//! Settings come from an optional `tgmigrate.json` file, overridden by
//! environment variables:
//! ```json
//! {
//!   "url": "http://localhost:9000",
//!   "fileUrl": "http://localhost:14240",
//!   "username": "tigergraph",
//!   "password": "tigergraph",
//!   "graph": "MyGraph",
//!   "migrationsDir": "./migrations",
//!   "initVersion": "004",
//!   "timeoutSecs": 120
//! }
//! ```
//! Command-line flags are applied on top by the CLI.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::tigergraph::{TigerGraphSettings, DEFAULT_TIMEOUT};
use crate::domain::result::INIT_VERSION_ENV;

/// Settings file name looked up by the CLI
pub const CONFIG_FILE_NAME: &str = "tgmigrate.json";

pub const URL_ENV: &str = "TG_URL";
pub const FILE_URL_ENV: &str = "TG_FILE_URL";
pub const USERNAME_ENV: &str = "TG_USERNAME";
pub const PASSWORD_ENV: &str = "TG_PASSWORD";
pub const GRAPH_ENV: &str = "TG_GRAPH";
pub const MIGRATIONS_DIR_ENV: &str = "TG_MIGRATIONS_DIR";
pub const TIMEOUT_ENV: &str = "TG_TIMEOUT_SECS";

/// Migration tool configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// REST++ base URL
    #[serde(default)]
    pub url: Option<String>,
    /// GSQL server base URL
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    #[serde(default)]
    pub graph: Option<String>,
    #[serde(default)]
    pub migrations_dir: Option<PathBuf>,
    #[serde(default)]
    pub init_version: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load the settings file (if it exists) and apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Same as `load`, reading variables through `env`
    pub fn load_with_env(path: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            _ => Self::default(),
        };
        config.apply_env(env)?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid settings file {}", path.display()))
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<()> {
        let var = |key: &str| env(key).filter(|v| !v.is_empty());

        if let Some(v) = var(URL_ENV) {
            self.url = Some(v);
        }
        if let Some(v) = var(FILE_URL_ENV) {
            self.file_url = Some(v);
        }
        if let Some(v) = var(USERNAME_ENV) {
            self.username = Some(v);
        }
        if let Some(v) = var(PASSWORD_ENV) {
            self.password = Some(v);
        }
        if let Some(v) = var(GRAPH_ENV) {
            self.graph = Some(v);
        }
        if let Some(v) = var(MIGRATIONS_DIR_ENV) {
            self.migrations_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = var(INIT_VERSION_ENV) {
            self.init_version = Some(v);
        }
        if let Some(v) = var(TIMEOUT_ENV) {
            let secs = v
                .parse::<u64>()
                .with_context(|| format!("{} must be a number of seconds, got {:?}", TIMEOUT_ENV, v))?;
            self.timeout_secs = Some(secs);
        }
        Ok(())
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Target graph, required for migrate and status
    pub fn graph(&self) -> Result<&str> {
        match self.graph.as_deref() {
            Some(graph) if !graph.is_empty() => Ok(graph),
            _ => bail!("No graph configured. Pass --graph or set {}", GRAPH_ENV),
        }
    }

    /// Directory holding migration files, `./migrations` if unset
    pub fn migrations_dir(&self) -> PathBuf {
        self.migrations_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("migrations"))
    }

    /// Connection settings for the TigerGraph client.
    ///
    /// The GSQL URL falls back to the REST++ URL when unset.
    pub fn tigergraph_settings(&self) -> Result<TigerGraphSettings> {
        let Some(base_url) = self.url.clone() else {
            bail!("No TigerGraph URL configured. Set {} or \"url\" in {}", URL_ENV, CONFIG_FILE_NAME);
        };
        let Some(username) = self.username.clone() else {
            bail!("No TigerGraph username configured. Set {}", USERNAME_ENV);
        };
        let Some(password) = self.password.clone() else {
            bail!("No TigerGraph password configured. Set {}", PASSWORD_ENV);
        };

        Ok(TigerGraphSettings {
            gsql_url: self.file_url.clone().unwrap_or_else(|| base_url.clone()),
            base_url,
            username,
            password,
            timeout: self.timeout(),
        })
    }
}
