//! Logging setup

use std::io;

use anyhow::{anyhow, Result};
use tracing_subscriber::fmt::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "tgmigrate=info,tgmigrate_core=info";
const VERBOSE_FILTER: &str = "tgmigrate=debug,tgmigrate_core=debug";

/// Install the global subscriber. Logs go to stderr so `--json` output on
/// stdout stays machine readable.
pub fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .map_err(|e| anyhow!("Invalid log filter: {}", e))?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if json {
        registry
            .with(Layer::new().with_writer(io::stderr).json())
            .try_init()
    } else {
        registry
            .with(Layer::new().with_writer(io::stderr).with_target(false))
            .try_init()
    };

    installed.map_err(|e| anyhow!("Failed to initialise logging: {}", e))
}
