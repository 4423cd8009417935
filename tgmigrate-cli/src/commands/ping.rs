//! Ping command - check that TigerGraph is reachable

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use colored::Colorize;

use super::{load_config, run_context, ConnectionArgs};

pub fn run(config_path: Option<&Path>, args: &ConnectionArgs) -> Result<()> {
    let config = load_config(config_path, args)?;
    let settings = config.tigergraph_settings()?;
    let url = settings.base_url.clone();

    let (_, gateway) = tgmigrate_core::connect(settings)?;

    let started = Instant::now();
    gateway
        .client()
        .ping(&run_context(None))
        .with_context(|| format!("TigerGraph at {} is not reachable", url))?;

    println!(
        "{} {} {}",
        "✓".green(),
        url,
        format!("({} ms)", started.elapsed().as_millis()).dimmed()
    );
    Ok(())
}
