//! Migrate command - move a graph to a migration version

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::Confirm;
use tgmigrate_core::{Direction, MigrateRequest, MigrationReport};

use super::{load_config, run_context, ConnectionArgs, RunLock};
use crate::output;

pub struct MigrateOptions {
    pub version: String,
    pub init_version: Option<String>,
    pub dry_run: bool,
    pub yes: bool,
    pub json: bool,
    pub timeout: Option<u64>,
}

pub fn run(config_path: Option<&Path>, args: &ConnectionArgs, opts: MigrateOptions) -> Result<()> {
    let mut config = load_config(config_path, args)?;
    if opts.init_version.is_some() {
        config.init_version = opts.init_version.clone();
    }

    let graph = config.graph()?.to_string();
    let dir = config.migrations_dir();
    if !dir.is_dir() {
        anyhow::bail!("Migrations directory not found: {}", dir.display());
    }

    let _lock = RunLock::acquire(&dir)?;
    let (service, _) = tgmigrate_core::connect(config.tigergraph_settings()?)?;
    let ctx = run_context(opts.timeout);

    // Going down drops schema; ask first when someone is at the terminal
    if !opts.dry_run && !opts.yes && !opts.json && atty::is(atty::Stream::Stdin) {
        let plan = service.plan(&ctx, &graph, &opts.version)?;
        if plan.direction == Direction::Down && !plan.steps.is_empty() {
            println!(
                "\n{}",
                format!(
                    "This will revert {} migration(s) on '{}': {}",
                    plan.steps.len(),
                    graph,
                    plan.steps.join(", ")
                )
                .yellow()
            );
            if !Confirm::new()
                .with_prompt("Continue?")
                .default(false)
                .interact()?
            {
                println!("{}\n", "Cancelled".dimmed());
                return Ok(());
            }
        }
    }

    let request = MigrateRequest {
        target: graph,
        desired: opts.version,
        initial_version: config.init_version.clone(),
        migration_dir: dir,
        dry_run: opts.dry_run,
    };

    let report = service
        .migrate(&ctx, &request)
        .with_context(|| format!("Migration of '{}' failed", request.target))?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &MigrationReport) {
    println!();
    if report.bootstrapped {
        output::info("Created migration tracking schema");
    }
    if !report.fast_forwarded.is_empty() {
        output::info(&format!(
            "Recorded as already applied: {}",
            report.fast_forwarded.join(", ")
        ));
    }

    if report.is_up_to_date() {
        output::success(&format!(
            "'{}' is already at version {}",
            report.target, report.desired
        ));
        println!();
        return;
    }

    let mut table = output::create_table();
    table.set_header(vec!["Version", "Direction", "Status"]);
    for version in &report.steps {
        let status = if report.applied.contains(version) {
            "applied".green().to_string()
        } else {
            "planned".dimmed().to_string()
        };
        table.add_row(vec![version.clone(), report.direction.to_string(), status]);
    }
    println!("{}", table);
    println!();

    let from = output::version_or_none(report.current.as_deref());
    if report.dry_run {
        output::warning(&format!(
            "Dry run: {} -> {} not applied",
            from, report.desired
        ));
    } else {
        output::success(&format!(
            "'{}' migrated {} -> {}",
            report.target, from, report.desired
        ));
    }
    println!();
}
