//! Status command - tracking state, current version and local migration files

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use tgmigrate_core::adapters::filesystem::{MigrationDirectory, MigrationFile};
use tgmigrate_core::{Direction, MigrationService, RunContext, Version};

use super::{load_config, run_context, ConnectionArgs};
use crate::output;

#[derive(Debug, Serialize)]
struct StatusSummary {
    graph: String,
    initialized: bool,
    current_version: Option<String>,
    migrations_dir: String,
    files: Vec<MigrationFile>,
}

pub fn run(config_path: Option<&Path>, args: &ConnectionArgs, json: bool) -> Result<()> {
    let config = load_config(config_path, args)?;
    let graph = config.graph()?.to_string();
    let dir = MigrationDirectory::new(config.migrations_dir());

    let (service, _) = tgmigrate_core::connect(config.tigergraph_settings()?)?;
    let summary = summarize(&service, &run_context(None), graph, &dir)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", "Migration Status".bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Graph", summary.graph.as_str()]);
    table.add_row(vec![
        "Tracking schema",
        if summary.initialized { "initialized" } else { "not initialized" },
    ]);
    let current = output::version_or_none(summary.current_version.as_deref());
    table.add_row(vec!["Current version", current.as_str()]);
    table.add_row(vec!["Migrations directory", summary.migrations_dir.as_str()]);
    println!("{}", table);
    println!();

    if summary.files.is_empty() {
        println!("{}", "No migration files found".dimmed());
        return Ok(());
    }

    let current_version = summary
        .current_version
        .as_deref()
        .and_then(|v| Version::parse(v).ok());

    let mut files = output::create_table();
    files.set_header(vec!["Version", "Name", "Direction", "Applied"]);
    for file in &summary.files {
        let applied = match is_applied(file, current_version) {
            Some(true) => "yes".green().to_string(),
            Some(false) => "no".dimmed().to_string(),
            None => "-".dimmed().to_string(),
        };
        files.add_row(vec![
            file.version.clone(),
            file.name.clone(),
            file.direction.to_string(),
            applied,
        ]);
    }
    println!("{}", files);

    Ok(())
}

/// Gather the status, checking the tracking schema once
fn summarize(
    service: &MigrationService,
    ctx: &RunContext,
    graph: String,
    dir: &MigrationDirectory,
) -> Result<StatusSummary> {
    let initialized = service.is_initialized(ctx)?;
    let current_version = if initialized {
        service.latest_version(ctx, &graph)?
    } else {
        None
    };
    let files = if dir.path().is_dir() { dir.list()? } else { Vec::new() };

    Ok(StatusSummary {
        graph,
        initialized,
        current_version,
        migrations_dir: dir.path().display().to_string(),
        files,
    })
}

/// Whether an up file's version is at or below `current`. Down files have no
/// applied state.
fn is_applied(file: &MigrationFile, current: Option<Version>) -> Option<bool> {
    if file.direction != Direction::Up {
        return None;
    }
    let applied = match (Version::parse(&file.version), current) {
        (Ok(version), Some(current)) => version <= current,
        _ => false,
    };
    Some(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tgmigrate_core::adapters::memory::InMemoryGateway;

    fn file(version: &str, direction: Direction) -> MigrationFile {
        MigrationFile {
            version: version.to_string(),
            name: "step".to_string(),
            direction,
            path: PathBuf::from(format!("{}_step.{}.gsql", version, direction)),
        }
    }

    #[test]
    fn test_down_files_have_no_applied_state() {
        let current = Some(Version::new(2));

        assert_eq!(is_applied(&file("001", Direction::Up), current), Some(true));
        assert_eq!(is_applied(&file("003", Direction::Up), current), Some(false));
        assert_eq!(is_applied(&file("001", Direction::Down), current), None);
        assert_eq!(is_applied(&file("001", Direction::Up), None), Some(false));
    }

    #[test]
    fn test_summary_checks_tracking_schema_once() {
        let store = Arc::new(
            InMemoryGateway::new()
                .initialized()
                .with_record("MyGraph", "001", "up"),
        );
        let service = MigrationService::new(store.clone(), store.clone());
        let dir = MigrationDirectory::new("/definitely/not/a/real/dir");

        let summary = summarize(
            &service,
            &RunContext::background(),
            "MyGraph".to_string(),
            &dir,
        )
        .unwrap();

        assert!(summary.initialized);
        assert_eq!(summary.current_version.as_deref(), Some("001"));
        assert!(summary.files.is_empty());
        assert_eq!(store.init_check_count(), 1);
    }

    #[test]
    fn test_summary_skips_latest_when_uninitialized() {
        let store = Arc::new(InMemoryGateway::new());
        let service = MigrationService::new(store.clone(), store.clone());
        let dir = MigrationDirectory::new("/definitely/not/a/real/dir");

        let summary = summarize(
            &service,
            &RunContext::background(),
            "MyGraph".to_string(),
            &dir,
        )
        .unwrap();

        assert!(!summary.initialized);
        assert_eq!(summary.current_version, None);
        assert_eq!(store.latest_call_count(), 0);
    }
}
