//! tgmigrate - versioned schema migrations for TigerGraph

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod logging;
mod output;

use commands::{migrate, ping, status, ConnectionArgs};

/// tgmigrate - versioned schema migrations for TigerGraph
#[derive(Parser)]
#[command(name = "tgmigrate", version, about, long_about = None)]
struct Cli {
    /// Settings file (default: ./tgmigrate.json, then the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log HTTP calls and step details
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate a graph up or down to a version
    Migrate {
        /// Desired version, e.g. 004
        version: String,
        #[command(flatten)]
        connection: ConnectionArgs,
        /// Versions to record as applied when the tracking schema is first created
        #[arg(long, env = "TIGER_GRAPH_MIGRATION_INIT_VERSION")]
        init_version: Option<String>,
        /// Resolve the steps and files without applying anything
        #[arg(long)]
        dry_run: bool,
        /// Skip the confirmation prompt for down migrations
        #[arg(long, short)]
        yes: bool,
        /// Give up on the whole run after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show tracking state, current version and local migration files
    Status {
        #[command(flatten)]
        connection: ConnectionArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that the TigerGraph REST endpoint is reachable
    Ping {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.verbose, cli.log_json) {
        output::error(&e.to_string());
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Migrate { version, connection, init_version, dry_run, yes, timeout, json } => {
            let opts = migrate::MigrateOptions { version, init_version, dry_run, yes, json, timeout };
            migrate::run(config, &connection, opts)
        }
        Commands::Status { connection, json } => status::run(config, &connection, json),
        Commands::Ping { connection } => ping::run(config, &connection),
    }
}
