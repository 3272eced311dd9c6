//! book-manager CLI
//!
//! Command-line interface for importing Goodreads library exports into the
//! book catalogue.

mod commands;
mod config;
mod error;

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub(crate) use error::CliError;

#[derive(Parser)]
#[command(name = "book-manager")]
#[command(about = "Manage a personal book catalogue", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a Goodreads library export for a user
    Import {
        /// Path to the exported CSV file
        csvfile: PathBuf,

        /// Reader the shelves and readings belong to
        username: String,

        /// Repopulate books that already exist in the catalogue
        #[arg(long)]
        overwrite: bool,
    },

    /// Manage readers
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Show catalogue statistics and recent imports
    Stats,
}

#[derive(Subcommand)]
enum UserAction {
    /// Register a new reader
    Add {
        /// Unique username
        username: String,
    },
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let db_path = config::resolve_db_path()?;
    log::debug!("Using catalog database at {}", db_path.display());

    match cli.command {
        Commands::Import {
            csvfile,
            username,
            overwrite,
        } => commands::import::run_import(&db_path, &csvfile, &username, overwrite),
        Commands::User { action } => match action {
            UserAction::Add { username } => commands::user::run_user_add(&db_path, &username),
        },
        Commands::Stats => commands::stats::run_stats(&db_path),
    }
}

/// Route `log` output to stderr, message only. `RUST_LOG` overrides the
/// default `info` filter.
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| match record.level() {
            log::Level::Info => writeln!(buf, "{}", record.args()),
            level => writeln!(buf, "{}: {}", level, record.args()),
        })
        .init();
}

/// Emit an empty line through the logger.
pub(crate) fn log_blank() {
    log::info!("");
}
