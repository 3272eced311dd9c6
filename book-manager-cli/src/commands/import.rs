use std::path::Path;

use book_manager_import::{
    ImportOptions, ImportStats, LogAudit, LogProgress, import_goodreads, log_import,
};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

/// Import a Goodreads library export for an existing user.
pub(crate) fn run_import(
    db_path: &Path,
    csvfile: &Path,
    username: &str,
    overwrite: bool,
) -> Result<(), CliError> {
    let conn = book_manager_db::open_database(db_path).map_err(|e| {
        CliError::database(format!(
            "Failed to open catalog database at {}: {}",
            db_path.display(),
            e
        ))
    })?;

    let user = book_manager_db::find_user_by_username(&conn, username)
        .map_err(|e| CliError::database(format!("Failed to look up user: {}", e)))?
        .ok_or_else(|| CliError::unknown_user(username))?;

    log::info!(
        "Importing {} for {}{}",
        csvfile.display().if_supports_color(Stdout, |t| t.cyan()),
        user.username,
        if overwrite { " (overwriting books)" } else { "" },
    );

    let options = ImportOptions { overwrite };
    let stats = import_goodreads(
        &conn,
        csvfile,
        &user,
        &options,
        &LogAudit,
        Some(&LogProgress),
    )?;

    log_import(&conn, &source_name(csvfile), &user, &stats)?;

    print_summary(&stats);
    Ok(())
}

/// Name recorded in the import log: the export's path, absolute when it can
/// be resolved.
fn source_name(csvfile: &Path) -> String {
    std::fs::canonicalize(csvfile)
        .unwrap_or_else(|_| csvfile.to_path_buf())
        .display()
        .to_string()
}

fn print_summary(stats: &ImportStats) {
    crate::log_blank();
    log::info!(
        "{}",
        "Import Summary".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Rows:                {:>6}", stats.rows);
    log::info!("  Bindings created:    {:>6}", stats.bindings_created);
    log::info!("  Publishers created:  {:>6}", stats.publishers_created);
    log::info!("  Authors created:     {:>6}", stats.authors_created);
    log::info!(
        "  Books:               {:>6} created, {} updated, {} unchanged",
        stats.books_created,
        stats.books_updated,
        stats.books_unchanged,
    );
    log::info!(
        "  Readings:            {:>6} created, {} updated",
        stats.readings_created,
        stats.readings_updated,
    );
    log::info!("  Shelves created:     {:>6}", stats.shelves_created);
}
