use std::path::Path;

use book_manager_catalog::types::ImportLog;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

/// Number of recent imports listed under the counts.
const RECENT_IMPORTS: u32 = 5;

pub(crate) fn run_stats(db_path: &Path) -> Result<(), CliError> {
    if !db_path.exists() {
        log::warn!("No catalog database found at {}", db_path.display());
        log::info!("Run 'book-manager user add <username>' to create one.");
        return Ok(());
    }

    let conn = book_manager_db::open_database(db_path)
        .map_err(|e| CliError::database(format!("Failed to open catalog database: {}", e)))?;

    let stats = book_manager_db::catalog_stats(&conn)
        .map_err(|e| CliError::database(format!("Failed to query catalog stats: {}", e)))?;

    log::info!(
        "{}",
        "Catalog Database Statistics".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Database: {}", db_path.display());
    crate::log_blank();
    log::info!("  Users:          {:>8}", stats.users);
    log::info!("  Books:          {:>8}", stats.books);
    log::info!("  Authors:        {:>8}", stats.authors);
    log::info!("  Publishers:     {:>8}", stats.publishers);
    log::info!("  Bindings:       {:>8}", stats.bindings);
    log::info!("  Shelves:        {:>8}", stats.shelves);
    log::info!("  Readings:       {:>8}", stats.readings);
    log::info!("  Imports:        {:>8}", stats.imports);

    let logs = book_manager_db::list_import_logs(&conn, Some(RECENT_IMPORTS))
        .map_err(|e| CliError::database(format!("Failed to list imports: {}", e)))?;
    if !logs.is_empty() {
        crate::log_blank();
        log::info!("{}", "Recent Imports".if_supports_color(Stdout, |t| t.bold()));
        for entry in &logs {
            log::info!("  {}", format_import_log(entry));
        }
    }

    Ok(())
}

fn format_import_log(entry: &ImportLog) -> String {
    let when = chrono::DateTime::parse_from_rfc3339(&entry.imported_at)
        .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| entry.imported_at.clone());
    format!(
        "{}  {} {}: {} created, {} updated, {} unchanged",
        when,
        entry.source_type,
        entry.source_name,
        entry.records_created,
        entry.records_updated,
        entry.records_unchanged,
    )
}
