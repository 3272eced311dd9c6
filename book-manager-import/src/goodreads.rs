//! Import a Goodreads library export for one reader.
//!
//! The file is read twice. The first pass resolves every binding, publisher
//! and author in a single transaction (see [`crate::lookups`]). The second
//! pass commits each row on its own: the book, its author links, the shelf
//! and the reading. A failing row aborts the import; rows committed before
//! it stay, and re-running the same file is idempotent.

use std::path::Path;

use book_manager_catalog::types::{ImportLog, User};
use book_manager_db::operations;
use rusqlite::Connection;

use crate::audit::AuditSink;
use crate::books::import_book;
use crate::error::ImportError;
use crate::lookups::load_lookups;
use crate::progress::{ImportPhase, ImportProgress};
use crate::readings::import_reading;
use crate::row::{GoodreadsRow, open_export, open_file};

/// Source type recorded in the import log.
pub const SOURCE_TYPE: &str = "goodreads";

/// Statistics from a single Goodreads import.
#[derive(Debug, Default)]
pub struct ImportStats {
    pub rows: u64,
    pub bindings_created: u64,
    pub publishers_created: u64,
    pub authors_created: u64,
    pub books_created: u64,
    /// Existing books repopulated because overwrite was on.
    pub books_updated: u64,
    /// Existing books left as stored.
    pub books_unchanged: u64,
    pub readings_created: u64,
    pub readings_updated: u64,
    pub shelves_created: u64,
}

/// Knobs for [`import_goodreads`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Repopulate books that already exist instead of leaving them alone.
    pub overwrite: bool,
}

/// Import the export at `path` into the catalog on behalf of `user`.
///
/// `audit` receives one event per created or touched entity. The optional
/// `progress` callback is invoked after each row is committed.
pub fn import_goodreads(
    conn: &Connection,
    path: &Path,
    user: &User,
    options: &ImportOptions,
    audit: &dyn AuditSink,
    progress: Option<&dyn ImportProgress>,
) -> Result<ImportStats, ImportError> {
    let mut stats = ImportStats::default();

    if let Some(p) = progress {
        p.on_phase(ImportPhase::ResolveLookups);
    }
    let lookups = load_lookups(conn, open_file(path)?, audit, &mut stats)?;

    let total = stats.rows as usize;
    if let Some(p) = progress {
        p.on_phase(ImportPhase::ImportRows { total });
    }
    let mut csv = open_export(path)?;
    for (i, result) in csv.deserialize::<GoodreadsRow>().enumerate() {
        let row_number = i + 1;
        let row = result.map_err(|e| ImportError::at_row(row_number, e.into()))?;

        let tx = conn.unchecked_transaction()?;
        let book = import_book(&tx, &row, &lookups, options.overwrite, audit, &mut stats)
            .map_err(|e| ImportError::at_row(row_number, e))?;
        import_reading(&tx, &book, user, &row, audit, &mut stats)
            .map_err(|e| ImportError::at_row(row_number, e))?;
        tx.commit()?;

        if let Some(p) = progress {
            p.on_row(row_number, total, &book.title);
        }
    }

    if let Some(p) = progress {
        p.on_complete(&stats);
    }

    Ok(stats)
}

/// Log an import run in the import_log table.
pub fn log_import(
    conn: &Connection,
    source_name: &str,
    user: &User,
    stats: &ImportStats,
) -> Result<i64, ImportError> {
    let now = chrono::Utc::now().to_rfc3339();
    let log_entry = ImportLog {
        id: 0,
        source_type: SOURCE_TYPE.to_string(),
        source_name: source_name.to_string(),
        reader_id: Some(user.id),
        imported_at: now,
        records_created: (stats.books_created + stats.readings_created) as i64,
        records_updated: (stats.books_updated + stats.readings_updated) as i64,
        records_unchanged: stats.books_unchanged as i64,
    };
    let id = operations::insert_import_log(conn, &log_entry)?;
    Ok(id)
}
