//! Read queries for the catalog database.
//!
//! Provides ordered author lists, per-reader readings, import history and
//! summary counts.

use book_manager_catalog::types::*;
use rusqlite::{Connection, params};

use crate::operations::{OperationError, READING_COLUMNS, row_to_author, row_to_reading};

// ── Author Lookups ──────────────────────────────────────────────────────────

/// List a book's authors in billing order (primary author first).
pub fn authors_for_book(
    conn: &Connection,
    book_id: i64,
) -> Result<Vec<BookAuthor>, OperationError> {
    let mut stmt = conn.prepare(
        r#"SELECT a.id, a.first_name, a.middle_name, a.last_name, a.full_name,
                  a.created_at, a.updated_at, ba."order"
           FROM book_authors ba JOIN authors a ON a.id = ba.author_id
           WHERE ba.book_id = ?1
           ORDER BY ba."order", a.id"#,
    )?;
    let rows = stmt.query_map(params![book_id], |row| {
        Ok(BookAuthor {
            book_id,
            author: row_to_author(row)?,
            order: row.get(7)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// The author at order 1 for a book, if any.
pub fn primary_author(conn: &Connection, book_id: i64) -> Result<Option<Author>, OperationError> {
    Ok(authors_for_book(conn, book_id)?
        .into_iter()
        .find(|link| link.order == 1)
        .map(|link| link.author))
}

// ── Reading Lookups ─────────────────────────────────────────────────────────

/// List every reading for a reader, oldest first.
pub fn readings_for_user(
    conn: &Connection,
    reader_id: i64,
) -> Result<Vec<Reading>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {READING_COLUMNS} FROM readings WHERE reader_id = ?1 ORDER BY id"
    ))?;
    let rows = stmt.query_map(params![reader_id], row_to_reading)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Statistics ──────────────────────────────────────────────────────────────

/// Get overall catalog statistics.
pub fn catalog_stats(conn: &Connection) -> Result<CatalogStats, OperationError> {
    let count = |table: &str| -> Result<i64, rusqlite::Error> {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
    };

    Ok(CatalogStats {
        users: count("users")?,
        books: count("books")?,
        authors: count("authors")?,
        publishers: count("publishers")?,
        bindings: count("bindings")?,
        shelves: count("shelves")?,
        readings: count("readings")?,
        imports: count("import_log")?,
    })
}

/// Summary statistics for the catalog.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub users: i64,
    pub books: i64,
    pub authors: i64,
    pub publishers: i64,
    pub bindings: i64,
    pub shelves: i64,
    pub readings: i64,
    pub imports: i64,
}

// ── Import Log Queries ──────────────────────────────────────────────────────

/// List recent import logs, newest first.
pub fn list_import_logs(
    conn: &Connection,
    limit: Option<u32>,
) -> Result<Vec<ImportLog>, OperationError> {
    let limit = limit.unwrap_or(20);
    let mut stmt = conn.prepare(&format!(
        "SELECT id, source_type, source_name, reader_id, imported_at,
                records_created, records_updated, records_unchanged
         FROM import_log ORDER BY imported_at DESC, id DESC LIMIT {limit}"
    ))?;
    let rows = stmt.query_map([], |row| {
        Ok(ImportLog {
            id: row.get(0)?,
            source_type: row.get(1)?,
            source_name: row.get(2)?,
            reader_id: row.get(3)?,
            imported_at: row.get(4)?,
            records_created: row.get(5)?,
            records_updated: row.get(6)?,
            records_unchanged: row.get(7)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}
