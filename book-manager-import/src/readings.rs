//! Second pass, per row: refresh the reader's shelf and reading for a book.
//!
//! Unlike book metadata, reading data from the current file always wins.

use book_manager_catalog::types::{Book, Reading, User};
use book_manager_db::operations;
use rusqlite::Connection;

use crate::audit::{AuditEvent, AuditSink, EntityKind, quoted};
use crate::error::ImportError;
use crate::goodreads::ImportStats;
use crate::row::{
    GoodreadsRow, non_empty, parse_date, parse_int, parse_optional_date, parse_optional_int,
};

/// Get or create `user`'s reading of `book` and overwrite it from `row`.
///
/// A new reading is placed on the row's exclusive shelf; an existing one
/// keeps its shelf. Notes, review and date read are only replaced when the
/// row has a value for them. The store rejects out-of-range ratings and
/// notes containing markup.
pub fn import_reading(
    conn: &Connection,
    book: &Book,
    user: &User,
    row: &GoodreadsRow,
    audit: &dyn AuditSink,
    stats: &mut ImportStats,
) -> Result<Reading, ImportError> {
    let (shelf, shelf_created) =
        operations::get_or_create_shelf(conn, user.id, &row.exclusive_shelf)?;
    if shelf_created {
        stats.shelves_created += 1;
        audit.record(&AuditEvent::created(
            EntityKind::Shelf,
            format!("user={} {}", user.username, quoted("name", &shelf.name)),
        ));
    }

    let date_added = parse_date("Date Added", &row.date_added)?;
    let (mut reading, created) = match operations::find_reading(conn, book.id, user.id)? {
        Some(existing) => (existing, false),
        None => (Reading::new(book.id, user.id, Some(shelf.id), date_added), true),
    };

    reading.date_added = date_added;
    if let Some(date_read) = parse_optional_date("Date Read", &row.date_read)? {
        reading.date_read = Some(date_read);
    }
    if let Some(notes) = non_empty(&row.private_notes) {
        reading.private_notes = Some(notes);
    }
    if let Some(review) = non_empty(&row.my_review) {
        reading.review = Some(review);
    }
    reading.read_count = parse_optional_int("Read Count", &row.read_count)?.unwrap_or(0);
    reading.rating = parse_int("My Rating", &row.my_rating)?;

    operations::save_reading(conn, &mut reading)?;

    let key = format!("user={} {}", user.username, quoted("title", &book.title));
    if created {
        stats.readings_created += 1;
        audit.record(&AuditEvent::created(EntityKind::Reading, key));
    } else {
        stats.readings_updated += 1;
        audit.record(&AuditEvent::updated(EntityKind::Reading, key));
    }

    Ok(reading)
}
