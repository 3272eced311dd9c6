//! Second pass, per row: find or create the book and, when allowed, rewrite
//! its fields and ordered author links.

use book_manager_catalog::types::Book;
use book_manager_db::operations;
use rusqlite::Connection;

use crate::audit::{AuditEvent, AuditSink, EntityKind, quoted};
use crate::error::ImportError;
use crate::goodreads::ImportStats;
use crate::lookups::{LookupMaps, author_keys};
use crate::row::{GoodreadsRow, clean_isbn, parse_optional_int};

/// Get or create the [`Book`] titled by `row`.
///
/// A new book, or any book when `overwrite` is set, is fully repopulated from
/// the row. An existing book with `overwrite` unset is returned untouched.
/// Either way an existing book is reported as `updated` to the audit sink.
///
/// Every field and lookup the row refers to is resolved before anything is
/// written, so a row that fails to resolve leaves no book behind.
pub fn import_book(
    conn: &Connection,
    row: &GoodreadsRow,
    lookups: &LookupMaps,
    overwrite: bool,
    audit: &dyn AuditSink,
    stats: &mut ImportStats,
) -> Result<Book, ImportError> {
    let existing = operations::find_book_by_title(conn, &row.title)?;
    if let Some(book) = existing.as_ref()
        && !overwrite
    {
        stats.books_unchanged += 1;
        audit.record(&AuditEvent::updated(
            EntityKind::Book,
            quoted("title", &book.title),
        ));
        return Ok(book.clone());
    }

    let fields = BookFields::resolve(row, lookups)?;

    let (mut book, created) = match existing {
        Some(book) => (book, false),
        None => operations::get_or_create_book(conn, &row.title)?,
    };
    fields.write(conn, &mut book)?;

    let key = quoted("title", &book.title);
    if created {
        stats.books_created += 1;
        audit.record(&AuditEvent::created(EntityKind::Book, key));
    } else {
        stats.books_updated += 1;
        audit.record(&AuditEvent::updated(EntityKind::Book, key));
    }

    Ok(book)
}

/// A row's book fields with every lookup already resolved to an id.
struct BookFields {
    isbn: Option<String>,
    isbn13: Option<String>,
    num_pages: Option<i64>,
    year_published: Option<i64>,
    original_publication_year: Option<i64>,
    binding_id: Option<i64>,
    publisher_id: Option<i64>,
    /// Author ids in billing order.
    author_ids: Vec<i64>,
}

impl BookFields {
    fn resolve(row: &GoodreadsRow, lookups: &LookupMaps) -> Result<Self, ImportError> {
        let binding_id = match row.binding.as_str() {
            "" => None,
            name => Some(lookups.binding(name)?.id),
        };
        let publisher_id = match row.publisher.as_str() {
            "" => None,
            name => Some(lookups.publisher(name)?.id),
        };
        let author_ids = author_keys(row)
            .into_iter()
            .map(|(full_name, _)| lookups.author(&full_name).map(|a| a.id))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            isbn: clean_isbn(&row.isbn),
            isbn13: clean_isbn(&row.isbn13),
            num_pages: parse_optional_int("Number of Pages", &row.number_of_pages)?,
            year_published: parse_optional_int("Year Published", &row.year_published)?,
            original_publication_year: parse_optional_int(
                "Original Publication Year",
                &row.original_publication_year,
            )?,
            binding_id,
            publisher_id,
            author_ids,
        })
    }

    /// Rewrite every scalar field and rebuild the author links from scratch.
    /// A blank binding or publisher keeps the stored one.
    fn write(self, conn: &Connection, book: &mut Book) -> Result<(), ImportError> {
        book.isbn = self.isbn;
        book.isbn13 = self.isbn13;
        book.num_pages = self.num_pages;
        book.year_published = self.year_published;
        book.original_publication_year = self.original_publication_year;
        if self.binding_id.is_some() {
            book.binding_id = self.binding_id;
        }
        if self.publisher_id.is_some() {
            book.publisher_id = self.publisher_id;
        }
        operations::save_book(conn, book)?;

        operations::clear_book_authors(conn, book.id)?;
        for (i, author_id) in self.author_ids.into_iter().enumerate() {
            operations::add_book_author(conn, book.id, author_id, i as u32 + 1)?;
        }
        Ok(())
    }
}
