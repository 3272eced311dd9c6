//! Get-or-create, lookup, and save operations for all catalog entity types.
//!
//! Every `get_or_create_*` returns the entity together with a flag that is
//! `true` when the row was inserted by this call. None of these functions
//! open their own transaction; callers wrap them in whatever unit of work they
//! need.

use book_manager_catalog::slug::numbered_slug;
use book_manager_catalog::types::*;
use book_manager_catalog::validators::{
    ValidationError, validate_no_markup, validate_non_negative, validate_rating,
};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Entity not found: {entity_type} with id '{id}'")]
    NotFound { entity_type: String, id: String },
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Storage format for calendar dates.
const DATE_FORMAT: &str = "%Y-%m-%d";

// ── User Operations ─────────────────────────────────────────────────────────

/// Insert a new reader. Fails if the username is taken.
pub fn insert_user(conn: &Connection, username: &str) -> Result<User, OperationError> {
    conn.execute("INSERT INTO users (username) VALUES (?1)", params![username])?;
    Ok(User {
        id: conn.last_insert_rowid(),
        username: username.to_string(),
    })
}

/// Find a reader by exact username.
pub fn find_user_by_username(
    conn: &Connection,
    username: &str,
) -> Result<Option<User>, OperationError> {
    conn.query_row(
        "SELECT id, username FROM users WHERE username = ?1",
        params![username],
        |row| {
            Ok(User {
                id: row.get(0)?,
                username: row.get(1)?,
            })
        },
    )
    .optional()
    .map_err(Into::into)
}

// ── Binding Operations ──────────────────────────────────────────────────────

/// Find a binding by exact name, creating it if absent.
pub fn get_or_create_binding(
    conn: &Connection,
    name: &str,
) -> Result<(Binding, bool), OperationError> {
    let existing = conn
        .query_row(
            "SELECT id, name FROM bindings WHERE name = ?1 ORDER BY id LIMIT 1",
            params![name],
            |row| {
                Ok(Binding {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?;
    if let Some(binding) = existing {
        return Ok((binding, false));
    }

    conn.execute("INSERT INTO bindings (name) VALUES (?1)", params![name])?;
    Ok((
        Binding {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
        },
        true,
    ))
}

// ── Publisher Operations ────────────────────────────────────────────────────

/// Find a publisher by exact name, creating it if absent.
pub fn get_or_create_publisher(
    conn: &Connection,
    name: &str,
) -> Result<(Publisher, bool), OperationError> {
    let select = "SELECT id, name, created_at, updated_at FROM publishers";
    let existing = conn
        .query_row(
            &format!("{select} WHERE name = ?1 ORDER BY id LIMIT 1"),
            params![name],
            row_to_publisher,
        )
        .optional()?;
    if let Some(publisher) = existing {
        return Ok((publisher, false));
    }

    conn.execute("INSERT INTO publishers (name) VALUES (?1)", params![name])?;
    let publisher = conn.query_row(
        &format!("{select} WHERE id = ?1"),
        params![conn.last_insert_rowid()],
        row_to_publisher,
    )?;
    Ok((publisher, true))
}

fn row_to_publisher(row: &rusqlite::Row<'_>) -> rusqlite::Result<Publisher> {
    Ok(Publisher {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

// ── Author Operations ───────────────────────────────────────────────────────

const AUTHOR_COLUMNS: &str =
    "id, first_name, middle_name, last_name, full_name, created_at, updated_at";

/// Find an author by canonical full name.
pub fn find_author_by_full_name(
    conn: &Connection,
    full_name: &str,
) -> Result<Option<Author>, OperationError> {
    conn.query_row(
        &format!("SELECT {AUTHOR_COLUMNS} FROM authors WHERE full_name = ?1"),
        params![full_name],
        row_to_author,
    )
    .optional()
    .map_err(Into::into)
}

/// Find an author by canonical full name, creating an empty record if absent.
///
/// A freshly created author has blank name components; callers fill them in
/// with [`save_author`].
pub fn get_or_create_author(
    conn: &Connection,
    full_name: &str,
) -> Result<(Author, bool), OperationError> {
    if let Some(author) = find_author_by_full_name(conn, full_name)? {
        return Ok((author, false));
    }

    conn.execute(
        "INSERT INTO authors (full_name) VALUES (?1)",
        params![full_name],
    )?;
    let author = conn.query_row(
        &format!("SELECT {AUTHOR_COLUMNS} FROM authors WHERE id = ?1"),
        params![conn.last_insert_rowid()],
        row_to_author,
    )?;
    Ok((author, true))
}

/// Write an author's name components back to the store.
pub fn save_author(conn: &Connection, author: &Author) -> Result<(), OperationError> {
    let changed = conn.execute(
        "UPDATE authors SET first_name = ?2, middle_name = ?3, last_name = ?4,
             full_name = ?5, updated_at = datetime('now')
         WHERE id = ?1",
        params![
            author.id,
            author.first_name,
            author.middle_name,
            author.last_name,
            author.full_name,
        ],
    )?;
    if changed == 0 {
        return Err(OperationError::NotFound {
            entity_type: "author".to_string(),
            id: author.id.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn row_to_author(row: &rusqlite::Row<'_>) -> rusqlite::Result<Author> {
    Ok(Author {
        id: row.get(0)?,
        first_name: row.get(1)?,
        middle_name: row.get(2)?,
        last_name: row.get(3)?,
        full_name: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

// ── Book Operations ─────────────────────────────────────────────────────────

const BOOK_COLUMNS: &str = "id, title, slug, isbn, isbn13, num_pages, year_published,
    original_publication_year, binding_id, publisher_id, created_at, updated_at";

/// Find a book by exact title.
pub fn find_book_by_title(conn: &Connection, title: &str) -> Result<Option<Book>, OperationError> {
    conn.query_row(
        &format!("SELECT {BOOK_COLUMNS} FROM books WHERE title = ?1"),
        params![title],
        row_to_book,
    )
    .optional()
    .map_err(Into::into)
}

/// Find a book by exact title, creating a bare record if absent.
///
/// New books get a unique slug derived from the title; all other fields start
/// empty.
pub fn get_or_create_book(conn: &Connection, title: &str) -> Result<(Book, bool), OperationError> {
    if let Some(book) = find_book_by_title(conn, title)? {
        return Ok((book, false));
    }

    let slug = unique_book_slug(conn, title)?;
    conn.execute(
        "INSERT INTO books (title, slug) VALUES (?1, ?2)",
        params![title, slug],
    )?;
    let book = conn.query_row(
        &format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?1"),
        params![conn.last_insert_rowid()],
        row_to_book,
    )?;
    Ok((book, true))
}

/// Pick the first free slug among `slug`, `slug-2`, `slug-3`, ...
fn unique_book_slug(conn: &Connection, title: &str) -> Result<String, OperationError> {
    let base = book_manager_catalog::slugify(title);
    let mut n = 1;
    loop {
        let candidate = numbered_slug(&base, n);
        let taken: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM books WHERE slug = ?1)",
            params![candidate],
            |row| row.get(0),
        )?;
        if !taken {
            return Ok(candidate);
        }
        n += 1;
    }
}

/// Write a book's scalar fields back to the store. Title and slug are not
/// changed.
pub fn save_book(conn: &Connection, book: &Book) -> Result<(), OperationError> {
    if let Some(pages) = book.num_pages {
        validate_non_negative("num_pages", pages)?;
    }
    let changed = conn.execute(
        "UPDATE books SET isbn = ?2, isbn13 = ?3, num_pages = ?4, year_published = ?5,
             original_publication_year = ?6, binding_id = ?7, publisher_id = ?8,
             updated_at = datetime('now')
         WHERE id = ?1",
        params![
            book.id,
            book.isbn,
            book.isbn13,
            book.num_pages,
            book.year_published,
            book.original_publication_year,
            book.binding_id,
            book.publisher_id,
        ],
    )?;
    if changed == 0 {
        return Err(OperationError::NotFound {
            entity_type: "book".to_string(),
            id: book.id.to_string(),
        });
    }
    Ok(())
}

/// Remove every author link for a book.
pub fn clear_book_authors(conn: &Connection, book_id: i64) -> Result<usize, OperationError> {
    let removed = conn.execute(
        "DELETE FROM book_authors WHERE book_id = ?1",
        params![book_id],
    )?;
    Ok(removed)
}

/// Link an author to a book at position `order` (1 = primary author).
pub fn add_book_author(
    conn: &Connection,
    book_id: i64,
    author_id: i64,
    order: u32,
) -> Result<(), OperationError> {
    conn.execute(
        r#"INSERT INTO book_authors (book_id, author_id, "order") VALUES (?1, ?2, ?3)"#,
        params![book_id, author_id, order],
    )?;
    Ok(())
}

pub(crate) fn row_to_book(row: &rusqlite::Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        isbn: row.get(3)?,
        isbn13: row.get(4)?,
        num_pages: row.get(5)?,
        year_published: row.get(6)?,
        original_publication_year: row.get(7)?,
        binding_id: row.get(8)?,
        publisher_id: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

// ── Shelf Operations ────────────────────────────────────────────────────────

/// Find a reader's shelf by name, creating it if absent.
pub fn get_or_create_shelf(
    conn: &Connection,
    reader_id: i64,
    name: &str,
) -> Result<(Shelf, bool), OperationError> {
    let existing = conn
        .query_row(
            "SELECT id, name, reader_id FROM shelves
             WHERE reader_id = ?1 AND name = ?2 ORDER BY id LIMIT 1",
            params![reader_id, name],
            |row| {
                Ok(Shelf {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    reader_id: row.get(2)?,
                })
            },
        )
        .optional()?;
    if let Some(shelf) = existing {
        return Ok((shelf, false));
    }

    conn.execute(
        "INSERT INTO shelves (name, reader_id) VALUES (?1, ?2)",
        params![name, reader_id],
    )?;
    Ok((
        Shelf {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            reader_id,
        },
        true,
    ))
}

// ── Reading Operations ──────────────────────────────────────────────────────

pub(crate) const READING_COLUMNS: &str = "id, book_id, reader_id, shelf_id, rating,
    private_notes, review, read_count, date_added, date_read, created_at, updated_at";

/// Find the reading for a (book, reader) pair.
pub fn find_reading(
    conn: &Connection,
    book_id: i64,
    reader_id: i64,
) -> Result<Option<Reading>, OperationError> {
    conn.query_row(
        &format!(
            "SELECT {READING_COLUMNS} FROM readings
             WHERE book_id = ?1 AND reader_id = ?2 ORDER BY id LIMIT 1"
        ),
        params![book_id, reader_id],
        row_to_reading,
    )
    .optional()
    .map_err(Into::into)
}

/// Validate and store a reading.
///
/// A reading with `id == 0` is inserted and its `id` filled in; otherwise the
/// existing row is updated. Nothing is written when validation fails.
pub fn save_reading(conn: &Connection, reading: &mut Reading) -> Result<(), OperationError> {
    validate_reading(reading)?;

    let date_added = reading.date_added.format(DATE_FORMAT).to_string();
    let date_read = reading
        .date_read
        .map(|d| d.format(DATE_FORMAT).to_string());

    if reading.id == 0 {
        conn.execute(
            "INSERT INTO readings (book_id, reader_id, shelf_id, rating, private_notes,
                 review, read_count, date_added, date_read)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                reading.book_id,
                reading.reader_id,
                reading.shelf_id,
                reading.rating,
                reading.private_notes,
                reading.review,
                reading.read_count,
                date_added,
                date_read,
            ],
        )?;
        reading.id = conn.last_insert_rowid();
        return Ok(());
    }

    let changed = conn.execute(
        "UPDATE readings SET shelf_id = ?2, rating = ?3, private_notes = ?4, review = ?5,
             read_count = ?6, date_added = ?7, date_read = ?8, updated_at = datetime('now')
         WHERE id = ?1",
        params![
            reading.id,
            reading.shelf_id,
            reading.rating,
            reading.private_notes,
            reading.review,
            reading.read_count,
            date_added,
            date_read,
        ],
    )?;
    if changed == 0 {
        return Err(OperationError::NotFound {
            entity_type: "reading".to_string(),
            id: reading.id.to_string(),
        });
    }
    Ok(())
}

fn validate_reading(reading: &Reading) -> Result<(), ValidationError> {
    validate_rating(reading.rating)?;
    validate_non_negative("read_count", reading.read_count)?;
    if let Some(notes) = &reading.private_notes {
        validate_no_markup("private_notes", notes)?;
    }
    if let Some(review) = &reading.review {
        validate_no_markup("review", review)?;
    }
    Ok(())
}

pub(crate) fn row_to_reading(row: &rusqlite::Row<'_>) -> rusqlite::Result<Reading> {
    let date_added: String = row.get(8)?;
    let date_read: Option<String> = row.get(9)?;
    Ok(Reading {
        id: row.get(0)?,
        book_id: row.get(1)?,
        reader_id: row.get(2)?,
        shelf_id: row.get(3)?,
        rating: row.get(4)?,
        private_notes: row.get(5)?,
        review: row.get(6)?,
        read_count: row.get(7)?,
        date_added: parse_stored_date(8, &date_added)?,
        date_read: date_read
            .map(|d| parse_stored_date(9, &d))
            .transpose()?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn parse_stored_date(idx: usize, s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

// ── Import Log Operations ───────────────────────────────────────────────────

/// Insert an import log entry. Returns the generated ID.
pub fn insert_import_log(conn: &Connection, log: &ImportLog) -> Result<i64, OperationError> {
    conn.execute(
        "INSERT INTO import_log (source_type, source_name, reader_id, imported_at,
             records_created, records_updated, records_unchanged)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            log.source_type,
            log.source_name,
            log.reader_id,
            log.imported_at,
            log.records_created,
            log.records_updated,
            log.records_unchanged,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}
