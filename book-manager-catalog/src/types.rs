//! Data model types for the book catalog.
//!
//! These types represent the persistent catalog schema: readers, bindings,
//! publishers, authors, books and their ordered author links, shelves,
//! readings, and import tracking. An `id` of `0` marks a record that has not
//! been stored yet.

use chrono::NaiveDate;

// ── Reader ──────────────────────────────────────────────────────────────────

/// A person whose readings are tracked in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
}

// ── Binding / Publisher ─────────────────────────────────────────────────────

/// Physical or format classification of a book (hardcover, paperback, ebook).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub id: i64,
    pub name: String,
}

/// A book publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publisher {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

// ── Author ──────────────────────────────────────────────────────────────────

/// A book author. `full_name` is the canonical parsed rendering and is unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: i64,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub full_name: String,
    pub created_at: String,
    pub updated_at: String,
}

// ── Book ────────────────────────────────────────────────────────────────────

/// A book, unique by title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    /// URL-safe rendering of the title, unique across books.
    pub slug: String,
    pub isbn: Option<String>,
    pub isbn13: Option<String>,
    pub num_pages: Option<i64>,
    pub year_published: Option<i64>,
    pub original_publication_year: Option<i64>,
    pub binding_id: Option<i64>,
    pub publisher_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// One link in a book's ordered author list. `order == 1` is the primary author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookAuthor {
    pub book_id: i64,
    pub author: Author,
    pub order: u32,
}

// ── Shelf / Reading ─────────────────────────────────────────────────────────

/// A per-reader named bucket such as "read" or "to-read".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shelf {
    pub id: i64,
    pub name: String,
    pub reader_id: i64,
}

/// One reader's record of a book: rating, notes, dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    pub id: i64,
    pub book_id: i64,
    pub reader_id: i64,
    pub shelf_id: Option<i64>,
    /// 0 (unrated) through 5.
    pub rating: i64,
    pub private_notes: Option<String>,
    pub review: Option<String>,
    pub read_count: i64,
    pub date_added: NaiveDate,
    pub date_read: Option<NaiveDate>,
    pub created_at: String,
    pub updated_at: String,
}

impl Reading {
    /// A not-yet-stored reading for `book_id`/`reader_id` placed on `shelf_id`.
    ///
    /// Callers overwrite the remaining fields before saving.
    pub fn new(book_id: i64, reader_id: i64, shelf_id: Option<i64>, date_added: NaiveDate) -> Self {
        Self {
            id: 0,
            book_id,
            reader_id,
            shelf_id,
            rating: 0,
            private_notes: None,
            review: None,
            read_count: 0,
            date_added,
            date_read: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}

// ── Import Tracking ─────────────────────────────────────────────────────────

/// Log entry for a data import operation.
#[derive(Debug, Clone)]
pub struct ImportLog {
    pub id: i64,
    pub source_type: String,
    pub source_name: String,
    pub reader_id: Option<i64>,
    pub imported_at: String,
    pub records_created: i64,
    pub records_updated: i64,
    pub records_unchanged: i64,
}
