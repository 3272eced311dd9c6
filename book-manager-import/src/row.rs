//! One row of a Goodreads library export and its field-level cleanup.
//!
//! A Goodreads CSV export carries more columns than are listed here
//! (`Book Id`, `Author l-f`, `Average Rating`, `Bookshelves`, ...); those are
//! ignored. Every column listed here is required: a file missing one fails to
//! deserialize.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::ImportError;

/// Date format used by the export, e.g. `2019/07/04`.
pub const GOODREADS_DATE_FORMAT: &str = "%Y/%m/%d";

/// Separator between names in the `Additional Authors` column.
pub const ADDITIONAL_AUTHORS_SEPARATOR: &str = ", ";

/// The columns of a Goodreads export the importer reads, as raw strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoodreadsRow {
    #[serde(rename = "Title")]
    pub title: String,
    /// Primary author, "First Last".
    #[serde(rename = "Author")]
    pub author: String,
    /// Comma-separated "First Last" names.
    #[serde(rename = "Additional Authors")]
    pub additional_authors: String,
    /// `="0441172717"`, or `=""` when absent.
    #[serde(rename = "ISBN")]
    pub isbn: String,
    #[serde(rename = "ISBN13")]
    pub isbn13: String,
    #[serde(rename = "My Rating")]
    pub my_rating: String,
    #[serde(rename = "Publisher")]
    pub publisher: String,
    #[serde(rename = "Binding")]
    pub binding: String,
    #[serde(rename = "Number of Pages")]
    pub number_of_pages: String,
    #[serde(rename = "Year Published")]
    pub year_published: String,
    #[serde(rename = "Original Publication Year")]
    pub original_publication_year: String,
    #[serde(rename = "Date Read")]
    pub date_read: String,
    #[serde(rename = "Date Added")]
    pub date_added: String,
    #[serde(rename = "Exclusive Shelf")]
    pub exclusive_shelf: String,
    #[serde(rename = "My Review")]
    pub my_review: String,
    #[serde(rename = "Private Notes")]
    pub private_notes: String,
    #[serde(rename = "Read Count")]
    pub read_count: String,
}

impl GoodreadsRow {
    /// Author names in billing order: the primary author, then each
    /// additional author. Blank entries are dropped.
    pub fn author_names(&self) -> Vec<&str> {
        std::iter::once(self.author.as_str())
            .chain(self.additional_authors.split(ADDITIONAL_AUTHORS_SEPARATOR))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect()
    }
}

/// Build a CSV reader over a Goodreads export.
pub fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader)
}

/// Open an export file, attaching the path to any I/O error.
pub fn open_file(path: &Path) -> Result<File, ImportError> {
    File::open(path).map_err(|source| ImportError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Open a Goodreads export file for reading.
pub fn open_export(path: &Path) -> Result<csv::Reader<File>, ImportError> {
    Ok(csv_reader(open_file(path)?))
}

// ── Field cleanup ───────────────────────────────────────────────────────────

/// Strip the spreadsheet artifact around ISBNs: drop the leading `=` and any
/// surrounding quotes. Empty results mean "no ISBN".
///
/// ```
/// use book_manager_import::row::clean_isbn;
///
/// assert_eq!(clean_isbn("=\"0441172717\""), Some("0441172717".to_string()));
/// assert_eq!(clean_isbn("=\"\""), None);
/// assert_eq!(clean_isbn("="), None);
/// ```
pub fn clean_isbn(raw: &str) -> Option<String> {
    let mut chars = raw.chars();
    chars.next();
    let cleaned = chars.as_str().trim_matches('"');
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Parse an optional integer column; empty means `None`.
pub fn parse_optional_int(field: &'static str, raw: &str) -> Result<Option<i64>, ImportError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| ImportError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}

/// Parse a required integer column.
pub fn parse_int(field: &'static str, raw: &str) -> Result<i64, ImportError> {
    parse_optional_int(field, raw)?.ok_or_else(|| ImportError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

/// Parse a required `YYYY/MM/DD` date column.
pub fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, ImportError> {
    NaiveDate::parse_from_str(raw.trim(), GOODREADS_DATE_FORMAT).map_err(|_| {
        ImportError::InvalidDate {
            field,
            value: raw.to_string(),
        }
    })
}

/// Parse an optional `YYYY/MM/DD` date column; empty means `None`.
pub fn parse_optional_date(
    field: &'static str,
    raw: &str,
) -> Result<Option<NaiveDate>, ImportError> {
    if raw.trim().is_empty() {
        Ok(None)
    } else {
        parse_date(field, raw).map(Some)
    }
}

/// `Some(text)` for non-empty text, `None` otherwise.
pub fn non_empty(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}
