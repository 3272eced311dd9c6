use std::path::PathBuf;

use book_manager_db::OperationError;

/// Errors that abort a Goodreads import. There is no skip-and-continue mode.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Db(#[from] OperationError),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A row referenced a name the lookup pass did not resolve.
    #[error("No {kind} named '{key}' in the lookup maps")]
    MissingLookup { kind: &'static str, key: String },

    #[error("Invalid date in '{field}': '{value}' (expected YYYY/MM/DD)")]
    InvalidDate { field: &'static str, value: String },

    #[error("Invalid number in '{field}': '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Row {row}: {source}")]
    AtRow {
        row: usize,
        #[source]
        source: Box<ImportError>,
    },
}

impl ImportError {
    pub(crate) fn missing_lookup(kind: &'static str, key: impl Into<String>) -> Self {
        Self::MissingLookup {
            kind,
            key: key.into(),
        }
    }

    pub(crate) fn at_row(row: usize, source: ImportError) -> Self {
        Self::AtRow {
            row,
            source: Box::new(source),
        }
    }

    /// The innermost error, looking through row context.
    pub fn root(&self) -> &ImportError {
        match self {
            Self::AtRow { source, .. } => source.root(),
            other => other,
        }
    }
}
