//! Import a Goodreads library export into the book catalogue.
//!
//! This crate owns the ETL logic: reading the CSV, resolving lookup entities,
//! writing books with their ordered authors, and refreshing each reader's
//! readings and shelves.

pub mod audit;
pub mod books;
pub mod error;
pub mod goodreads;
pub mod lookups;
pub mod progress;
pub mod readings;
pub mod row;

pub use audit::{AuditAction, AuditEvent, AuditSink, EntityKind, LogAudit, SilentAudit};
pub use books::import_book;
pub use error::ImportError;
pub use goodreads::{ImportOptions, ImportStats, import_goodreads, log_import};
pub use lookups::{LookupMaps, author_keys, load_lookups};
pub use progress::{ImportPhase, ImportProgress, LogProgress, SilentProgress};
pub use readings::import_reading;
pub use row::GoodreadsRow;
