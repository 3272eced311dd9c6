//! SQLite persistence layer for the book catalog.
//!
//! Provides schema creation, get-or-create / lookup / save operations, and
//! query APIs backed by SQLite (via rusqlite with bundled feature).

pub mod operations;
pub mod queries;
pub mod schema;

pub use operations::{
    OperationError, add_book_author, clear_book_authors, find_author_by_full_name,
    find_book_by_title, find_reading, find_user_by_username, get_or_create_author,
    get_or_create_binding, get_or_create_book, get_or_create_publisher, get_or_create_shelf,
    insert_import_log, insert_user, save_author, save_book, save_reading,
};
pub use queries::{
    CatalogStats, authors_for_book, catalog_stats, list_import_logs, primary_author,
    readings_for_user,
};
pub use schema::{SchemaError, open_database, open_memory};
