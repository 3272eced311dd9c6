//! Book catalog data model types, personal-name parsing, and field validators.
//!
//! This crate defines the persistent data model for the book catalog without
//! any database dependencies. Consumers can use these types directly or pass
//! them to `book-manager-db` for persistence.

pub mod name_parser;
pub mod slug;
pub mod types;
pub mod validators;

pub use name_parser::{HumanName, parse_human_name};
pub use slug::slugify;
pub use types::*;
pub use validators::{
    ValidationError, contains_markup, validate_no_markup, validate_non_negative, validate_rating,
};
