//! Field validators enforced by the store before a record is written.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: rating must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("{field}: cannot contain any HTML")]
    ContainsMarkup { field: &'static str },
    #[error("{field}: must not be negative, got {value}")]
    Negative { field: &'static str, value: i64 },
}

/// Lowest accepted rating; 0 means "not rated".
pub const MIN_RATING: i64 = 0;
/// Highest accepted rating.
pub const MAX_RATING: i64 = 5;

/// Check that a rating lies in `MIN_RATING..=MAX_RATING`.
pub fn validate_rating(value: i64) -> Result<(), ValidationError> {
    if (MIN_RATING..=MAX_RATING).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: "rating",
            value,
            min: MIN_RATING,
            max: MAX_RATING,
        })
    }
}

/// Check that an integer field is zero or positive.
pub fn validate_non_negative(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value < 0 {
        Err(ValidationError::Negative { field, value })
    } else {
        Ok(())
    }
}

/// Reject text containing HTML tags or comments.
pub fn validate_no_markup(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if contains_markup(value) {
        Err(ValidationError::ContainsMarkup { field })
    } else {
        Ok(())
    }
}

/// Whether `text` contains something a tag stripper would remove.
///
/// A tag is `<` immediately followed by a letter, `/`, `!` or `?`, and later
/// closed by `>`. Bare comparisons such as `a < b` or `<3` are plain text.
pub fn contains_markup(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    while let Some(offset) = bytes[i..].iter().position(|&b| b == b'<') {
        let open = i + offset;
        let opens_tag = bytes
            .get(open + 1)
            .is_some_and(|&b| b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?'));
        if opens_tag && bytes[open + 1..].contains(&b'>') {
            return true;
        }
        i = open + 1;
    }
    false
}
