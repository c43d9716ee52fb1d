//! Error types for malformed input records.

use thiserror::Error;

/// A date string that could not be turned into a [`FractionalDate`](crate::date::FractionalDate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid date '{0}', expected month/day/year")]
    InvalidFormat(String),

    #[error("'{0}' is not a valid calendar date")]
    InvalidDate(String),
}

/// A raw occurrence record that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("attendance '{0}' is not a non-negative integer or an unknown marker")]
    InvalidAttendance(String),

    #[error(transparent)]
    Date(#[from] ParseError),
}
