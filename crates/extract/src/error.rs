//! Extraction Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The decoded text does not start with the accepted institution code.
    /// Expected for symbols from other collections; skip the image.
    #[display("unrecognized symbol text: {_0:?}")]
    UnrecognizedSymbol(#[error(not(source))] String),
    /// The text starts with the institution code but the catalogue number
    /// after it is not a number. Needs a human to look at the label.
    #[display("catalogue number {value:?} in {text:?} is not a number")]
    InvalidIdentifier {
        /// The normalized decoded text.
        text: String,
        /// The token that should have been the catalogue number.
        value: String,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Decoding the same symbol again yields the same text.
        false
    }
}
