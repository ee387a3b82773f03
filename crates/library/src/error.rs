//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Per-image failures are raised from
//! the [`rename`](crate::rename) module's own error kinds.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The range table could not be read or is not valid CSV with the
    /// required columns.
    #[display("could not load range table")]
    RangeTable,
    /// A range table row has a start or stop cell without digits, or a start
    /// after its stop. Loading aborts; the table needs fixing by hand.
    #[display("malformed range table row {row}: {column} = {value:?}")]
    MalformedRangeRow {
        /// 1-based data row, not counting the header.
        row: usize,
        column: &'static str,
        value: String,
    },
    /// Renaming a single image failed.
    #[display("could not rename image")]
    Rename,
    /// The batch root could not be listed.
    #[display("could not read batch directory")]
    Batch,
    /// The audit log could not be written.
    #[display("could not write rename log")]
    Log,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Rename | Self::Batch | Self::Log)
    }
}
