//! Application Error Types
//!
//! Everything that stops a run before (or instead of) finishing a batch.

use derive_more::{Display, Error};

/// An application error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for application operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("configuration error")]
    Config,
    /// The batch directory is missing or not a directory.
    #[display("the starting directory either doesn't exist or is not a directory: {_0}")]
    Directory(#[error(not(source))] String),
    /// A configured decoder is not installed.
    #[display("decoder check failed")]
    Decoders,
    #[display("could not load range table")]
    RangeTable,
    #[display("batch failed")]
    Batch,
    #[display("could not read the answer to the completion prompt")]
    Prompt,
    #[display("could not write rename log")]
    Log,
}
