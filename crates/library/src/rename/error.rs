//! Error types for the [`rename`](super) module.
//!
//! Only failures that need a human end up here. Images that are simply
//! not for this run (no symbol, someone else's symbol, outside the range
//! table) are [`Skipped`](super::Outcome::Skipped) instead.

use derive_more::{Display, Error};

/// A rename error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for rename operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The symbol belongs to this institution but its catalogue number is
    /// unreadable.
    #[display("identifier could not be parsed")]
    IdentifierParse,
    /// The composed file name would not stay inside the image's directory.
    #[display("refusing unsafe file name: {_0:?}")]
    InvalidName(#[error(not(source))] String),
    /// The filesystem refused the rename (permissions, name collision or the
    /// source disappeared).
    #[display("rename failed")]
    RenameFailed,
}
