//! Decode Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! None of these ever reach the rename engine directly: the
//! [`SymbolReader`](crate::SymbolReader) turns every failure into "nothing
//! found" after logging it. They matter for discovery and for callers using a
//! single [`Decoder`](crate::Decoder) on its own.

use derive_more::{Display, Error};

/// A decode error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for decode operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The decoder executable is not installed (or not on `PATH`).
    #[display("{_0} not detected on your system; please install it")]
    DecoderNotFound(#[error(not(source))] &'static str),
    /// The decoder executable exists but could not be started.
    #[display("failed to start decoder: {_0}")]
    Spawn(#[error(not(source))] String),
    /// The decoder exited with a code that means something other than
    /// "nothing found".
    #[display("decoder exited with code: {_0}")]
    DecoderFailed(#[error(not(source))] i32),
    /// The decoder was killed by a signal or crashed.
    #[display("decoder terminated without an exit code")]
    DecoderKilled,
    #[display("I/O error while talking to decoder")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DecoderKilled | Self::Io)
    }
}
