//! Renaming a single image after the symbol on its label.
//!
//! [`rename_image`] runs one image through the whole pipeline: range gate,
//! decode, identifier extraction, view assignment, rename, then the raw
//! companion file. Every image ends in one of three ways:
//!
//! - **[`Outcome`]** `Renamed`/`AlreadyNamed`: the image has its final name.
//! - **[`Outcome`]** `Skipped`: the image is not for this run. Nothing was
//!   touched and nothing was counted.
//! - **`Err`**: something needs a human (an unreadable catalogue number, an
//!   unsafe name, the filesystem refusing the rename). Nothing was recorded.

pub mod error;
mod file;
mod name;

pub use self::file::rename_image;
use crate::View;
use derive_more::Display;
use std::path::PathBuf;

/// The result of (successfully) handling a single image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Renamed {
        from: PathBuf,
        to: PathBuf,
        view: View,
        companion: Companion,
    },
    /// The image already carries the name it would have been given. It still
    /// counts towards the view sequence of its identifier.
    AlreadyNamed(PathBuf),
    Skipped(SkipReason),
}

/// Why an image was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub enum SkipReason {
    /// A range table is active but the file name has no digits to look up.
    #[display("no image number in file name")]
    NoFileNumber,
    /// A range table is active and no range holds the file's number.
    #[display("image number outside every range")]
    OutOfRange,
    /// No decoder found a symbol carrying the institution code.
    #[display("symbol not found")]
    SymbolNotFound,
    /// A symbol was found but it is not one of this institution's identifiers.
    #[display("unrecognized symbol")]
    UnrecognizedSymbol,
}

/// What happened to the raw file sharing the image's stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Companion {
    /// There is no companion file.
    None,
    Renamed { from: PathBuf, to: PathBuf },
    /// The companion exists but could not be renamed. The image rename stands.
    Failed(PathBuf),
}
