//! Renaming specimen photographs after the catalogue number on their label.
//!
//! A [`Context`] holds everything fixed for a run (institution, extensions,
//! decoders, optional [`RangeTable`]); a [`Run`] holds everything that
//! changes as images are processed. [`batch`] walks a directory, handing each
//! image to [`rename_image`](rename::rename_image); afterwards the run's
//! [`RenameRecord`] is either undone or written out as an audit log.

mod batch;
pub mod error;
mod occurrence;
pub mod range;
mod record;
pub mod rename;

pub use crate::batch::{BatchSummary, Mode, batch};
pub use crate::occurrence::{Occurrences, View};
pub use crate::range::RangeTable;
pub use crate::record::{RenamePair, RenameRecord, UndoReport};
use dmread_decode::SymbolReader;
use std::ffi::OsStr;
use std::path::Path;

/// Settings fixed for the duration of a run.
pub struct Context {
    pub institution: String,
    /// Extensions of files treated as images, matched case-sensitively.
    pub image_extensions: Vec<String>,
    /// Extension of the raw companion renamed with each image.
    pub raw_extension: String,
    pub ranges: Option<RangeTable>,
    pub reader: SymbolReader,
}
impl Context {
    pub fn new(institution: impl Into<String>, reader: SymbolReader) -> Self {
        Self {
            institution: institution.into(),
            image_extensions: ["JPG", "jpg", "jpeg", "JPEG"].map(String::from).to_vec(),
            raw_extension: "CR2".to_string(),
            ranges: None,
            reader,
        }
    }

    pub fn with_image_extensions(mut self, extensions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.image_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_raw_extension(mut self, extension: impl Into<String>) -> Self {
        self.raw_extension = extension.into();
        self
    }

    pub fn with_ranges(mut self, ranges: RangeTable) -> Self {
        self.ranges = Some(ranges);
        self
    }

    pub fn is_image(&self, path: &Path) -> bool {
        path.extension()
            .and_then(OsStr::to_str)
            .is_some_and(|extension| self.image_extensions.iter().any(|e| e == extension))
    }
}

/// State accumulated while a run processes images.
#[derive(Debug, Default)]
pub struct Run {
    pub occurrences: Occurrences,
    pub record: RenameRecord,
}
