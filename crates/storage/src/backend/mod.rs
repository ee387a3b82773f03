//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait, the narrow slice of
//! filesystem behaviour the renaming pipeline needs: sorted directory
//! listings, existence checks, non-clobbering renames and write-once files
//! for audit logs.
//!

mod local;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use self::local::LocalBackend;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockBackend;
use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// The contents of a single directory, split by entry type.
///
/// Both lists hold absolute paths and are sorted lexicographically by name,
/// so that two runs over the same tree visit entries in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub directories: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
}
impl Listing {
    /// Sorts both lists; backends call this before returning.
    pub fn sorted(mut self) -> Self {
        self.directories.sort();
        self.files.sort();
        self
    }

    /// Finds a file in this listing by its exact (case-sensitive) file name.
    pub fn file_named(&self, name: &str) -> Option<&Path> {
        self.files
            .iter()
            .find(|f| f.file_name().is_some_and(|n| n == name))
            .map(PathBuf::as_path)
    }
}

/// Unified interface for storage backends.
///
/// All paths are absolute. Implementations must never overwrite an existing
/// file: the rename record relies on every recorded destination having been
/// free before the rename, otherwise undoing a batch would lose data.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use dmread_storage::{backend::StorageBackend, error::Result};
///
/// async fn count_images(backend: &dyn StorageBackend, dir: &Path) -> Result<usize> {
///     let listing = backend.list(dir).await?;
///     Ok(listing.files.iter().filter(|f| f.extension().is_some_and(|e| e == "JPG")).count())
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the backend, used for logging only.
    fn name(&self) -> &str;

    /// List the immediate children of a directory.
    ///
    /// Symlinks to files are listed as files. Symlinks to directories are
    /// left out, so a walk over listings visits each directory once.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the
    /// directory does not exist.
    async fn list(&self, dir: &Path) -> Result<Listing>;

    /// Check if a file or directory exists.
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Read file contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Create a new file with the given contents.
    ///
    /// Returns [`AlreadyExists`](crate::error::ErrorKind::AlreadyExists) if
    /// anything already occupies `path`; existing files are never truncated.
    async fn write_new(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Rename a file.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if `from` does
    /// not exist and [`AlreadyExists`](crate::error::ErrorKind::AlreadyExists)
    /// if `to` is already occupied.
    async fn rename(&self, from: &Path, to: &Path) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_sorted() {
        let listing = Listing {
            directories: vec![PathBuf::from("/r/b"), PathBuf::from("/r/a")],
            files: vec![PathBuf::from("/r/img2.jpg"), PathBuf::from("/r/img10.jpg"), PathBuf::from("/r/img1.jpg")],
        }
        .sorted();
        assert_eq!(listing.directories, vec![PathBuf::from("/r/a"), PathBuf::from("/r/b")]);
        // Lexicographic, not natural, ordering.
        assert_eq!(
            listing.files,
            vec![PathBuf::from("/r/img1.jpg"), PathBuf::from("/r/img10.jpg"), PathBuf::from("/r/img2.jpg")]
        );
    }

    #[test]
    fn test_listing_file_named_is_case_sensitive() {
        let listing = Listing {
            directories: vec![],
            files: vec![PathBuf::from("/r/img1.CR2"), PathBuf::from("/r/img1.jpg")],
        };
        assert_eq!(listing.file_named("img1.CR2"), Some(Path::new("/r/img1.CR2")));
        assert_eq!(listing.file_named("img1.cr2"), None);
    }
}
