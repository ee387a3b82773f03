//! In-memory storage backend for testing.

use crate::backend::{Listing, StorageBackend};
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};
use tokio::sync::RwLock;

/// In-memory storage backend for testing.
///
/// Files are stored in a map behind a [`RwLock`], so all trait methods can
/// operate on `&self` without external synchronisation. Directories are
/// implied by the files beneath them; there are no empty directories.
///
/// # Examples
///
/// ```
/// use dmread_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_files([
///     "/batch/tray1/img1.jpg",
///     "/batch/img2.jpg",
/// ]);
/// let listing = backend.list(Path::new("/batch")).await.unwrap();
/// assert_eq!(listing.directories, vec![Path::new("/batch/tray1")]);
/// assert_eq!(listing.files, vec![Path::new("/batch/img2.jpg")]);
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    storage: RwLock<BTreeMap<PathBuf, Vec<u8>>>,
}

impl MockBackend {
    /// Create a mock backend pre-populated with files. Each file's contents
    /// is its own path, which makes it easy to assert where a file ended up.
    ///
    /// Panics if any path is relative or contains `..`. If test setup is
    /// wrong, then test should not pass.
    pub fn with_files(files: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        let mut map = BTreeMap::new();
        for path in files {
            let path = path.into();
            let clean = path.is_absolute() && !path.components().any(|c| matches!(c, Component::ParentDir));
            if !clean {
                // The panic here is DELIBERATE. MockBackend is intended to be
                // used in tests; panics are expected. There is no error result.
                panic!("MockBackend::with_files: invalid path {}", path.display());
            }
            let contents = path.to_string_lossy().into_owned().into_bytes();
            map.insert(path, contents);
        }
        Self {
            name: "mock".to_string(),
            storage: RwLock::new(map),
        }
    }

    /// Change the name of the mock backend.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// All file paths currently stored, in sorted order.
    pub async fn paths(&self) -> Vec<PathBuf> {
        self.storage.read().await.keys().cloned().collect()
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let files: [&str; 0] = [];
        Self::with_files(files)
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list(&self, dir: &Path) -> Result<Listing> {
        let guard = self.storage.read().await;
        let mut directories = BTreeSet::new();
        let mut files = Vec::new();
        let mut found = false;
        for path in guard.keys() {
            let Ok(relative) = path.strip_prefix(dir) else {
                continue;
            };
            found = true;
            let mut components = relative.components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(_)), None) => files.push(path.clone()),
                (Some(Component::Normal(child)), Some(_)) => {
                    directories.insert(dir.join(child));
                },
                _ => {},
            }
        }
        if !found {
            exn::bail!(ErrorKind::NotFound(dir.to_path_buf()));
        }
        Ok(Listing { directories: directories.into_iter().collect(), files }.sorted())
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let guard = self.storage.read().await;
        Ok(guard.keys().any(|p| p.starts_with(path)))
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.storage
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path.to_path_buf())))
    }

    async fn write_new(&self, path: &Path, data: &[u8]) -> Result<()> {
        let mut guard = self.storage.write().await;
        if guard.keys().any(|p| p.starts_with(path)) {
            exn::bail!(ErrorKind::AlreadyExists(path.to_path_buf()));
        }
        guard.insert(path.to_path_buf(), data.to_vec());
        Ok(())
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let mut guard = self.storage.write().await;
        if guard.keys().any(|p| p.starts_with(to)) {
            exn::bail!(ErrorKind::AlreadyExists(to.to_path_buf()));
        }
        let data = guard.remove(from).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(from.to_path_buf())))?;
        guard.insert(to.to_path_buf(), data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_files_contents() {
        let backend = MockBackend::with_files(["/a/img1.jpg"]);
        assert_eq!(backend.read(Path::new("/a/img1.jpg")).await.unwrap(), b"/a/img1.jpg");
    }

    #[tokio::test]
    async fn test_list_nested() {
        let backend = MockBackend::with_files(["/a/z/deep/img.jpg", "/a/b/img.jpg", "/a/img2.jpg", "/a/img1.jpg"]);
        let listing = backend.list(Path::new("/a")).await.unwrap();
        assert_eq!(listing.directories, vec![PathBuf::from("/a/b"), PathBuf::from("/a/z")]);
        assert_eq!(listing.files, vec![PathBuf::from("/a/img1.jpg"), PathBuf::from("/a/img2.jpg")]);
    }

    #[tokio::test]
    async fn test_list_missing() {
        let backend = MockBackend::with_files(["/a/img1.jpg"]);
        let err = backend.list(Path::new("/b")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rename_and_collision() {
        let backend = MockBackend::with_files(["/a/img1.jpg", "/a/img2.jpg"]);
        backend.rename(Path::new("/a/img1.jpg"), Path::new("/a/MGCL_1_D.jpg")).await.unwrap();
        assert_eq!(backend.read(Path::new("/a/MGCL_1_D.jpg")).await.unwrap(), b"/a/img1.jpg");
        let err = backend.rename(Path::new("/a/img2.jpg"), Path::new("/a/MGCL_1_D.jpg")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::AlreadyExists(_)));
        let err = backend.rename(Path::new("/a/img1.jpg"), Path::new("/a/x.jpg")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_write_new_refuses_existing() {
        let backend = MockBackend::with_files(["/a/log.csv"]);
        let err = backend.write_new(Path::new("/a/log.csv"), b"x").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::AlreadyExists(_)));
        backend.write_new(Path::new("/a/log_1.csv"), b"x").await.unwrap();
        assert_eq!(backend.read(Path::new("/a/log_1.csv")).await.unwrap(), b"x");
    }
}
