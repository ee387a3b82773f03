//! Local filesystem storage backend.
//!
//! This module provides a storage backend implementation for the local filesystem,
//! accessed using standard filesystem operations via `tokio::fs` for async I/O.

use crate::backend::{Listing, StorageBackend};
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Local filesystem storage backend.
///
/// # Examples
///
/// ```no_run
/// use dmread_storage::backend::{LocalBackend, StorageBackend};
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::new("local");
/// let listing = backend.list(Path::new("/data/specimens")).await.unwrap();
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LocalBackend {
    name: String,
}
impl LocalBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            std::io::ErrorKind::AlreadyExists => ErrorKind::AlreadyExists(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }
}
impl Default for LocalBackend {
    fn default() -> Self {
        Self::new("local")
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list(&self, dir: &Path) -> Result<Listing> {
        let mut entries = fs::read_dir(dir).await.map_err(|e| Self::map_io_error(e, dir))?;
        let mut listing = Listing::default();
        while let Some(entry) = entries.next_entry().await.map_err(|e| Self::map_io_error(e, dir))? {
            let path = entry.path();
            let file_type = entry.file_type().await.map_err(|e| Self::map_io_error(e, &path))?;
            if file_type.is_dir() {
                listing.directories.push(path);
                continue;
            }
            if file_type.is_file() {
                listing.files.push(path);
                continue;
            }
            if !file_type.is_symlink() {
                continue;
            }
            // A linked file is listed under its link name. A linked directory
            // is never listed: it may alias a directory already walked.
            match fs::metadata(&path).await {
                Ok(m) if m.is_file() => listing.files.push(path),
                Ok(m) if m.is_dir() => {
                    tracing::debug!(path = %path.display(), "Not following directory symlink");
                },
                Ok(_) => {},
                Err(e) => {
                    // Note: silently drop what is most likely a broken symlink.
                    tracing::debug!(path = %path.display(), error = %e, "Skipping unreadable directory entry");
                },
            }
        }
        Ok(listing.sorted())
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(fs::try_exists(path).await.map_err(ErrorKind::Io)?)
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(path).await.map_err(|e| Self::map_io_error(e, path))?)
    }

    async fn write_new(&self, path: &Path, data: &[u8]) -> Result<()> {
        // `create_new` makes the existence check and the creation a single
        // atomic operation, so a log can never clobber another log.
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .map_err(|e| Self::map_io_error(e, path))?;
        file.write_all(data).await.map_err(ErrorKind::Io)?;
        Ok(file.flush().await.map_err(ErrorKind::Io)?)
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        // `rename(2)` silently replaces the destination on Unix. There is no
        // portable no-replace rename, so check first; the window between the
        // two calls is accepted for a single-operator tool.
        if fs::try_exists(to).await.map_err(ErrorKind::Io)? {
            exn::bail!(ErrorKind::AlreadyExists(to.to_path_buf()));
        }
        Ok(fs::rename(from, to).await.map_err(|e| Self::map_io_error(e, from))?)
    }
}
