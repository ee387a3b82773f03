//! The reversible record of a run's renames.

use crate::error::{ErrorKind, Result};
use dmread_storage::BackendHandle;
use dmread_storage::error::ErrorKind as StorageErrorKind;
use exn::ResultExt;
use serde::Serialize;
use std::path::{Path, PathBuf};
use time::Date;
use tracing::instrument;

const LOG_HEADER: [&str; 2] = ["Old Path", "New Path"];
/// Gives up looking for a free log name after this many same-day logs.
const MAX_LOG_ATTEMPTS: u32 = 10_000;

/// One rename actually performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenamePair {
    pub old: PathBuf,
    pub new: PathBuf,
}

/// Every rename of a run, in the order performed.
#[derive(Debug, Clone, Default)]
pub struct RenameRecord {
    pairs: Vec<RenamePair>,
}
impl RenameRecord {
    pub fn push(&mut self, old: impl Into<PathBuf>, new: impl Into<PathBuf>) {
        self.pairs.push(RenamePair { old: old.into(), new: new.into() });
    }

    pub fn pairs(&self) -> &[RenamePair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Moves every file back, last rename first.
    ///
    /// Keeps going past failures. Pairs that could not be restored are
    /// handed back in the report and are all that is left in the record, so
    /// a full undo leaves it empty and a second undo does nothing.
    #[instrument(skip_all, fields(backend = storage.name(), pairs = self.pairs.len()))]
    pub async fn undo(&mut self, storage: &BackendHandle) -> UndoReport {
        let mut report = UndoReport::default();
        for pair in std::mem::take(&mut self.pairs).into_iter().rev() {
            match storage.rename(&pair.new, &pair.old).await {
                Ok(()) => {
                    tracing::debug!(from = %pair.new.display(), to = %pair.old.display(), "Restored");
                    report.restored += 1;
                },
                Err(e) => {
                    tracing::error!(
                        from = %pair.new.display(),
                        to = %pair.old.display(),
                        error = ?e,
                        "Could not restore"
                    );
                    report.failed.push(pair);
                },
            }
        }
        self.pairs = report.failed.iter().rev().cloned().collect();
        tracing::info!(restored = report.restored, failed = report.failed.len(), "Undo finished");
        report
    }

    /// Renders the record as CSV: an `Old Path,New Path` header, then one
    /// row per pair.
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
        writer.write_record(LOG_HEADER).or_raise(|| ErrorKind::Log)?;
        for pair in &self.pairs {
            writer.serialize(pair).or_raise(|| ErrorKind::Log)?;
        }
        writer.into_inner().map_err(|e| e.into_error()).or_raise(|| ErrorKind::Log)
    }

    /// Writes the record into `dir` as `<prefix>_<year>_<month>_<day>.csv`.
    ///
    /// An existing log is never replaced: when the name is taken, `_1`, `_2`
    /// and so on are tried in turn. Returns the path written.
    #[instrument(skip(self, storage, dir), fields(dir = %dir.display(), pairs = self.pairs.len()))]
    pub async fn write_log(&self, storage: &BackendHandle, dir: &Path, prefix: &str, date: Date) -> Result<PathBuf> {
        let data = self.to_csv()?;
        let stem = format!("{prefix}_{}_{}_{}", date.year(), u8::from(date.month()), date.day());
        let mut attempt = 0;
        while attempt < MAX_LOG_ATTEMPTS {
            let name = match attempt {
                0 => format!("{stem}.csv"),
                n => format!("{stem}_{n}.csv"),
            };
            let path = dir.join(name);
            match storage.write_new(&path, &data).await {
                Ok(()) => {
                    tracing::info!(path = %path.display(), "Wrote rename log");
                    return Ok(path);
                },
                Err(e) if matches!(&*e, StorageErrorKind::AlreadyExists(_)) => {
                    tracing::trace!(path = %path.display(), "Log name taken");
                    attempt += 1;
                },
                Err(e) => return Err(e).or_raise(|| ErrorKind::Log),
            }
        }
        exn::bail!(ErrorKind::Log)
    }
}

/// What [`RenameRecord::undo`] managed.
#[derive(Debug, Default)]
pub struct UndoReport {
    pub restored: usize,
    pub failed: Vec<RenamePair>,
}
impl UndoReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}
