//! Walking a directory tree and renaming every image in it.

use crate::error::{ErrorKind, Result};
use crate::rename::{Companion, Outcome, SkipReason, rename_image};
use crate::{Context, Run};
use derive_more::Display;
use dmread_storage::{BackendHandle, Listing};
use exn::ResultExt;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Mode {
    /// Only the images directly inside the root.
    #[display("standard")]
    Standard,
    /// Every directory under the root, depth-first. A directory's
    /// subdirectories are finished before its own images.
    #[display("recursive")]
    Recursive,
}

/// Tally of a finished batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    /// Files with an image extension that were handed to the rename engine.
    pub considered: usize,
    pub renamed: usize,
    pub already_named: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
    /// Images that needed a human: unreadable identifiers, unsafe names and
    /// refused renames.
    pub failed: usize,
    pub companions_renamed: usize,
    pub companions_failed: usize,
    /// Subdirectories that could not be listed and were left out.
    pub unreadable_directories: usize,
    pub elapsed: Duration,
}
impl BatchSummary {
    pub fn skipped(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or_default()
    }

    pub fn total_skipped(&self) -> usize {
        self.skipped.values().sum()
    }

    pub fn average_per_image(&self) -> Option<Duration> {
        match u32::try_from(self.considered) {
            Ok(0) | Err(_) => None,
            Ok(n) => Some(self.elapsed / n),
        }
    }

    /// Share of considered images in which no decoder found a symbol.
    pub fn miss_rate(&self) -> f64 {
        match self.considered {
            0 => 0.0,
            n => self.skipped(SkipReason::SymbolNotFound) as f64 / n as f64,
        }
    }
}

enum Visit {
    Enter(PathBuf),
    Files(Listing),
}

/// Renames every image under `root` according to `mode`.
///
/// Images are processed one at a time, in lexicographic order within each
/// directory. Per-image problems are logged and counted, never returned;
/// only failing to list `root` itself is an error.
///
/// A relative `root` is resolved against the working directory first, so
/// every path in the run's record is absolute.
#[instrument(skip(storage, ctx, run, root), fields(root = %root.display()))]
pub async fn batch(
    storage: &BackendHandle,
    ctx: &Context,
    run: &mut Run,
    root: &Path,
    mode: Mode,
) -> Result<BatchSummary> {
    let started = Instant::now();
    let mut summary = BatchSummary::default();
    let root = std::path::absolute(root).or_raise(|| ErrorKind::Batch)?;
    let listing = storage.list(&root).await.or_raise(|| ErrorKind::Batch)?;

    match mode {
        Mode::Standard => process_directory(storage, ctx, run, &listing, &mut summary).await,
        Mode::Recursive => {
            let mut stack = Vec::new();
            descend(&mut stack, listing);
            while let Some(visit) = stack.pop() {
                match visit {
                    Visit::Enter(dir) => match storage.list(&dir).await {
                        Ok(listing) => descend(&mut stack, listing),
                        Err(e) => {
                            tracing::warn!(dir = %dir.display(), error = ?e, "Could not read directory; skipping it");
                            summary.unreadable_directories += 1;
                        },
                    },
                    Visit::Files(listing) => process_directory(storage, ctx, run, &listing, &mut summary).await,
                }
            }
        },
    }

    summary.elapsed = started.elapsed();
    tracing::info!(
        considered = summary.considered,
        renamed = summary.renamed,
        skipped = summary.total_skipped(),
        failed = summary.failed,
        elapsed = ?summary.elapsed,
        "Batch complete"
    );
    Ok(summary)
}

/// Queues a directory: its own files go underneath its subdirectories so
/// they come off the stack last, and the subdirectories go on in reverse so
/// the first by name comes off first.
fn descend(stack: &mut Vec<Visit>, listing: Listing) {
    let children = listing.directories.clone();
    stack.push(Visit::Files(listing));
    stack.extend(children.into_iter().rev().map(Visit::Enter));
}

async fn process_directory(
    storage: &BackendHandle,
    ctx: &Context,
    run: &mut Run,
    listing: &Listing,
    summary: &mut BatchSummary,
) {
    for image in listing.files.iter().filter(|f| ctx.is_image(f)) {
        summary.considered += 1;
        match rename_image(storage, ctx, run, image, listing).await {
            Ok(Outcome::Renamed { from, to, view, companion }) => {
                tracing::info!(from = %from.display(), to = %to.display(), %view, "Renamed");
                summary.renamed += 1;
                match companion {
                    Companion::Renamed { from, to } => {
                        tracing::info!(from = %from.display(), to = %to.display(), "Renamed raw companion");
                        summary.companions_renamed += 1;
                    },
                    Companion::Failed(_) => summary.companions_failed += 1,
                    Companion::None => {},
                }
            },
            Ok(Outcome::AlreadyNamed(path)) => {
                tracing::info!(path = %path.display(), "Already named correctly");
                summary.already_named += 1;
            },
            Ok(Outcome::Skipped(reason)) => {
                tracing::warn!(image = %image.display(), %reason, "Skipped");
                *summary.skipped.entry(reason).or_default() += 1;
            },
            Err(e) => {
                tracing::error!(image = %image.display(), error = ?e, "Could not rename");
                summary.failed += 1;
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::View;
    use dmread_decode::{MockDecoder, SymbolReader, Symbology};
    use dmread_storage::backend::MockBackend;
    use std::sync::Arc;

    fn storage(files: &[&str]) -> (Arc<MockBackend>, BackendHandle) {
        let mock = Arc::new(MockBackend::with_files(files.iter().copied()));
        let handle: BackendHandle = mock.clone();
        (mock, handle)
    }

    fn context(decoded: &[(&str, &str)]) -> Context {
        let decoder = decoded
            .iter()
            .fold(MockDecoder::new(Symbology::DataMatrix), |d, (file, text)| d.with_result(*file, *text));
        Context::new("MGCL", SymbolReader::new("MGCL", Duration::from_secs(1)).with_decoder(decoder))
    }

    fn paths(paths: &[&str]) -> Vec<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    #[tokio::test]
    async fn test_standard_ignores_subdirectories() {
        let (mock, storage) = storage(&["/b/img1.jpg", "/b/tray/img2.jpg", "/b/notes.txt"]);
        let ctx = context(&[("img1.jpg", "MGCL 1"), ("img2.jpg", "MGCL 2")]);
        let mut run = Run::default();

        let summary = batch(&storage, &ctx, &mut run, Path::new("/b"), Mode::Standard).await.unwrap();
        assert_eq!(summary.considered, 1);
        assert_eq!(summary.renamed, 1);
        assert_eq!(mock.paths().await, paths(&["/b/MGCL_1_D.jpg", "/b/notes.txt", "/b/tray/img2.jpg"]));
    }

    #[tokio::test]
    async fn test_recursive_visits_children_before_own_files() {
        // Every image shows the same specimen, so the suffix order is the
        // visiting order.
        let (mock, storage) = storage(&["/b/a.jpg", "/b/t1/b.jpg", "/b/t1/deep/c.jpg", "/b/t2/d.jpg"]);
        let ctx = context(&[
            ("a.jpg", "MGCL 7 a"),
            ("b.jpg", "MGCL 7 b"),
            ("c.jpg", "MGCL 7 c"),
            ("d.jpg", "MGCL 7 d"),
        ]);
        let mut run = Run::default();

        let summary = batch(&storage, &ctx, &mut run, Path::new("/b"), Mode::Recursive).await.unwrap();
        assert_eq!(summary.renamed, 4);
        assert_eq!(
            mock.paths().await,
            paths(&[
                "/b/MGCL_7_a_MANUAL.jpg",
                "/b/t1/MGCL_7_b_V.jpg",
                "/b/t1/deep/MGCL_7_c_D.jpg",
                "/b/t2/MGCL_7_d_MANUAL.jpg",
            ])
        );
        let order: Vec<_> = run.record.pairs().iter().map(|p| p.old.clone()).collect();
        assert_eq!(order, paths(&["/b/t1/deep/c.jpg", "/b/t1/b.jpg", "/b/t2/d.jpg", "/b/a.jpg"]));
    }

    #[tokio::test]
    async fn test_view_sequence_and_lateral_scenario() {
        let (mock, storage) = storage(&["/b/img1.CR2", "/b/img1.jpg", "/b/img2.jpg"]);
        let ctx = context(&[("img1.jpg", "MGCL_0001234"), ("img2.jpg", "MGCL_0001234 lateral")]);
        let mut run = Run::default();

        let summary = batch(&storage, &ctx, &mut run, Path::new("/b"), Mode::Standard).await.unwrap();
        assert_eq!(summary.renamed, 2);
        assert_eq!(summary.companions_renamed, 1);
        assert_eq!(
            mock.paths().await,
            paths(&["/b/MGCL_0001234_D.CR2", "/b/MGCL_0001234_D.jpg", "/b/MGCL_0001234_L.jpg"])
        );
        assert_eq!(run.occurrences.next_view(1234), View::Ventral);
    }

    #[tokio::test]
    async fn test_four_views_of_one_specimen() {
        // The third and fourth both want `_MANUAL`; the fourth collides and
        // fails rather than overwriting the third.
        let (mock, storage) = storage(&["/b/img1.jpg", "/b/img2.jpg", "/b/img3.jpg", "/b/img4.jpg"]);
        let ctx = context(&[
            ("img1.jpg", "MGCL 5"),
            ("img2.jpg", "MGCL 5"),
            ("img3.jpg", "MGCL 5"),
            ("img4.jpg", "MGCL 5"),
        ]);
        let mut run = Run::default();

        let summary = batch(&storage, &ctx, &mut run, Path::new("/b"), Mode::Standard).await.unwrap();
        assert_eq!(summary.renamed, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(
            mock.paths().await,
            paths(&["/b/MGCL_5_D.jpg", "/b/MGCL_5_MANUAL.jpg", "/b/MGCL_5_V.jpg", "/b/img4.jpg"])
        );
        assert_eq!(run.record.len(), 3);
    }

    #[tokio::test]
    async fn test_summary_counts_skips() {
        let (_, storage) = storage(&["/b/img1.jpg", "/b/img2.jpg", "/b/img3.jpg", "/b/img4.jpg"]);
        let ctx = context(&[("img2.jpg", "XMGCL 2"), ("img3.jpg", "MGCL x"), ("img4.jpg", "MGCL 4")]);
        let mut run = Run::default();

        let summary = batch(&storage, &ctx, &mut run, Path::new("/b"), Mode::Standard).await.unwrap();
        assert_eq!(summary.considered, 4);
        assert_eq!(summary.renamed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped(SkipReason::SymbolNotFound), 1);
        assert_eq!(summary.skipped(SkipReason::UnrecognizedSymbol), 1);
        assert_eq!(summary.total_skipped(), 2);
        assert_eq!(summary.miss_rate(), 0.25);
        assert!(summary.average_per_image().is_some());
    }

    #[tokio::test]
    async fn test_relative_root_records_absolute_paths() {
        let cwd = std::env::current_dir().unwrap();
        let mock = Arc::new(MockBackend::with_files([cwd.join("b/img1.jpg"), cwd.join("b/img1.CR2")]));
        let storage: BackendHandle = mock.clone();
        let ctx = context(&[("img1.jpg", "MGCL 1")]);
        let mut run = Run::default();

        let summary = batch(&storage, &ctx, &mut run, Path::new("b"), Mode::Standard).await.unwrap();
        assert_eq!(summary.renamed, 1);
        assert_eq!(run.record.len(), 2);
        for pair in run.record.pairs() {
            assert!(pair.old.is_absolute(), "{}", pair.old.display());
            assert!(pair.new.is_absolute(), "{}", pair.new.display());
        }
        assert_eq!(run.record.pairs()[0].new, cwd.join("b/MGCL_1_D.jpg"));
    }

    #[tokio::test]
    async fn test_missing_root_is_an_error() {
        let (_, storage) = storage(&["/b/img1.jpg"]);
        let mut run = Run::default();
        let err = batch(&storage, &context(&[]), &mut run, Path::new("/elsewhere"), Mode::Recursive).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Batch));
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchSummary::default();
        assert_eq!(summary.miss_rate(), 0.0);
        assert_eq!(summary.average_per_image(), None);
    }
}
