use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::rename::error::{ErrorKind, Result as RenameResult};
use crate::rename::name::{base_name, compose};
use crate::rename::{Companion, Outcome, SkipReason};
use crate::{Context, Run, View};
use dmread_extract::error::ErrorKind as ExtractErrorKind;
use dmread_extract::{extract, file_number};
use dmread_storage::{BackendHandle, Listing, validate_file_name};
use exn::ResultExt;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Decodes `image` and renames it (and its raw companion) after the
/// identifier on its label.
///
/// `siblings` is the listing of the image's directory, used to find the
/// companion file by exact name. Successful renames are appended to the
/// run's record; the identifier's view count only advances once the image
/// has its final name.
///
/// # Errors
/// Returns [`Exn<LibraryErrorKind::Rename>`](LibraryErrorKind::Rename)
/// raised from an inner [`Exn<ErrorKind>`](ErrorKind).
pub async fn rename_image(
    storage: &BackendHandle,
    ctx: &Context,
    run: &mut Run,
    image: &Path,
    siblings: &Listing,
) -> LibraryResult<Outcome> {
    rename_image_inner(storage, ctx, run, image, siblings).await.or_raise(|| LibraryErrorKind::Rename)
}

#[instrument(skip_all, fields(image = %image.display()))]
pub(crate) async fn rename_image_inner(
    storage: &BackendHandle,
    ctx: &Context,
    run: &mut Run,
    image: &Path,
    siblings: &Listing,
) -> RenameResult<Outcome> {
    let dir = image.parent().unwrap_or(Path::new(""));
    let Some(stem) = image.file_stem().and_then(OsStr::to_str) else {
        exn::bail!(ErrorKind::InvalidName(image.display().to_string()));
    };
    let extension = image.extension().and_then(OsStr::to_str);

    // Range gate first: it only needs the file name, decoding takes seconds.
    let taxon = match &ctx.ranges {
        Some(ranges) => {
            let Some(number) = file_number(stem) else {
                return Ok(Outcome::Skipped(SkipReason::NoFileNumber));
            };
            match ranges.lookup(number) {
                Some(taxon) => Some(taxon),
                None => return Ok(Outcome::Skipped(SkipReason::OutOfRange)),
            }
        },
        None => None,
    };

    let Some(raw) = ctx.reader.read(image).await else {
        return Ok(Outcome::Skipped(SkipReason::SymbolNotFound));
    };
    let identifier = match extract(&raw, &ctx.institution) {
        Ok(identifier) => identifier,
        Err(e) if matches!(&*e, ExtractErrorKind::UnrecognizedSymbol(_)) => {
            return Ok(Outcome::Skipped(SkipReason::UnrecognizedSymbol));
        },
        Err(e) => return Err(e).or_raise(|| ErrorKind::IdentifierParse),
    };

    let base = base_name(&identifier, taxon);
    let view = match identifier.lateral {
        true => View::Lateral,
        false => run.occurrences.next_view(identifier.number),
    };
    let new_name = compose(&base, view, extension);
    validate_file_name(&new_name).or_raise(|| ErrorKind::InvalidName(new_name.clone()))?;
    let target = dir.join(&new_name);

    if target == image {
        if view != View::Lateral {
            run.occurrences.commit(identifier.number);
        }
        return Ok(Outcome::AlreadyNamed(target));
    }
    storage.rename(image, &target).await.or_raise(|| ErrorKind::RenameFailed)?;
    run.record.push(image, &target);
    if view != View::Lateral {
        run.occurrences.commit(identifier.number);
    }

    let companion = match siblings.file_named(&format!("{stem}.{}", ctx.raw_extension)) {
        None => Companion::None,
        Some(from) => {
            let to = dir.join(compose(&base, view, Some(&ctx.raw_extension)));
            rename_companion(storage, run, from, to).await
        },
    };

    Ok(Outcome::Renamed { from: image.to_path_buf(), to: target, view, companion })
}

/// Moves the raw file that shares the image's stem.
///
/// `siblings` predates this image's rename, so another image with the same
/// stem (`img1.jpg` and `img1.JPG`) may already have taken the companion.
async fn rename_companion(storage: &BackendHandle, run: &mut Run, from: &Path, to: PathBuf) -> Companion {
    match storage.exists(from).await {
        Ok(false) => {
            tracing::debug!(companion = %from.display(), "Raw companion already moved");
            return Companion::None;
        },
        Ok(true) => {},
        Err(e) => {
            tracing::error!(companion = %from.display(), error = ?e, "Could not check raw companion");
            return Companion::Failed(from.to_path_buf());
        },
    }
    match storage.rename(from, &to).await {
        Ok(()) => {
            run.record.push(from, &to);
            Companion::Renamed { from: from.to_path_buf(), to }
        },
        Err(e) => {
            tracing::error!(companion = %from.display(), error = ?e, "Could not rename raw companion");
            Companion::Failed(from.to_path_buf())
        },
    }
}
