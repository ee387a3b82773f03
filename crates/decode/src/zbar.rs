use crate::error::{ErrorKind, Result};
use crate::process::{non_empty, run};
use crate::{Decoder, Symbology};
use async_trait::async_trait;
use exn::ResultExt;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// `zbarimg` exits with this code when it scanned the image successfully but
/// found no symbols.
const EXIT_NO_SYMBOLS: i32 = 4;

/// The `zbarimg` barcode scanner from the ZBar suite.
///
/// Reads 1D barcodes (Code 128 on current specimen labels). Output lines are
/// prefixed with the symbology, e.g. `CODE-128:MGCL 1037779`; the prefix is
/// left for the identifier extractor to strip.
pub struct Zbar {
    path: PathBuf,
}
impl Zbar {
    pub const EXECUTABLE: &'static str = "zbarimg";

    /// Locates `zbarimg` on `PATH`.
    pub fn discover() -> Result<Self> {
        let path = which::which(Self::EXECUTABLE).or_raise(|| ErrorKind::DecoderNotFound(Self::EXECUTABLE))?;
        tracing::debug!(path = %path.display(), "Discovered zbarimg");
        Ok(Self::at(path))
    }

    /// Uses a specific `zbarimg` binary, skipping discovery.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Decoder for Zbar {
    fn symbology(&self) -> Symbology {
        Symbology::Barcode
    }

    async fn decode(&self, image: &Path, budget: Duration) -> Result<Option<String>> {
        let Some(captured) = run(&self.path, [OsStr::new("--quiet"), image.as_os_str()], budget).await? else {
            return Ok(None);
        };
        match captured.status.code() {
            Some(0) | Some(EXIT_NO_SYMBOLS) => Ok(non_empty(captured.stdout)),
            Some(code) => exn::bail!(ErrorKind::DecoderFailed(code)),
            None => exn::bail!(ErrorKind::DecoderKilled),
        }
    }
}
