use crate::error::{ErrorKind, Result};
use crate::process::{non_empty, run};
use crate::{Decoder, Symbology};
use async_trait::async_trait;
use exn::ResultExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Extra wall-clock time granted on top of the scan budget before the
/// process is killed. `dmtxread` enforces the budget itself; this only
/// catches a scanner that ignores it.
const KILL_GRACE: Duration = Duration::from_secs(2);

/// The `dmtxread` data matrix scanner from dmtx-utils.
///
/// Scanning for a matrix is slow on large photographs, so the scan budget is
/// handed to `dmtxread` (`-m`, in milliseconds) and scanning stops after the
/// first symbol.
pub struct Dmtx {
    path: PathBuf,
}
impl Dmtx {
    pub const EXECUTABLE: &'static str = "dmtxread";

    /// Locates `dmtxread` on `PATH`.
    pub fn discover() -> Result<Self> {
        let path = which::which(Self::EXECUTABLE).or_raise(|| ErrorKind::DecoderNotFound(Self::EXECUTABLE))?;
        tracing::debug!(path = %path.display(), "Discovered dmtxread");
        Ok(Self::at(path))
    }

    /// Uses a specific `dmtxread` binary, skipping discovery.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn arguments(image: &Path, budget: Duration) -> Vec<std::ffi::OsString> {
        vec![
            "--stop-after=1".into(),
            format!("-m{}", budget.as_millis()).into(),
            image.as_os_str().to_os_string(),
        ]
    }
}

#[async_trait]
impl Decoder for Dmtx {
    fn symbology(&self) -> Symbology {
        Symbology::DataMatrix
    }

    async fn decode(&self, image: &Path, budget: Duration) -> Result<Option<String>> {
        let args = Self::arguments(image, budget);
        let Some(captured) = run(&self.path, args, budget + KILL_GRACE).await? else {
            return Ok(None);
        };
        // dmtxread reports "no matrix found" with a non-zero exit and empty
        // output; only an empty result is meaningful here.
        if !captured.status.success() {
            tracing::debug!(status = %captured.status, "dmtxread exited unsuccessfully");
        }
        Ok(non_empty(captured.stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments() {
        let args = Dmtx::arguments(Path::new("/img/IMG_0001.JPG"), Duration::from_secs(30));
        assert_eq!(args, ["--stop-after=1", "-m30000", "/img/IMG_0001.JPG"]);
    }

    #[test]
    fn test_discover_missing() {
        // Either installed or not; when missing the error must name the binary.
        if let Err(err) = Dmtx::discover() {
            assert!(matches!(&*err, ErrorKind::DecoderNotFound("dmtxread")));
        }
    }
}
