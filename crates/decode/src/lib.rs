//! Symbol decoding for specimen photographs.
//!
//! Specimen labels carry the catalogue number twice: as a Code 128 barcode
//! and as a data matrix. Neither is read by this crate directly; external
//! scanners are driven as subprocesses behind the [`Decoder`] trait:
//!
//! - **[`Zbar`]**: `zbarimg`, fast, barcodes only.
//! - **[`Dmtx`]**: `dmtxread`, slow, data matrices, honours a scan budget.
//!
//! [`SymbolReader`] chains decoders in a configured order and returns the
//! first decoded text that carries the institution marker. Every failure
//! along the way (scanner missing a symbol, scanner crashing, scanner timing
//! out) is logged and treated as "nothing found", so one bad photograph can
//! never stop a batch.

mod dmtx;
pub mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod process;
mod zbar;

pub use crate::dmtx::Dmtx;
use crate::error::Result;
#[cfg(any(test, feature = "mock"))]
pub use crate::mock::MockDecoder;
pub use crate::zbar::Zbar;
use async_trait::async_trait;
use derive_more::Display;
use std::path::Path;
use std::time::Duration;
use tracing::instrument;

/// The kind of symbol a [`Decoder`] looks for.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(rename_all = "kebab-case"))]
pub enum Symbology {
    /// 1D barcode (Code 128).
    #[display("barcode")]
    Barcode,
    /// 2D data matrix.
    #[display("data-matrix")]
    DataMatrix,
}

/// A single decoding backend.
///
/// Implementations return `Ok(None)` when the image was scanned but nothing
/// was found, including when the scan exceeded `budget`. `Err` is reserved
/// for the backend itself misbehaving.
#[async_trait]
pub trait Decoder: Send + Sync {
    fn symbology(&self) -> Symbology;

    async fn decode(&self, image: &Path, budget: Duration) -> Result<Option<String>>;
}

/// Locates the executable for a [`Symbology`] on `PATH`.
pub fn discover(symbology: Symbology) -> Result<Box<dyn Decoder>> {
    let decoder: Box<dyn Decoder> = match symbology {
        Symbology::Barcode => Box::new(Zbar::discover()?),
        Symbology::DataMatrix => Box::new(Dmtx::discover()?),
    };
    Ok(decoder)
}

/// Runs decoders in order until one produces text containing `marker`.
///
/// ```no_run
/// use dmread_decode::{Symbology, SymbolReader};
/// use std::path::Path;
/// use std::time::Duration;
///
/// # async fn example() -> dmread_decode::error::Result<()> {
/// let reader = SymbolReader::discover(&[Symbology::Barcode, Symbology::DataMatrix], "MGCL", Duration::from_secs(30))?;
/// match reader.read(Path::new("/data/IMG_0001.JPG")).await {
///     Some(text) => println!("decoded {text}"),
///     None => println!("no symbol"),
/// }
/// # Ok(())
/// # }
/// ```
pub struct SymbolReader {
    decoders: Vec<Box<dyn Decoder>>,
    marker: String,
    budget: Duration,
}
impl SymbolReader {
    /// Creates a reader with no decoders; add them with
    /// [`with_decoder`](Self::with_decoder).
    pub fn new(marker: impl Into<String>, budget: Duration) -> Self {
        Self { decoders: Vec::new(), marker: marker.into(), budget }
    }

    /// Discovers the executables for every symbology in `order`. Fails on
    /// the first one that isn't installed, before any image is touched.
    pub fn discover(order: &[Symbology], marker: impl Into<String>, budget: Duration) -> Result<Self> {
        let decoders = order.iter().map(|s| discover(*s)).collect::<Result<Vec<_>>>()?;
        Ok(Self { decoders, marker: marker.into(), budget })
    }

    pub fn with_decoder(mut self, decoder: impl Decoder + 'static) -> Self {
        self.decoders.push(Box::new(decoder));
        self
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Decodes `image`, returning the raw text of the first symbol carrying
    /// the institution marker, or `None` if no decoder found one.
    #[instrument(skip_all, fields(image = %image.display()))]
    pub async fn read(&self, image: &Path) -> Option<String> {
        for decoder in &self.decoders {
            let symbology = decoder.symbology();
            match decoder.decode(image, self.budget).await {
                Ok(Some(text)) if text.contains(&self.marker) => {
                    tracing::debug!(%symbology, raw = %text.trim(), "Decoded symbol");
                    return Some(text);
                },
                Ok(Some(text)) => {
                    tracing::debug!(%symbology, raw = %text.trim(), "Decoded text lacks institution marker");
                },
                Ok(None) => tracing::debug!(%symbology, "No symbol found"),
                Err(e) => tracing::warn!(%symbology, error = ?e, "Decoder failed; trying next"),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader() -> SymbolReader {
        SymbolReader::new("MGCL", Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_first_decoder_wins() {
        let barcode = MockDecoder::new(Symbology::Barcode).with_result("img1.jpg", "CODE-128:MGCL 1037779");
        let matrix = MockDecoder::new(Symbology::DataMatrix).with_result("img1.jpg", "MGCL 9999999");
        let reader = reader().with_decoder(barcode).with_decoder(matrix);
        assert_eq!(reader.read(Path::new("/a/img1.jpg")).await.as_deref(), Some("CODE-128:MGCL 1037779"));
    }

    #[tokio::test]
    async fn test_falls_back_when_nothing_found() {
        let barcode = MockDecoder::new(Symbology::Barcode);
        let matrix = MockDecoder::new(Symbology::DataMatrix).with_result("img1.jpg", "MGCL 1037779");
        let reader = reader().with_decoder(barcode).with_decoder(matrix);
        assert_eq!(reader.read(Path::new("/a/img1.jpg")).await.as_deref(), Some("MGCL 1037779"));
    }

    #[tokio::test]
    async fn test_falls_back_on_error() {
        let barcode = MockDecoder::new(Symbology::Barcode).with_failure("img1.jpg");
        let matrix = MockDecoder::new(Symbology::DataMatrix).with_result("img1.jpg", "MGCL 1037779");
        let reader = reader().with_decoder(barcode).with_decoder(matrix);
        assert_eq!(reader.read(Path::new("/a/img1.jpg")).await.as_deref(), Some("MGCL 1037779"));
    }

    #[tokio::test]
    async fn test_falls_back_when_marker_missing() {
        let barcode = MockDecoder::new(Symbology::Barcode).with_result("img1.jpg", "EAN-13:4006381333931");
        let matrix = MockDecoder::new(Symbology::DataMatrix).with_result("img1.jpg", "MGCL 1037779");
        let reader = reader().with_decoder(barcode).with_decoder(matrix);
        assert_eq!(reader.read(Path::new("/a/img1.jpg")).await.as_deref(), Some("MGCL 1037779"));
    }

    #[tokio::test]
    async fn test_nothing_found_is_none() {
        let barcode = MockDecoder::new(Symbology::Barcode).with_failure("img1.jpg");
        let matrix = MockDecoder::new(Symbology::DataMatrix).with_result("img1.jpg", "NHM 1");
        let reader = reader().with_decoder(barcode).with_decoder(matrix);
        assert_eq!(reader.read(Path::new("/a/img1.jpg")).await, None);
        assert_eq!(SymbolReader::new("MGCL", Duration::ZERO).read(Path::new("/a/img1.jpg")).await, None);
    }

    #[test]
    fn test_symbology_display() {
        assert_eq!(Symbology::Barcode.to_string(), "barcode");
        assert_eq!(Symbology::DataMatrix.to_string(), "data-matrix");
    }
}
