//! Scripted decoder for testing.

use crate::error::{ErrorKind, Result};
use crate::{Decoder, Symbology};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Decoder that answers from a script keyed by file name.
///
/// Images absent from the script decode to nothing. Keying by file name
/// rather than full path lets the same script drive a test regardless of
/// where its temporary directory ended up.
///
/// # Examples
///
/// ```
/// use dmread_decode::{Decoder, MockDecoder, Symbology};
/// use std::path::Path;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let decoder = MockDecoder::new(Symbology::DataMatrix).with_result("img1.jpg", "MGCL 1037779");
/// let text = decoder.decode(Path::new("/any/dir/img1.jpg"), Duration::ZERO).await.unwrap();
/// assert_eq!(text.as_deref(), Some("MGCL 1037779"));
/// # }
/// ```
pub struct MockDecoder {
    symbology: Symbology,
    results: HashMap<String, String>,
    failures: HashSet<String>,
    calls: AtomicUsize,
}
impl MockDecoder {
    pub fn new(symbology: Symbology) -> Self {
        Self {
            symbology,
            results: HashMap::new(),
            failures: HashSet::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Scripts the decoded text for a file name.
    pub fn with_result(mut self, file_name: impl Into<String>, text: impl Into<String>) -> Self {
        self.results.insert(file_name.into(), text.into());
        self
    }

    /// Scripts a backend failure (as if the scanner crashed) for a file name.
    pub fn with_failure(mut self, file_name: impl Into<String>) -> Self {
        self.failures.insert(file_name.into());
        self
    }

    /// Number of times [`decode`](Decoder::decode) has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Decoder for MockDecoder {
    fn symbology(&self) -> Symbology {
        self.symbology
    }

    async fn decode(&self, image: &Path, _budget: Duration) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let name = image.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        if self.failures.contains(&name) {
            exn::bail!(ErrorKind::DecoderKilled);
        }
        Ok(self.results.get(&name).cloned())
    }
}
