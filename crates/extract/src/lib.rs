//! Catalogue identifiers from decoded label text.
//!
//! Decoders hand back whatever the symbol contained, wrapped in whatever the
//! scanner adds around it. This crate cleans that up ([`normalize`]) and
//! parses the result into an [`Identifier`]. It also owns the digit rules
//! that tie camera file names to the image-number range table.

mod consts;
pub mod error;
mod identifier;
mod normalize;
mod number;

use tracing::instrument;

use crate::error::Result;
pub use crate::identifier::{Identifier, is_lateral};
pub use crate::normalize::normalize;
pub use crate::number::{digits_of, file_number};

/// Top-level entrypoint: raw decoder output to [`Identifier`].
///
/// Scanners may print one line per symbol found. The first line whose
/// leading token is `institution` is used; failing that, the first
/// non-blank line, which then fails to parse.
///
/// ```
/// use dmread_extract::extract;
/// let id = extract("CODE-128:MGCL 1037779\n", "MGCL").unwrap();
/// assert_eq!(id.base_name(), "MGCL_1037779");
/// ```
#[instrument(skip(raw), fields(raw_size = raw.len()))]
pub fn extract(raw: &str, institution: &str) -> Result<Identifier> {
    let lines: Vec<String> = raw.lines().map(normalize).filter(|l| !l.is_empty()).collect();
    let text = lines
        .iter()
        .find(|l| l.split('_').next() == Some(institution))
        .or(lines.first())
        .map(String::as_str)
        .unwrap_or_default();
    let identifier = Identifier::parse(text, institution)?;
    tracing::debug!(identifier = %identifier, lateral = identifier.lateral, "Extracted identifier");
    Ok(identifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_extract_prefers_institution_line() {
        let id = extract("EAN-13:4006381333931\nCODE-128:MGCL 1037779\n", "MGCL").unwrap();
        assert_eq!(id.number, 1037779);
    }

    #[test]
    fn test_extract_lateral() {
        let id = extract("b'MGCL 1037779 lateral'", "MGCL").unwrap();
        assert!(id.lateral);
        assert_eq!(id.base_name(), "MGCL_1037779");
    }

    #[test]
    fn test_extract_unrecognized() {
        let err = extract("NHM 1\n", "MGCL").unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnrecognizedSymbol(t) if t == "NHM_1"));
        let err = extract("\n\n", "MGCL").unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnrecognizedSymbol(t) if t.is_empty()));
    }

    #[test]
    fn test_extract_invalid() {
        let err = extract("MGCL 1O37779", "MGCL").unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidIdentifier { .. }));
    }
}
