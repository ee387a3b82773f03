use crate::consts::{LATERAL_MARKERS, LATERAL_TOKENS};
use crate::error::{ErrorKind, Result};
use derive_more::Display;

/// A catalogue identifier read off a specimen label.
///
/// Built from normalized text (see [`normalize`](crate::normalize)) of the
/// form `<INSTITUTION>_<NUMBER>[_<HINT>...]`, e.g. `MGCL_1037779_lateral`.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{text}")]
pub struct Identifier {
    /// The full normalized text the identifier was parsed from.
    pub text: String,
    /// The institution code, always equal to the accepted one.
    pub institution: String,
    /// Catalogue number as written on the label, zero padding included.
    pub digits: String,
    /// Catalogue number as an integer, for comparisons.
    pub number: u64,
    /// Any tokens after the catalogue number.
    pub hints: Vec<String>,
    /// Whether the label marks this as a lateral view.
    pub lateral: bool,
}
impl Identifier {
    /// Parses normalized text, accepting only identifiers issued by `institution`.
    ///
    /// # Errors
    ///
    /// - [`UnrecognizedSymbol`](ErrorKind::UnrecognizedSymbol) when the first
    ///   token is not exactly `institution`.
    /// - [`InvalidIdentifier`](ErrorKind::InvalidIdentifier) when the second
    ///   token is missing or not entirely digits.
    ///
    /// ```
    /// use dmread_extract::Identifier;
    /// let id = Identifier::parse("MGCL_0001234_lateral", "MGCL").unwrap();
    /// assert_eq!(id.number, 1234);
    /// assert!(id.lateral);
    /// assert_eq!(id.base_name(), "MGCL_0001234");
    /// ```
    pub fn parse(text: &str, institution: &str) -> Result<Self> {
        let mut tokens = text.split('_').filter(|t| !t.is_empty());
        if tokens.next() != Some(institution) {
            exn::bail!(ErrorKind::UnrecognizedSymbol(text.to_string()));
        }
        let digits = tokens.next().unwrap_or_default();
        let number = match digits.bytes().all(|b| b.is_ascii_digit()) {
            true => digits.parse::<u64>().ok(),
            false => None,
        };
        let Some(number) = number else {
            exn::bail!(ErrorKind::InvalidIdentifier {
                text: text.to_string(),
                value: digits.to_string(),
            });
        };
        Ok(Self {
            text: text.to_string(),
            institution: institution.to_string(),
            digits: digits.to_string(),
            number,
            hints: tokens.map(str::to_string).collect(),
            lateral: is_lateral(text),
        })
    }

    /// The identifier part of the new file name: institution, catalogue
    /// number and any hints that are not lateral markers.
    pub fn base_name(&self) -> String {
        let mut parts = vec![self.institution.as_str(), self.digits.as_str()];
        parts.extend(
            self.hints
                .iter()
                .map(String::as_str)
                .filter(|h| !LATERAL_TOKENS.iter().any(|t| h.eq_ignore_ascii_case(t))),
        );
        parts.join("_")
    }
}

/// Whether normalized symbol text marks a lateral view.
///
/// Deliberately loose: any of `lateral`, `lat` or `_l` anywhere in the
/// text, ignoring case.
pub fn is_lateral(text: &str) -> bool {
    let text = text.to_ascii_lowercase();
    LATERAL_MARKERS.iter().any(|m| text.contains(m))
}
