//! Cleanup of raw decoder output.

use crate::consts::SYMBOLOGY_PREFIX_REGEX;

/// Normalizes one line of decoder output into an underscore-joined token
/// string, e.g. `CODE-128:MGCL 1037779` becomes `MGCL_1037779`.
///
/// In order:
/// - byte-string wrappers (`b'...'`) and quote characters are dropped,
/// - literal `\n` and `\r` escape sequences are dropped,
/// - a leading symbology prefix (`CODE-128:`) is dropped,
/// - runs of whitespace become a single `_`.
///
/// ```
/// use dmread_extract::normalize;
/// assert_eq!(normalize("b'MGCL 1037779\\n'"), "MGCL_1037779");
/// ```
pub fn normalize(line: &str) -> String {
    let line = line.trim();
    let line = strip_byte_string(line);
    let line = line.replace("\\n", " ").replace("\\r", " ").replace(['\'', '"'], "");
    let line = SYMBOLOGY_PREFIX_REGEX.replace(line.trim_start(), "");
    line.split_whitespace().collect::<Vec<_>>().join("_")
}

fn strip_byte_string(line: &str) -> &str {
    for quote in ['\'', '"'] {
        if let Some(inner) = line.strip_prefix('b').and_then(|l| l.strip_prefix(quote)) {
            return inner.strip_suffix(quote).unwrap_or(inner);
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("MGCL 1037779", "MGCL_1037779")]
    #[case::trailing_newline("MGCL 1037779\n", "MGCL_1037779")]
    #[case::byte_string("b'MGCL 1037779\\n'", "MGCL_1037779")]
    #[case::byte_string_double_quoted("b\"MGCL 1037779\"", "MGCL_1037779")]
    #[case::quoted("'MGCL_1037779'", "MGCL_1037779")]
    #[case::zbar_prefix("CODE-128:MGCL 1037779", "MGCL_1037779")]
    #[case::qr_prefix("QR-Code:MGCL 1037779 lateral", "MGCL_1037779_lateral")]
    #[case::whitespace_runs("  MGCL \t 1037779   L ", "MGCL_1037779_L")]
    #[case::already_normal("MGCL_1037779", "MGCL_1037779")]
    #[case::empty("", "")]
    #[case::only_noise("b''", "")]
    fn test_normalize(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize(raw), expected);
    }

    #[test]
    fn test_bare_b_is_not_a_byte_string() {
        assert_eq!(normalize("bMGCL 1"), "bMGCL_1");
    }
}
