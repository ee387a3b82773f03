use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// zbarimg prefixes every decoded line with its symbology, e.g. `CODE-128:` or `QR-Code:`.
regex!(SYMBOLOGY_PREFIX_REGEX, r"^[A-Za-z][A-Za-z0-9-]*:");
// Duplicate indicators added by file managers and cameras, e.g. `IMG_0001(1).JPG`.
regex!(DUPLICATE_COUNTER_REGEX, r"\(\d+\)");

/// Case-insensitive substrings that mark a decoded symbol as a lateral view.
pub(crate) const LATERAL_MARKERS: [&str; 3] = ["lateral", "lat", "_l"];
/// Whole tokens that are lateral view hints rather than part of the identifier.
pub(crate) const LATERAL_TOKENS: [&str; 3] = ["lateral", "lat", "l"];
