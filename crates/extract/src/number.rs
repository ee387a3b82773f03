//! Digit extraction for file names and range table cells.

use crate::consts::DUPLICATE_COUNTER_REGEX;

/// Keeps only the ASCII digits of `text` and parses them.
///
/// Returns `None` when there are no digits (or too many to fit a `u64`).
///
/// ```
/// use dmread_extract::digits_of;
/// assert_eq!(digits_of("IMG_0042"), Some(42));
/// assert_eq!(digits_of("ImageStart"), None);
/// ```
pub fn digits_of(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    match digits.is_empty() {
        true => None,
        false => digits.parse().ok(),
    }
}

/// The image number of a file stem: its digits, once duplicate counters
/// such as `(1)` have been removed.
///
/// ```
/// use dmread_extract::file_number;
/// assert_eq!(file_number("IMG_0042(1)"), Some(42));
/// ```
pub fn file_number(stem: &str) -> Option<u64> {
    digits_of(&DUPLICATE_COUNTER_REGEX.replace_all(stem, ""))
}
