//! File name validation.
//!
//! Image names are composed from text decoded out of a label, so they are
//! untrusted. This module makes sure a composed name stays a single
//! component inside the directory the image already lives in.

use crate::error::{ErrorKind, Result};

/// Validates a single file name produced by renaming.
///
/// > **Note:** This does **not** normalize anything. A name is either used
/// >           verbatim or rejected.
///
/// # Returns
/// Returns the name unchanged if valid, or
/// [`InvalidName`](crate::error::ErrorKind::InvalidName) if invalid.
///
/// # Examples
///
/// ```
/// use dmread_storage::validate_file_name;
/// // Valid names
/// assert!(validate_file_name("MGCL_1037779_D.JPG").is_ok());
/// assert!(validate_file_name("MGCL_1037779_Danaus_plexippus_V.CR2").is_ok());
/// // Invalid names
/// assert!(validate_file_name("../MGCL_1037779_D.JPG").is_err());
/// assert!(validate_file_name("sub/MGCL_1037779_D.JPG").is_err());
/// assert!(validate_file_name("a\0b").is_err());
/// ```
pub fn validate_file_name(name: &str) -> Result<&str> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        // Null bytes cause truncation in C-based syscalls.
        || name.contains('\0')
        // Both separators are rejected on every platform; a name decoded on
        // one machine may be renamed on another.
        || name.contains(['/', '\\']);
    if invalid {
        exn::bail!(ErrorKind::InvalidName(name.to_string()));
    }
    Ok(name)
}
