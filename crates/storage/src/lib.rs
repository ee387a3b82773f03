pub mod backend;
pub mod error;
mod path;

pub use crate::backend::{Listing, StorageBackend};
pub use crate::path::validate_file_name;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
