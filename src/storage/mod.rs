//! Storage module for writing the mirror to disk
//!
//! This module handles all filesystem operations for the mirror, including:
//! - Mapping URLs to output paths (query suffix, index fallback)
//! - Creating the directory hierarchy
//! - Resolving leaf/directory collisions between URLs
//! - Tracking which URL owns each written file

mod disk;
mod path;
mod traits;

pub use disk::MirrorStorage;
pub use path::{map_to_path, OutputPath, INDEX_FILE};
pub use traits::{SaveOutcome, SavedFile, Storage, StorageError, StorageResult};

use crate::MirrorError;
use std::path::Path;

/// Opens storage rooted at `path`, creating the directory if needed
///
/// # Arguments
///
/// * `path` - Output root directory
///
/// # Returns
///
/// * `Ok(MirrorStorage)` - Storage ready for writes
/// * `Err(MirrorError)` - The root could not be created
pub fn open_storage(path: &Path) -> Result<MirrorStorage, MirrorError> {
    Ok(MirrorStorage::new(path)?)
}
