//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("URL has no host: {0}")]
    MissingHost(String),

    #[error("Path escapes the output root: {0}")]
    OutsideRoot(PathBuf),
}

impl StorageError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// What happened when content was handed to storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Content was written to `path`
    Written,

    /// Another URL of this crawl already owns `path`; nothing was written
    AlreadyClaimed { owner: String },
}

/// Result of a save operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub path: PathBuf,
    pub outcome: SaveOutcome,
}

impl SavedFile {
    pub fn was_written(&self) -> bool {
        matches!(self.outcome, SaveOutcome::Written)
    }
}

/// Trait for storage backend implementations
///
/// A backend turns URLs into files and owns whatever bookkeeping it needs to
/// keep leaf/directory collisions from losing content.
pub trait Storage: Send {
    /// Saves content fetched from `url`
    ///
    /// # Arguments
    ///
    /// * `url` - The fragment-free URL the content came from
    /// * `content` - Raw bytes to write
    ///
    /// # Returns
    ///
    /// Where the content lives on disk, and whether this call wrote it
    fn save(&mut self, url: &Url, content: &[u8]) -> StorageResult<SavedFile>;

    /// Root directory everything is written under
    fn root(&self) -> &Path;
}
