//! Filesystem storage with leaf/directory collision resolution
//!
//! URLs and directories do not share a namespace: `/v1.2` can be a file
//! while `/v1.2/notes` later needs `v1.2` to be a directory, and `/docs/a`
//! can create `docs/` before `/docs.d` style siblings or `/docs` itself are
//! seen. `MirrorStorage` keeps a table of every path it has created so that
//! both cases are decided up front:
//!
//! - **File where a directory is needed**: the file is moved aside to a
//!   temporary sibling, the directory is created, and the file is moved back
//!   in as `<dir>/index.html`.
//! - **Directory where a file is requested**: the content is written to
//!   `<path>/index.html` instead.
//!
//! Paths not in the table (left on disk by something else) are probed with
//! `std::fs::metadata` and handled the same way.

use crate::storage::path::{map_to_path, INDEX_FILE};
use crate::storage::{SaveOutcome, SavedFile, Storage, StorageError, StorageResult};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use url::Url;

/// Known kind of a path under the output root
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathKind {
    /// Regular file; `owner` is the URL whose content it holds, empty when
    /// the file predates this crawl
    File { owner: String },

    Directory,
}

/// Storage backend writing the mirror under one root directory
#[derive(Debug)]
pub struct MirrorStorage {
    root: PathBuf,
    kinds: HashMap<PathBuf, PathKind>,
}

impl MirrorStorage {
    /// Creates storage rooted at `root`, creating the directory if needed
    pub fn new(root: &Path) -> StorageResult<Self> {
        fs::create_dir_all(root).map_err(|e| StorageError::io(root, e))?;

        let mut kinds = HashMap::new();
        kinds.insert(root.to_path_buf(), PathKind::Directory);

        Ok(Self {
            root: root.to_path_buf(),
            kinds,
        })
    }

    /// Looks up a path, consulting the filesystem for paths not yet seen
    fn kind_of(&mut self, path: &Path) -> Option<PathKind> {
        if let Some(kind) = self.kinds.get(path) {
            return Some(kind.clone());
        }

        let kind = match fs::metadata(path) {
            Ok(meta) if meta.is_dir() => PathKind::Directory,
            Ok(_) => PathKind::File {
                owner: String::new(),
            },
            Err(_) => return None,
        };

        self.kinds.insert(path.to_path_buf(), kind.clone());
        Some(kind)
    }

    /// Creates every directory from the root down to `dir`
    fn ensure_directory(&mut self, dir: &Path) -> StorageResult<()> {
        let relative = dir
            .strip_prefix(&self.root)
            .map_err(|_| StorageError::OutsideRoot(dir.to_path_buf()))?
            .to_path_buf();

        let mut current = self.root.clone();
        for component in relative.components() {
            current.push(component);

            match self.kind_of(&current) {
                Some(PathKind::Directory) => {}
                Some(PathKind::File { .. }) => self.demote_to_directory(&current)?,
                None => self.create_directory(&current)?,
            }
        }

        Ok(())
    }

    /// Creates a single directory, tolerating a concurrent creator
    fn create_directory(&mut self, path: &Path) -> StorageResult<()> {
        match fs::create_dir(path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists && path.is_dir() => {}
            Err(e) if path.is_file() => {
                tracing::debug!("{} appeared as a file ({}), demoting", path.display(), e);
                self.kinds.insert(
                    path.to_path_buf(),
                    PathKind::File {
                        owner: String::new(),
                    },
                );
                return self.demote_to_directory(path);
            }
            Err(e) => return Err(StorageError::io(path, e)),
        }

        self.kinds.insert(path.to_path_buf(), PathKind::Directory);
        Ok(())
    }

    /// Turns the file at `path` into a directory holding it as `index.html`
    fn demote_to_directory(&mut self, path: &Path) -> StorageResult<()> {
        let temp = temporary_sibling(path);
        let index = path.join(INDEX_FILE);

        fs::rename(path, &temp).map_err(|e| StorageError::io(path, e))?;
        fs::create_dir(path).map_err(|e| StorageError::io(path, e))?;
        fs::rename(&temp, &index).map_err(|e| StorageError::io(&index, e))?;

        let previous = self.kinds.remove(path);
        self.kinds.insert(path.to_path_buf(), PathKind::Directory);
        if let Some(file @ PathKind::File { .. }) = previous {
            self.kinds.insert(index.clone(), file);
        }

        tracing::debug!(
            "Moved {} to {} to make room for a directory",
            path.display(),
            index.display()
        );
        Ok(())
    }

    /// Writes `content`, redirecting into `index.html` if `target` is a directory
    fn write_file(&mut self, target: PathBuf, content: &[u8]) -> StorageResult<PathBuf> {
        match fs::write(&target, content) {
            Ok(()) => Ok(target),
            Err(_) if target.is_dir() => {
                self.kinds.insert(target.clone(), PathKind::Directory);
                let index = target.join(INDEX_FILE);
                fs::write(&index, content).map_err(|e| StorageError::io(&index, e))?;
                Ok(index)
            }
            Err(e) => Err(StorageError::io(&target, e)),
        }
    }
}

impl Storage for MirrorStorage {
    fn save(&mut self, url: &Url, content: &[u8]) -> StorageResult<SavedFile> {
        let mapped = map_to_path(url, &self.root)?;
        self.ensure_directory(&mapped.dir)?;

        let mut target = mapped.file_path();
        if let Some(PathKind::Directory) = self.kind_of(&target) {
            tracing::debug!(
                "{} is a directory, saving {} as its index",
                target.display(),
                url
            );
            target.push(INDEX_FILE);
        }

        if let Some(PathKind::File { owner }) = self.kinds.get(&target) {
            if !owner.is_empty() && owner != url.as_str() {
                tracing::debug!(
                    "{} already holds {}, not overwriting with {}",
                    target.display(),
                    owner,
                    url
                );
                return Ok(SavedFile {
                    path: target,
                    outcome: SaveOutcome::AlreadyClaimed {
                        owner: owner.clone(),
                    },
                });
            }
        }

        let written = self.write_file(target, content)?;

        if is_html_path(&written) {
            tracing::info!("Saving page to {}", written.display());
        } else {
            tracing::info!("Saving asset to {}", written.display());
        }

        self.kinds.insert(
            written.clone(),
            PathKind::File {
                owner: url.to_string(),
            },
        );

        Ok(SavedFile {
            path: written,
            outcome: SaveOutcome::Written,
        })
    }

    fn root(&self) -> &Path {
        &self.root
    }
}

fn is_html_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("html") | Some("htm")
    )
}

/// Picks an unused name next to `path` for the demotion shuffle
fn temporary_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut attempt = 0u32;
    loop {
        let candidate = path.with_file_name(format!(".{}.sumi-tmp{}", name, attempt));
        if !candidate.exists() {
            return candidate;
        }
        attempt += 1;
    }
}
