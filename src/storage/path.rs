//! URL to filesystem path mapping
//!
//! Every URL maps to `root/<network-location>/<path segments>/<leaf>`:
//!
//! | URL path        | Directory        | Leaf                 |
//! |-----------------|------------------|----------------------|
//! | `/`             | `host/`          | `index.html`         |
//! | `/css/site.css` | `host/css/`      | `site.css`           |
//! | `/blog`         | `host/blog/`     | `index.html`         |
//! | `/blog/`        | `host/blog/`     | `index.html`         |
//! | `/p.php?a=1`    | `host/`          | `p-a=1.php`          |
//! | `/blog?page=2`  | `host/blog/`     | `index-page=2.html`  |

use crate::storage::{StorageError, StorageResult};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use url::form_urlencoded;
use url::Url;

/// Leaf used for directory-like URLs and for demoted files
pub const INDEX_FILE: &str = "index.html";

/// Longest encoded query kept verbatim in a filename
const MAX_QUERY_SUFFIX: usize = 96;

/// Hex digits of the SHA-256 digest kept in a shortened suffix
const SUFFIX_HASH_LEN: usize = 16;

/// The computed on-disk location for a URL's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPath {
    /// Directory the file is written into
    pub dir: PathBuf,

    /// File name inside `dir`
    pub leaf: String,
}

impl OutputPath {
    pub fn file_path(&self) -> PathBuf {
        self.dir.join(&self.leaf)
    }
}

/// Maps a URL to its output location under `root`
///
/// The mapping is deterministic and does not touch the filesystem; collision
/// handling happens when the file is saved.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use url::Url;
/// use sumi_mirror::storage::map_to_path;
///
/// let url = Url::parse("https://example.com/blog").unwrap();
/// let mapped = map_to_path(&url, Path::new("out")).unwrap();
/// assert_eq!(mapped.file_path(), Path::new("out/example.com/blog/index.html"));
/// ```
pub fn map_to_path(url: &Url, root: &Path) -> StorageResult<OutputPath> {
    let location = location_dir(url)?;

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.collect())
        .unwrap_or_default();

    let (parents, last) = match segments.split_last() {
        Some((last, parents)) => (parents, *last),
        None => (&[][..], ""),
    };

    let mut dir = root.join(location);
    for segment in parents.iter().filter(|s| is_usable_segment(s)) {
        dir.push(segment);
    }

    let leaf = if !is_usable_segment(last) {
        INDEX_FILE.to_string()
    } else if has_extension(last) {
        last.to_string()
    } else {
        // Extensionless leaf: the URL may also host children later
        dir.push(last);
        INDEX_FILE.to_string()
    };

    let leaf = match query_suffix(url) {
        Some(suffix) => with_suffix(&leaf, &suffix),
        None => leaf,
    };

    Ok(OutputPath { dir, leaf })
}

/// Directory name for the URL's network location (`host` or `host:port`)
fn location_dir(url: &Url) -> StorageResult<String> {
    let host = url
        .host_str()
        .ok_or_else(|| StorageError::MissingHost(url.to_string()))?;

    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

fn is_usable_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".."
}

fn has_extension(leaf: &str) -> bool {
    Path::new(leaf)
        .extension()
        .map(|ext| !ext.is_empty())
        .unwrap_or(false)
}

/// Encodes the query string into a filename-safe suffix
///
/// Parameters are decoded and re-encoded with form-urlencoded rules, so any
/// `/` inside a value becomes `%2F` and cannot introduce a path separator.
fn query_suffix(url: &Url) -> Option<String> {
    let query = url.query()?;

    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(form_urlencoded::parse(query.as_bytes()))
        .finish();

    if encoded.is_empty() {
        return None;
    }

    if encoded.len() <= MAX_QUERY_SUFFIX {
        return Some(encoded);
    }

    // form-urlencoded output is ASCII, so byte slicing is safe
    let mut hasher = Sha256::new();
    hasher.update(encoded.as_bytes());
    let digest = hex::encode(hasher.finalize());

    Some(format!(
        "{}-{}",
        &encoded[..MAX_QUERY_SUFFIX / 2],
        &digest[..SUFFIX_HASH_LEN]
    ))
}

/// Inserts `-suffix` between the leaf's stem and extension
fn with_suffix(leaf: &str, suffix: &str) -> String {
    match leaf.rfind('.') {
        Some(dot) if dot > 0 => format!("{}-{}{}", &leaf[..dot], suffix, &leaf[dot..]),
        _ => format!("{}-{}", leaf, suffix),
    }
}
