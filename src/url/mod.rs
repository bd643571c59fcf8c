//! URL handling module for Sumi-Mirror
//!
//! This module provides URL normalization, network-location comparison,
//! ignore-pattern matching, and the scope classification of candidate URLs.

mod domain;
mod matcher;
mod normalize;

use ::url::Url;

// Re-export main functions
pub use domain::{is_same_domain, network_location};
pub use matcher::IgnoreSet;
pub use normalize::{normalize_url, resolve_reference};

/// Extensions that mark a URL as a literal file download rather than a page
///
/// Compared case-insensitively against the end of the URL path.
pub const DOWNLOADABLE_FILE_EXTENSIONS: &[&str] = &[
    ".7z", ".avi", ".bz2", ".csv", ".doc", ".docx", ".epub", ".exe", ".flac", ".gif", ".gz",
    ".jpeg", ".jpg", ".json", ".m4a", ".mkv", ".mov", ".mp3", ".mp4", ".mpeg", ".ods", ".odt",
    ".ogg", ".pdf", ".pkg", ".png", ".ppt", ".pptx", ".rar", ".svg", ".tar", ".tgz", ".tif",
    ".tiff", ".tsv", ".txt", ".wav", ".webm", ".webp", ".xls", ".xlsx", ".xml", ".zip",
];

/// Scope decision for a candidate URL
///
/// A pure function of the URL, the seed URL and the ignore set: classifying
/// the same URL twice always yields the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Classification {
    /// The URL matched an ignore pattern
    pub ignored: bool,

    /// The URL shares the seed's network location
    pub same_domain: bool,

    /// The URL path names a non-HTML file
    pub file_download: bool,
}

impl Classification {
    /// Returns true if a link with this classification should be crawled
    pub fn should_follow(&self) -> bool {
        self.same_domain && !self.ignored
    }
}

/// Classifies a URL relative to the seed URL and ignore set
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_mirror::url::{classify, IgnoreSet};
///
/// let seed = Url::parse("https://example.com/").unwrap();
/// let ignore = IgnoreSet::new(&["*facebook.com/*"]).unwrap();
///
/// let c = classify(&Url::parse("https://example.com/report.PDF").unwrap(), &seed, &ignore);
/// assert!(c.same_domain && c.file_download && !c.ignored);
///
/// let c = classify(&Url::parse("https://facebook.com/share").unwrap(), &seed, &ignore);
/// assert!(c.ignored && !c.same_domain);
/// ```
pub fn classify(url: &Url, seed: &Url, ignore: &IgnoreSet) -> Classification {
    Classification {
        ignored: ignore.is_ignored(url),
        same_domain: is_same_domain(url, seed),
        file_download: is_file_download(url),
    }
}

/// Returns true if the URL path ends with a downloadable file extension
pub fn is_file_download(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    DOWNLOADABLE_FILE_EXTENSIONS
        .iter()
        .any(|extension| path.ends_with(extension))
}

/// Returns true if the URL path names a stylesheet
pub fn is_stylesheet(url: &Url) -> bool {
    url.path().to_ascii_lowercase().ends_with(".css")
}
