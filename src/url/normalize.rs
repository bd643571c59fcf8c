use crate::UrlError;
use url::Url;

/// Schemes that are never fetched, even when they resolve against a page
const NON_FETCHABLE_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:", "data:", "blob:"];

/// Normalizes a URL into its crawl-target form
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything that is not `http` or `https`
/// 3. Require a host
/// 4. Remove the fragment (everything after #)
///
/// Host lowercasing, default-port removal and dot-segment resolution come
/// from the `url` parser itself. The query string is kept as-is: two URLs
/// differing in their query are distinct crawl targets.
///
/// # Examples
///
/// ```
/// use sumi_mirror::url::normalize_url;
///
/// let url = normalize_url("http://EXAMPLE.com/a/../page#top").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/page");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    finish(url)
}

/// Resolves a reference found in a document against its base URL
///
/// Returns `None` for empty references, fragment-only references, special
/// schemes and anything that does not resolve to an http(s) URL.
pub fn resolve_reference(reference: &str, base: &Url) -> Option<Url> {
    let reference = reference.trim();

    if reference.is_empty() || reference.starts_with('#') {
        return None;
    }

    let lowered = reference.to_ascii_lowercase();
    if NON_FETCHABLE_PREFIXES
        .iter()
        .any(|prefix| lowered.starts_with(prefix))
    {
        return None;
    }

    let joined = base.join(reference).ok()?;
    finish(joined).ok()
}

fn finish(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    Ok(url)
}
