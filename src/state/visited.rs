use std::collections::HashSet;
use url::Url;

/// The per-crawl record of URLs already claimed
///
/// Created at crawl start and discarded when the crawl ends. Entries are
/// only ever added. Keys are fragment-free URL strings, so `/a#x` and
/// `/a#y` share one entry.
#[derive(Debug, Default, Clone)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a URL, returning true if it was not yet present
    pub fn insert(&mut self, url: &Url) -> bool {
        self.urls.insert(dedup_key(url))
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.urls.contains(&dedup_key(url))
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }
}

fn dedup_key(url: &Url) -> String {
    if url.fragment().is_none() {
        return url.as_str().to_string();
    }

    let mut url = url.clone();
    url.set_fragment(None);
    url.into()
}
