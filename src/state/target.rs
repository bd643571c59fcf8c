use url::Url;

/// How a crawl target is handled once fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// HTML page: rendered, saved, scanned for assets and links
    Page,

    /// Static resource referenced by a page or stylesheet
    Asset,

    /// Non-HTML document linked to directly; saved as a leaf
    FileDownload,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Asset => "asset",
            Self::FileDownload => "file",
        }
    }
}

/// Where a crawl target was discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Discovery {
    /// The crawl's starting URL
    Seed,

    /// An `<a href>` on a crawled page
    Link,

    /// An asset reference in markup or CSS
    Reference,
}

/// A URL plus its classification, fixed for the crawl pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    pub url: Url,
    pub kind: TargetKind,
    pub discovery: Discovery,
}

impl CrawlTarget {
    pub fn new(url: Url, kind: TargetKind, discovery: Discovery) -> Self {
        Self {
            url,
            kind,
            discovery,
        }
    }
}
