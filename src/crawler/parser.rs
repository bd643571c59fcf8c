//! HTML and CSS parser for discovering assets and links
//!
//! This module handles parsing page markup and stylesheet text to extract:
//! - Asset references (`img`, `script`, resource `link`s, `srcset`)
//! - CSS `url(...)` and `@import` references, in files, `<style>` blocks
//!   and `style` attributes
//! - Links to crawl (from `<a>` tags)
//!
//! Every reference is resolved to an absolute, fragment-free http(s) URL and
//! returned once, in document order.

use crate::url::resolve_reference;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// `<link rel>` values that point at resources rather than documents
const ASSET_LINK_RELS: &[&str] = &[
    "stylesheet",
    "icon",
    "shortcut",
    "apple-touch-icon",
    "apple-touch-icon-precomposed",
    "mask-icon",
    "manifest",
    "preload",
    "modulepreload",
];

lazy_static! {
    static ref CSS_URL: Regex =
        Regex::new(r#"(?i)url\(\s*(?:"([^"]*)"|'([^']*)'|([^)"'\s]*))\s*\)"#).unwrap();
    static ref CSS_IMPORT: Regex = Regex::new(r#"(?i)@import\s+(?:"([^"]*)"|'([^']*)')"#).unwrap();
}

/// References discovered on one page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Static assets the page needs (absolute URLs)
    pub assets: Vec<Url>,

    /// Pages and files the page links to (absolute URLs)
    pub links: Vec<Url>,
}

/// Parses HTML content and extracts asset references and links
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `page_url` - The URL the HTML was loaded from
///
/// # Example
///
/// ```
/// use sumi_mirror::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<img src="/logo.png"><a href="/about">About</a>"#;
/// let page = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &page);
/// assert_eq!(parsed.assets[0].as_str(), "https://example.com/logo.png");
/// assert_eq!(parsed.links[0].as_str(), "https://example.com/about");
/// ```
pub fn parse_html(html: &str, page_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        assets: extract_asset_urls(&document, page_url),
        links: extract_links(&document, page_url),
    }
}

/// Extracts the asset URLs referenced by a parsed page
///
/// # Sources
///
/// | Element              | Attribute |
/// |----------------------|-----------|
/// | `img`, `script`      | `src`     |
/// | `link` (resource rel)| `href`    |
/// | `img`, `source`      | `srcset`  |
/// | `<style>` text       | CSS refs  |
/// | any element          | `style`   |
pub fn extract_asset_urls(document: &Html, page_url: &Url) -> Vec<Url> {
    let base = document_base(document, page_url);
    let mut found = Collector::default();

    for (selector, attr) in [("img[src]", "src"), ("script[src]", "src")] {
        for element in select(document, selector) {
            if let Some(value) = element.value().attr(attr) {
                found.push(resolve_reference(value, &base));
            }
        }
    }

    for element in select(document, "link[href]") {
        if is_asset_link(&element) {
            if let Some(href) = element.value().attr("href") {
                found.push(resolve_reference(href, &base));
            }
        }
    }

    for element in select(document, "img[srcset], source[srcset]") {
        if let Some(srcset) = element.value().attr("srcset") {
            for candidate in srcset_urls(srcset) {
                found.push(resolve_reference(candidate, &base));
            }
        }
    }

    for element in select(document, "style") {
        let css: String = element.text().collect();
        for url in extract_css_asset_urls(&css, &base) {
            found.push(Some(url));
        }
    }

    for element in select(document, "[style]") {
        if let Some(style) = element.value().attr("style") {
            for url in extract_css_asset_urls(style, &base) {
                found.push(Some(url));
            }
        }
    }

    found.into_urls()
}

/// Extracts the `<a href>` targets of a parsed page
///
/// Fragment-only hrefs and `javascript:`/`mailto:`/`tel:`/`data:` links are
/// dropped. Links with a `download` attribute are kept: they are file
/// downloads, which the mirror saves.
pub fn extract_links(document: &Html, page_url: &Url) -> Vec<Url> {
    let base = document_base(document, page_url);
    let mut found = Collector::default();

    for element in select(document, "a[href]") {
        if let Some(href) = element.value().attr("href") {
            found.push(resolve_reference(href, &base));
        }
    }

    found.into_urls()
}

/// Scans CSS text for `url(...)` and `@import` references
///
/// Quoted and unquoted forms are both recognized. References resolve against
/// `base_url`, which for a stylesheet file is the stylesheet's own URL.
///
/// ```
/// use sumi_mirror::crawler::extract_css_asset_urls;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/css/site.css").unwrap();
/// let urls = extract_css_asset_urls("@font-face { src: url('fonts/a.woff') }", &base);
/// assert_eq!(urls[0].as_str(), "https://example.com/css/fonts/a.woff");
/// ```
pub fn extract_css_asset_urls(css: &str, base_url: &Url) -> Vec<Url> {
    let mut found = Collector::default();

    for regex in [&*CSS_IMPORT, &*CSS_URL] {
        for captures in regex.captures_iter(css) {
            let reference = captures
                .iter()
                .skip(1)
                .flatten()
                .next()
                .map(|m| m.as_str());

            if let Some(reference) = reference {
                found.push(resolve_reference(reference, base_url));
            }
        }
    }

    found.into_urls()
}

/// Returns the `<base href>` of the document, or the page URL
fn document_base(document: &Html, page_url: &Url) -> Url {
    select(document, "base[href]")
        .next()
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| page_url.join(href.trim()).ok())
        .filter(|url| url.scheme() == "http" || url.scheme() == "https")
        .unwrap_or_else(|| page_url.clone())
}

fn is_asset_link(element: &ElementRef) -> bool {
    let rel = element.value().attr("rel").unwrap_or("").to_ascii_lowercase();
    rel.split_ascii_whitespace()
        .any(|token| ASSET_LINK_RELS.contains(&token))
}

/// Splits a `srcset` into its candidate URLs
fn srcset_urls(srcset: &str) -> impl Iterator<Item = &str> {
    srcset
        .split(',')
        .filter_map(|candidate| candidate.split_ascii_whitespace().next())
}

fn select<'a>(document: &'a Html, selector: &str) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    let parsed = Selector::parse(selector).ok();
    let elements: Vec<ElementRef<'a>> = match parsed {
        Some(selector) => document.select(&selector).collect(),
        None => Vec::new(),
    };
    elements.into_iter()
}

/// Order-preserving, duplicate-free list of resolved URLs
#[derive(Default)]
struct Collector {
    seen: HashSet<String>,
    urls: Vec<Url>,
}

impl Collector {
    fn push(&mut self, url: Option<Url>) {
        if let Some(url) = url {
            if self.seen.insert(url.as_str().to_string()) {
                self.urls.push(url);
            }
        }
    }

    fn into_urls(self) -> Vec<Url> {
        self.urls
    }
}
