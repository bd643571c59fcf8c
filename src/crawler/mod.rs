//! Crawler module for mirroring a site
//!
//! This module contains the core mirroring logic, including:
//! - Raw HTTP fetching and redirect probes
//! - Page rendering (headless Chrome or plain HTTP)
//! - HTML and CSS reference extraction
//! - The depth-first frontier
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod render;

pub use coordinator::{mirror_site, Coordinator};
pub use fetcher::{build_http_client, FetchedContent, HttpFetcher, ProbeResult};
pub use frontier::Frontier;
pub use parser::{extract_asset_urls, extract_css_asset_urls, extract_links, parse_html, ParsedPage};
pub use render::{ChromeRenderer, HttpRenderer, PageRenderer};
