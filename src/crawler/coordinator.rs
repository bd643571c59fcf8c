//! Crawler coordinator - main mirror orchestration logic
//!
//! This module contains the crawl loop that ties the rest of the crate
//! together:
//! - Claiming discovered URLs in the visited set
//! - Driving the depth-first frontier
//! - Rendering pages and fetching assets
//! - Probing links for redirects
//! - Recording per-target outcomes
//!
//! Every target is claimed in the `VisitedSet` when it is pushed onto the
//! frontier, so a URL discovered on several pages is queued exactly once.
//! Failures of individual targets are logged and counted; nothing inside the
//! loop aborts the crawl.

use crate::config::{validate, validate_seed_url, Config};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::{extract_css_asset_urls, parse_html};
use crate::crawler::render::{ChromeRenderer, HttpRenderer, PageRenderer};
use crate::crawler::{HttpFetcher, ProbeResult};
use crate::output::CrawlStatistics;
use crate::state::{CrawlTarget, Discovery, TargetKind, TargetState, VisitedSet};
use crate::storage::{open_storage, SaveOutcome, Storage};
use crate::url::{classify, is_file_download, is_same_domain, is_stylesheet, IgnoreSet};
use crate::MirrorError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use url::Url;

/// Main mirror coordinator structure
///
/// Owns everything a crawl run shares: the configuration, the visited set,
/// the frontier, the fetcher, the renderer and the storage backend.
pub struct Coordinator {
    config: Config,
    seed: Url,
    ignore: IgnoreSet,
    visited: VisitedSet,
    frontier: Frontier,
    fetcher: HttpFetcher,
    renderer: Box<dyn PageRenderer>,
    storage: Box<dyn Storage>,
    stats: CrawlStatistics,
    stop: Arc<AtomicBool>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Validates the configuration and seed, creates the output root, and
    /// launches the headless browser unless `mirror.render` is off.
    ///
    /// # Arguments
    ///
    /// * `config` - The mirror configuration
    /// * `seed` - URL the crawl starts from
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(MirrorError)` - Invalid config or seed, unwritable output
    ///   directory, or the browser failed to start
    pub async fn new(config: Config, seed: &str) -> Result<Self, MirrorError> {
        validate(&config)?;

        let fetcher = HttpFetcher::new(&config.fetch)?;
        let renderer: Box<dyn PageRenderer> = if config.mirror.render {
            tracing::debug!("Launching headless browser");
            Box::new(ChromeRenderer::launch(&config.fetch).await?)
        } else {
            Box::new(HttpRenderer::new(fetcher.clone()))
        };

        Self::with_renderer(config, seed, fetcher, renderer)
    }

    /// Creates a coordinator around an existing fetcher and renderer
    pub fn with_renderer(
        config: Config,
        seed: &str,
        fetcher: HttpFetcher,
        renderer: Box<dyn PageRenderer>,
    ) -> Result<Self, MirrorError> {
        let seed = validate_seed_url(seed)?;
        let ignore = IgnoreSet::new(&config.ignore.patterns)?;
        let storage = open_storage(&config.mirror.output_dir)?;

        tracing::debug!(
            "Loaded {} ignore patterns, writing to {}",
            ignore.len(),
            storage.root().display()
        );

        Ok(Self {
            stats: CrawlStatistics::new(seed.as_str()),
            config,
            seed,
            ignore,
            visited: VisitedSet::new(),
            frontier: Frontier::new(),
            fetcher,
            renderer,
            storage: Box::new(storage),
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Flag that stops the crawl before the next target when set
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Mirrors the seed URL, then releases the browser
    pub async fn run(&mut self) -> &CrawlStatistics {
        tracing::info!(
            "Mirroring {} into {}",
            self.seed,
            self.storage.root().display()
        );

        let seed = self.seed.clone();
        self.download(&seed).await;
        self.close().await;

        &self.stats
    }

    /// Downloads `url` and everything reachable from it
    ///
    /// Returns false without doing anything if the URL was already claimed
    /// by this crawl or matches an ignore pattern.
    pub async fn download(&mut self, url: &Url) -> bool {
        let mut url = url.clone();
        url.set_fragment(None);

        if self.visited.contains(&url) {
            tracing::debug!("{} already downloaded", url);
            return false;
        }

        if self.ignore.is_ignored(&url) {
            tracing::warn!("Skipping ignored URL {}", url);
            self.stats.record_state(TargetState::Ignored);
            return false;
        }

        let kind = kind_of(&url);
        self.visited.insert(&url);
        self.frontier.push(CrawlTarget::new(url, kind, Discovery::Seed));

        self.drain().await;
        true
    }

    /// Shuts the renderer down and logs the summary line
    pub async fn close(&mut self) {
        if let Err(e) = self.renderer.shutdown().await {
            tracing::warn!("Failed to close renderer: {}", e);
        }

        self.stats.finish();
        tracing::info!(
            "Downloaded all content: {} ({} downloads)",
            self.seed,
            self.stats.downloads()
        );
    }

    pub fn stats(&self) -> &CrawlStatistics {
        &self.stats
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    pub fn into_statistics(self) -> CrawlStatistics {
        self.stats
    }

    /// Processes targets until the frontier is empty or a stop is requested
    async fn drain(&mut self) {
        while let Some(target) = self.frontier.pop() {
            if self.stop.load(Ordering::SeqCst) {
                tracing::warn!(
                    "Interrupted, leaving {} queued targets",
                    self.frontier.len() + 1
                );
                self.stats.interrupted = true;
                self.frontier = Frontier::new();
                break;
            }

            let state = self.process(target).await;
            debug_assert!(state.is_terminal());
            self.stats.record_state(state);
        }
    }

    /// Runs one target to a terminal state
    async fn process(&mut self, target: CrawlTarget) -> TargetState {
        let target = if target.discovery == Discovery::Link && self.config.mirror.follow_redirects
        {
            match self.follow_redirect(target).await {
                Ok(target) => target,
                Err(state) => return state,
            }
        } else {
            target
        };

        tracing::debug!("Processing {} ({})", target.url, target.kind.as_str());

        match target.kind {
            TargetKind::Page => self.process_page(&target).await,
            TargetKind::Asset | TargetKind::FileDownload => self.process_asset(&target).await,
        }
    }

    /// Probes a link and swaps it for its redirect target when it has one
    ///
    /// The redirect target goes through the same scope checks as a link
    /// found on a page.
    async fn follow_redirect(&mut self, target: CrawlTarget) -> Result<CrawlTarget, TargetState> {
        match self.fetcher.probe(&target.url).await {
            ProbeResult::Success => Ok(target),
            ProbeResult::Redirect { location } if location == target.url => Ok(target),
            ProbeResult::Redirect { location } => {
                tracing::info!("Redirected to {} from {}", location, target.url);

                let classification = classify(&location, &self.seed, &self.ignore);
                if !classification.should_follow() {
                    tracing::debug!("Redirect target {} is out of scope", location);
                    return Err(TargetState::Ignored);
                }

                if !self.visited.insert(&location) {
                    tracing::debug!("Redirect target {} already downloaded", location);
                    return Err(TargetState::AlreadyVisited);
                }

                let kind = kind_of(&location);
                Ok(CrawlTarget::new(location, kind, Discovery::Link))
            }
            ProbeResult::HttpError { status_code } => {
                tracing::warn!("Skipping {}: HTTP {}", target.url, status_code);
                Err(TargetState::Failed)
            }
            ProbeResult::NetworkError { error } => {
                tracing::warn!("Skipping {}: {}", target.url, error);
                Err(TargetState::Failed)
            }
        }
    }

    /// Renders and saves a page, then queues its assets and links
    async fn process_page(&mut self, target: &CrawlTarget) -> TargetState {
        let mut state = TargetState::Discovered;
        advance(&mut state, TargetState::Fetching);

        tracing::info!("Scraping {}", target.url);
        let html = match self.renderer.render(&target.url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", target.url, e);
                advance(&mut state, TargetState::Failed);
                return state;
            }
        };

        if !self.save(target, html.as_bytes()) {
            advance(&mut state, TargetState::Failed);
            return state;
        }
        advance(&mut state, TargetState::Saved);

        let parsed = parse_html(&html, &target.url);
        let mut children = Vec::new();

        if self.config.mirror.include_assets {
            advance(&mut state, TargetState::ExtractingAssets);
            children.extend(
                parsed
                    .assets
                    .into_iter()
                    .filter_map(|url| self.claim_asset(url)),
            );
        }

        advance(&mut state, TargetState::ExtractingLinks);
        tracing::info!("Crawling links on {}", target.url);
        children.extend(
            parsed
                .links
                .into_iter()
                .filter_map(|url| self.claim_link(url)),
        );

        self.frontier.extend_in_order(children);
        advance(&mut state, TargetState::Done);
        state
    }

    /// Fetches and saves an asset or file download
    ///
    /// Stylesheets are scanned for further references, which are queued
    /// ahead of everything else.
    async fn process_asset(&mut self, target: &CrawlTarget) -> TargetState {
        let mut state = TargetState::Discovered;
        advance(&mut state, TargetState::Fetching);

        let content = match self.fetcher.fetch_raw(&target.url).await {
            Ok(content) => content,
            Err(MirrorError::Status { status, .. }) => {
                tracing::warn!("Download of {} cancelled: HTTP {}", target.url, status);
                advance(&mut state, TargetState::Failed);
                return state;
            }
            Err(e) => {
                tracing::error!("Failed to download {}: {}", target.url, e);
                advance(&mut state, TargetState::Failed);
                return state;
            }
        };

        if !self.save(target, &content.body) {
            advance(&mut state, TargetState::Failed);
            return state;
        }
        advance(&mut state, TargetState::Saved);
        tracing::info!("Downloaded {} {}", target.kind.as_str(), target.url);

        let is_css = content.is_css() || is_stylesheet(&target.url);
        if is_css && self.config.mirror.include_assets {
            advance(&mut state, TargetState::ExtractingAssets);

            let children: Vec<CrawlTarget> =
                extract_css_asset_urls(&content.text(), &content.final_url)
                    .into_iter()
                    .filter_map(|url| self.claim_asset(url))
                    .collect();

            tracing::debug!(
                "{} references {} new assets",
                target.url,
                children.len()
            );
            self.frontier.extend_in_order(children);
        }

        advance(&mut state, TargetState::Done);
        state
    }

    /// Writes content for a target; false if nothing usable ended up on disk
    fn save(&mut self, target: &CrawlTarget, content: &[u8]) -> bool {
        match self.storage.save(&target.url, content) {
            Ok(saved) => {
                match saved.outcome {
                    SaveOutcome::Written => self.stats.record_saved(target.kind),
                    SaveOutcome::AlreadyClaimed { owner } => {
                        tracing::debug!(
                            "{} maps to {}, already saved from {}",
                            target.url,
                            saved.path.display(),
                            owner
                        );
                        self.stats.record_collision();
                    }
                }
                true
            }
            Err(e) => {
                tracing::error!("Failed to save {}: {}", target.url, e);
                false
            }
        }
    }

    /// Claims an asset reference, returning a target if it should be fetched
    fn claim_asset(&mut self, url: Url) -> Option<CrawlTarget> {
        if self.ignore.is_ignored(&url) {
            tracing::debug!("Ignoring asset {}", url);
            self.stats.record_state(TargetState::Ignored);
            return None;
        }

        if self.config.mirror.same_domain_assets && !is_same_domain(&url, &self.seed) {
            tracing::debug!("Skipping off-site asset {}", url);
            self.stats.record_state(TargetState::Ignored);
            return None;
        }

        if !self.visited.insert(&url) {
            self.stats.record_state(TargetState::AlreadyVisited);
            return None;
        }

        Some(CrawlTarget::new(url, TargetKind::Asset, Discovery::Reference))
    }

    /// Claims a link, returning a target if it is in scope and new
    fn claim_link(&mut self, url: Url) -> Option<CrawlTarget> {
        let classification = classify(&url, &self.seed, &self.ignore);

        if !classification.should_follow() {
            tracing::debug!(
                "Not following {} (ignored: {}, same domain: {})",
                url,
                classification.ignored,
                classification.same_domain
            );
            self.stats.record_state(TargetState::Ignored);
            return None;
        }

        if !self.visited.insert(&url) {
            self.stats.record_state(TargetState::AlreadyVisited);
            return None;
        }

        tracing::info!("Found URL {}", url);
        let kind = if classification.file_download {
            TargetKind::FileDownload
        } else {
            TargetKind::Page
        };

        Some(CrawlTarget::new(url, kind, Discovery::Link))
    }
}

/// Mirrors `seed` with `config` and returns the crawl statistics
///
/// # Example
///
/// ```no_run
/// use sumi_mirror::{mirror_site, Config};
///
/// # async fn example() -> Result<(), sumi_mirror::MirrorError> {
/// let stats = mirror_site(Config::default(), "https://example.com/").await?;
/// println!("{} files", stats.downloads());
/// # Ok(())
/// # }
/// ```
pub async fn mirror_site(config: Config, seed: &str) -> Result<CrawlStatistics, MirrorError> {
    let mut coordinator = Coordinator::new(config, seed).await?;
    coordinator.run().await;
    Ok(coordinator.into_statistics())
}

fn kind_of(url: &Url) -> TargetKind {
    if is_file_download(url) {
        TargetKind::FileDownload
    } else {
        TargetKind::Page
    }
}

fn advance(state: &mut TargetState, next: TargetState) {
    debug_assert!(
        state.can_transition_to(next),
        "illegal transition {} -> {}",
        state,
        next
    );
    *state = next;
}
