//! Page rendering
//!
//! Pages are captured as the DOM looks after client-side scripts ran. The
//! `ChromeRenderer` drives one headless Chrome for the whole crawl: it is
//! launched once, opens and closes a tab per page, and is shut down when the
//! crawl ends (or killed when dropped). `HttpRenderer` skips the browser and
//! returns the raw response body.

use crate::config::FetchConfig;
use crate::crawler::fetcher::HttpFetcher;
use crate::MirrorError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

/// Captures the HTML of a page
#[async_trait]
pub trait PageRenderer: Send {
    /// Returns the page's HTML as text
    async fn render(&mut self, url: &Url) -> Result<String, MirrorError>;

    /// Releases any resources held for the crawl
    async fn shutdown(&mut self) -> Result<(), MirrorError> {
        Ok(())
    }
}

/// Renders pages in a headless Chrome instance shared by the crawl
pub struct ChromeRenderer {
    browser: Browser,
    handler: JoinHandle<()>,
    settle_delay: Duration,
    closed: bool,
}

impl ChromeRenderer {
    /// Launches the browser and starts polling its event handler
    ///
    /// # Arguments
    ///
    /// * `config` - Timeout, settle delay and optional Chrome binary
    ///
    /// # Returns
    ///
    /// * `Ok(ChromeRenderer)` - Browser is up
    /// * `Err(MirrorError::Browser)` - Chrome could not be found or started
    pub async fn launch(config: &FetchConfig) -> Result<Self, MirrorError> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(Duration::from_secs(config.request_timeout_secs));

        if let Some(executable) = &config.chrome_executable {
            builder = builder.chrome_executable(executable);
        }

        let browser_config = builder.build().map_err(MirrorError::Browser)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| MirrorError::Browser(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                match event {
                    Ok(()) => {}
                    Err(CdpError::Ws(e)) => {
                        tracing::debug!("Browser connection closed: {}", e);
                        break;
                    }
                    Err(e) => tracing::trace!("Browser handler error: {}", e),
                }
            }
        });

        tracing::info!("Launched headless browser");

        Ok(Self {
            browser,
            handler,
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            closed: false,
        })
    }
}

impl ChromeRenderer {
    /// Closes any open tab still showing `url`
    async fn close_stray_tabs(&self, url: &Url) {
        let pages = match self.browser.pages().await {
            Ok(pages) => pages,
            Err(e) => {
                tracing::debug!("Failed to list tabs after {} failed: {}", url, e);
                return;
            }
        };

        for page in pages {
            let tab_url = page.url().await.ok().flatten();
            if !is_stray_tab(tab_url.as_deref(), url) {
                continue;
            }

            tracing::debug!("Closing tab left open by failed render of {}", url);
            if let Err(e) = page.close().await {
                tracing::debug!("Failed to close tab for {}: {}", url, e);
            }
        }
    }
}

/// Returns true if a tab at `tab_url` was opened for `requested`
fn is_stray_tab(tab_url: Option<&str>, requested: &Url) -> bool {
    let Some(tab_url) = tab_url else {
        return false;
    };

    match Url::parse(tab_url) {
        Ok(mut tab) => {
            tab.set_fragment(None);
            tab == *requested
        }
        Err(_) => false,
    }
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn render(&mut self, url: &Url) -> Result<String, MirrorError> {
        if self.closed {
            return Err(MirrorError::Browser("browser already shut down".to_string()));
        }

        let render_error = |e: CdpError| MirrorError::Render {
            url: url.to_string(),
            message: e.to_string(),
        };

        let page = match self.browser.new_page(url.as_str()).await {
            Ok(page) => page,
            Err(e) => {
                // Navigation can fail after the target was created
                self.close_stray_tabs(url).await;
                return Err(render_error(e));
            }
        };

        // Allow time for JavaScript to run
        tokio::time::sleep(self.settle_delay).await;

        let content = page.content().await.map_err(render_error);

        if let Err(e) = page.close().await {
            tracing::debug!("Failed to close tab for {}: {}", url, e);
        }

        content
    }

    async fn shutdown(&mut self) -> Result<(), MirrorError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Failed to reap browser process: {}", e);
        }
        self.handler.abort();

        closed
            .map(|_| ())
            .map_err(|e| MirrorError::Browser(e.to_string()))
    }
}

impl Drop for ChromeRenderer {
    fn drop(&mut self) {
        // Browser's own Drop kills a still-running child process
        self.handler.abort();
    }
}

/// Returns pages exactly as the server sent them
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    fetcher: HttpFetcher,
}

impl HttpRenderer {
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&mut self, url: &Url) -> Result<String, MirrorError> {
        let content = self.fetcher.fetch_raw(url).await?;
        Ok(content.text())
    }
}
