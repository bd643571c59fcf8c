//! HTTP fetcher implementation
//!
//! This module handles all raw HTTP requests for the mirror, including:
//! - Building HTTP clients with the configured user agent and timeout
//! - GET requests for assets and file downloads
//! - Redirect probes for discovered links
//! - Error classification

use crate::config::FetchConfig;
use crate::url::normalize_url;
use crate::MirrorError;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Maximum redirects followed by the content client
const MAX_REDIRECTS: usize = 10;

/// Content retrieved with a raw GET
#[derive(Debug, Clone)]
pub struct FetchedContent {
    /// Final URL after redirects
    pub final_url: Url,

    /// HTTP status code
    pub status_code: u16,

    /// Content-Type header value, if any
    pub content_type: Option<String>,

    /// Response body
    pub body: Vec<u8>,
}

impl FetchedContent {
    /// Returns true if the server labelled the body as CSS
    pub fn is_css(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.to_ascii_lowercase().contains("text/css"))
            .unwrap_or(false)
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Result of probing a discovered link before crawling it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    /// Link answered with a 2xx status
    Success,

    /// Link answered with a 3xx status and a usable `Location`
    Redirect {
        /// Absolute, fragment-free redirect target
        location: Url,
    },

    /// Link answered with a status that is neither success nor redirect
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetch configuration
/// * `redirect` - Redirect policy for this client
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use reqwest::redirect::Policy;
/// use sumi_mirror::config::FetchConfig;
/// use sumi_mirror::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default(), Policy::none()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig, redirect: Policy) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.request_timeout_secs);

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(redirect)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Raw HTTP access used for assets, file downloads and link probes
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    /// Follows redirects; used for content
    client: Client,

    /// Never follows redirects; used to detect them
    probe_client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, MirrorError> {
        let client = build_http_client(config, Policy::limited(MAX_REDIRECTS))?;
        let probe_client = build_http_client(config, Policy::none())?;

        Ok(Self {
            client,
            probe_client,
        })
    }

    /// Fetches a URL's bytes with a plain GET
    ///
    /// Any status outside 2xx is returned as `MirrorError::Status`.
    pub async fn fetch_raw(&self, url: &Url) -> Result<FetchedContent, MirrorError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MirrorError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(url, e))?
            .to_vec();

        Ok(FetchedContent {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
        })
    }

    /// Sends a GET without following redirects and reports what came back
    ///
    /// # Returns
    ///
    /// | Response                       | Result                  |
    /// |--------------------------------|-------------------------|
    /// | 2xx                            | `Success`               |
    /// | 3xx with a resolvable Location | `Redirect { location }` |
    /// | anything else                  | `HttpError`             |
    /// | transport failure              | `NetworkError`          |
    pub async fn probe(&self, url: &Url) -> ProbeResult {
        let response = match self.probe_client.get(url.as_str()).send().await {
            Ok(response) => response,
            Err(e) => {
                let error = if e.is_timeout() {
                    "Request timeout".to_string()
                } else if e.is_connect() {
                    "Connection refused".to_string()
                } else {
                    e.to_string()
                };
                return ProbeResult::NetworkError { error };
            }
        };

        let status = response.status();

        if status.is_success() {
            return ProbeResult::Success;
        }

        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|loc| url.join(loc).ok())
                .and_then(|joined| normalize_url(joined.as_str()).ok());

            if let Some(location) = location {
                return ProbeResult::Redirect { location };
            }
        }

        ProbeResult::HttpError {
            status_code: status.as_u16(),
        }
    }
}

fn classify_error(url: &Url, error: reqwest::Error) -> MirrorError {
    if error.is_timeout() {
        MirrorError::Timeout {
            url: url.to_string(),
        }
    } else {
        MirrorError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
