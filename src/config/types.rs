use serde::Deserialize;
use std::path::PathBuf;

/// Output folder used when neither the config file nor the CLI names one
pub const DEFAULT_OUTPUT_DIR: &str = "downloaded_files";

/// Third-party and social domains skipped unless the ignore set is overridden
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "*adobe.com/*",
    "*.adobe.com/*",
    "*facebook.com/*",
    "*.facebook.com/*",
    "*twitter.com/*",
    "*.twitter.com/*",
    "*instagram.com/*",
    "*.instagram.com/*",
    "*linkedin.com/*",
    "*.linkedin.com/*",
    "*pinterest.com/*",
    "*.pinterest.com/*",
    "*youtube.com/*",
    "*.youtube.com/*",
    "*github.com/*",
    "*.github.com/*",
    "*codepen.io/*",
    "*.codepen.io/*",
    "*apple.com/*",
    "*.apple.com/*",
    "*google.com/*",
    "*.google.com/*",
];

/// Main configuration structure for Sumi-Mirror
///
/// This is the read-only crawl configuration passed through the whole crawl.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub mirror: MirrorConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub ignore: IgnoreConfig,
}

/// What gets mirrored and where it goes
#[derive(Debug, Clone, Deserialize)]
pub struct MirrorConfig {
    /// Root directory the mirrored hosts are written under
    #[serde(rename = "output-dir", default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Download images, stylesheets, scripts and CSS references of each page
    #[serde(rename = "include-assets", default = "default_true")]
    pub include_assets: bool,

    /// Probe discovered links and follow 3xx `Location` headers
    #[serde(rename = "follow-redirects", default = "default_true")]
    pub follow_redirects: bool,

    /// Render pages in a headless browser instead of a plain GET
    #[serde(default = "default_true")]
    pub render: bool,

    /// Restrict assets to the seed's network location as well as pages
    #[serde(rename = "same-domain-assets", default)]
    pub same_domain_assets: bool,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            include_assets: true,
            follow_redirects: true,
            render: true,
            same_domain_assets: false,
        }
    }
}

/// Network and browser behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Timeout for raw HTTP requests (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Time given to client-side scripts after page load (milliseconds)
    #[serde(rename = "settle-delay-ms", default = "default_settle_delay")]
    pub settle_delay_ms: u64,

    /// User-Agent header sent with raw HTTP requests
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Chrome/Chromium binary; auto-detected when unset
    #[serde(rename = "chrome-executable", default)]
    pub chrome_executable: Option<PathBuf>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            settle_delay_ms: default_settle_delay(),
            user_agent: default_user_agent(),
            chrome_executable: None,
        }
    }
}

/// Glob patterns matched against full URLs
#[derive(Debug, Clone, Deserialize)]
pub struct IgnoreConfig {
    #[serde(default = "default_ignore_patterns")]
    pub patterns: Vec<String>,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            patterns: default_ignore_patterns(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_true() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    10
}

fn default_settle_delay() -> u64 {
    3000
}

fn default_user_agent() -> String {
    format!("sumi-mirror/{}", env!("CARGO_PKG_VERSION"))
}

fn default_ignore_patterns() -> Vec<String> {
    DEFAULT_IGNORE_PATTERNS.iter().map(|p| p.to_string()).collect()
}
