use crate::ConfigError;
use glob::Pattern;
use url::Url;

/// A compiled set of ignore patterns
///
/// Patterns use glob semantics (`*`, `?`, `[...]`) and are matched
/// case-sensitively against the whole URL string, so `*facebook.com/*`
/// matches any scheme, subdomain and path on that host. `*` crosses `/`.
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    patterns: Vec<Pattern>,
}

impl IgnoreSet {
    /// Compiles the given patterns, failing on the first invalid one
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p.as_ref()).map_err(|e| {
                    ConfigError::InvalidPattern(format!("'{}': {}", p.as_ref(), e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    /// Returns true if any pattern matches the URL
    ///
    /// The URL is expected to be fragment-free already. A pattern also
    /// matches when it matches the URL with its query removed, so
    /// `*.example.com/track/*` catches `/track/pixel.gif?id=1`.
    pub fn is_ignored(&self, url: &Url) -> bool {
        if self.patterns.is_empty() {
            return false;
        }

        if self.matches_str(url.as_str()) {
            return true;
        }

        if url.query().is_some() {
            let mut without_query = url.clone();
            without_query.set_query(None);
            return self.matches_str(without_query.as_str());
        }

        false
    }

    /// Matches a raw string against every pattern
    pub fn matches_str(&self, candidate: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(candidate))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
