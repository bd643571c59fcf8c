/// Target state definitions for tracking crawl progress
///
/// This module defines every state a discovered URL can pass through.
use std::fmt;

/// Represents the current state of a crawl target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetState {
    // ===== Active States =====
    /// URL has been discovered but not yet examined
    Discovered,

    /// Content is being fetched or rendered
    Fetching,

    /// Content has been written to disk
    Saved,

    /// Asset references are being extracted from saved content
    ExtractingAssets,

    /// Links are being extracted from a saved page
    ExtractingLinks,

    // ===== Terminal States =====
    /// URL matched an ignore pattern or fell outside the crawl scope
    Ignored,

    /// URL was already claimed earlier in this crawl
    AlreadyVisited,

    /// Fetch, render or save failed; the URL is abandoned
    Failed,

    /// All work for this URL is finished
    Done,
}

impl TargetState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Ignored | Self::AlreadyVisited | Self::Failed | Self::Done
        )
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    ///
    /// ```text
    /// Discovered -> Ignored | AlreadyVisited | Fetching
    /// Fetching   -> Saved | Failed
    /// Saved      -> ExtractingAssets | ExtractingLinks | Done
    /// ExtractingAssets -> ExtractingLinks | Done
    /// ExtractingLinks  -> Done
    /// ```
    pub fn can_transition_to(&self, next: TargetState) -> bool {
        use TargetState::*;

        matches!(
            (self, next),
            (Discovered, Ignored)
                | (Discovered, AlreadyVisited)
                | (Discovered, Fetching)
                | (Fetching, Saved)
                | (Fetching, Failed)
                | (Saved, ExtractingAssets)
                | (Saved, ExtractingLinks)
                | (Saved, Done)
                | (ExtractingAssets, ExtractingLinks)
                | (ExtractingAssets, Done)
                | (ExtractingLinks, Done)
        )
    }

    /// Short lowercase name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Fetching => "fetching",
            Self::Saved => "saved",
            Self::ExtractingAssets => "extracting_assets",
            Self::ExtractingLinks => "extracting_links",
            Self::Ignored => "ignored",
            Self::AlreadyVisited => "already_visited",
            Self::Failed => "failed",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
