//! State module for tracking crawl progress
//!
//! This module provides the per-target state machine and the per-crawl
//! dedup record.
//!
//! # Components
//!
//! - `TargetState`: Tracks the lifecycle of one discovered URL
//! - `CrawlTarget` / `TargetKind`: A URL plus its page/asset/file classification
//! - `VisitedSet`: The URLs already claimed during the current crawl

mod target;
mod target_state;
mod visited;

// Re-export main types
pub use target::{CrawlTarget, Discovery, TargetKind};
pub use target_state::TargetState;
pub use visited::VisitedSet;
