//! Statistics gathered during a crawl
//!
//! The coordinator records the terminal state of every target here; the
//! binary prints the result once the crawl ends or is interrupted.

use crate::state::{TargetKind, TargetState};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Seed URL the crawl started from
    pub seed: String,

    /// Files written, per target kind
    pub saved_by_kind: HashMap<TargetKind, u64>,

    /// Targets that reached each terminal state
    pub targets_by_state: HashMap<TargetState, u64>,

    /// Targets whose path was already owned by another URL
    pub path_collisions: u64,

    /// Whether the crawl was stopped by an interrupt
    pub interrupted: bool,

    started: Instant,
    finished: Option<Instant>,
}

impl CrawlStatistics {
    pub fn new(seed: &str) -> Self {
        Self {
            seed: seed.to_string(),
            saved_by_kind: HashMap::new(),
            targets_by_state: HashMap::new(),
            path_collisions: 0,
            interrupted: false,
            started: Instant::now(),
            finished: None,
        }
    }

    /// Records a file written for a target of `kind`
    pub fn record_saved(&mut self, kind: TargetKind) {
        *self.saved_by_kind.entry(kind).or_insert(0) += 1;
    }

    /// Records the terminal state a target reached
    pub fn record_state(&mut self, state: TargetState) {
        *self.targets_by_state.entry(state).or_insert(0) += 1;
    }

    pub fn record_collision(&mut self) {
        self.path_collisions += 1;
    }

    pub fn finish(&mut self) {
        self.finished.get_or_insert_with(Instant::now);
    }

    /// Total files written across all kinds
    pub fn downloads(&self) -> u64 {
        self.saved_by_kind.values().sum()
    }

    pub fn saved(&self, kind: TargetKind) -> u64 {
        self.saved_by_kind.get(&kind).copied().unwrap_or(0)
    }

    pub fn count(&self, state: TargetState) -> u64 {
        self.targets_by_state.get(&state).copied().unwrap_or(0)
    }

    pub fn elapsed(&self) -> Duration {
        self.finished.unwrap_or_else(Instant::now) - self.started
    }
}

/// Prints statistics to stdout in a human-readable format
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Mirror Statistics ===\n");

    println!("Seed: {}", stats.seed);
    println!("Elapsed: {:.1}s", stats.elapsed().as_secs_f64());
    if stats.interrupted {
        println!("Status: interrupted");
    }

    println!("\nFiles Saved: {}", stats.downloads());
    for kind in [TargetKind::Page, TargetKind::Asset, TargetKind::FileDownload] {
        println!("  {:<8} {}", kind.as_str(), stats.saved(kind));
    }

    println!("\nTargets by Outcome:");
    for state in [
        TargetState::Done,
        TargetState::Ignored,
        TargetState::AlreadyVisited,
        TargetState::Failed,
    ] {
        let count = stats.count(state);
        if count > 0 {
            println!("  {:<16} {}", state.as_str(), count);
        }
    }

    if stats.path_collisions > 0 {
        println!("\nPaths already claimed: {}", stats.path_collisions);
    }
}
