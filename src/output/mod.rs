//! Output module for reporting crawl results
//!
//! This module handles:
//! - Recording per-target outcomes during the crawl
//! - Printing the final statistics summary

pub mod stats;

pub use stats::{print_statistics, CrawlStatistics};
