//! Configuration module for Sumi-Mirror
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every section and key has a default, so an empty file
//! (or no file at all) yields a usable configuration.
//!
//! # Example
//!
//! ```no_run
//! use sumi_mirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mirror.toml")).unwrap();
//! println!("Mirroring into: {}", config.mirror.output_dir.display());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, FetchConfig, IgnoreConfig, MirrorConfig, DEFAULT_IGNORE_PATTERNS, DEFAULT_OUTPUT_DIR,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::{validate, validate_seed_url};
