//! Sumi-Mirror main entry point
//!
//! This is the command-line interface for the Sumi-Mirror site downloader.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use sumi_mirror::config::{load_config, Config};
use sumi_mirror::output::print_statistics;
use sumi_mirror::Coordinator;
use tracing_subscriber::EnvFilter;

/// Sumi-Mirror: a single-host website mirror
///
/// Sumi-Mirror renders a page, saves it with its images, stylesheets and
/// scripts, and follows links on the same host until the reachable part of
/// the site is on disk.
#[derive(Parser, Debug)]
#[command(name = "sumi-mirror")]
#[command(version)]
#[command(about = "Mirror a website to local files", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download a site starting from URL
    Download(DownloadArgs),
}

#[derive(Args, Debug)]
struct DownloadArgs {
    /// Seed URL
    #[arg(value_name = "URL")]
    url: String,

    /// Download the images, stylesheets and scripts of each page
    #[arg(long, overrides_with = "no_assets")]
    assets: bool,

    /// Save pages only
    #[arg(long, overrides_with = "assets")]
    no_assets: bool,

    /// Follow redirects of discovered links
    #[arg(long, overrides_with = "no_follow")]
    follow: bool,

    /// Crawl links as found, without probing for redirects
    #[arg(long, overrides_with = "follow")]
    no_follow: bool,

    /// Render pages in headless Chrome
    #[arg(long, overrides_with = "no_render")]
    render: bool,

    /// Fetch pages with plain HTTP
    #[arg(long, overrides_with = "render")]
    no_render: bool,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Ignore patterns, replacing the defaults (none given clears them)
    #[arg(short, long, value_name = "PATTERN", num_args = 0..)]
    ignore: Option<Vec<String>>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl DownloadArgs {
    /// Applies command-line overrides on top of the loaded configuration
    fn apply(&self, config: &mut Config) {
        if let Some(value) = switch(self.assets, self.no_assets) {
            config.mirror.include_assets = value;
        }
        if let Some(value) = switch(self.follow, self.no_follow) {
            config.mirror.follow_redirects = value;
        }
        if let Some(value) = switch(self.render, self.no_render) {
            config.mirror.render = value;
        }
        if let Some(output) = &self.output {
            config.mirror.output_dir = output.clone();
        }
        if let Some(patterns) = &self.ignore {
            config.ignore.patterns = patterns.clone();
        }
    }
}

/// Exit status for a forced stop (128 + SIGINT)
const INTERRUPT_EXIT_CODE: i32 = 130;

/// What a Ctrl-C should do given the interrupts already seen
#[derive(Debug, PartialEq, Eq)]
enum Interrupt {
    Stop,
    ForceExit,
}

fn on_interrupt(stop: &AtomicBool) -> Interrupt {
    if stop.swap(true, Ordering::SeqCst) {
        Interrupt::ForceExit
    } else {
        Interrupt::Stop
    }
}

fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Download(args) => handle_download(args).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_mirror=info,warn"),
            1 => EnvFilter::new("sumi_mirror=debug,info"),
            2 => EnvFilter::new("sumi_mirror=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the download command
async fn handle_download(args: DownloadArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load {}", path.display()))?
        }
        None => Config::default(),
    };
    args.apply(&mut config);

    let mut coordinator = Coordinator::new(config, &args.url)
        .await
        .with_context(|| format!("failed to start mirroring {}", args.url))?;

    // First Ctrl-C finishes the current target, a second one exits at once
    let stop = coordinator.stop_handle();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            match on_interrupt(&stop) {
                Interrupt::Stop => {
                    tracing::warn!("Interrupt received, stopping after the current download")
                }
                Interrupt::ForceExit => {
                    tracing::error!("Second interrupt received, exiting");
                    std::process::exit(INTERRUPT_EXIT_CODE);
                }
            }
        }
    });

    let stats = coordinator.run().await;
    print_statistics(stats);

    Ok(())
}
