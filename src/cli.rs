//! CLI argument parsing with clap
//!
//! The tool is menu-driven; the flags here configure the session
//! (config file, logging, tuning) before the menu takes over.

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Archivist - personal photo and video archival tool
///
/// Renames media into canonical timestamp names, burns date captions
/// into pixels, exports and re-imports metadata, and restructures a
/// library into a decade/year/event hierarchy. Operations are driven
/// through an interactive menu.
#[derive(Parser, Debug)]
#[command(name = "archivist")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file (TOML format)
    ///
    /// When specified, settings from the config file are used as
    /// defaults. CLI arguments override config file settings.
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Minimum file count for a suffix to earn its own event folder
    /// during restructuring
    #[arg(short = 'e', long)]
    pub event_threshold: Option<usize>,

    /// Number of threads for parallel file transfers (0 = auto)
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Write a sample configuration file to the given path and exit
    #[arg(long)]
    pub write_sample_config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output log format as JSON
    #[arg(long)]
    pub json_log: bool,
}

impl Cli {
    /// Get config file name (without extension) for log naming
    pub fn config_name(&self) -> Option<String> {
        self.config.as_ref().and_then(|p| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string())
        })
    }

    /// Merge CLI arguments with config from file.
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if let Some(threshold) = self.event_threshold {
            config.event_threshold = threshold;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        config
    }
}
