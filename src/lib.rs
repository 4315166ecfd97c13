//! Archivist - a personal media-archival utility
//!
//! This library provides functionality for long-term curation of photo
//! and video collections:
//! - canonical timestamp-based renaming (digital and film workflows)
//! - layered capture-date resolution from metadata, filenames, and
//!   filesystem timestamps
//! - caption burn-in for images and videos
//! - metadata export/import over CSV and JSON
//! - restructuring a library into a decade/year/month-or-event hierarchy

pub mod classify;
pub mod cli;
pub mod config;
pub mod date;
pub mod error;
pub mod media;
pub mod menu;
pub mod metadata;
pub mod naming;
pub mod os;
pub mod overlay;
pub mod rename;
pub mod restructure;

pub use cli::Cli;
pub use config::{CategoryFilter, Config, ConfigError, MediaKind};
pub use error::{Error, Result};
pub use menu::Menu;
