//! Configuration management for clipmix.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Validation on load with automatic defaults
//!
//! Everything that used to be a fixed constant (directories, extensions,
//! fade lengths, encoder names) lives here and is passed to the pipeline
//! through its `Context`.
//!
//! # Example
//!
//! ```no_run
//! use clipmix_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new(".config/clipmix.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Music folder: {}", config.settings().music_dir().display());
//!
//! config.settings_mut().paths.project_root = "/videos/training".to_string();
//! config.update_section(ConfigSection::Paths).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, EncodingSettings, FadeSettings, LoggingSettings, MediaSettings, PathSettings,
    Settings,
};
