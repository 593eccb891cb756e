//! Reads and writes `clipmix.toml`.
//!
//! The file is always replaced through a temp file and a rename. Saving a
//! single section goes through `toml_edit` so hand-written comments in the
//! other sections survive. A file with unknown tables or missing keys is
//! rewritten on load with the defaults filled in.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml_edit::{DocumentMut, Item};

use super::settings::{ConfigSection, Settings};

/// Config file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Failed to parse config for editing: {0}")]
    EditParseError(#[from] toml_edit::TomlError),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Owns the settings of one config file.
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

impl ConfigManager {
    /// Manager for `config_path`, holding defaults until loaded.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// In-memory edits; persisted by `save()` or `update_section()`.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Load an existing file. Missing file is an error.
    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }

        let content = fs::read_to_string(&self.config_path)?;
        self.settings = toml::from_str(&content)?;
        Ok(())
    }

    /// Load config from file, creating with defaults if it doesn't exist.
    ///
    /// Also validates and cleans up the config, saving if changes were made.
    pub fn load_or_create(&mut self) -> ConfigResult<()> {
        if self.config_path.exists() {
            let content = fs::read_to_string(&self.config_path)?;
            let (settings, was_modified) = self.parse_validate_and_clean(&content)?;
            self.settings = settings;

            if was_modified {
                tracing::debug!("Rewriting config {} with defaults", self.config_path.display());
                self.save()?;
            }
        } else {
            self.settings = Settings::default();
            self.save()?;
        }
        Ok(())
    }

    /// Ensure the logs directory exists.
    ///
    /// Should be called after `load_or_create()` and any overrides. The work
    /// directory lives inside the project and is left to the pipeline, which
    /// creates it only once the project directory has been validated.
    pub fn ensure_dirs_exist(&self) -> ConfigResult<()> {
        let logs = self.settings.logs_folder();
        if !logs.exists() {
            fs::create_dir_all(&logs)?;
        }
        Ok(())
    }

    /// Parse and validate config content.
    ///
    /// Returns the settings and whether the file differs from what would be
    /// written back (unknown sections, or fields filled from defaults).
    fn parse_validate_and_clean(&self, content: &str) -> ConfigResult<(Settings, bool)> {
        let doc: DocumentMut = content.parse()?;
        let settings: Settings = toml::from_str(content)?;

        let has_unknown = doc.iter().any(|(key, _)| {
            !ConfigSection::ALL
                .iter()
                .any(|section| section.table_name() == key)
        });

        let mut has_missing = false;
        for section in ConfigSection::ALL {
            let expected: DocumentMut = self.section_toml(&settings, section)?.parse()?;
            match doc.get(section.table_name()).and_then(|item| item.as_table()) {
                Some(table) => {
                    if expected.iter().any(|(key, _)| !table.contains_key(key)) {
                        has_missing = true;
                    }
                }
                None => has_missing = true,
            }
        }

        Ok((settings, has_unknown || has_missing))
    }

    /// Write every section, with the section comments.
    pub fn save(&self) -> ConfigResult<()> {
        let content = self.generate_config_with_comments()?;
        self.atomic_write(&content)?;
        Ok(())
    }

    /// Replace one table in the file on disk with the in-memory values.
    ///
    /// Other tables are left byte-for-byte as they were.
    pub fn update_section(&mut self, section: ConfigSection) -> ConfigResult<()> {
        let current_content = if self.config_path.exists() {
            fs::read_to_string(&self.config_path)?
        } else {
            String::new()
        };

        let mut doc: DocumentMut = if current_content.is_empty() {
            DocumentMut::new()
        } else {
            current_content.parse()?
        };

        let section_doc: DocumentMut = self.section_toml(&self.settings, section)?.parse()?;
        let section_table = section_doc.as_table().clone();

        doc[section.table_name()] = Item::Table(section_table);

        self.atomic_write(&doc.to_string())?;

        Ok(())
    }

    /// Serialize one section's fields (without the table header).
    fn section_toml(&self, settings: &Settings, section: ConfigSection) -> ConfigResult<String> {
        let text = match section {
            ConfigSection::Paths => toml::to_string_pretty(&settings.paths)?,
            ConfigSection::Media => toml::to_string_pretty(&settings.media)?,
            ConfigSection::Fades => toml::to_string_pretty(&settings.fades)?,
            ConfigSection::Encoding => toml::to_string_pretty(&settings.encoding)?,
            ConfigSection::Logging => toml::to_string_pretty(&settings.logging)?,
        };
        Ok(text)
    }

    fn generate_config_with_comments(&self) -> ConfigResult<String> {
        let mut output = String::new();

        output.push_str("# clipmix configuration\n");
        output.push_str(
            "# This file is auto-generated. Comments may be preserved on section updates.\n\n",
        );

        for (i, section) in ConfigSection::ALL.iter().enumerate() {
            if i > 0 {
                output.push('\n');
            }
            output.push_str(section.comment());
            output.push('\n');
            output.push_str(&format!("[{}]\n", section.table_name()));
            let content = self.section_toml(&self.settings, *section)?;
            for line in content.lines() {
                output.push_str(line);
                output.push('\n');
            }
        }

        Ok(output)
    }

    fn atomic_write(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Same directory, so the rename cannot cross filesystems
        let temp_path = self.config_path.with_extension("toml.tmp");

        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &self.config_path)?;

        Ok(())
    }
}
