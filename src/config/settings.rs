//! TOML-based configuration for jsonview.
//!
//! Supplies defaults for the `compile` command. Command-line flags override
//! anything set here.
//!
//! Example configuration:
//! ```toml
//! [compile]
//! encoding = "jsonb"
//! indexes = true
//! replace = true
//! drop_existing_indexes = false
//! use_materialized_view = true
//! extract_date_parts = ["year", "month"]
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::compile::CompileOptions;
use crate::schema::{DatePart, Encoding};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "JSONVIEW_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Defaults for `jsonview compile`.
    pub compile: CompileSettings,
}

/// The `[compile]` section.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CompileSettings {
    /// Storage type of the document column.
    pub encoding: Encoding,

    pub indexes: bool,

    pub replace: bool,

    #[serde(alias = "dropExistingIndexes")]
    pub drop_existing_indexes: bool,

    #[serde(alias = "useMaterializedView")]
    pub use_materialized_view: bool,

    #[serde(alias = "extractDateParts")]
    pub extract_date_parts: Vec<DatePart>,
}

impl Default for CompileSettings {
    fn default() -> Self {
        let options = CompileOptions::default();
        Self {
            encoding: Encoding::default(),
            indexes: options.indexes,
            replace: options.replace,
            drop_existing_indexes: options.drop_existing_indexes,
            use_materialized_view: options.use_materialized_view,
            extract_date_parts: options.extract_date_parts,
        }
    }
}

impl CompileSettings {
    /// Compile options carried by this section.
    pub fn to_options(&self) -> CompileOptions {
        CompileOptions::default()
            .with_indexes(self.indexes)
            .with_replace(self.replace)
            .with_drop_existing_indexes(self.drop_existing_indexes)
            .with_materialized_view(self.use_materialized_view)
            .with_date_parts(self.extract_date_parts.iter().copied())
    }
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `JSONVIEW_CONFIG`
    /// 2. `./jsonview.toml`
    /// 3. `~/.config/jsonview/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        match Self::locate() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading settings");
                Self::from_file(&path)
            }
            None => Ok(Settings::default()),
        }
    }

    /// First config file that applies, if any.
    ///
    /// A path named by the environment variable is returned even if it does
    /// not exist, so that loading reports it.
    pub fn locate() -> Option<PathBuf> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }

        let local_config = PathBuf::from("jsonview.toml");
        if local_config.exists() {
            return Some(local_config);
        }

        let user_config = dirs::config_dir()?.join("jsonview").join("config.toml");
        user_config.exists().then_some(user_config)
    }
}
