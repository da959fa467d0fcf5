//! Configuration module for jsonview.
//!
//! Handles the TOML settings file that supplies compile defaults.

mod settings;

pub use settings::{CompileSettings, Settings, SettingsError, CONFIG_ENV_VAR};
