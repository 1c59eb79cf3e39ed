//! Store configuration.
//!
//! # Responsibility
//! - Hold tunables shared by the note repository and the file store.
//! - Parse optional JSON overrides supplied by the host application.
//!
//! # Invariants
//! - A validated config has a non-blank storage key and notes directory name
//!   and a non-zero canvas.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_STORAGE_KEY: &str = "notes";
pub const DEFAULT_NOTES_DIR_NAME: &str = "notes";
pub const DEFAULT_CANVAS_SIZE: u32 = 500;

/// What `load_all` does when the stored collection cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptDataPolicy {
    /// Log and report an empty collection.
    Discard,
    /// Copy the raw value to `<storage_key>.corrupt`, then report empty.
    #[default]
    Backup,
    /// Surface the decode failure to the caller.
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Preference key holding the whole note collection.
    pub storage_key: String,
    pub corrupt_data_policy: CorruptDataPolicy,
    /// Subdirectory of the app-private base directory for attachment files.
    pub notes_dir_name: String,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            corrupt_data_policy: CorruptDataPolicy::default(),
            notes_dir_name: DEFAULT_NOTES_DIR_NAME.to_string(),
            canvas_width: DEFAULT_CANVAS_SIZE,
            canvas_height: DEFAULT_CANVAS_SIZE,
        }
    }
}

impl StoreConfig {
    /// Parses a JSON object; missing fields take their defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid("storage_key cannot be empty"));
        }
        let dir_name = self.notes_dir_name.trim();
        if dir_name.is_empty() {
            return Err(ConfigError::Invalid("notes_dir_name cannot be empty"));
        }
        if dir_name.contains(['/', '\\']) || dir_name == "." || dir_name == ".." {
            return Err(ConfigError::Invalid(
                "notes_dir_name must be a single path component",
            ));
        }
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(ConfigError::Invalid("canvas dimensions must be non-zero"));
        }
        Ok(())
    }

    /// Preference key used to keep an undecodable collection around.
    pub fn corrupt_backup_key(&self) -> String {
        format!("{}.corrupt", self.storage_key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
    Invalid(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "invalid store config: {message}"),
            Self::Invalid(message) => write!(f, "invalid store config: {message}"),
        }
    }
}

impl Error for ConfigError {}
