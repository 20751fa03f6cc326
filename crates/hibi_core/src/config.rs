//! Per-app configuration.
//!
//! # Invariants
//! - A config that passes `validate` always yields a usable storage key and
//!   renderer offset.

use crate::render::view::SortOrder;
use crate::storage::key::{StorageKey, StorageKeyError};
use chrono::FixedOffset;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_APP_NAME: &str = "hibi";
pub const DEFAULT_SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_MAX_TEXT_CHARS: usize = 200;
/// Dates render in JST unless configured otherwise.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 9 * 60;
const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;

/// Where the store places newly added entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertPosition {
    #[default]
    Append,
    Prepend,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    StorageKey(StorageKeyError),
    ZeroTextLimit,
    UtcOffsetOutOfRange(i32),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageKey(err) => write!(f, "{err}"),
            Self::ZeroTextLimit => write!(f, "max_text_chars must be > 0"),
            Self::UtcOffsetOutOfRange(minutes) => write!(
                f,
                "utc offset {minutes} minutes is outside +/-{MAX_UTC_OFFSET_MINUTES}"
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageKey(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageKeyError> for ConfigError {
    fn from(value: StorageKeyError) -> Self {
        Self::StorageKey(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Names the app's storage key, e.g. `todo` -> `todo_v1`.
    pub app_name: String,
    /// Bumped whenever the persisted shape changes.
    pub schema_version: u32,
    pub insert_position: InsertPosition,
    pub sort_order: SortOrder,
    /// Longest accepted text, counted in chars.
    pub max_text_chars: usize,
    pub utc_offset_minutes: i32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            schema_version: DEFAULT_SCHEMA_VERSION,
            insert_position: InsertPosition::default(),
            sort_order: SortOrder::default(),
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
        }
    }
}

impl AppConfig {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.storage_key()?;
        if self.max_text_chars == 0 {
            return Err(ConfigError::ZeroTextLimit);
        }
        self.utc_offset()?;
        Ok(())
    }

    pub fn storage_key(&self) -> Result<StorageKey, StorageKeyError> {
        StorageKey::new(self.app_name.as_str(), self.schema_version)
    }

    /// Key of the view preferences record, versioned independently.
    pub fn prefs_key(&self) -> Result<StorageKey, StorageKeyError> {
        self.storage_key()?.sibling("prefs", 1)
    }

    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        if self.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ConfigError::UtcOffsetOutOfRange(self.utc_offset_minutes));
        }
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .ok_or(ConfigError::UtcOffsetOutOfRange(self.utc_offset_minutes))
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError};
    use crate::storage::key::StorageKeyError;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage_key().expect("key").to_string(), "hibi_v1");
        assert_eq!(config.prefs_key().expect("key").to_string(), "hibi.prefs_v1");
    }

    #[test]
    fn validate_reports_each_problem() {
        let mut config = AppConfig::new("bad name");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::StorageKey(StorageKeyError::InvalidAppName(_)))
        ));

        config.app_name = "todo".to_string();
        config.max_text_chars = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTextLimit));

        config.max_text_chars = 10;
        config.utc_offset_minutes = 20 * 60;
        assert_eq!(
            config.validate(),
            Err(ConfigError::UtcOffsetOutOfRange(1200))
        );
    }
}
