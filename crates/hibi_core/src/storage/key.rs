//! Versioned storage keys: `<appName>_v<N>` for an app's entry list and
//! `<appName>.<record>_v<N>` for records stored next to it.
//!
//! # Invariants
//! - App and record names start with an ASCII alphanumeric and contain only
//!   `[A-Za-z0-9_-]`. A `.` therefore never appears in an app name, so no
//!   sibling key can equal another app's list key.
//! - Versions start at 1. A shape change bumps the version; the old key is
//!   abandoned, never migrated.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

const RECORD_SEPARATOR: char = '.';

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("valid name regex"));
static VERSIONED_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9][A-Za-z0-9_-]*)(?:\.([A-Za-z0-9][A-Za-z0-9_-]*))?_v([1-9][0-9]*)$")
        .expect("valid storage key regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageKeyError {
    InvalidAppName(String),
    InvalidRecordName(String),
    ZeroVersion,
    Malformed(String),
}

impl Display for StorageKeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAppName(name) => write!(
                f,
                "invalid app name `{name}`; expected [A-Za-z0-9] followed by [A-Za-z0-9_-]*"
            ),
            Self::InvalidRecordName(name) => write!(
                f,
                "invalid record name `{name}`; expected [A-Za-z0-9] followed by [A-Za-z0-9_-]*"
            ),
            Self::ZeroVersion => write!(f, "storage key version must be >= 1"),
            Self::Malformed(raw) => write!(f, "not a versioned storage key: `{raw}`"),
        }
    }
}

impl Error for StorageKeyError {}

/// Fixed key an app persists its record under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    app_name: String,
    record: Option<String>,
    version: u32,
}

impl StorageKey {
    pub fn new(app_name: impl Into<String>, version: u32) -> Result<Self, StorageKeyError> {
        let app_name = app_name.into();
        if !NAME_RE.is_match(&app_name) {
            return Err(StorageKeyError::InvalidAppName(app_name));
        }
        if version == 0 {
            return Err(StorageKeyError::ZeroVersion);
        }
        Ok(Self {
            app_name,
            record: None,
            version,
        })
    }

    /// Parses a raw `<appName>_v<N>` or `<appName>.<record>_v<N>` key.
    pub fn parse(raw: &str) -> Result<Self, StorageKeyError> {
        let captures = VERSIONED_KEY_RE
            .captures(raw)
            .ok_or_else(|| StorageKeyError::Malformed(raw.to_string()))?;
        let version = captures[3]
            .parse::<u32>()
            .map_err(|_| StorageKeyError::Malformed(raw.to_string()))?;
        let key = Self::new(&captures[1], version)?;
        match captures.get(2) {
            Some(record) => key.sibling(record.as_str(), version),
            None => Ok(key),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Record name of a sibling key; `None` for the entry list itself.
    pub fn record(&self) -> Option<&str> {
        self.record.as_deref()
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Key of a record owned by the same app, e.g. view preferences,
    /// versioned independently of the entry list.
    pub fn sibling(&self, record: &str, version: u32) -> Result<Self, StorageKeyError> {
        if !NAME_RE.is_match(record) {
            return Err(StorageKeyError::InvalidRecordName(record.to_string()));
        }
        if version == 0 {
            return Err(StorageKeyError::ZeroVersion);
        }
        Ok(Self {
            app_name: self.app_name.clone(),
            record: Some(record.to_string()),
            version,
        })
    }

    /// Whether `other` is an older version of the same app record.
    pub fn supersedes(&self, other: &StorageKey) -> bool {
        self.app_name == other.app_name && self.record == other.record && other.version < self.version
    }
}

impl Display for StorageKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.record {
            Some(record) => write!(
                f,
                "{}{}{}_v{}",
                self.app_name, RECORD_SEPARATOR, record, self.version
            ),
            None => write!(f, "{}_v{}", self.app_name, self.version),
        }
    }
}
