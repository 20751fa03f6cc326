//! User input validation at the controller boundary.
//!
//! The store accepts any shape; everything a user types is checked here
//! first and rejected with a cue instead of reaching the list.

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    EmptyText,
    TextTooLong { max_chars: usize, actual: usize },
    InvalidTimeWindow { start: i64, stop: i64 },
    /// No unused id could be generated; the entry was not recorded.
    IdUnavailable,
}

impl InputError {
    /// Short inline message shown next to the form.
    pub fn cue(&self) -> String {
        match self {
            Self::EmptyText => "テキストを入力してください".to_string(),
            Self::TextTooLong { max_chars, .. } => {
                format!("{max_chars}文字以内で入力してください")
            }
            Self::InvalidTimeWindow { .. } => "終了時刻は開始時刻より後にしてください".to_string(),
            Self::IdUnavailable => "記録できませんでした。もう一度お試しください".to_string(),
        }
    }

    /// Stable code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyText => "empty_text",
            Self::TextTooLong { .. } => "text_too_long",
            Self::InvalidTimeWindow { .. } => "invalid_time_window",
            Self::IdUnavailable => "id_unavailable",
        }
    }
}

impl Display for InputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "text must not be empty"),
            Self::TextTooLong { max_chars, actual } => {
                write!(f, "text has {actual} chars; limit is {max_chars}")
            }
            Self::InvalidTimeWindow { start, stop } => {
                write!(f, "stop ({stop}) must be >= start ({start})")
            }
            Self::IdUnavailable => write!(f, "no unused entry id available"),
        }
    }
}

impl Error for InputError {}

/// Trims `raw` and checks it is non-empty and within `max_chars`.
pub fn validate_text(raw: &str, max_chars: usize) -> Result<String, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InputError::EmptyText);
    }
    let actual = trimmed.chars().count();
    if actual > max_chars {
        return Err(InputError::TextTooLong { max_chars, actual });
    }
    Ok(trimmed.to_string())
}

/// Blank categories mean "no category".
pub fn normalize_category(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub fn validate_window(start: Option<i64>, stop: Option<i64>) -> Result<(), InputError> {
    match (start, stop) {
        (Some(start), Some(stop)) if stop < start => {
            Err(InputError::InvalidTimeWindow { start, stop })
        }
        _ => Ok(()),
    }
}
