//! Pure projection from entry lists to visible markup.
//!
//! # Responsibility
//! - Escape user text and format dates/durations.
//! - Apply filter and sort UI state without touching the store.

pub mod escape;
pub mod format;
pub mod view;

pub use escape::escape_html;
pub use format::{format_clock_time, format_date, format_duration};
pub use view::{Filter, Renderer, SortOrder, ViewState};
