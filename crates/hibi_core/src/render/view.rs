//! Entry list projection into HTML markup.
//!
//! # Invariants
//! - Rendering only reads the list; the same input gives byte-identical output.
//! - Every user-supplied string passes through `escape_html`.

use super::escape::escape_html;
use super::format::{format_clock_time, format_date, format_duration};
use crate::model::entry::Entry;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::str::FromStr;

const EMPTY_LABEL: &str = "まだ記録がありません";
const UNKNOWN_DATE: &str = "----/--/--";

/// Active filter tab.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum Filter {
    #[default]
    All,
    /// Entries not yet marked done.
    Active,
    Done,
    Category(String),
}

impl Filter {
    pub fn matches(&self, entry: &Entry) -> bool {
        match self {
            Self::All => true,
            Self::Active => !entry.done,
            Self::Done => entry.done,
            Self::Category(name) => entry.category.as_deref() == Some(name.as_str()),
        }
    }

    fn label(&self) -> &str {
        match self {
            Self::All => "すべて",
            Self::Active => "未完了",
            Self::Done => "完了",
            Self::Category(name) => name.as_str(),
        }
    }

    fn slug(&self) -> String {
        match self {
            Self::All => "all".to_string(),
            Self::Active => "active".to_string(),
            Self::Done => "done".to_string(),
            Self::Category(name) => format!("category:{name}"),
        }
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        match trimmed {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "done" => Ok(Self::Done),
            other => match other.strip_prefix("category:") {
                Some(name) if !name.trim().is_empty() => Ok(Self::Category(name.trim().to_string())),
                _ => Err(format!(
                    "unsupported filter `{other}`; expected all|active|done|category:NAME"
                )),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// List order as stored.
    #[default]
    Insertion,
    /// `created_at` descending; ties keep list order.
    NewestFirst,
}

/// Transient UI state that is not part of the entry list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub filter: Filter,
    pub sort_order: SortOrder,
    /// Inline message shown after rejected input.
    pub cue: Option<String>,
}

/// Renders entry lists with dates in a fixed UTC offset.
#[derive(Debug, Clone)]
pub struct Renderer {
    app_name: String,
    offset: FixedOffset,
}

impl Renderer {
    pub fn new(app_name: impl Into<String>, offset: FixedOffset) -> Self {
        Self {
            app_name: app_name.into(),
            offset,
        }
    }

    pub fn offset(&self) -> &FixedOffset {
        &self.offset
    }

    /// Entries that pass the filter, in display order. Pinned entries lead.
    pub fn visible<'a>(&self, entries: &'a [Entry], state: &ViewState) -> Vec<&'a Entry> {
        let mut visible: Vec<&Entry> = entries
            .iter()
            .filter(|entry| state.filter.matches(entry))
            .collect();
        if state.sort_order == SortOrder::NewestFirst {
            visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        visible.sort_by_key(|entry| !entry.pinned);
        visible
    }

    pub fn render(&self, entries: &[Entry], state: &ViewState) -> String {
        let mut html = String::new();
        let _ = writeln!(
            html,
            "<section class=\"hibi-app\" data-app=\"{}\">",
            escape_html(&self.app_name)
        );

        if let Some(cue) = &state.cue {
            let _ = writeln!(
                html,
                "<p class=\"input-cue\" role=\"alert\">{}</p>",
                escape_html(cue)
            );
        }

        self.render_tabs(&mut html, entries, &state.filter);

        let visible = self.visible(entries, state);
        html.push_str("<ul class=\"entries\">\n");
        if visible.is_empty() {
            let _ = writeln!(html, "<li class=\"entry empty\">{EMPTY_LABEL}</li>");
        }
        for entry in &visible {
            self.render_entry(&mut html, entry);
        }
        html.push_str("</ul>\n");

        let done = entries.iter().filter(|entry| entry.done).count();
        let _ = writeln!(
            html,
            "<p class=\"summary\">{} / {}件 (完了 {done})</p>",
            visible.len(),
            entries.len()
        );
        html.push_str("</section>\n");
        html
    }

    fn render_tabs(&self, html: &mut String, entries: &[Entry], active: &Filter) {
        let categories: BTreeSet<&str> = entries
            .iter()
            .filter_map(|entry| entry.category.as_deref())
            .collect();
        let mut tabs = vec![Filter::All, Filter::Active, Filter::Done];
        tabs.extend(
            categories
                .into_iter()
                .map(|name| Filter::Category(name.to_string())),
        );
        if !tabs.contains(active) {
            tabs.push(active.clone());
        }

        html.push_str("<nav class=\"filters\">\n");
        for tab in &tabs {
            let current = if tab == active {
                " aria-current=\"true\""
            } else {
                ""
            };
            let _ = writeln!(
                html,
                "<a class=\"filter\" data-filter=\"{}\"{current}>{}</a>",
                escape_html(&tab.slug()),
                escape_html(tab.label())
            );
        }
        html.push_str("</nav>\n");
    }

    fn render_entry(&self, html: &mut String, entry: &Entry) {
        let mut classes = String::from("entry");
        if entry.done {
            classes.push_str(" done");
        }
        if entry.pinned {
            classes.push_str(" pinned");
        }

        let date = format_date(entry.created_at, &self.offset);
        let _ = write!(
            html,
            "<li class=\"{classes}\" data-id=\"{}\"><time>{}</time>",
            escape_html(entry.id.as_str()),
            date.as_deref().unwrap_or(UNKNOWN_DATE)
        );
        if let Some(category) = &entry.category {
            let _ = write!(
                html,
                "<span class=\"category\">{}</span>",
                escape_html(category)
            );
        }
        let _ = write!(
            html,
            "<span class=\"text\">{}</span>",
            escape_html(&entry.text)
        );
        if let (Some(start), Some(duration)) = (entry.started_at, entry.duration_ms()) {
            let started = format_clock_time(start, &self.offset);
            let _ = write!(
                html,
                "<span class=\"duration\" data-start=\"{}\">{}</span>",
                started.as_deref().unwrap_or("--:--"),
                format_duration(duration)
            );
        }
        html.push_str("</li>\n");
    }
}

#[cfg(test)]
mod tests {
    use super::{Filter, Renderer, SortOrder, ViewState};
    use crate::model::entry::{Entry, EntryFields, EntryId};
    use chrono::FixedOffset;

    fn renderer() -> Renderer {
        Renderer::new("todo", FixedOffset::east_opt(9 * 3600).expect("offset"))
    }

    fn entry(id: &str, created_at: i64, text: &str) -> Entry {
        Entry::from_fields(EntryId::new(id), created_at, EntryFields::text(text))
    }

    #[test]
    fn filter_parses_known_values() {
        assert_eq!("done".parse::<Filter>(), Ok(Filter::Done));
        assert_eq!(
            "category: mood ".parse::<Filter>(),
            Ok(Filter::Category("mood".to_string()))
        );
        assert!("category:".parse::<Filter>().is_err());
        assert!("weekly".parse::<Filter>().is_err());
    }

    #[test]
    fn newest_first_sorts_by_created_at_and_pins_lead() {
        let mut pinned_old = entry("a", 1, "old pinned");
        pinned_old.pinned = true;
        let entries = vec![pinned_old, entry("b", 2, "mid"), entry("c", 3, "new")];
        let state = ViewState {
            sort_order: SortOrder::NewestFirst,
            ..ViewState::default()
        };

        let ids: Vec<_> = renderer()
            .visible(&entries, &state)
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "c", "b"]);
    }

    #[test]
    fn empty_list_renders_placeholder() {
        let html = renderer().render(&[], &ViewState::default());
        assert!(html.contains("class=\"entry empty\""));
        assert!(html.contains("0 / 0件"));
    }

    #[test]
    fn cue_and_text_are_escaped() {
        let entries = vec![entry("x", 0, "<b>bold</b>")];
        let state = ViewState {
            cue: Some("<oops>".to_string()),
            ..ViewState::default()
        };
        let html = renderer().render(&entries, &state);
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(html.contains("&lt;oops&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn category_tabs_come_from_entries() {
        let mut a = entry("a", 0, "a");
        a.category = Some("mood".to_string());
        let state = ViewState {
            filter: Filter::Category("mood".to_string()),
            ..ViewState::default()
        };
        let html = renderer().render(&[a], &state);
        assert!(html.contains("data-filter=\"category:mood\" aria-current=\"true\""));
    }
}
