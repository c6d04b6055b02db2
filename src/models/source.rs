use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub id: String,
    pub url: String,
    pub title: String,
    /// CSS selector of the monitored region; `None` watches the whole document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_checked: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Source {
    pub fn new(id: impl Into<String>, url: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        let url = url.into();
        Self {
            id: id.into(),
            title: url.clone(),
            url,
            selector: None,
            tags: BTreeSet::new(),
            created_at,
            last_checked: None,
            last_updated: None,
        }
    }

    /// Selector with blank values treated as "whole document".
    pub fn effective_selector(&self) -> Option<&str> {
        self.selector
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Replace the title when the fetched one says more than the URL does.
    pub fn adopt_title(&mut self, fetched: Option<&str>) -> bool {
        let Some(title) = fetched.map(str::trim) else {
            return false;
        };
        if title.is_empty() || title == self.url || title == self.title {
            return false;
        }
        self.title = title.to_string();
        true
    }
}

/// An "add source" request waiting to be merged into the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSource {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub requested_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> Source {
        Source::new("example-com", "https://example.com/", Utc::now())
    }

    #[test]
    fn title_defaults_to_url() {
        let s = source();
        assert_eq!(s.title, "https://example.com/");
    }

    #[test]
    fn uninformative_titles_are_ignored() {
        let mut s = source();
        assert!(!s.adopt_title(None));
        assert!(!s.adopt_title(Some("   ")));
        assert!(!s.adopt_title(Some("https://example.com/")));
        assert_eq!(s.title, "https://example.com/");

        assert!(s.adopt_title(Some(" Example Domain ")));
        assert_eq!(s.title, "Example Domain");
    }

    #[test]
    fn blank_selector_means_whole_document() {
        let mut s = source();
        s.selector = Some("  ".to_string());
        assert_eq!(s.effective_selector(), None);
        s.selector = Some("#main".to_string());
        assert_eq!(s.effective_selector(), Some("#main"));
    }

    #[test]
    fn deserializes_without_optional_fields() {
        let json = r#"{
            "id": "a",
            "url": "https://a.test/",
            "title": "A",
            "createdAt": "2026-01-01T00:00:00Z"
        }"#;
        let s: Source = serde_json::from_str(json).unwrap();
        assert!(s.selector.is_none());
        assert!(s.tags.is_empty());
        assert!(s.last_checked.is_none());
        assert!(s.last_updated.is_none());
    }
}
