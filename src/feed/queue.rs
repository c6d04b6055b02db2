use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::feed::registry::{slug_for, Registry};
use crate::models::{PendingSource, Source};

/// "Add source" requests collected outside the crawl pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingQueue {
    #[serde(default)]
    pub pending: Vec<PendingSource>,
}

#[derive(Debug, Default, PartialEq)]
pub struct MergeReport {
    pub added: Vec<String>,
    pub duplicates: Vec<String>,
}

impl PendingQueue {
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn push(
        &mut self,
        url: &str,
        title: Option<String>,
        selector: Option<String>,
        tags: BTreeSet<String>,
        requested_at: DateTime<Utc>,
    ) -> Result<&PendingSource> {
        let url = parse_http_url(url)?;
        if self.pending.iter().any(|p| p.url == url.as_str()) {
            return Err(AppError::DuplicateSource(url.to_string()));
        }

        self.pending.push(PendingSource {
            url: url.to_string(),
            title: title.filter(|t| !t.trim().is_empty()),
            selector: selector.filter(|s| !s.trim().is_empty()),
            tags,
            requested_at,
        });
        Ok(&self.pending[self.pending.len() - 1])
    }

    /// Move every queued request into `registry`, leaving the queue empty.
    pub fn merge_into(&mut self, registry: &mut Registry, now: DateTime<Utc>) -> MergeReport {
        let mut report = MergeReport::default();

        for pending in self.pending.drain(..) {
            let url = match parse_http_url(&pending.url) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!("Dropping queued source: {}", e);
                    continue;
                }
            };

            if registry.contains_url(url.as_str()) {
                tracing::info!("{} is already registered", url);
                report.duplicates.push(url.to_string());
                continue;
            }

            let id = registry.unique_id(&slug_for(&url));
            let mut source = Source::new(id.clone(), url.to_string(), now);
            if let Some(title) = pending.title {
                source.title = title;
            }
            source.selector = pending.selector;
            source.tags = pending.tags;

            match registry.insert(source) {
                Ok(()) => report.added.push(id),
                Err(e) => {
                    tracing::warn!("Failed to register {}: {}", url, e);
                    report.duplicates.push(url.to_string());
                }
            }
        }

        report
    }
}

fn parse_http_url(raw: &str) -> Result<Url> {
    let invalid = |reason: String| AppError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn push_validates_urls() {
        let mut queue = PendingQueue::default();
        let now = Utc::now();

        assert!(matches!(
            queue.push("not a url", None, None, BTreeSet::new(), now),
            Err(AppError::InvalidUrl { .. })
        ));
        assert!(matches!(
            queue.push("ftp://example.com/", None, None, BTreeSet::new(), now),
            Err(AppError::InvalidUrl { .. })
        ));

        let queued = queue
            .push("https://example.com/news", Some(" ".to_string()), None, tags(&["news"]), now)
            .unwrap();
        assert_eq!(queued.url, "https://example.com/news");
        assert_eq!(queued.title, None);

        assert!(matches!(
            queue.push("https://example.com/news", None, None, BTreeSet::new(), now),
            Err(AppError::DuplicateSource(_))
        ));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn merge_registers_and_empties_queue() {
        let now = Utc::now();
        let mut registry = Registry::default();
        registry
            .insert(Source::new("example-com", "https://example.com/", now))
            .unwrap();

        let mut queue = PendingQueue::default();
        queue
            .push(
                "https://example.com/news",
                Some("Example News".to_string()),
                Some("#content".to_string()),
                tags(&["news"]),
                now,
            )
            .unwrap();
        queue
            .push("https://example.com", None, None, BTreeSet::new(), now)
            .unwrap();
        queue
            .push("https://www.example.com/", None, None, BTreeSet::new(), now)
            .unwrap();

        let report = queue.merge_into(&mut registry, now);

        assert!(queue.is_empty());
        assert_eq!(report.added, vec!["example-com-news", "example-com-2"]);
        assert_eq!(report.duplicates, vec!["https://example.com/"]);

        let news = registry.get("example-com-news").unwrap();
        assert_eq!(news.title, "Example News");
        assert_eq!(news.selector.as_deref(), Some("#content"));
        assert!(news.last_checked.is_none());
        assert!(registry.tags.contains("news"));

        let www = registry.get("example-com-2").unwrap();
        assert_eq!(www.title, "https://www.example.com/");
    }
}
