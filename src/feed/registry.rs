use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::Source;

/// The set of tracked sources plus every tag any of them carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub feeds: Vec<Source>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl Registry {
    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Source> {
        self.feeds.iter().find(|s| s.id == id)
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.feeds.iter().any(|s| same_url(&s.url, url))
    }

    pub fn insert(&mut self, source: Source) -> Result<()> {
        if self.get(&source.id).is_some() {
            return Err(AppError::DuplicateSource(source.id));
        }
        if self.contains_url(&source.url) {
            return Err(AppError::DuplicateSource(source.url));
        }
        self.tags.extend(source.tags.iter().cloned());
        self.feeds.push(source);
        Ok(())
    }

    /// Reject documents that list the same id twice.
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for source in &self.feeds {
            if !seen.insert(source.id.as_str()) {
                return Err(AppError::DuplicateSource(source.id.clone()));
            }
        }
        Ok(())
    }

    /// `base`, or `base-2`, `base-3`, … if already taken.
    pub fn unique_id(&self, base: &str) -> String {
        if self.get(base).is_none() {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{}-{}", base, n))
            .find(|id| self.get(id).is_none())
            .unwrap_or_else(|| base.to_string())
    }
}

/// Identifier derived from host and path, e.g. `example-com-news`.
pub fn slug_for(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    let host = host.strip_prefix("www.").unwrap_or(host);
    let raw = format!("{}{}", host, url.path());

    let mut slug = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }

    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "source".to_string()
    } else {
        slug.to_string()
    }
}

fn same_url(a: &str, b: &str) -> bool {
    match (Url::parse(a.trim()), Url::parse(b.trim())) {
        (Ok(a), Ok(b)) => a == b,
        _ => a.trim() == b.trim(),
    }
}
