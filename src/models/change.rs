use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Added,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSegment {
    #[serde(rename = "type")]
    pub kind: DiffKind,
    pub text: String,
}

/// A detected change, with the source's metadata copied as it was at detection time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub id: String,
    pub feed_id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub detected_at: DateTime<Utc>,
    pub diff: Vec<DiffSegment>,
    #[serde(default)]
    pub added: usize,
    #[serde(default)]
    pub removed: usize,
    pub summary: String,
}
