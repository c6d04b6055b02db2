use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::changes::LineDiff;
use crate::models::{ChangeRecord, Source};

/// Newest-first ledger of detected changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    #[serde(default)]
    pub updates: Vec<ChangeRecord>,
}

impl History {
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn latest(&self) -> Option<&ChangeRecord> {
        self.updates.first()
    }

    /// Drop the oldest records beyond `limit`.
    pub fn enforce_limit(&mut self, limit: usize) {
        self.updates.truncate(limit);
    }

    /// Prepend `record` and drop whatever falls beyond `limit`.
    pub fn record(&mut self, mut record: ChangeRecord, limit: usize) {
        record.id = self.unique_id(&record.id);
        self.updates.insert(0, record);
        self.enforce_limit(limit);
    }

    fn unique_id(&self, base: &str) -> String {
        let taken = |id: &str| self.updates.iter().any(|r| r.id == id);
        if !taken(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{}-{}", base, n))
            .find(|id| !taken(id))
            .unwrap_or_else(|| base.to_string())
    }
}

/// Build the record for a change of `source` found at `detected_at`.
///
/// Counts and summary cover every segment; only the first `max_segments`
/// are kept for display.
pub fn change_record(
    source: &Source,
    diff: LineDiff,
    detected_at: DateTime<Utc>,
    max_segments: usize,
) -> ChangeRecord {
    let added = diff.added();
    let removed = diff.removed();
    let summary = diff.summary();
    let mut segments = diff.segments;
    segments.truncate(max_segments);

    ChangeRecord {
        id: format!("{}-{}", source.id, detected_at.timestamp_millis()),
        feed_id: source.id.clone(),
        title: source.title.clone(),
        url: source.url.clone(),
        tags: source.tags.clone(),
        detected_at,
        diff: segments,
        added,
        removed,
        summary,
    }
}
