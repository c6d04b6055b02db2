use sha2::{Digest, Sha256};

use crate::store::SnapshotStore;

/// Hex-encoded SHA-256 of `text`.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    FirstSeen,
    Unchanged,
    Changed { previous: String },
}

pub fn classify(previous: Option<String>, current: &str) -> Detection {
    match previous {
        None => Detection::FirstSeen,
        Some(previous) if content_hash(&previous) == content_hash(current) => {
            Detection::Unchanged
        }
        Some(previous) => Detection::Changed { previous },
    }
}

/// Compares freshly extracted text against the stored snapshot.
pub struct ChangeDetector<'a> {
    snapshots: &'a SnapshotStore,
}

impl<'a> ChangeDetector<'a> {
    pub fn new(snapshots: &'a SnapshotStore) -> Self {
        Self { snapshots }
    }

    pub fn inspect(&self, source_id: &str, current: &str) -> Detection {
        let previous = match self.snapshots.read(source_id) {
            Ok(previous) => previous,
            Err(e) => {
                tracing::warn!(source = source_id, "Unreadable snapshot, treating as first seen: {}", e);
                None
            }
        };
        classify(previous, current)
    }
}
