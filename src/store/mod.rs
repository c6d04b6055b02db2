mod documents;
mod snapshot;

pub use documents::{load_document, save_document};
pub use snapshot::SnapshotStore;
