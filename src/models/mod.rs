mod change;
mod source;

pub use change::{ChangeRecord, DiffKind, DiffSegment};
pub use source::{PendingSource, Source};
