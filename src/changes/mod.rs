mod detector;
mod diff;
mod history;

pub use detector::{ChangeDetector, Detection};
pub use diff::{diff_lines, LineDiff};
pub use history::{change_record, History};
