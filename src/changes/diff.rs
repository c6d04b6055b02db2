use similar::{ChangeTag, TextDiff};

use crate::models::{DiffKind, DiffSegment};

/// Added/removed runs of lines between two texts, in diff order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineDiff {
    pub segments: Vec<DiffSegment>,
}

impl LineDiff {
    pub fn added(&self) -> usize {
        self.count(DiffKind::Added)
    }

    pub fn removed(&self) -> usize {
        self.count(DiffKind::Removed)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn summary(&self) -> String {
        format!("+{}件 / -{}件", self.added(), self.removed())
    }

    fn count(&self, kind: DiffKind) -> usize {
        self.segments.iter().filter(|s| s.kind == kind).count()
    }
}

/// Line diff of `old` against `new`. Consecutive lines of the same kind are
/// merged into one segment whose text is cut to `max_chars` characters.
pub fn diff_lines(old: &str, new: &str, max_chars: usize) -> LineDiff {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    let diff = TextDiff::from_slices(&old_lines[..], &new_lines[..]);

    let mut segments = Vec::new();
    let mut run: Option<(DiffKind, Vec<&str>)> = None;

    for change in diff.iter_all_changes() {
        let kind = match change.tag() {
            ChangeTag::Equal => None,
            ChangeTag::Insert => Some(DiffKind::Added),
            ChangeTag::Delete => Some(DiffKind::Removed),
        };

        let extends_run = matches!(
            (&run, kind),
            (Some((current, _)), Some(kind)) if *current == kind
        );
        if extends_run {
            if let Some((_, lines)) = run.as_mut() {
                lines.push(change.value());
            }
            continue;
        }

        if let Some((current, lines)) = run.take() {
            segments.push(segment(current, &lines, max_chars));
        }
        run = kind.map(|kind| (kind, vec![change.value()]));
    }

    if let Some((current, lines)) = run {
        segments.push(segment(current, &lines, max_chars));
    }

    LineDiff { segments }
}

fn segment(kind: DiffKind, lines: &[&str], max_chars: usize) -> DiffSegment {
    DiffSegment {
        kind,
        text: truncate_chars(&lines.join("\n"), max_chars),
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
