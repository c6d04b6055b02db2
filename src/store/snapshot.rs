use std::io;
use std::path::PathBuf;

/// Latest extracted text per source, one file each.
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, source_id: &str) -> PathBuf {
        self.dir.join(format!("{}.txt", file_stem(source_id)))
    }

    /// `Ok(None)` when the source has never been snapshotted.
    pub fn read(&self, source_id: &str) -> io::Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(source_id)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Written to a `.txt.tmp` sibling, then renamed over the old snapshot.
    pub fn write(&self, source_id: &str, text: &str) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(source_id);
        let temp = path.with_extension("txt.tmp");
        std::fs::write(&temp, text)?;
        std::fs::rename(&temp, &path)
    }
}

// Distinct ids map to distinct file names.
fn file_stem(source_id: &str) -> String {
    hex::encode(source_id.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_snapshot_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("snapshots"));
        assert_eq!(store.read("nobody").unwrap(), None);
    }

    #[test]
    fn write_overwrites_previous_text() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("snapshots"));

        store.write("site", "first").unwrap();
        store.write("site", "second").unwrap();
        assert_eq!(store.read("site").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn ids_cannot_escape_the_directory() {
        let store = SnapshotStore::new("/data/snapshots");
        let path = store.path_for("../etc/passwd");
        assert_eq!(path.parent(), Some(std::path::Path::new("/data/snapshots")));
        assert_eq!(
            store.path_for("ab"),
            PathBuf::from("/data/snapshots/6162.txt")
        );
    }

    #[test]
    fn similar_ids_keep_separate_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("snapshots"));
        assert_ne!(store.path_for("a.b"), store.path_for("a_b"));

        store.write("a.b", "alpha").unwrap();
        store.write("a_b", "beta").unwrap();
        assert_eq!(store.read("a.b").unwrap().as_deref(), Some("alpha"));
        assert_eq!(store.read("a_b").unwrap().as_deref(), Some("beta"));
    }

    #[test]
    fn write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("snapshots"));
        store.write("site", "text").unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path().join("snapshots"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec![format!("{}.txt", hex::encode("site"))]);
    }
}
