//! File-backed snapshot store: one file per snapshot kind under a data dir.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::snapshot::{SnapshotKind, SnapshotStore};
use crate::StoreError;

pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| StoreError::Backend(format!("{}: {e}", dir.display())))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, kind: SnapshotKind) -> PathBuf {
        self.dir.join(format!("{}.bin", kind.key()))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn get_snapshot(&self, kind: SnapshotKind) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(self.path(kind)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Backend(format!("read {kind}: {e}"))),
        }
    }

    fn put_snapshot(&self, kind: SnapshotKind, bytes: &[u8]) -> Result<(), StoreError> {
        // write-then-rename so readers never observe a torn snapshot
        let target = self.path(kind);
        let tmp = target.with_extension("bin.tmp");
        fs::write(&tmp, bytes).map_err(|e| StoreError::Backend(format!("write {kind}: {e}")))?;
        fs::rename(&tmp, &target).map_err(|e| StoreError::Backend(format!("commit {kind}: {e}")))?;
        tracing::trace!(kind = %kind, bytes = bytes.len(), "snapshot written");
        Ok(())
    }

    fn delete_snapshot(&self, kind: SnapshotKind) -> Result<(), StoreError> {
        match fs::remove_file(self.path(kind)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Backend(format!("delete {kind}: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_snapshot_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::open(dir.path()).unwrap();
        assert_eq!(store.get_snapshot(SnapshotKind::Directory).unwrap(), None);
    }

    #[test]
    fn put_then_get_returns_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::open(dir.path()).unwrap();
        store.put_snapshot(SnapshotKind::StakeLedger, b"ledger").unwrap();
        assert_eq!(
            store.get_snapshot(SnapshotKind::StakeLedger).unwrap(),
            Some(b"ledger".to_vec())
        );
        assert_eq!(store.get_snapshot(SnapshotKind::Directory).unwrap(), None);
    }

    #[test]
    fn put_replaces_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::open(dir.path()).unwrap();
        store.put_snapshot(SnapshotKind::Directory, b"one").unwrap();
        store.put_snapshot(SnapshotKind::Directory, b"two").unwrap();
        assert_eq!(
            store.get_snapshot(SnapshotKind::Directory).unwrap(),
            Some(b"two".to_vec())
        );
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::open(dir.path()).unwrap();
        store.put_snapshot(SnapshotKind::Directory, b"x").unwrap();
        store.delete_snapshot(SnapshotKind::Directory).unwrap();
        store.delete_snapshot(SnapshotKind::Directory).unwrap();
        assert_eq!(store.get_snapshot(SnapshotKind::Directory).unwrap(), None);
    }

    #[test]
    fn open_creates_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileSnapshotStore::open(&nested).unwrap();
        assert!(store.dir().is_dir());
    }
}
