//! Nullable store: thread-safe in-memory snapshot storage for testing.

use std::collections::HashMap;
use std::sync::Mutex;
use sylo_store::{SnapshotKind, SnapshotStore, StoreError};

#[derive(Default)]
pub struct NullSnapshotStore {
    snapshots: Mutex<HashMap<SnapshotKind, Vec<u8>>>,
}

impl NullSnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of snapshots currently held.
    pub fn len(&self) -> usize {
        self.snapshots.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<SnapshotKind, Vec<u8>>>, StoreError> {
        self.snapshots
            .lock()
            .map_err(|_| StoreError::Backend("null store lock poisoned".into()))
    }
}

impl SnapshotStore for NullSnapshotStore {
    fn get_snapshot(&self, kind: SnapshotKind) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.lock()?.get(&kind).cloned())
    }

    fn put_snapshot(&self, kind: SnapshotKind, bytes: &[u8]) -> Result<(), StoreError> {
        self.lock()?.insert(kind, bytes.to_vec());
        Ok(())
    }

    fn delete_snapshot(&self, kind: SnapshotKind) -> Result<(), StoreError> {
        self.lock()?.remove(&kind);
        Ok(())
    }
}
