//! In-memory completion store for tests and embedding.

use crate::clock::Clock;
use crate::store::{CompletionMap, CompletionStore, StoreError, StoreResult, StoreSnapshot};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Store holding one snapshot in memory.
pub struct InMemoryCompletionStore {
    clock: Arc<dyn Clock>,
    snapshot: Mutex<Option<StoreSnapshot>>,
    fail_writes: AtomicBool,
    saves: AtomicUsize,
}

impl InMemoryCompletionStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            snapshot: Mutex::new(None),
            fail_writes: AtomicBool::new(false),
            saves: AtomicUsize::new(0),
        }
    }

    /// Seeds the store as if a previous process had saved `snapshot`.
    pub fn with_snapshot(clock: Arc<dyn Clock>, snapshot: StoreSnapshot) -> Self {
        let store = Self::new(clock);
        *store.lock() = Some(snapshot);
        store
    }

    /// Makes subsequent `save` calls fail with an I/O error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Currently persisted snapshot, if any.
    pub fn persisted(&self) -> Option<StoreSnapshot> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<StoreSnapshot>> {
        self.snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CompletionStore for InMemoryCompletionStore {
    fn load(&self) -> StoreResult<StoreSnapshot> {
        Ok(self
            .lock()
            .clone()
            .unwrap_or_else(|| StoreSnapshot::empty(self.clock.now())))
    }

    fn save(&self, records: &CompletionMap) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Io {
                path: PathBuf::from(":memory:"),
                source: std::io::Error::new(std::io::ErrorKind::Other, "simulated write failure"),
            });
        }

        *self.lock() = Some(StoreSnapshot {
            last_update: Some(self.clock.now()),
            records: records.clone(),
        });
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
