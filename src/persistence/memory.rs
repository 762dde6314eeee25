use super::{PersistenceError, SnapshotGateway, decode_snapshot, encode_snapshot};
use crate::models::Store;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Keeps the serialized snapshot in memory.
///
/// Snapshots go through the same JSON encoding as the file gateway. Saves can
/// be switched to fail with [`set_fail_saves`](Self::set_fail_saves).
#[derive(Debug, Default)]
pub struct MemoryGateway {
    snapshot: Mutex<Option<String>>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from raw snapshot text (which may be corrupt)
    pub fn with_snapshot(json: impl Into<String>) -> Self {
        Self {
            snapshot: Mutex::new(Some(json.into())),
            ..Self::default()
        }
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Currently stored snapshot text
    pub fn raw_snapshot(&self) -> Option<String> {
        self.snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SnapshotGateway for MemoryGateway {
    fn load(&self) -> Result<Option<Store>, PersistenceError> {
        self.raw_snapshot()
            .map(|json| decode_snapshot(&json))
            .transpose()
    }

    fn save(&self, store: &Store) -> Result<(), PersistenceError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable(
                "memory gateway is rejecting saves".to_string(),
            ));
        }

        let json = encode_snapshot(store)?;
        *self.snapshot.lock().unwrap_or_else(PoisonError::into_inner) = Some(json);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_gateway_is_absent() {
        let gateway = MemoryGateway::new();
        assert!(gateway.load().unwrap().is_none());
        assert_eq!(gateway.save_count(), 0);
    }

    #[test]
    fn test_round_trip() {
        let gateway = MemoryGateway::new();
        let store = Store::initialize_default(4);

        gateway.save(&store).unwrap();
        assert_eq!(gateway.load().unwrap(), Some(store));
        assert_eq!(gateway.save_count(), 1);
    }

    #[test]
    fn test_failing_saves_keep_previous_snapshot() {
        let gateway = MemoryGateway::new();
        let original = Store::initialize_default(1);
        gateway.save(&original).unwrap();

        gateway.set_fail_saves(true);
        let result = gateway.save(&Store::initialize_default(5));
        assert!(matches!(result, Err(PersistenceError::Unavailable(_))));
        assert_eq!(gateway.load().unwrap(), Some(original));
        assert_eq!(gateway.save_count(), 1);
    }

    #[test]
    fn test_corrupt_snapshot() {
        let gateway = MemoryGateway::with_snapshot("not json at all");
        assert!(matches!(gateway.load(), Err(PersistenceError::Corrupt(_))));
    }
}
