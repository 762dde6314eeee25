// State management module
//
// This module provides the StoreManager which owns the learner's Store for one
// session, saves a snapshot after every mutation and emits change events.

use crate::models::{Confidence, DotPoint, DotPointId, Store, SubjectId};
use crate::persistence::SnapshotGateway;
use crate::services::{self, RandomSource, RngSource, Suggestion};
use indexmap::IndexMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when the store is modified
///
/// A UI layer can subscribe to these to re-render only what changed.
#[derive(Clone, Debug, PartialEq)]
pub enum StoreChange {
    DotPointAdded {
        subject_id: SubjectId,
        dot_point_id: DotPointId,
    },

    DotPointRemoved {
        subject_id: SubjectId,
        dot_point_id: DotPointId,
    },

    ConfidenceChanged {
        subject_id: SubjectId,
        dot_point_id: DotPointId,
        from: Confidence,
        to: Confidence,
    },

    SubjectRenamed {
        subject_id: SubjectId,
        name: String,
    },

    HighlightModeChanged {
        enabled: bool,
    },
}

/// Outcome of the snapshot save that follows a mutation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveStatus {
    /// Snapshot accepted by the gateway. For a
    /// [`QueuedGateway`](crate::persistence::QueuedGateway) that only means
    /// queued; later write errors show up in `failed_saves()`.
    Saved,

    /// Rejected input or missing target, so the store was not touched or saved
    Unchanged,

    /// Gateway reported an error; the in-memory change is kept
    Failed { reason: String },
}

impl SaveStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, SaveStatus::Failed { .. })
    }
}

/// Result of a store mutation
#[derive(Clone, Debug, PartialEq)]
pub struct Mutation<T> {
    /// The operation's own return value
    pub value: T,

    /// Events emitted for this mutation (empty when no value actually changed)
    pub changes: Vec<StoreChange>,

    pub save: SaveStatus,
}

/// What a mutation did to the store
enum Applied {
    /// Input rejected or target missing: skip the save
    Untouched,

    /// Target found and written. Saved even when the events are empty, so
    /// repeating an action after a failed save makes it durable.
    Touched(Vec<StoreChange>),
}

/// Session-scoped owner of the [`Store`]
///
/// - Restores the store through a [`SnapshotGateway`] on open, falling back to
///   default subjects when there is no usable snapshot
/// - Applies mutations under a write lock and saves while still holding it,
///   so snapshots reach the gateway in mutation order
/// - Broadcasts [`StoreChange`] events to subscribers
///
/// Missing targets and blank input are silent no-ops: they return
/// [`SaveStatus::Unchanged`] and emit nothing. Any operation that finds its
/// target saves, including re-rating to the same level.
pub struct StoreManager {
    state: Arc<RwLock<Store>>,
    gateway: Arc<dyn SnapshotGateway>,
    state_tx: broadcast::Sender<StoreChange>,
}

impl StoreManager {
    /// Restore the store from `gateway`, or start fresh.
    ///
    /// When the gateway has no snapshot, or the snapshot cannot be read, the
    /// store becomes [`Store::initialize_default`] with `default_subject_count`
    /// subjects and is saved immediately. The returned status reports that save
    /// (`Unchanged` when a snapshot was restored).
    pub fn open(
        gateway: Arc<dyn SnapshotGateway>,
        default_subject_count: usize,
    ) -> (Self, SaveStatus) {
        let restored = match gateway.load() {
            Ok(Some(store)) => Some(store),
            Ok(None) => {
                tracing::info!("No saved snapshot, starting with defaults");
                None
            }
            Err(e) => {
                tracing::warn!("Snapshot unreadable, starting with defaults: {}", e);
                None
            }
        };

        match restored {
            Some(store) => {
                tracing::info!(
                    "Restored {} subjects with {} dot points",
                    store.subjects.len(),
                    store.dot_point_count()
                );
                (Self::with_store(store, gateway), SaveStatus::Unchanged)
            }
            None => {
                let store = Store::initialize_default(default_subject_count);
                let manager = Self::with_store(store, gateway);
                let status = manager.save_now();
                (manager, status)
            }
        }
    }

    /// Wrap an existing store without loading or saving
    pub fn with_store(store: Store, gateway: Arc<dyn SnapshotGateway>) -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(store)),
            gateway,
            state_tx,
        }
    }

    /// Clone of the current store
    pub fn snapshot(&self) -> Store {
        self.read(Store::clone)
    }

    /// Execute a function with read access to the store
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Store) -> R,
    {
        let store = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&store)
    }

    /// Subscribe to change events
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.state_tx.subscribe()
    }

    /// Save the current store regardless of whether it changed
    pub fn save_now(&self) -> SaveStatus {
        let store = self.state.read().unwrap_or_else(PoisonError::into_inner);
        self.persist(&store)
    }

    /// Apply a mutation, then save and broadcast if it touched the store.
    ///
    /// The write lock is held across the save so concurrent callers cannot
    /// interleave snapshots out of order.
    fn apply<T, F>(&self, op: F) -> Mutation<T>
    where
        F: FnOnce(&mut Store) -> (T, Applied),
    {
        let mut store = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let (value, applied) = op(&mut store);

        let changes = match applied {
            Applied::Untouched => {
                return Mutation {
                    value,
                    changes: Vec::new(),
                    save: SaveStatus::Unchanged,
                };
            }
            Applied::Touched(changes) => changes,
        };

        let save = self.persist(&store);
        drop(store);

        for change in &changes {
            tracing::debug!("Store change: {:?}", change);
            // Ignore send errors - it's OK if no one is listening
            let _ = self.state_tx.send(change.clone());
        }

        Mutation {
            value,
            changes,
            save,
        }
    }

    fn persist(&self, store: &Store) -> SaveStatus {
        match self.gateway.save(store) {
            Ok(()) => SaveStatus::Saved,
            Err(e) => {
                tracing::error!("Failed to save snapshot: {}", e);
                SaveStatus::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn add_dot_point(
        &self,
        subject_id: &SubjectId,
        text: &str,
    ) -> Mutation<Option<DotPointId>> {
        self.apply(|store| match store.add_dot_point(subject_id, text) {
            Some(id) => {
                let change = StoreChange::DotPointAdded {
                    subject_id: subject_id.clone(),
                    dot_point_id: id.clone(),
                };
                (Some(id), Applied::Touched(vec![change]))
            }
            None => (None, Applied::Untouched),
        })
    }

    pub fn remove_dot_point(
        &self,
        subject_id: &SubjectId,
        dot_point_id: &DotPointId,
    ) -> Mutation<Option<DotPoint>> {
        self.apply(|store| match store.remove_dot_point(subject_id, dot_point_id) {
            Some(removed) => {
                let change = StoreChange::DotPointRemoved {
                    subject_id: subject_id.clone(),
                    dot_point_id: removed.id.clone(),
                };
                (Some(removed), Applied::Touched(vec![change]))
            }
            None => (None, Applied::Untouched),
        })
    }

    /// Re-rate a dot point, returning its previous level.
    ///
    /// Re-rating to the current level still saves but emits no event.
    pub fn set_confidence(
        &self,
        subject_id: &SubjectId,
        dot_point_id: &DotPointId,
        level: Confidence,
    ) -> Mutation<Option<Confidence>> {
        self.apply(|store| match store.set_confidence(subject_id, dot_point_id, level) {
            Some(previous) if previous == level => (Some(previous), Applied::Touched(Vec::new())),
            Some(previous) => {
                let change = StoreChange::ConfidenceChanged {
                    subject_id: subject_id.clone(),
                    dot_point_id: dot_point_id.clone(),
                    from: previous,
                    to: level,
                };
                (Some(previous), Applied::Touched(vec![change]))
            }
            None => (None, Applied::Untouched),
        })
    }

    /// Rename a subject; see [`Store::rename_subject`] for the empty-name fallback.
    ///
    /// Renaming to the current name still saves but emits no event.
    pub fn rename_subject(&self, subject_id: &SubjectId, name: &str) -> Mutation<bool> {
        self.apply(|store| {
            let before = store.subject(subject_id).map(|s| s.name.clone());
            if !store.rename_subject(subject_id, name) {
                return (false, Applied::Untouched);
            }

            let after = store
                .subject(subject_id)
                .map(|s| s.name.clone())
                .unwrap_or_default();
            if before.as_deref() == Some(after.as_str()) {
                return (true, Applied::Touched(Vec::new()));
            }

            let change = StoreChange::SubjectRenamed {
                subject_id: subject_id.clone(),
                name: after,
            };
            (true, Applied::Touched(vec![change]))
        })
    }

    pub fn set_highlight_mode(&self, enabled: bool) -> Mutation<bool> {
        self.apply(|store| {
            let changes = if store.set_highlight_mode(enabled) {
                vec![StoreChange::HighlightModeChanged { enabled }]
            } else {
                Vec::new()
            };
            (enabled, Applied::Touched(changes))
        })
    }

    /// Flip the highlight flag, returning the new value
    pub fn toggle_highlight_mode(&self) -> Mutation<bool> {
        self.apply(|store| {
            let enabled = store.toggle_highlight_mode();
            let change = StoreChange::HighlightModeChanged { enabled };
            (enabled, Applied::Touched(vec![change]))
        })
    }

    /// Progress of one subject, `None` if it does not exist
    pub fn progress(&self, subject_id: &SubjectId) -> Option<u8> {
        self.read(|store| store.subject(subject_id).map(services::progress))
    }

    pub fn progress_by_subject(&self) -> IndexMap<SubjectId, u8> {
        self.read(services::progress_by_subject)
    }

    /// Weighted suggestions drawn from `rng`
    pub fn suggest<R>(&self, k: usize, rng: &mut R) -> Vec<Suggestion>
    where
        R: RandomSource + ?Sized,
    {
        self.read(|store| services::suggest(store, k, rng))
    }

    /// Weighted suggestions using the thread-local RNG
    pub fn suggest_today(&self, k: usize) -> Vec<Suggestion> {
        self.suggest(k, &mut RngSource::thread())
    }
}

// Make StoreManager cloneable for sharing across handlers
impl Clone for StoreManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            gateway: Arc::clone(&self.gateway),
            state_tx: self.state_tx.clone(),
        }
    }
}
