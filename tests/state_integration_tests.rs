//! Integration tests for StoreManager with change events and persistence
//!
//! These tests verify that the StoreManager correctly:
//! - Restores or initializes the store through a gateway
//! - Emits change events on mutations
//! - Saves snapshots in mutation order, including through the queued gateway
//! - Keeps in-memory state when saves fail

use dotpoint_tracker::persistence::{JsonFileGateway, MemoryGateway, QueuedGateway};
use dotpoint_tracker::services::ScriptedSource;
use dotpoint_tracker::{
    Confidence, SaveStatus, SnapshotGateway, Store, StoreChange, StoreManager, SubjectId,
};
use camino::Utf8PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::time::{Duration, timeout};

fn temp_snapshot() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = Utf8PathBuf::try_from(temp_dir.path().join("dotpoints.json")).unwrap();
    (temp_dir, path)
}

#[test]
fn test_default_six_subjects_scenario() {
    let gateway = Arc::new(MemoryGateway::new());
    let (manager, status) = StoreManager::open(gateway.clone(), 6);

    assert_eq!(status, SaveStatus::Saved);
    assert_eq!(gateway.save_count(), 1);

    let progress = manager.progress_by_subject();
    assert_eq!(progress.len(), 6);
    assert!(progress.values().all(|&p| p == 0));

    for _ in 0..20 {
        assert!(manager.suggest_today(3).is_empty());
    }
}

#[test]
fn test_session_survives_restart() {
    let (_temp_dir, path) = temp_snapshot();

    let (subject_id, kept_id) = {
        let (manager, _) = StoreManager::open(Arc::new(JsonFileGateway::new(&path)), 6);
        let subject_id = manager.read(|s| s.subjects[2].id.clone());

        let kept = manager.add_dot_point(&subject_id, "Newton's laws").value.unwrap();
        let dropped = manager.add_dot_point(&subject_id, "Projectile motion").value.unwrap();
        manager.add_dot_point(&subject_id, "Circular motion");
        manager.set_confidence(&subject_id, &kept, Confidence::ExamReady);
        manager.remove_dot_point(&subject_id, &dropped);
        manager.rename_subject(&subject_id, "Physics");
        manager.toggle_highlight_mode();

        (subject_id, kept)
    };

    let (reopened, status) = StoreManager::open(Arc::new(JsonFileGateway::new(&path)), 6);
    assert_eq!(status, SaveStatus::Unchanged);

    let store = reopened.snapshot();
    assert!(store.highlight_mode);
    assert_eq!(store.subjects.len(), 6);

    let subject = store.subject(&subject_id).unwrap();
    assert_eq!(subject.name, "Physics");
    let texts: Vec<_> = subject.dot_points.iter().map(|dp| dp.text.as_str()).collect();
    assert_eq!(texts, vec!["Newton's laws", "Circular motion"]);
    assert_eq!(subject.dot_points[0].id, kept_id);
    assert_eq!(subject.dot_points[0].confidence, Confidence::ExamReady);
    assert_eq!(reopened.progress(&subject_id), Some(50));
}

#[test]
fn test_corrupt_snapshot_file_recovers_with_defaults() {
    let (_temp_dir, path) = temp_snapshot();
    std::fs::write(&path, "{ definitely not a snapshot").unwrap();

    let gateway = Arc::new(JsonFileGateway::new(&path));
    let (manager, status) = StoreManager::open(gateway.clone(), 4);

    assert_eq!(status, SaveStatus::Saved);
    assert_eq!(manager.read(|s| s.subjects.len()), 4);
    assert_eq!(gateway.load().unwrap(), Some(manager.snapshot()));
}

#[test]
fn test_failed_saves_are_signalled_not_fatal() {
    let gateway = Arc::new(MemoryGateway::new());
    let (manager, _) = StoreManager::open(gateway.clone(), 1);
    let subject_id = manager.read(|s| s.subjects[0].id.clone());

    gateway.set_fail_saves(true);
    let failed = manager.add_dot_point(&subject_id, "Offline edit");
    assert!(failed.save.is_failed());
    let id = failed.value.unwrap();

    gateway.set_fail_saves(false);
    let saved = manager.set_confidence(&subject_id, &id, Confidence::Learning);
    assert_eq!(saved.save, SaveStatus::Saved);

    // The next successful save carries the earlier unsaved edit too
    let persisted = gateway.load().unwrap().unwrap();
    assert_eq!(
        persisted.dot_point(&subject_id, &id).unwrap().confidence,
        Confidence::Learning
    );
}

#[test]
fn test_repeating_an_edit_after_failed_save_persists_it() {
    let gateway = Arc::new(MemoryGateway::new());
    let (manager, _) = StoreManager::open(gateway.clone(), 1);
    let subject_id = manager.read(|s| s.subjects[0].id.clone());
    let id = manager.add_dot_point(&subject_id, "Titration").value.unwrap();

    gateway.set_fail_saves(true);
    assert!(manager.set_confidence(&subject_id, &id, Confidence::Learning).save.is_failed());
    assert!(manager.rename_subject(&subject_id, "Chemistry").save.is_failed());

    // The user retries the same edits once storage is back
    gateway.set_fail_saves(false);
    let rerated = manager.set_confidence(&subject_id, &id, Confidence::Learning);
    assert_eq!(rerated.value, Some(Confidence::Learning));
    assert_eq!(rerated.save, SaveStatus::Saved);
    assert!(rerated.changes.is_empty());

    let renamed = manager.rename_subject(&subject_id, "Chemistry");
    assert_eq!(renamed.save, SaveStatus::Saved);

    let persisted = gateway.load().unwrap().unwrap();
    assert_eq!(
        persisted.dot_point(&subject_id, &id).unwrap().confidence,
        Confidence::Learning
    );
    assert_eq!(persisted.subject(&subject_id).unwrap().name, "Chemistry");
}

#[test]
fn test_suggest_through_manager_is_scriptable() {
    let (manager, _) = StoreManager::open(Arc::new(MemoryGateway::new()), 2);
    let s1 = manager.read(|s| s.subjects[0].id.clone());
    let s2 = manager.read(|s| s.subjects[1].id.clone());

    let learning = manager.add_dot_point(&s1, "Learning item").value.unwrap();
    manager.set_confidence(&s1, &learning, Confidence::Learning);
    manager.add_dot_point(&s2, "Unseen item");

    // Expanded pool: [Learning item, Unseen item, Unseen item]
    let picks = manager.suggest(2, &mut ScriptedSource::new([2, 0]));
    let texts: Vec<_> = picks.iter().map(|p| p.dot_point.text.as_str()).collect();
    assert_eq!(texts, vec!["Unseen item", "Learning item"]);
    assert_eq!(picks[0].subject_name, "Subject 2");
}

#[tokio::test]
async fn test_change_events_emitted() {
    let (manager, _) = StoreManager::open(Arc::new(MemoryGateway::new()), 1);
    let subject_id = manager.read(|s| s.subjects[0].id.clone());
    let mut rx = manager.subscribe();

    manager.rename_subject(&subject_id, "");

    let event = timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout waiting for event")
        .expect("Channel closed");

    assert_eq!(
        event,
        StoreChange::SubjectRenamed {
            subject_id,
            name: "Subject".to_string()
        }
    );
}

#[tokio::test]
async fn test_multiple_subscribers_receive_events() {
    let (manager, _) = StoreManager::open(Arc::new(MemoryGateway::new()), 1);
    let mut rx1 = manager.subscribe();
    let mut rx2 = manager.subscribe();

    manager.set_highlight_mode(true);

    for rx in [&mut rx1, &mut rx2] {
        let event = timeout(Duration::from_millis(100), rx.recv())
            .await
            .expect("Timeout")
            .expect("Channel closed");
        assert_eq!(event, StoreChange::HighlightModeChanged { enabled: true });
    }
}

#[tokio::test]
async fn test_noop_emits_nothing() {
    let (manager, _) = StoreManager::open(Arc::new(MemoryGateway::new()), 1);
    let mut rx = manager.subscribe();

    manager.add_dot_point(&SubjectId::new("missing"), "Text");
    manager.add_dot_point(&manager.read(|s| s.subjects[0].id.clone()), "");

    let result = timeout(Duration::from_millis(50), rx.recv()).await;
    assert!(result.is_err(), "No event expected for no-op mutations");
}

#[tokio::test]
async fn test_queued_gateway_preserves_save_order() {
    let (_temp_dir, path) = temp_snapshot();
    let file = Arc::new(JsonFileGateway::new(&path));
    let queued = Arc::new(QueuedGateway::spawn(file.clone(), &tokio::runtime::Handle::current()));

    let (manager, status) = StoreManager::open(queued.clone(), 3);
    assert_eq!(status, SaveStatus::Saved);
    let subject_id = manager.read(|s| s.subjects[0].id.clone());

    let mut ids = Vec::new();
    for i in 0..25 {
        ids.push(manager.add_dot_point(&subject_id, &format!("Item {i}")).value.unwrap());
    }
    for id in ids.iter().step_by(2) {
        manager.set_confidence(&subject_id, id, Confidence::Memorised);
    }

    queued.flush().await.unwrap();
    assert_eq!(queued.failed_saves(), 0);

    let on_disk: Store = file.load().unwrap().unwrap();
    assert_eq!(on_disk, manager.snapshot());
    assert_eq!(manager.progress(&subject_id), Some(52));
}

#[tokio::test]
async fn test_concurrent_handlers_serialize_mutations() {
    let gateway = Arc::new(MemoryGateway::new());
    let (manager, _) = StoreManager::open(gateway.clone(), 1);
    let subject_id = manager.read(|s| s.subjects[0].id.clone());

    let mut handles = Vec::new();
    for worker in 0..4 {
        let manager = manager.clone();
        let subject_id = subject_id.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            for i in 0..10 {
                manager.add_dot_point(&subject_id, &format!("w{worker}-{i}"));
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(manager.read(|s| s.dot_point_count()), 40);
    // One default save plus one per mutation; the last snapshot is the final state
    assert_eq!(gateway.save_count(), 41);
    assert_eq!(gateway.load().unwrap(), Some(manager.snapshot()));
}
