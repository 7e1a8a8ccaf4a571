mod common;

use common::{fixed_clock, stepping_clock, FlakyStore};
use pocketnote_core::storage::NOTES_KEY;
use pocketnote_core::{LoadOutcome, NotesStore, StoreError};

async fn loaded_store(storage: &std::sync::Arc<FlakyStore>) -> NotesStore {
    let store = NotesStore::with_clock(storage.clone(), stepping_clock(1_000));
    store.load().await;
    store
}

#[tokio::test]
async fn fresh_install_starts_empty_without_writing() {
    let storage = FlakyStore::new();
    let store = NotesStore::new(storage.clone());

    assert_eq!(store.load().await, LoadOutcome::Fresh { seeded: 0 });
    assert!(store.notes().is_empty());
    assert_eq!(storage.writes(), 0);
    assert_eq!(storage.raw(NOTES_KEY).await, None);
}

#[tokio::test]
async fn add_applies_defaults_and_persists_full_collection() {
    let storage = FlakyStore::new();
    let store = NotesStore::with_clock(storage.clone(), fixed_clock(1_700_000_000_000));
    store.load().await;

    let note = store
        .add("Groceries", "milk, eggs", Vec::new(), None)
        .await
        .unwrap();
    assert_eq!(note.color, "yellow");
    assert!(!note.is_archived);
    assert_eq!(note.created_at, note.updated_at);
    assert_eq!(note.id, "1700000000000");

    let persisted = storage.json(NOTES_KEY).await;
    assert_eq!(persisted.as_array().unwrap().len(), 1);
    assert_eq!(persisted[0]["title"], "Groceries");
    assert_eq!(persisted[0]["tagIds"], serde_json::json!([]));
    assert_eq!(persisted[0]["isArchived"], false);
    assert_eq!(storage.writes(), 1);
}

#[tokio::test]
async fn ids_stay_unique_when_clock_does_not_move() {
    let storage = FlakyStore::new();
    let store = NotesStore::with_clock(storage.clone(), fixed_clock(50));
    store.load().await;

    let first = store.add("a", "", Vec::new(), None).await.unwrap();
    let second = store.add("b", "", Vec::new(), None).await.unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(store.notes().len(), 2);
    assert_eq!(store.notes()[1].title, "b");
}

#[tokio::test]
async fn update_replaces_editable_fields_and_refreshes_updated_at() {
    let storage = FlakyStore::new();
    let store = loaded_store(&storage).await;
    let note = store
        .add("draft", "body", vec!["1".to_string()], Some("red".to_string()))
        .await
        .unwrap();
    store.archive(&note.id).await.unwrap();

    let updated = store
        .update(&note.id, "final", "new body", vec!["2".to_string()], "blue")
        .await
        .unwrap()
        .expect("note exists");
    assert_eq!(updated.id, note.id);
    assert_eq!(updated.created_at, note.created_at);
    assert!(updated.updated_at > note.updated_at);
    assert!(updated.is_archived);
    assert_eq!(updated.title, "final");
    assert_eq!(updated.content, "new body");
    assert_eq!(updated.tag_ids, vec!["2".to_string()]);
    assert_eq!(updated.color, "blue");
    assert_eq!(store.get_by_id(&note.id), Some(updated));
}

#[tokio::test]
async fn update_of_unknown_id_is_a_persisted_no_op() {
    let storage = FlakyStore::new();
    let store = loaded_store(&storage).await;
    store.add("kept", "", Vec::new(), None).await.unwrap();
    let before = store.notes();
    let writes_before = storage.writes();

    let result = store
        .update("missing", "x", "y", Vec::new(), "red")
        .await
        .unwrap();
    assert_eq!(result, None);
    assert_eq!(store.notes(), before);
    assert_eq!(storage.writes(), writes_before + 1);
}

#[tokio::test]
async fn archive_round_trip_restores_note_and_keeps_updated_at() {
    let storage = FlakyStore::new();
    let store = loaded_store(&storage).await;
    let note = store.add("t", "c", Vec::new(), None).await.unwrap();

    let archived = store.archive(&note.id).await.unwrap().unwrap();
    assert!(archived.is_archived);
    assert_eq!(archived.updated_at, note.updated_at);

    let restored = store.unarchive(&note.id).await.unwrap().unwrap();
    assert_eq!(restored, note);
    assert_eq!(storage.json(NOTES_KEY).await[0]["isArchived"], false);
}

#[tokio::test]
async fn every_transition_writes_exactly_once() {
    let storage = FlakyStore::new();
    let store = loaded_store(&storage).await;

    let note = store.add("t", "c", Vec::new(), None).await.unwrap();
    assert_eq!(storage.writes(), 1);
    store.archive(&note.id).await.unwrap();
    assert_eq!(storage.writes(), 2);
    store.unarchive(&note.id).await.unwrap();
    assert_eq!(storage.writes(), 3);
    store.delete(&note.id).await.unwrap();
    assert_eq!(storage.writes(), 4);
}

#[tokio::test]
async fn archive_of_unknown_id_changes_nothing() {
    let storage = FlakyStore::new();
    let store = loaded_store(&storage).await;
    store.add("t", "c", Vec::new(), None).await.unwrap();
    let before = store.notes();

    assert_eq!(store.archive("nope").await.unwrap(), None);
    assert_eq!(store.unarchive("nope").await.unwrap(), None);
    assert_eq!(store.notes(), before);
}

#[tokio::test]
async fn delete_is_idempotent() {
    let storage = FlakyStore::new();
    let store = loaded_store(&storage).await;
    let first = store.add("first", "", Vec::new(), None).await.unwrap();
    store.add("second", "", Vec::new(), None).await.unwrap();

    assert!(store.delete(&first.id).await.unwrap());
    let once = store.notes();
    assert!(!store.delete(&first.id).await.unwrap());
    assert_eq!(store.notes(), once);
    assert_eq!(once.len(), 1);
    assert_eq!(store.get_by_id(&first.id), None);
}

#[tokio::test]
async fn get_by_tag_keeps_collection_order() {
    let storage = FlakyStore::new();
    let store = loaded_store(&storage).await;
    let a = store
        .add("a", "", vec!["work".to_string()], None)
        .await
        .unwrap();
    store
        .add("b", "", vec!["home".to_string()], None)
        .await
        .unwrap();
    let c = store
        .add("c", "", vec!["home".to_string(), "work".to_string()], None)
        .await
        .unwrap();

    let tagged: Vec<String> = store
        .get_by_tag("work")
        .into_iter()
        .map(|note| note.id)
        .collect();
    assert_eq!(tagged, vec![a.id, c.id]);
    assert!(store.get_by_tag("all").is_empty());
}

#[tokio::test]
async fn write_failure_is_reported_but_memory_keeps_the_change() {
    let storage = FlakyStore::new();
    let store = loaded_store(&storage).await;
    storage.fail_writes(true);

    let err = store
        .add("unsaved", "", Vec::new(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Persistence(_)));
    assert!(err.is_persistence());
    assert_eq!(store.notes().len(), 1);
    assert_eq!(store.notes()[0].title, "unsaved");

    storage.fail_writes(false);
    store.add("saved", "", Vec::new(), None).await.unwrap();
    let persisted = storage.json(NOTES_KEY).await;
    assert_eq!(persisted.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn subscribers_see_each_published_change() {
    let storage = FlakyStore::new();
    let store = loaded_store(&storage).await;
    let mut updates = store.subscribe();
    assert!(!updates.has_changed().unwrap());

    let note = store.add("seen", "", Vec::new(), None).await.unwrap();
    assert!(updates.has_changed().unwrap());
    assert_eq!(updates.borrow_and_update().len(), 1);

    store.delete("unknown").await.unwrap();
    assert!(!updates.has_changed().unwrap());

    store.archive(&note.id).await.unwrap();
    assert!(updates.borrow_and_update()[0].is_archived);
}

#[tokio::test]
async fn concurrent_mutations_are_all_applied_in_memory() {
    let storage = FlakyStore::new();
    let store = std::sync::Arc::new(loaded_store(&storage).await);

    let handles: Vec<_> = (0..8)
        .map(|idx| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .add(format!("note {idx}"), "", Vec::new(), None)
                    .await
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.notes().len(), 8);
    let mut ids: Vec<String> = store.notes().into_iter().map(|note| note.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 8);
}
