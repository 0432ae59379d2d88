//! Integration tests for the file-backed store.
//!
//! Tests value round trips, overwrite and delete semantics, on-disk layout,
//! and that a repository over a `FileStore` survives a restart.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use taskdeck::store::{DurableStore, FileStore};
use taskdeck::tasks::{SAMPLE_TASK_COUNT, TaskRepository};
use taskdeck_proto::task::TaskFilter;

fn make_store() -> (tempfile::TempDir, FileStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("data"));
    (dir, store)
}

fn stored_files(store: &FileStore) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(store.root())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ---------------------------------------------------------------------------
// Key/value semantics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_key_reads_none() {
    let (_dir, store) = make_store();
    assert!(store.read("tasks:u1").await.unwrap().is_none());
}

#[tokio::test]
async fn write_then_read() {
    let (_dir, store) = make_store();
    store.write("tasks:u1", "[]").await.unwrap();
    assert_eq!(store.read("tasks:u1").await.unwrap().as_deref(), Some("[]"));
}

#[tokio::test]
async fn write_replaces_previous_value() {
    let (_dir, store) = make_store();
    store.write("tasks:u1", "first").await.unwrap();
    store.write("tasks:u1", "second").await.unwrap();
    assert_eq!(
        store.read("tasks:u1").await.unwrap().as_deref(),
        Some("second")
    );
}

#[tokio::test]
async fn delete_removes_value_and_tolerates_missing_key() {
    let (_dir, store) = make_store();
    store.write("initialized:u1", "true").await.unwrap();

    store.delete("initialized:u1").await.unwrap();
    assert!(store.read("initialized:u1").await.unwrap().is_none());

    store.delete("initialized:u1").await.unwrap();
    store.delete("never-written").await.unwrap();
}

#[tokio::test]
async fn keys_map_to_one_file_each_without_temp_leftovers() {
    let (_dir, store) = make_store();
    store.write("tasks:u1", "[]").await.unwrap();
    store.write("initialized:u1", "true").await.unwrap();
    store.write("tasks:u1", "[ ]").await.unwrap();

    assert_eq!(
        stored_files(&store),
        vec!["initialized%3Au1.json", "tasks%3Au1.json"]
    );
}

#[tokio::test]
async fn hostile_keys_stay_inside_root() {
    let (dir, store) = make_store();
    store.write("tasks:../../escape", "x").await.unwrap();

    assert_eq!(stored_files(&store).len(), 1);
    assert!(!dir.path().join("escape.json").exists());
    assert_eq!(
        store.read("tasks:../../escape").await.unwrap().as_deref(),
        Some("x")
    );
}

#[tokio::test]
async fn unicode_values_round_trip() {
    let (_dir, store) = make_store();
    let value = "Comprar leche 🥛, dos litros";
    store.write("tasks:usuario", value).await.unwrap();
    assert_eq!(
        store.read("tasks:usuario").await.unwrap().as_deref(),
        Some(value)
    );
}

// ---------------------------------------------------------------------------
// Repository over files
// ---------------------------------------------------------------------------

#[tokio::test]
async fn collection_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    let added = {
        let repo = TaskRepository::with_seed(FileStore::new(dir.path()), 1);
        assert_eq!(repo.get_user_tasks("u1").await.len(), SAMPLE_TASK_COUNT);
        repo.add_task("u1", "Buy milk", "Two litres").await.unwrap()
    };

    // Different seed: a reseed would produce different tasks.
    let repo = TaskRepository::with_seed(FileStore::new(dir.path()), 99);
    let tasks = repo.get_filtered_tasks("u1", TaskFilter::All).await;
    assert_eq!(tasks.len(), SAMPLE_TASK_COUNT + 1);
    assert_eq!(repo.find_task("u1", &added.id).await.unwrap(), added);
}

#[tokio::test]
async fn clear_user_removes_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    let repo = TaskRepository::with_seed(store, 1);
    repo.get_user_tasks("u1").await;
    assert_eq!(stored_files(repo.store()).len(), 2);

    repo.clear_user("u1").await.unwrap();
    assert!(stored_files(repo.store()).is_empty());
}
