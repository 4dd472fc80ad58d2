mod common;
use common::temp_dir;
use voicenotes_core::storage::{operator_from_uri, ATOMIC_WRITE_DIR};
use voicenotes_core::{NoteDraft, NoteStore, StoreError};

#[tokio::test]
async fn test_memory_uri_is_shared_within_process() -> anyhow::Result<()> {
    let first = operator_from_uri("memory://test-storage-shared")?;
    let store = NoteStore::open(first).await?;
    let id = store.insert(NoteDraft::new("shared", "content")).await?;

    let second = operator_from_uri("memory://test-storage-shared")?;
    let reopened = NoteStore::open(second).await?;
    assert!(reopened.get(&id).await?.is_some());

    let other = operator_from_uri("memory://test-storage-other")?;
    let isolated = NoteStore::open(other).await?;
    assert!(isolated.is_empty().await?);

    Ok(())
}

#[tokio::test]
async fn test_filesystem_store_survives_reopen() -> anyhow::Result<()> {
    let dir = temp_dir("fs-reopen");
    let uri = format!("file://{}", dir.display());

    let id = {
        let store = NoteStore::open(operator_from_uri(&uri)?).await?;
        store
            .insert(NoteDraft::new("disk", "persisted").with_tags("fs"))
            .await?
    };
    assert!(dir.join("notes").join(format!("{}.json", id)).exists());
    assert!(dir.join("counter.json").exists());

    let reopened = NoteStore::open(operator_from_uri(dir.to_str().unwrap_or_default())?).await?;
    let note = reopened.get(&id).await?.expect("note persisted");
    assert_eq!(note.content, "persisted");
    assert_eq!(note.tags, "fs");

    std::fs::remove_dir_all(&dir).ok();
    Ok(())
}

#[test]
fn test_unsupported_scheme_rejected() {
    let err = operator_from_uri("ftp://example.com/notes").unwrap_err();
    assert!(matches!(err, StoreError::InvalidUri(_)));
}

#[tokio::test]
async fn test_file_uri_with_space_uses_literal_directory() -> anyhow::Result<()> {
    let dir = temp_dir("with space");
    let uri = format!("file://{}", dir.display());

    let store = NoteStore::open(operator_from_uri(&uri)?).await?;
    let id = store.insert(NoteDraft::new("spaced", "content")).await?;

    assert!(dir.join("notes").join(format!("{}.json", id)).exists());
    let encoded = dir.to_string_lossy().replace(' ', "%20");
    assert!(!std::path::Path::new(&encoded).exists());

    std::fs::remove_dir_all(&dir).ok();
    Ok(())
}

#[tokio::test]
async fn test_filesystem_writes_leave_no_staging_files() -> anyhow::Result<()> {
    let dir = temp_dir("atomic");
    let store = NoteStore::open(operator_from_uri(&dir.to_string_lossy())?).await?;

    let id = store.insert(NoteDraft::new("a", "first")).await?;
    store
        .update(&id, voicenotes_core::NotePatch::tags("x,y"))
        .await?;
    store.set_liked(&id, true).await?;

    let staged = std::fs::read_dir(dir.join(ATOMIC_WRITE_DIR))
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(staged, 0);

    let notes: Vec<String> = std::fs::read_dir(dir.join("notes"))?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(notes, vec![format!("{}.json", id)]);

    let note = store.get(&id).await?.expect("note exists");
    assert_eq!(note.tags, "x,y");
    assert!(note.is_liked);

    std::fs::remove_dir_all(&dir).ok();
    Ok(())
}
