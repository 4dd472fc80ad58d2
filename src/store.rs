use crate::error::{Result, StoreError};
use crate::integrity::{IntegrityProvider, Sha256Integrity};
use crate::note::{Note, NoteDraft, NotePatch};
use crate::search;
use opendal::{ErrorKind, Operator};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const NOTES_DIR: &str = "notes/";
const NOTES_ENTRY: &str = "notes";
const COUNTER_PATH: &str = "counter.json";

#[derive(Serialize, Deserialize, Debug)]
struct NoteEnvelope {
    note: Note,
    #[serde(default)]
    checksum: String,
}

#[derive(Serialize, Deserialize, Debug)]
struct Counter {
    next_id: u64,
}

#[derive(Debug)]
struct WriterState {
    next_id: u64,
}

/// Persistent collection of notes, one JSON file per note under `notes/`.
///
/// Construct one per process and hand it to consumers. [`NoteStore::initialize`]
/// must complete before any other operation; until then they fail with
/// [`StoreError::NotInitialized`]. Mutations are serialized through an internal
/// lock, reads go straight to storage.
pub struct NoteStore<I = Sha256Integrity> {
    op: Operator,
    integrity: I,
    initialized: AtomicBool,
    writer: Mutex<WriterState>,
}

impl NoteStore<Sha256Integrity> {
    pub fn new(op: Operator) -> Self {
        Self::with_integrity(op, Sha256Integrity)
    }

    /// Builds a store and initializes it.
    pub async fn open(op: Operator) -> Result<Self> {
        let store = Self::new(op);
        store.initialize().await?;
        Ok(store)
    }
}

impl<I: IntegrityProvider + Send + Sync> NoteStore<I> {
    pub fn with_integrity(op: Operator, integrity: I) -> Self {
        Self {
            op,
            integrity,
            initialized: AtomicBool::new(false),
            writer: Mutex::new(WriterState { next_id: 1 }),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Opens or creates the backing storage and restores the id counter.
    ///
    /// Unreadable or tampered storage is discarded and recreated empty.
    /// Calling this again after a successful run does nothing.
    pub async fn initialize(&self) -> Result<()> {
        let mut state = self.writer.lock().await;
        if self.is_initialized() {
            return Ok(());
        }

        let next_id = match self.load_snapshot().await {
            Ok((notes, persisted)) => {
                let max_numeric = notes
                    .iter()
                    .filter_map(|n| n.id.parse::<u64>().ok())
                    .max()
                    .unwrap_or(0);
                let next_id = persisted
                    .max(notes.len() as u64 + 1)
                    .max(max_numeric + 1);
                info!(records = notes.len(), next_id, "note store opened");
                next_id
            }
            Err(e) => {
                warn!(error = %e, "note storage is corrupted, recreating it empty");
                self.wipe().await?;
                self.write_counter(1).await?;
                1
            }
        };

        state.next_id = next_id;
        self.initialized.store(true, Ordering::Release);
        Ok(())
    }

    /// Stores a new note and returns its id.
    pub async fn insert(&self, draft: NoteDraft) -> Result<String> {
        self.ensure_initialized()?;
        draft.validate()?;

        let mut state = self.writer.lock().await;
        let id = state.next_id.to_string();
        state.next_id += 1;
        // Counter first: a crash between the two writes skips an id instead of reusing one.
        self.write_counter(state.next_id).await?;

        let note = draft.into_note(id.clone());
        self.write_record(&note).await?;
        debug!(id = %id, "inserted note");
        Ok(id)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Note>> {
        self.ensure_initialized()?;
        self.read_existing(id).await
    }

    /// All notes, or only liked ones, newest first.
    pub async fn get_all(&self, liked_only: bool) -> Result<Vec<Note>> {
        self.ensure_initialized()?;
        let notes = self.load_all().await?;
        Ok(search::filter_and_sort(&notes, |n| !liked_only || n.is_liked))
    }

    /// Notes whose title, content or tags contain `query`, ignoring case.
    /// A blank query returns nothing.
    pub async fn search(&self, query: &str) -> Result<Vec<Note>> {
        self.ensure_initialized()?;
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let notes = self.load_all().await?;
        Ok(search::filter_and_sort(&notes, |n| search::matches(n, query)))
    }

    /// Applies the fields present in `patch`. Unknown ids are ignored.
    pub async fn update(&self, id: &str, patch: NotePatch) -> Result<()> {
        self.ensure_initialized()?;
        let _guard = self.writer.lock().await;
        let Some(mut note) = self.read_existing(id).await? else {
            debug!(id, "update skipped, no such note");
            return Ok(());
        };
        if patch.apply(&mut note) {
            self.write_record(&note).await?;
            debug!(id, "updated note");
        }
        Ok(())
    }

    pub async fn set_liked(&self, id: &str, value: bool) -> Result<()> {
        self.ensure_initialized()?;
        let _guard = self.writer.lock().await;
        let Some(mut note) = self.read_existing(id).await? else {
            debug!(id, "set_liked skipped, no such note");
            return Ok(());
        };
        if note.is_liked != value {
            note.is_liked = value;
            self.write_record(&note).await?;
            debug!(id, liked = value, "set liked");
        }
        Ok(())
    }

    /// Permanently removes a note. The id is never handed out again.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.ensure_initialized()?;
        let _guard = self.writer.lock().await;
        let Some(path) = record_path(id) else {
            return Ok(());
        };
        if !self.op.exists(&path).await? {
            debug!(id, "delete skipped, no such note");
            return Ok(());
        }
        self.op.delete(&path).await?;
        debug!(id, "deleted note");
        Ok(())
    }

    pub async fn len(&self) -> Result<usize> {
        self.ensure_initialized()?;
        Ok(self.record_paths().await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(StoreError::NotInitialized)
        }
    }

    async fn load_snapshot(&self) -> Result<(Vec<Note>, u64)> {
        self.op.create_dir(NOTES_DIR).await?;
        let notes = self.load_all().await?;
        let next_id = if self.op.exists(COUNTER_PATH).await? {
            let bytes = self.op.read(COUNTER_PATH).await?;
            let counter: Counter = serde_json::from_slice(&bytes.to_vec())?;
            counter.next_id
        } else {
            1
        };
        Ok((notes, next_id))
    }

    /// Every record in storage order (ascending numeric id). Records deleted
    /// between listing and reading are skipped.
    async fn load_all(&self) -> Result<Vec<Note>> {
        let paths = self.record_paths().await?;
        let notes =
            futures::future::try_join_all(paths.iter().map(|path| self.read_if_present(path)))
                .await?;
        Ok(notes.into_iter().flatten().collect())
    }

    async fn record_paths(&self) -> Result<Vec<String>> {
        let entries = self.op.list(NOTES_DIR).await?;
        let mut paths: Vec<String> = entries
            .into_iter()
            .filter(|entry| entry.metadata().mode().is_file())
            .filter(|entry| entry.name().ends_with(".json"))
            .map(|entry| entry.path().to_string())
            .collect();
        paths.sort_by_key(|path| {
            let stem = record_stem(path).to_string();
            (stem.parse::<u64>().unwrap_or(u64::MAX), stem)
        });
        Ok(paths)
    }

    async fn read_existing(&self, id: &str) -> Result<Option<Note>> {
        let Some(path) = record_path(id) else {
            return Ok(None);
        };
        self.read_if_present(&path).await
    }

    async fn read_if_present(&self, path: &str) -> Result<Option<Note>> {
        match self.read_record(path).await {
            Ok(note) => Ok(Some(note)),
            Err(StoreError::Storage(e)) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn read_record(&self, path: &str) -> Result<Note> {
        let bytes = self.op.read(path).await?;
        let envelope: NoteEnvelope = serde_json::from_slice(&bytes.to_vec())?;

        if !envelope.checksum.is_empty() {
            let canonical = serde_json::to_string(&envelope.note)?;
            if !self.integrity.verify(&canonical, &envelope.checksum) {
                return Err(StoreError::Corrupted(format!("checksum mismatch in {}", path)));
            }
        }
        if envelope.note.id != record_stem(path) {
            return Err(StoreError::Corrupted(format!(
                "record {} holds note id {:?}",
                path, envelope.note.id
            )));
        }
        Ok(envelope.note)
    }

    async fn write_record(&self, note: &Note) -> Result<()> {
        let path = record_path(&note.id)
            .ok_or_else(|| StoreError::Corrupted(format!("unusable note id {:?}", note.id)))?;
        let canonical = serde_json::to_string(note)?;
        let envelope = NoteEnvelope {
            checksum: self.integrity.checksum(&canonical),
            note: note.clone(),
        };
        self.op
            .write(&path, serde_json::to_vec_pretty(&envelope)?)
            .await?;
        Ok(())
    }

    async fn write_counter(&self, next_id: u64) -> Result<()> {
        let counter = Counter { next_id };
        self.op
            .write(COUNTER_PATH, serde_json::to_vec_pretty(&counter)?)
            .await?;
        Ok(())
    }

    async fn wipe(&self) -> Result<()> {
        // A plain file where the notes directory belongs.
        match self.op.stat(NOTES_ENTRY).await {
            Ok(meta) if meta.mode().is_file() => self.op.delete(NOTES_ENTRY).await?,
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        let entries = self.op.list_with(NOTES_DIR).recursive(true).await?;
        for entry in entries {
            if entry.metadata().mode().is_file() {
                self.op.delete(entry.path()).await?;
            }
        }
        self.op.delete(COUNTER_PATH).await?;
        self.op.create_dir(NOTES_DIR).await?;
        Ok(())
    }
}

fn record_path(id: &str) -> Option<String> {
    let usable = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    usable.then(|| format!("{}{}.json", NOTES_DIR, id))
}

fn record_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.strip_suffix(".json").unwrap_or(name)
}
