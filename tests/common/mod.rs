use anyhow::Result;
use opendal::services::Memory;
use opendal::Operator;
use voicenotes_core::{NoteDraft, NoteStore};

#[allow(dead_code)]
pub fn setup_operator() -> Result<Operator> {
    let builder = Memory::default();
    let op = Operator::new(builder)?.finish();
    Ok(op)
}

#[allow(dead_code)]
pub async fn setup_store() -> Result<(Operator, NoteStore)> {
    let op = setup_operator()?;
    let store = NoteStore::open(op.clone()).await?;
    Ok((op, store))
}

#[allow(dead_code)]
pub fn draft(title: &str, content: &str, created_at: &str) -> NoteDraft {
    NoteDraft::new(title, content).with_created_at(created_at)
}

/// Fresh, not yet created directory under the system temp dir.
#[allow(dead_code)]
pub fn temp_dir(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "voicenotes-{}-{}-{}",
        label,
        std::process::id(),
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    ))
}
