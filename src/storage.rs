use crate::error::{Result, StoreError};
use opendal::services::{Fs, Memory};
use opendal::Operator;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use url::Url;

pub const ATOMIC_WRITE_DIR: &str = ".tmp";

static MEMORY_OPERATORS: OnceLock<Mutex<HashMap<String, Operator>>> = OnceLock::new();

fn memory_cache() -> &'static Mutex<HashMap<String, Operator>> {
    MEMORY_OPERATORS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Creates the operator backing a note store from a URI.
///
/// Supported forms:
/// - `memory://` (optionally `memory://name`) -> in-memory, shared per URI
///   within the process
/// - `file:///path/to/dir` -> local filesystem rooted at the path
/// - `/path/to/dir` or `relative/dir` -> same as `file://`
pub fn operator_from_uri(uri: &str) -> Result<Operator> {
    if uri.starts_with("memory://") {
        let mut cache = memory_cache()
            .lock()
            .map_err(|_| StoreError::InvalidUri("memory operator cache lock poisoned".into()))?;
        if let Some(op) = cache.get(uri) {
            return Ok(op.clone());
        }
        let op = Operator::new(Memory::default())?.finish();
        cache.insert(uri.to_string(), op.clone());
        return Ok(op);
    }

    match Url::parse(uri) {
        Ok(url) if url.scheme() == "file" => {
            let path = url
                .to_file_path()
                .map_err(|_| StoreError::InvalidUri(format!("not a local file path: {}", uri)))?;
            fs_operator(&path)
        }
        Ok(url) => Err(StoreError::InvalidUri(format!(
            "unsupported storage scheme: {}",
            url.scheme()
        ))),
        Err(url::ParseError::RelativeUrlWithoutBase) => fs_operator(Path::new(uri)),
        Err(e) => Err(StoreError::InvalidUri(e.to_string())),
    }
}

/// Writes go through `<root>/.tmp` and are renamed into place, so a record
/// file is either the old or the new version, never a truncated one.
fn fs_operator(root: &Path) -> Result<Operator> {
    if root.as_os_str().is_empty() {
        return Err(StoreError::InvalidUri("empty filesystem root".into()));
    }
    let staging = root.join(ATOMIC_WRITE_DIR);
    let builder = Fs::default()
        .root(&root.to_string_lossy())
        .atomic_write_dir(&staging.to_string_lossy());
    Ok(Operator::new(builder)?.finish())
}
