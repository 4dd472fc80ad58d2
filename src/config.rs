use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

const ENV_PREFIX: &str = "VOICENOTES_";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_storage_uri")]
    pub storage_uri: String,
    #[serde(default = "default_log")]
    pub log: String,
}

fn default_log() -> String {
    "info".into()
}

fn data_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("XDG_DATA_HOME").filter(|d| !d.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    std::env::var_os("HOME")
        .filter(|d| !d.is_empty())
        .map(|home| PathBuf::from(home).join(".local").join("share"))
}

fn default_storage_uri() -> String {
    match data_dir() {
        Some(dir) => dir_uri(&dir.join("voicenotes")),
        None => "memory://".into(),
    }
}

/// `file://` URI for a directory, percent-encoded. Relative paths cannot be
/// expressed as a file URL and are passed through as bare paths.
fn dir_uri(dir: &Path) -> String {
    Url::from_directory_path(dir)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| dir.display().to_string())
}

impl Config {
    /// Reads `VOICENOTES_*` variables, after loading a `.env` file if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        envy::prefixed(ENV_PREFIX)
            .from_env::<Self>()
            .context("failed to read VOICENOTES_* configuration")
    }

    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(ENV_PREFIX)
            .from_iter(vars)
            .context("failed to read VOICENOTES_* configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_prefixed_values() {
        let config = Config::from_vars(vec![
            ("VOICENOTES_STORAGE_URI".to_string(), "memory://cfg".to_string()),
            ("VOICENOTES_LOG".to_string(), "debug".to_string()),
            ("STORAGE_URI".to_string(), "ignored".to_string()),
        ])
        .unwrap();
        assert_eq!(config.storage_uri, "memory://cfg");
        assert_eq!(config.log, "debug");
    }

    #[cfg(unix)]
    #[test]
    fn dir_uri_percent_encodes_spaces() {
        let uri = dir_uri(Path::new("/home/a b/voicenotes"));
        assert_eq!(uri, "file:///home/a%20b/voicenotes/");
        let path = Url::parse(&uri).unwrap().to_file_path().unwrap();
        assert_eq!(path, PathBuf::from("/home/a b/voicenotes/"));
        assert_eq!(dir_uri(Path::new("rel/dir")), "rel/dir");
    }

    #[test]
    fn falls_back_to_defaults() {
        let config = Config::from_vars(Vec::new()).unwrap();
        assert_eq!(config.log, "info");
        assert!(config.storage_uri.starts_with("file://") || config.storage_uri == "memory://");
    }
}
