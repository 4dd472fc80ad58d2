pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("note store used before initialize()")]
    NotInitialized,

    #[error("note content must not be empty")]
    EmptyContent,

    #[error("note storage is corrupted: {0}")]
    Corrupted(String),

    #[error("invalid storage uri: {0}")]
    InvalidUri(String),

    #[error(transparent)]
    Storage(#[from] opendal::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}
