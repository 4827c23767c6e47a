/// Errors that can occur while persisting or loading share records.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A record with this share id already exists. Ids are never reused.
    #[error("share record already exists: {0}")]
    AlreadyExists(String),
    /// Rejected a record with no files.
    #[error("share record must contain at least one file")]
    EmptyRecord,
    /// An I/O error occurred.
    #[error("registry IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A persisted record could not be decoded.
    #[error("corrupt share record: {0}")]
    Corrupt(#[from] serde_json::Error),
}
