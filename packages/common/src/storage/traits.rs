use async_trait::async_trait;

use super::error::StorageError;
use super::name::StorageName;

/// Durable storage for uploaded binary files, addressed by generated name.
///
/// The only mutation is "create new blob"; existing blobs are never edited.
/// `delete` exists solely so a failed upload batch can roll back its own
/// writes.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under a freshly generated storage name.
    ///
    /// `original_name` is attacker-controlled and is sanitized before it is
    /// used in any filesystem-facing operation.
    async fn put(&self, data: &[u8], original_name: &str) -> Result<StorageName, StorageError>;

    /// Retrieve all bytes for a blob.
    async fn get(&self, name: &StorageName) -> Result<Vec<u8>, StorageError>;

    /// Check whether a blob exists.
    async fn exists(&self, name: &StorageName) -> Result<bool, StorageError>;

    /// Delete a blob.
    ///
    /// Returns `true` if the blob was deleted, `false` if it did not exist.
    async fn delete(&self, name: &StorageName) -> Result<bool, StorageError>;

    /// Get the size of a blob in bytes.
    async fn size(&self, name: &StorageName) -> Result<u64, StorageError>;

    /// Publicly fetchable URL for a blob.
    ///
    /// Exposes the storage name inside the URL path only; never the backing
    /// location.
    fn url_for(&self, name: &StorageName) -> String;
}
