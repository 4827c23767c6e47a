use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::error::StorageError;
use super::name::StorageName;
use super::traits::BlobStore;

/// Filesystem-backed blob store.
///
/// Blobs live as flat files named by their [`StorageName`] under the root
/// directory. Writes go through a `.tmp/` sibling and are renamed into place,
/// so a crashed upload never leaves a partial blob at its final path.
pub struct FilesystemBlobStore {
    root: PathBuf,
    public_prefix: String,
    max_size: u64,
}

impl FilesystemBlobStore {
    /// Create a new filesystem blob store rooted at `root`.
    ///
    /// `public_prefix` is the URL prefix under which the root is served
    /// read-only (e.g. `http://localhost:3001/uploads`).
    pub async fn new(
        root: PathBuf,
        public_prefix: impl Into<String>,
        max_size: u64,
    ) -> Result<Self, StorageError> {
        fs::create_dir_all(&root).await?;
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self {
            root,
            public_prefix: public_prefix.into().trim_end_matches('/').to_string(),
            max_size,
        })
    }

    fn blob_path(&self, name: &StorageName) -> PathBuf {
        self.root.join(name.as_str())
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.root.join(".tmp").join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put(&self, data: &[u8], original_name: &str) -> Result<StorageName, StorageError> {
        if data.is_empty() {
            return Err(StorageError::Empty);
        }
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        // Names are unique by construction; regenerate on the off chance of
        // a collision rather than overwrite.
        let mut name = StorageName::generate(original_name);
        while fs::try_exists(self.blob_path(&name)).await? {
            name = StorageName::generate(original_name);
        }

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, self.blob_path(&name)).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(name)
    }

    async fn get(&self, name: &StorageName) -> Result<Vec<u8>, StorageError> {
        match fs::read(self.blob_path(name)).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, name: &StorageName) -> Result<bool, StorageError> {
        Ok(fs::try_exists(self.blob_path(name)).await?)
    }

    async fn delete(&self, name: &StorageName) -> Result<bool, StorageError> {
        match fs::remove_file(self.blob_path(name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn size(&self, name: &StorageName) -> Result<u64, StorageError> {
        match fs::metadata(self.blob_path(name)).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn url_for(&self, name: &StorageName) -> String {
        format!("{}/{}", self.public_prefix, name)
    }
}
