use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::share::{ShareId, ShareRecord};

use super::error::RegistryError;
use super::traits::ShareRegistry;

/// One-JSON-document-per-record registry.
///
/// Each record is stored at `{root}/{shareId}.json`. Because every key maps
/// to its own file, concurrent creates never touch shared state and need no
/// locking. Writes go through a `.tmp/` sibling and are renamed into place.
pub struct FilesystemShareRegistry {
    root: PathBuf,
}

impl FilesystemShareRegistry {
    pub async fn new(root: PathBuf) -> Result<Self, RegistryError> {
        fs::create_dir_all(&root).await?;
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self { root })
    }

    fn record_path(&self, id: &ShareId) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    fn temp_path(&self) -> PathBuf {
        self.root.join(".tmp").join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl ShareRegistry for FilesystemShareRegistry {
    async fn create(&self, record: &ShareRecord) -> Result<(), RegistryError> {
        if record.files.is_empty() {
            return Err(RegistryError::EmptyRecord);
        }

        let path = self.record_path(&record.id);
        if fs::try_exists(&path).await? {
            return Err(RegistryError::AlreadyExists(record.id.to_hex()));
        }

        let json = serde_json::to_vec_pretty(record)?;

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, &json).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }

    async fn get(&self, id: &ShareId) -> Result<Option<ShareRecord>, RegistryError> {
        match fs::read(self.record_path(id)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
