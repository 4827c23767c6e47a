use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;

use crate::share::{ShareId, ShareRecord};

use super::error::RegistryError;
use super::traits::ShareRegistry;

/// Single-shared-index registry.
///
/// All records live in one `index.json`. The read-modify-write cycle on the
/// shared document is the classic lost-update hazard, so writers are
/// serialized behind a mutex; readers go through the same lock to see a
/// consistent document.
pub struct IndexShareRegistry {
    path: PathBuf,
    lock: Mutex<()>,
}

impl IndexShareRegistry {
    pub async fn new(path: PathBuf) -> Result<Self, RegistryError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    async fn load_index(&self) -> Result<BTreeMap<String, ShareRecord>, RegistryError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn store_index(
        &self,
        index: &BTreeMap<String, ShareRecord>,
    ) -> Result<(), RegistryError> {
        let json = serde_json::to_vec_pretty(index)?;

        // Temp-write in the same directory, then rename over the index.
        let temp = self.path.with_extension("json.tmp");
        if let Err(e) = fs::write(&temp, &json).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp, &self.path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }

        Ok(())
    }
}

#[async_trait]
impl ShareRegistry for IndexShareRegistry {
    async fn create(&self, record: &ShareRecord) -> Result<(), RegistryError> {
        if record.files.is_empty() {
            return Err(RegistryError::EmptyRecord);
        }

        let _guard = self.lock.lock().await;

        let mut index = self.load_index().await?;
        let key = record.id.to_hex();
        if index.contains_key(&key) {
            return Err(RegistryError::AlreadyExists(key));
        }
        index.insert(key, record.clone());

        self.store_index(&index).await
    }

    async fn get(&self, id: &ShareId) -> Result<Option<ShareRecord>, RegistryError> {
        let _guard = self.lock.lock().await;
        let index = self.load_index().await?;
        Ok(index.get(&id.to_hex()).cloned())
    }
}
