use async_trait::async_trait;
use dashmap::DashMap;

use crate::share::{ShareId, ShareRecord};

use super::error::RegistryError;
use super::traits::ShareRegistry;

/// In-memory registry for tests and ephemeral runs.
///
/// Backed by a concurrent map; creates on distinct ids never contend.
#[derive(Default)]
pub struct MemoryShareRegistry {
    records: DashMap<ShareId, ShareRecord>,
}

impl MemoryShareRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShareRegistry for MemoryShareRegistry {
    async fn create(&self, record: &ShareRecord) -> Result<(), RegistryError> {
        if record.files.is_empty() {
            return Err(RegistryError::EmptyRecord);
        }

        match self.records.entry(record.id) {
            dashmap::Entry::Occupied(_) => Err(RegistryError::AlreadyExists(record.id.to_hex())),
            dashmap::Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }

    async fn get(&self, id: &ShareId) -> Result<Option<ShareRecord>, RegistryError> {
        Ok(self.records.get(id).map(|r| r.clone()))
    }
}
