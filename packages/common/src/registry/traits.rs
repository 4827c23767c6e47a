use async_trait::async_trait;

use crate::share::{ShareId, ShareRecord};

use super::error::RegistryError;

/// Persistence for minted share records.
///
/// Records are write-once: `create` never overwrites, and nothing mutates a
/// record after creation. Implementations must keep concurrent creates on
/// distinct ids durable without lost updates.
#[async_trait]
pub trait ShareRegistry: Send + Sync {
    /// Persist a freshly minted record.
    async fn create(&self, record: &ShareRecord) -> Result<(), RegistryError>;

    /// Look up a record by id.
    ///
    /// An unknown id is `Ok(None)` — an expected outcome, not an error.
    async fn get(&self, id: &ShareId) -> Result<Option<ShareRecord>, RegistryError>;
}
