use std::sync::Arc;

use common::registry::ShareRegistry;
use common::storage::BlobStore;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub blob_store: Arc<dyn BlobStore>,
    pub registry: Arc<dyn ShareRegistry>,
    pub config: AppConfig,
}
