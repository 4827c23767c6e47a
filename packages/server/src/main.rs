use std::sync::Arc;

use common::registry::{
    FilesystemShareRegistry, IndexShareRegistry, MemoryShareRegistry, ShareRegistry,
};
use common::storage::filesystem::FilesystemBlobStore;
use tracing::{Level, info};

use server::config::{AppConfig, RegistryStrategy};
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let blob_store = Arc::new(
        FilesystemBlobStore::new(
            config.storage.root_path.clone(),
            config.storage.public_base_url.clone(),
            config.storage.max_blob_size,
        )
        .await?,
    );

    let registry: Arc<dyn ShareRegistry> = match config.registry.strategy {
        RegistryStrategy::PerRecord => {
            Arc::new(FilesystemShareRegistry::new(config.registry.path.clone()).await?)
        }
        RegistryStrategy::SharedIndex => {
            Arc::new(IndexShareRegistry::new(config.registry.path.clone()).await?)
        }
        RegistryStrategy::Memory => Arc::new(MemoryShareRegistry::new()),
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        blob_store,
        registry,
        config,
    };
    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
