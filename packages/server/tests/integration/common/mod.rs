use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use common::registry::{
    FilesystemShareRegistry, IndexShareRegistry, MemoryShareRegistry, ShareRegistry,
};
use common::storage::filesystem::FilesystemBlobStore;
use reqwest::Client;
use serde_json::Value;
use tempfile::TempDir;

use server::config::{
    AppConfig, CorsConfig, RegistryConfig, RegistryStrategy, ServerConfig, StorageConfig,
};
use server::state::AppState;

pub mod routes {
    pub const UPLOAD: &str = "/api/share/upload";

    pub fn share(id: &str) -> String {
        format!("/api/share/{id}")
    }
}

/// A running test server backed by a throwaway storage directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    uploads_dir: PathBuf,
    _dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_strategy(RegistryStrategy::PerRecord).await
    }

    pub async fn spawn_with_strategy(strategy: RegistryStrategy) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let uploads_dir = dir.path().join("uploads");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        let registry_path = match strategy {
            RegistryStrategy::SharedIndex => dir.path().join("shares/index.json"),
            _ => dir.path().join("shares"),
        };

        let config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            storage: StorageConfig {
                root_path: uploads_dir.clone(),
                public_base_url: format!("http://{addr}/uploads"),
                max_blob_size: 10 * 1024 * 1024,
            },
            registry: RegistryConfig {
                strategy,
                path: registry_path.clone(),
            },
        };

        let blob_store = Arc::new(
            FilesystemBlobStore::new(
                config.storage.root_path.clone(),
                config.storage.public_base_url.clone(),
                config.storage.max_blob_size,
            )
            .await
            .expect("Failed to create blob store"),
        );

        let registry: Arc<dyn ShareRegistry> = match strategy {
            RegistryStrategy::PerRecord => Arc::new(
                FilesystemShareRegistry::new(registry_path)
                    .await
                    .expect("Failed to create registry"),
            ),
            RegistryStrategy::SharedIndex => Arc::new(
                IndexShareRegistry::new(registry_path)
                    .await
                    .expect("Failed to create registry"),
            ),
            RegistryStrategy::Memory => Arc::new(MemoryShareRegistry::new()),
        };

        let state = AppState {
            blob_store,
            registry,
            config,
        };
        let app = server::build_router(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            uploads_dir,
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Upload a batch of `(filename, bytes)` parts, with an optional `meta`
    /// JSON string.
    pub async fn upload_files(
        &self,
        files: Vec<(&str, Vec<u8>)>,
        meta: Option<&str>,
    ) -> TestResponse {
        let mut form = reqwest::multipart::Form::new();
        for (name, bytes) in files {
            let part = reqwest::multipart::Part::bytes(bytes)
                .file_name(name.to_string())
                .mime_str("model/stl")
                .expect("Failed to set MIME type");
            form = form.part("files", part);
        }
        if let Some(meta) = meta {
            form = form.text("meta", meta.to_string());
        }

        let res = self
            .client
            .post(self.url(routes::UPLOAD))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart upload request");

        TestResponse::from_response(res).await
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    /// Fetch an absolute URL (e.g. one returned by the resolver).
    pub async fn fetch_url(&self, url: &str) -> reqwest::Response {
        self.client
            .get(url)
            .send()
            .await
            .expect("Failed to fetch URL")
    }

    /// Number of blobs currently on disk, excluding the temp directory.
    pub fn blob_count(&self) -> usize {
        std::fs::read_dir(&self.uploads_dir)
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .filter(|e| e.file_name() != ".tmp")
                    .count()
            })
            .unwrap_or(0)
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    pub fn share_id(&self) -> String {
        self.body["shareId"]
            .as_str()
            .expect("response body should contain 'shareId'")
            .to_string()
    }
}
