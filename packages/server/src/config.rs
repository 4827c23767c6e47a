use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    /// Allowed origins; empty means any origin.
    #[serde(default)]
    pub allow_origins: Vec<String>,
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

fn default_cors_max_age() -> u64 {
    3600
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: Vec::new(),
            max_age: default_cors_max_age(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory uploaded blobs are written to.
    pub root_path: PathBuf,
    /// URL prefix under which `root_path` is served read-only.
    pub public_base_url: String,
    /// Per-file upload size limit in bytes.
    pub max_blob_size: u64,
}

/// Which share-registry persistence strategy to run.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RegistryStrategy {
    /// One JSON document per share id. No writer coordination needed.
    PerRecord,
    /// All records in one shared index document, writers serialized.
    SharedIndex,
    /// In-memory only; shares do not survive a restart.
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RegistryConfig {
    pub strategy: RegistryStrategy,
    /// Directory (per-record) or index file (shared-index).
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub registry: RegistryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3001)?
            .set_default("storage.root_path", "./data/uploads")?
            .set_default("storage.public_base_url", "http://127.0.0.1:3001/uploads")?
            .set_default("storage.max_blob_size", 128 * 1024 * 1024)?
            .set_default("registry.strategy", "per-record")?
            .set_default("registry.path", "./data/shares")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., MESHSHARE__SERVER__PORT)
            .add_source(Environment::with_prefix("MESHSHARE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
