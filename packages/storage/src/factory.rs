use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use tokenkeep_config::constants::TOKENKEEP_DATABASE_URL;

use super::{
    MemoryDriver, SharedDriver, SqliteConfig, SqliteDriver, StorageError, StorageResult,
};

/// Which backend a driver should be built for
#[derive(Debug, Clone)]
pub enum StorageKind {
    Memory,
    Sqlite(SqliteConfig),
}

/// Factory for creating storage drivers
pub struct StorageFactory;

impl StorageFactory {
    /// Create a driver, running migrations for relational backends
    pub async fn create_driver(kind: StorageKind) -> StorageResult<SharedDriver> {
        debug!("Creating token storage: {:?}", kind);

        match kind {
            StorageKind::Memory => {
                info!("Using in-memory token storage");
                Ok(Arc::new(MemoryDriver::new()))
            }
            StorageKind::Sqlite(config) => {
                info!("Initializing SQLite token storage at: {:?}", config.path);
                let driver = SqliteDriver::new(config).await?;
                driver.initialize().await?;
                Ok(Arc::new(driver))
            }
        }
    }

    /// Create a driver from a URL: `memory` or `sqlite:<path>`
    pub async fn from_url(url: &str) -> StorageResult<SharedDriver> {
        Self::create_driver(Self::parse_url(url)?).await
    }

    /// Create a driver from `TOKENKEEP_DATABASE_URL`, defaulting to memory
    pub async fn from_env() -> StorageResult<SharedDriver> {
        match std::env::var(TOKENKEEP_DATABASE_URL) {
            Ok(url) => Self::from_url(&url).await,
            Err(_) => Self::create_driver(StorageKind::Memory).await,
        }
    }

    fn parse_url(url: &str) -> StorageResult<StorageKind> {
        if url == "memory" {
            return Ok(StorageKind::Memory);
        }

        match url.strip_prefix("sqlite:") {
            Some(":memory:") => Ok(StorageKind::Sqlite(SqliteConfig::in_memory())),
            Some(path) if !path.is_empty() => Ok(StorageKind::Sqlite(SqliteConfig {
                path: PathBuf::from(path.trim_start_matches("//")),
                ..SqliteConfig::default()
            })),
            _ => Err(StorageError::InvalidFormat(format!(
                "Unsupported database URL: {}",
                url
            ))),
        }
    }
}
