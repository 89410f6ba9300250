// ABOUTME: Storage layer for personal access tokens
// ABOUTME: Defines the TokenDriver trait with in-memory and SQLite implementations

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use tokenkeep_core::PersonalAccessToken;

pub mod factory;
pub mod memory;
pub mod sqlite;

pub use factory::{StorageFactory, StorageKind};
pub use memory::MemoryDriver;
pub use sqlite::{SqliteConfig, SqliteDriver};

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Token not found")]
    NotFound,
    #[error("Token expired")]
    Expired,
    #[error("Duplicate token: {0}")]
    Duplicate(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid storage configuration: {0}")]
    InvalidFormat(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence backend for personal access tokens.
///
/// Every implementation must report missing records as
/// [`StorageError::NotFound`] and records past their `expires_at` as
/// [`StorageError::Expired`] (strictly after, see
/// [`PersonalAccessToken::is_expired_at`]) so callers stay storage-agnostic.
#[async_trait]
pub trait TokenDriver: Send + Sync {
    /// Insert a new record, assigning `id` when it is 0. Returns the stored
    /// record. An existing digest is never overwritten.
    async fn store_token(&self, token: PersonalAccessToken) -> StorageResult<PersonalAccessToken>;

    async fn find_by_hash(&self, digest: &str) -> StorageResult<PersonalAccessToken>;

    async fn find_by_id(&self, id: i64) -> StorageResult<PersonalAccessToken>;

    /// Delete the record with this digest. Fails with `NotFound` when it is
    /// already gone.
    async fn revoke_token(&self, digest: &str) -> StorageResult<()>;

    /// Set `last_used_at` to now
    async fn touch_last_used(&self, id: i64) -> StorageResult<()>;
}

/// Driver handle shared between the generator, validator, and background touches
pub type SharedDriver = Arc<dyn TokenDriver>;
