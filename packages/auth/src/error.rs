// ABOUTME: Error types for token issuing, validation, and revocation
// ABOUTME: Classifies every failure into exactly one variant, mapping storage errors onto token errors

use thiserror::Error;

use tokenkeep_config::ConfigError;
use tokenkeep_core::FormatError;
use tokenkeep_storage::StorageError;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    #[error("Invalid token options: {0}")]
    InvalidOptions(String),

    #[error("Invalid token format")]
    InvalidFormat,

    #[error("Token not found")]
    TokenNotFound,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token is invalid")]
    TokenInvalid,

    #[error("Storage driver cannot be nil")]
    StorageDriverNil,

    #[error("Storage error: {0}")]
    Storage(StorageError),

    #[error("Secure random source failed: {0}")]
    RandomSource(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl From<StorageError> for AuthError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound => AuthError::TokenNotFound,
            StorageError::Expired => AuthError::TokenExpired,
            other => AuthError::Storage(other),
        }
    }
}

impl From<FormatError> for AuthError {
    fn from(_: FormatError) -> Self {
        AuthError::InvalidFormat
    }
}
