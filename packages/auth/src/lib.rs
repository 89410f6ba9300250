// ABOUTME: Tokenkeep authentication library for opaque personal access tokens
// ABOUTME: Issues, validates, and revokes tokens against a pluggable storage driver

pub mod client;
pub mod error;
pub mod generator;
pub mod options;
pub mod revoker;
pub mod touch;
pub mod validator;

// Re-export main types
pub use client::{ClientBuilder, TokenClient};
pub use error::{AuthError, AuthResult};
pub use generator::{Generator, IssuedToken};
pub use options::TokenOptions;
pub use revoker::Revoker;
pub use touch::TouchScheduler;
pub use validator::Validator;

pub use tokenkeep_config::{ConfigError, SigningKey, SigningMethod, TokenConfig};
pub use tokenkeep_core::PersonalAccessToken;
pub use tokenkeep_storage::{SharedDriver, StorageError, TokenDriver};
pub use tokio_util::sync::CancellationToken;
