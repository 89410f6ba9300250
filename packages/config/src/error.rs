// ABOUTME: Error types for token configuration validation
// ABOUTME: Covers signing parameters, token length, delimiters, and environment parsing

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unsupported signing method: {0}")]
    UnsupportedSigningMethod(String),

    #[error("Missing HMAC signing key")]
    MissingHmacKey,

    #[error("Missing RSA key pair")]
    MissingRsaKeyPair,

    #[error("Signing key does not match signing method {0}")]
    SigningKeyMismatch(String),

    #[error("Token length too short: {actual} bytes (minimum {min})")]
    TokenLengthTooShort { min: usize, actual: usize },

    #[error("Invalid token prefix '{0}': must not contain '|'")]
    InvalidPrefix(String),

    #[error("Invalid ability delimiter '{0}': must be non-empty and must not contain ','")]
    InvalidAbilityDelimiter(String),

    #[error("Token expiration is out of range")]
    ExpirationOutOfRange,

    #[error("Invalid value '{value}' for environment variable {var}")]
    InvalidEnvValue { var: String, value: String },
}
