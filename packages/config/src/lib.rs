// ABOUTME: Token policy configuration for Tokenkeep
// ABOUTME: Provides TokenConfig with defaults, validation, and environment variable overlay

pub mod constants;
pub mod error;
pub mod token;

pub use error::ConfigError;
pub use token::{
    SigningKey, SigningMethod, TokenConfig, DEFAULT_ABILITY_DELIMITER, DEFAULT_EXPIRATION,
    DEFAULT_TOKEN_LENGTH, MIN_TOKEN_LENGTH,
};
