// ABOUTME: Core types and primitives for Tokenkeep personal access tokens
// ABOUTME: Foundational package providing the token entity, hashing, and token string encoding

pub mod constants;
pub mod format;
pub mod hasher;
pub mod types;

// Re-export main types
pub use types::PersonalAccessToken;

// Re-export constants
pub use constants::{
    ABILITY_LIST_SEPARATOR, ABILITY_WILDCARD, BEARER_PREFIX, DIGEST_HEX_LEN, MAX_NAME_LEN,
    TOKEN_SEPARATOR,
};

// Re-export hashing and encoding
pub use format::{
    checksum_matches, compose_secret, format_plain_token, parse_plain_token, FormatError,
    ParsedToken,
};
pub use hasher::hash_token;
