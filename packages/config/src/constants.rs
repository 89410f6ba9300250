// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names read by Tokenkeep

// Token Generation
pub const TOKENKEEP_TOKEN_LENGTH: &str = "TOKENKEEP_TOKEN_LENGTH";
pub const TOKENKEEP_TOKEN_PREFIX: &str = "TOKENKEEP_TOKEN_PREFIX";
pub const TOKENKEEP_EXPIRE_SECS: &str = "TOKENKEEP_EXPIRE_SECS";
pub const TOKENKEEP_ABILITY_DELIMITER: &str = "TOKENKEEP_ABILITY_DELIMITER";

// Signing (reserved for signed tokens)
pub const TOKENKEEP_SIGNING_METHOD: &str = "TOKENKEEP_SIGNING_METHOD";
pub const TOKENKEEP_SIGNING_KEY: &str = "TOKENKEEP_SIGNING_KEY";
pub const TOKENKEEP_RSA_PRIVATE_KEY: &str = "TOKENKEEP_RSA_PRIVATE_KEY";
pub const TOKENKEEP_RSA_PUBLIC_KEY: &str = "TOKENKEEP_RSA_PUBLIC_KEY";

// Storage
pub const TOKENKEEP_DATABASE_URL: &str = "TOKENKEEP_DATABASE_URL";
