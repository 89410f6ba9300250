/// Separator between the record id and the secret in a client-facing token
pub const TOKEN_SEPARATOR: char = '|';

/// Optional scheme prefix accepted when a token is presented for validation
pub const BEARER_PREFIX: &str = "Bearer ";

/// Separator used when persisting the ability list as a single string.
/// Independent of the configurable ability segment delimiter (`read:posts`).
pub const ABILITY_LIST_SEPARATOR: char = ',';

/// Ability granting every permission
pub const ABILITY_WILDCARD: &str = "*";

/// Length of a hex-encoded SHA-256 digest
pub const DIGEST_HEX_LEN: usize = 64;

/// Length of the hex-encoded CRC-32C checksum appended to every secret
pub const CHECKSUM_HEX_LEN: usize = 8;

/// Maximum length of a token display name (matches the persisted column width)
pub const MAX_NAME_LEN: usize = 100;
