// ABOUTME: Encoding and parsing of the client-facing token string
// ABOUTME: Format is "<id>|<prefix><hex-secret><crc32c>", optionally presented as "Bearer <token>"

use thiserror::Error;

use crate::constants::{BEARER_PREFIX, CHECKSUM_HEX_LEN, TOKEN_SEPARATOR};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Invalid token format: expected 2 parts separated by '|', found {0}")]
    PartCount(usize),
}

/// Borrowed view of a client token split into its two halves.
///
/// `id` is only a hint for humans and external tooling; lookups always go
/// through the digest of `secret`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedToken<'a> {
    pub id: &'a str,
    pub secret: &'a str,
}

/// Build the secret half of a token from the configured prefix and the
/// hex-encoded random bytes, appending a CRC-32C checksum of `random_hex`.
pub fn compose_secret(prefix: &str, random_hex: &str) -> String {
    let crc = crc32c::crc32c(random_hex.as_bytes());
    format!("{}{}{:08x}", prefix, random_hex, crc)
}

/// Join a record id and a composed secret into the client-facing string
pub fn format_plain_token(id: i64, secret: &str) -> String {
    format!("{}{}{}", id, TOKEN_SEPARATOR, secret)
}

/// Split a presented token into id and secret.
///
/// A single leading `"Bearer "` is stripped first. Anything other than exactly
/// one separator is rejected.
pub fn parse_plain_token(raw: &str) -> Result<ParsedToken<'_>, FormatError> {
    let raw = raw.strip_prefix(BEARER_PREFIX).unwrap_or(raw);

    let parts: Vec<&str> = raw.split(TOKEN_SEPARATOR).collect();
    match parts.as_slice() {
        [id, secret] => Ok(ParsedToken { id, secret }),
        _ => Err(FormatError::PartCount(parts.len())),
    }
}

/// Check the trailing checksum of a secret without touching storage.
///
/// Useful for secret scanners that want to discard random look-alikes. Not
/// part of validation, which relies solely on the digest lookup.
pub fn checksum_matches(secret: &str, prefix: &str) -> bool {
    let Some(body) = secret.strip_prefix(prefix) else {
        return false;
    };
    if body.len() <= CHECKSUM_HEX_LEN || !body.is_ascii() {
        return false;
    }

    let (random_hex, checksum) = body.split_at(body.len() - CHECKSUM_HEX_LEN);
    let expected = format!("{:08x}", crc32c::crc32c(random_hex.as_bytes()));
    expected == checksum
}
