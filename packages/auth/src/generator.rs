// ABOUTME: Issues new personal access tokens
// ABOUTME: Draws a CSPRNG secret, appends its checksum, stores only the digest, returns "<id>|<secret>"

use std::sync::Arc;

use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{debug, info};

use tokenkeep_config::TokenConfig;
use tokenkeep_core::{compose_secret, format_plain_token, hash_token, PersonalAccessToken};
use tokenkeep_storage::SharedDriver;

use crate::error::{AuthError, AuthResult};
use crate::options::TokenOptions;

/// A freshly issued token.
///
/// This is the ONLY time the plaintext is available; storage keeps the digest.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// `"<id>|<secret>"`, handed to the client once
    pub plain_text: String,
    /// The stored record, id assigned
    pub token: PersonalAccessToken,
}

pub struct Generator {
    config: Arc<TokenConfig>,
    storage: Option<SharedDriver>,
}

impl Generator {
    pub fn new(config: Arc<TokenConfig>, storage: Option<SharedDriver>) -> Self {
        Self { config, storage }
    }

    pub async fn create(&self, opts: &TokenOptions) -> AuthResult<IssuedToken> {
        let storage = self.storage.as_ref().ok_or(AuthError::StorageDriverNil)?;
        opts.validate()?;

        let secret = self.generate_secret()?;
        let digest = hash_token(&secret);

        let now = Utc::now();
        let expires_at = self.config.expiry_from(now)?;

        let record = PersonalAccessToken::new(
            opts.user_id,
            digest,
            opts.name.clone(),
            &opts.abilities,
            now,
            expires_at,
        );

        let stored = storage.store_token(record).await?;
        info!(
            "Issued token {} for user {} (expires: {:?})",
            stored.id, stored.user_id, stored.expires_at
        );

        Ok(IssuedToken {
            plain_text: format_plain_token(stored.id, &secret),
            token: stored,
        })
    }

    /// `<prefix><hex of token_length random bytes><crc32c>`.
    ///
    /// Only the OS generator is used; if it fails, issuing fails.
    fn generate_secret(&self) -> AuthResult<String> {
        let mut buf = vec![0u8; self.config.token_length];
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|e| AuthError::RandomSource(e.to_string()))?;

        debug!("Generated {} random bytes for new token", buf.len());
        Ok(compose_secret(&self.config.token_prefix, &hex::encode(&buf)))
    }
}
