// ABOUTME: Validates client-presented personal access tokens
// ABOUTME: Parses "<id>|<secret>", looks up by digest, re-checks digest and expiry, then schedules a touch

use chrono::Utc;
use subtle::ConstantTimeEq;
use tracing::warn;

use tokenkeep_core::{hash_token, parse_plain_token, PersonalAccessToken};
use tokenkeep_storage::SharedDriver;

use crate::error::{AuthError, AuthResult};
use crate::touch::TouchScheduler;

pub struct Validator {
    storage: Option<SharedDriver>,
    touches: TouchScheduler,
}

impl Validator {
    pub fn new(storage: Option<SharedDriver>, touches: TouchScheduler) -> Self {
        Self { storage, touches }
    }

    /// Validate a token and record its use.
    ///
    /// The last-used update runs in the background; the returned record
    /// carries the previous `last_used_at`.
    pub async fn validate(&self, raw: &str) -> AuthResult<PersonalAccessToken> {
        let storage = self.storage()?;
        let record = self.lookup(raw).await?;

        self.touches.schedule(storage.clone(), record.id);
        Ok(record)
    }

    /// Run every validation check without recording use
    pub async fn inspect(&self, raw: &str) -> AuthResult<PersonalAccessToken> {
        self.lookup(raw).await
    }

    pub(crate) fn storage(&self) -> AuthResult<&SharedDriver> {
        self.storage.as_ref().ok_or(AuthError::StorageDriverNil)
    }

    async fn lookup(&self, raw: &str) -> AuthResult<PersonalAccessToken> {
        let storage = self.storage()?;

        // The id half is never trusted for lookup
        let parsed = parse_plain_token(raw).map_err(|e| {
            warn!("Rejecting malformed token: {}", e);
            AuthError::from(e)
        })?;
        let digest = hash_token(parsed.secret);

        let record = storage.find_by_hash(&digest).await.map_err(|e| {
            let err = AuthError::from(e);
            if matches!(err, AuthError::TokenNotFound | AuthError::TokenExpired) {
                warn!("Rejecting token presented with id {}: {}", parsed.id, err);
            }
            err
        })?;

        // Guard against a driver returning the wrong row
        if !bool::from(record.token.as_bytes().ct_eq(digest.as_bytes())) {
            warn!("Storage returned token {} for a different digest", record.id);
            return Err(AuthError::TokenInvalid);
        }

        if record.is_expired_at(Utc::now()) {
            warn!("Rejecting token {}: expired at {:?}", record.id, record.expires_at);
            return Err(AuthError::TokenExpired);
        }

        Ok(record)
    }
}
