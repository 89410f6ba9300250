// ABOUTME: Revokes personal access tokens
// ABOUTME: A token must pass full validation before its record is deleted by digest

use std::sync::Arc;

use tracing::info;

use crate::error::AuthResult;
use crate::validator::Validator;

pub struct Revoker {
    validator: Arc<Validator>,
}

impl Revoker {
    pub fn new(validator: Arc<Validator>) -> Self {
        Self { validator }
    }

    /// Validate then delete. Invalid, expired, or already revoked tokens fail
    /// with the validator's error, so revoking twice is an error.
    pub async fn revoke(&self, raw: &str) -> AuthResult<()> {
        let storage = self.validator.storage()?;
        let record = self.validator.inspect(raw).await?;

        storage.revoke_token(&record.token).await?;
        info!("Revoked token {} for user {}", record.id, record.user_id);
        Ok(())
    }
}
