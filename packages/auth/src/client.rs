// ABOUTME: Explicit token client composing generator, validator, and revoker
// ABOUTME: Built once from a validated TokenConfig and a storage driver, then cloned freely

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use tokenkeep_config::{SigningKey, SigningMethod, TokenConfig};
use tokenkeep_core::PersonalAccessToken;
use tokenkeep_storage::{MemoryDriver, SharedDriver};

use crate::error::{AuthError, AuthResult};
use crate::generator::{Generator, IssuedToken};
use crate::options::TokenOptions;
use crate::revoker::Revoker;
use crate::touch::TouchScheduler;
use crate::validator::Validator;

/// Issues, validates, and revokes personal access tokens.
///
/// Cloning is cheap and clones share storage and background touches. Every
/// operation checks the client's cancellation token before it touches
/// storage; once a storage call is issued it runs to completion.
#[derive(Clone)]
pub struct TokenClient {
    config: Arc<TokenConfig>,
    generator: Arc<Generator>,
    validator: Arc<Validator>,
    revoker: Arc<Revoker>,
    touches: TouchScheduler,
    cancel: CancellationToken,
}

impl TokenClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Same client, observing a different cancellation signal
    pub fn with_cancellation(&self, cancel: CancellationToken) -> Self {
        Self {
            cancel,
            ..self.clone()
        }
    }

    pub async fn create_token(&self, opts: &TokenOptions) -> AuthResult<IssuedToken> {
        self.ensure_active()?;
        self.generator.create(opts).await
    }

    pub async fn validate_token(&self, raw: &str) -> AuthResult<PersonalAccessToken> {
        self.ensure_active()?;
        self.validator.validate(raw).await
    }

    /// Look a token up with full validation but without recording use
    pub async fn token_info(&self, raw: &str) -> AuthResult<PersonalAccessToken> {
        self.ensure_active()?;
        self.validator.inspect(raw).await
    }

    pub async fn revoke_token(&self, raw: &str) -> AuthResult<()> {
        self.ensure_active()?;
        self.revoker.revoke(raw).await
    }

    /// Wait for pending last-used updates, e.g. before shutdown or in tests
    pub async fn wait_for_background_tasks(&self) {
        self.touches.wait_idle().await;
    }

    fn ensure_active(&self) -> AuthResult<()> {
        if self.cancel.is_cancelled() {
            debug!("Operation skipped: client cancelled");
            return Err(AuthError::Cancelled);
        }
        Ok(())
    }
}

/// Builder for [`TokenClient`]
#[derive(Default)]
pub struct ClientBuilder {
    config: TokenConfig,
    storage: Option<SharedDriver>,
    cancel: Option<CancellationToken>,
}

impl ClientBuilder {
    /// Replace the whole configuration
    pub fn with_config(mut self, config: TokenConfig) -> Self {
        self.config = config;
        self
    }

    /// Use HS256 with the given secret
    pub fn with_signing_key(mut self, key: impl Into<String>) -> Self {
        self.config.signing_method = SigningMethod::Hs256;
        self.config.signing_key = Some(SigningKey::Hmac(key.into()));
        self
    }

    /// Use RS256 with a PEM-encoded key pair
    pub fn with_rsa_keys(
        mut self,
        private_key_pem: impl Into<String>,
        public_key_pem: impl Into<String>,
    ) -> Self {
        self.config.signing_method = SigningMethod::Rs256;
        self.config.signing_key = Some(SigningKey::Rsa {
            private_key_pem: private_key_pem.into(),
            public_key_pem: public_key_pem.into(),
        });
        self
    }

    pub fn with_token_length(mut self, length: usize) -> Self {
        self.config.token_length = length;
        self
    }

    pub fn with_token_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.token_prefix = prefix.into();
        self
    }

    /// Token lifetime; `Duration::ZERO` issues tokens that never expire
    pub fn with_expiration(mut self, expire_after: Duration) -> Self {
        self.config.expire_after = expire_after;
        self
    }

    pub fn with_ability_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.config.ability_delimiter = delimiter.into();
        self
    }

    pub fn with_storage(mut self, storage: SharedDriver) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_memory_storage(self) -> Self {
        self.with_storage(Arc::new(MemoryDriver::new()))
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Validate the configuration and assemble the client. Without explicit
    /// storage, tokens live in a fresh [`MemoryDriver`].
    pub fn build(self) -> AuthResult<TokenClient> {
        self.config.validate()?;

        let storage = self.storage.unwrap_or_else(|| {
            debug!("No storage configured, using in-memory driver");
            Arc::new(MemoryDriver::new())
        });

        let config = Arc::new(self.config);
        let touches = TouchScheduler::new();
        let validator = Arc::new(Validator::new(Some(storage.clone()), touches.clone()));

        Ok(TokenClient {
            generator: Arc::new(Generator::new(config.clone(), Some(storage))),
            revoker: Arc::new(Revoker::new(validator.clone())),
            validator,
            touches,
            config,
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}
