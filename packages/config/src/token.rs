// ABOUTME: Token policy configuration consumed by token generation and validation
// ABOUTME: Defaults, validation rules, and environment variable overlay for TokenConfig

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::constants;
use crate::error::ConfigError;

/// Smallest accepted number of random bytes per token
pub const MIN_TOKEN_LENGTH: usize = 16;
pub const DEFAULT_TOKEN_LENGTH: usize = 32;
pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_ABILITY_DELIMITER: &str = ":";

/// Signing algorithm for the signed-token mode. Only validated today; the
/// hash-lookup tokens issued by this crate are never signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SigningMethod {
    #[default]
    Hs256,
    Rs256,
}

impl fmt::Display for SigningMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningMethod::Hs256 => write!(f, "HS256"),
            SigningMethod::Rs256 => write!(f, "RS256"),
        }
    }
}

impl FromStr for SigningMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "HS256" => Ok(SigningMethod::Hs256),
            "RS256" => Ok(SigningMethod::Rs256),
            _ => Err(ConfigError::UnsupportedSigningMethod(s.to_string())),
        }
    }
}

/// Key material matching a [`SigningMethod`]
#[derive(Clone, PartialEq, Eq)]
pub enum SigningKey {
    Hmac(String),
    Rsa {
        private_key_pem: String,
        public_key_pem: String,
    },
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningKey::Hmac(_) => write!(f, "SigningKey::Hmac([redacted])"),
            SigningKey::Rsa { .. } => write!(f, "SigningKey::Rsa([redacted])"),
        }
    }
}

/// Token policy parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    /// Number of random bytes in each secret (hex-encoded to twice as many characters)
    pub token_length: usize,
    /// Prepended to every secret, e.g. `pk_`
    pub token_prefix: String,
    /// Token lifetime; `Duration::ZERO` means tokens never expire
    pub expire_after: Duration,
    pub signing_method: SigningMethod,
    pub signing_key: Option<SigningKey>,
    /// Separator between ability segments, e.g. `:` in `read:posts`
    pub ability_delimiter: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            token_length: DEFAULT_TOKEN_LENGTH,
            token_prefix: String::new(),
            expire_after: DEFAULT_EXPIRATION,
            signing_method: SigningMethod::Hs256,
            signing_key: None,
            ability_delimiter: DEFAULT_ABILITY_DELIMITER.to_string(),
        }
    }
}

impl TokenConfig {
    /// Load defaults overlaid with `TOKENKEEP_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Overlay values from an environment lookup. Unset variables keep the
    /// current value; set but unparseable ones are an error.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(constants::TOKENKEEP_TOKEN_LENGTH) {
            self.token_length = parse_env_value(constants::TOKENKEEP_TOKEN_LENGTH, &raw)?;
        }
        if let Some(prefix) = lookup(constants::TOKENKEEP_TOKEN_PREFIX) {
            self.token_prefix = prefix;
        }
        if let Some(raw) = lookup(constants::TOKENKEEP_EXPIRE_SECS) {
            let secs: u64 = parse_env_value(constants::TOKENKEEP_EXPIRE_SECS, &raw)?;
            self.expire_after = Duration::from_secs(secs);
        }
        if let Some(delimiter) = lookup(constants::TOKENKEEP_ABILITY_DELIMITER) {
            self.ability_delimiter = delimiter;
        }
        if let Some(raw) = lookup(constants::TOKENKEEP_SIGNING_METHOD) {
            self.signing_method = raw.parse()?;
        }
        self.apply_signing_env(&lookup);

        debug!(
            "Token config after environment overlay: length={}, expire_after={:?}, method={}",
            self.token_length, self.expire_after, self.signing_method
        );
        Ok(())
    }

    /// HS256 reads `TOKENKEEP_SIGNING_KEY`; RS256 reads the PEM pair from
    /// `TOKENKEEP_RSA_PRIVATE_KEY` and `TOKENKEEP_RSA_PUBLIC_KEY`.
    fn apply_signing_env<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        match self.signing_method {
            SigningMethod::Hs256 => {
                if let Some(key) = lookup(constants::TOKENKEEP_SIGNING_KEY) {
                    self.signing_key = Some(SigningKey::Hmac(key));
                }
            }
            SigningMethod::Rs256 => {
                let private_key = lookup(constants::TOKENKEEP_RSA_PRIVATE_KEY);
                let public_key = lookup(constants::TOKENKEEP_RSA_PUBLIC_KEY);
                if private_key.is_some() || public_key.is_some() {
                    self.signing_key = Some(SigningKey::Rsa {
                        private_key_pem: private_key.unwrap_or_default(),
                        public_key_pem: public_key.unwrap_or_default(),
                    });
                }
                if lookup(constants::TOKENKEEP_SIGNING_KEY).is_some() {
                    debug!("Ignoring {} for RS256", constants::TOKENKEEP_SIGNING_KEY);
                }
            }
        }
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_signing()?;

        if self.token_length < MIN_TOKEN_LENGTH {
            return Err(ConfigError::TokenLengthTooShort {
                min: MIN_TOKEN_LENGTH,
                actual: self.token_length,
            });
        }

        if self.token_prefix.contains('|') {
            return Err(ConfigError::InvalidPrefix(self.token_prefix.clone()));
        }

        if self.ability_delimiter.is_empty() || self.ability_delimiter.contains(',') {
            return Err(ConfigError::InvalidAbilityDelimiter(
                self.ability_delimiter.clone(),
            ));
        }

        self.expiry_from(Utc::now())?;
        Ok(())
    }

    fn validate_signing(&self) -> Result<(), ConfigError> {
        match (self.signing_method, &self.signing_key) {
            // Key material is optional until signed tokens exist, but if one
            // is supplied it has to be usable.
            (SigningMethod::Hs256, None) => Ok(()),
            (SigningMethod::Hs256, Some(SigningKey::Hmac(key))) if key.is_empty() => {
                Err(ConfigError::MissingHmacKey)
            }
            (SigningMethod::Hs256, Some(SigningKey::Hmac(_))) => Ok(()),
            (SigningMethod::Rs256, None) => Err(ConfigError::MissingRsaKeyPair),
            (
                SigningMethod::Rs256,
                Some(SigningKey::Rsa {
                    private_key_pem,
                    public_key_pem,
                }),
            ) => {
                if private_key_pem.is_empty() || public_key_pem.is_empty() {
                    Err(ConfigError::MissingRsaKeyPair)
                } else {
                    Ok(())
                }
            }
            (method, Some(_)) => Err(ConfigError::SigningKeyMismatch(method.to_string())),
        }
    }

    /// True when issued tokens never expire
    pub fn is_unlimited(&self) -> bool {
        self.expire_after.is_zero()
    }

    /// Absolute expiry for a token created at `now`, or `None` when unlimited
    pub fn expiry_from(&self, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>, ConfigError> {
        if self.is_unlimited() {
            return Ok(None);
        }

        let lifetime = chrono::Duration::from_std(self.expire_after)
            .map_err(|_| ConfigError::ExpirationOutOfRange)?;
        now.checked_add_signed(lifetime)
            .map(Some)
            .ok_or(ConfigError::ExpirationOutOfRange)
    }
}

fn parse_env_value<T: FromStr>(var: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidEnvValue {
            var: var.to_string(),
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::collections::HashMap;

    fn env_lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = TokenConfig::default();
        assert_eq!(config.token_length, 32);
        assert_eq!(config.expire_after, Duration::from_secs(86_400));
        assert_eq!(config.ability_delimiter, ":");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_token_length_below_minimum() {
        let config = TokenConfig {
            token_length: 10,
            ..TokenConfig::default()
        };

        let err = config.validate().unwrap_err();
        assert_eq!(
            err,
            ConfigError::TokenLengthTooShort {
                min: 16,
                actual: 10
            }
        );
        assert!(err.to_string().contains("minimum 16"));
    }

    #[test]
    fn test_token_length_at_minimum() {
        let config = TokenConfig {
            token_length: 16,
            ..TokenConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case(SigningMethod::Hs256, None, None)]
    #[case(
        SigningMethod::Hs256,
        Some(SigningKey::Hmac("secret".into())),
        None
    )]
    #[case(
        SigningMethod::Hs256,
        Some(SigningKey::Hmac(String::new())),
        Some(ConfigError::MissingHmacKey)
    )]
    #[case(SigningMethod::Rs256, None, Some(ConfigError::MissingRsaKeyPair))]
    #[case(
        SigningMethod::Rs256,
        Some(SigningKey::Rsa { private_key_pem: "priv".into(), public_key_pem: String::new() }),
        Some(ConfigError::MissingRsaKeyPair)
    )]
    #[case(
        SigningMethod::Rs256,
        Some(SigningKey::Rsa { private_key_pem: "priv".into(), public_key_pem: "pub".into() }),
        None
    )]
    #[case(
        SigningMethod::Rs256,
        Some(SigningKey::Hmac("secret".into())),
        Some(ConfigError::SigningKeyMismatch("RS256".into()))
    )]
    fn test_signing_validation(
        #[case] method: SigningMethod,
        #[case] key: Option<SigningKey>,
        #[case] expected: Option<ConfigError>,
    ) {
        let config = TokenConfig {
            signing_method: method,
            signing_key: key,
            ..TokenConfig::default()
        };
        assert_eq!(config.validate().err(), expected);
    }

    #[rstest]
    #[case("HS256", SigningMethod::Hs256)]
    #[case("hs256", SigningMethod::Hs256)]
    #[case("RS256", SigningMethod::Rs256)]
    fn test_signing_method_from_str(#[case] raw: &str, #[case] expected: SigningMethod) {
        assert_eq!(raw.parse::<SigningMethod>().unwrap(), expected);
    }

    #[test]
    fn test_unsupported_signing_method() {
        assert_eq!(
            "ES256".parse::<SigningMethod>(),
            Err(ConfigError::UnsupportedSigningMethod("ES256".to_string()))
        );
    }

    #[test]
    fn test_signing_key_debug_is_redacted() {
        let key = SigningKey::Hmac("super-secret".to_string());
        assert!(!format!("{:?}", key).contains("super-secret"));
    }

    #[test]
    fn test_prefix_with_separator_rejected() {
        let config = TokenConfig {
            token_prefix: "pk|".to_string(),
            ..TokenConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidPrefix("pk|".to_string()))
        );
    }

    #[rstest]
    #[case("")]
    #[case(",")]
    fn test_invalid_ability_delimiter(#[case] delimiter: &str) {
        let config = TokenConfig {
            ability_delimiter: delimiter.to_string(),
            ..TokenConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAbilityDelimiter(_))
        ));
    }

    #[test]
    fn test_unlimited_expiry() {
        let config = TokenConfig {
            expire_after: Duration::ZERO,
            ..TokenConfig::default()
        };
        assert!(config.is_unlimited());
        assert_eq!(config.expiry_from(Utc::now()).unwrap(), None);
    }

    #[test]
    fn test_expiry_from_adds_lifetime() {
        let config = TokenConfig::default();
        let now = Utc::now();
        let expires_at = config.expiry_from(now).unwrap().unwrap();
        assert_eq!(expires_at - now, chrono::Duration::hours(24));
    }

    #[test]
    fn test_expiry_out_of_range() {
        let config = TokenConfig {
            expire_after: Duration::from_secs(u64::MAX),
            ..TokenConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ExpirationOutOfRange));
    }

    #[test]
    fn test_apply_env_overrides() {
        let mut config = TokenConfig::default();
        config
            .apply_env(env_lookup(&[
                (constants::TOKENKEEP_TOKEN_LENGTH, "48"),
                (constants::TOKENKEEP_TOKEN_PREFIX, "pk_"),
                (constants::TOKENKEEP_EXPIRE_SECS, "0"),
                (constants::TOKENKEEP_SIGNING_KEY, "env-key"),
                (constants::TOKENKEEP_ABILITY_DELIMITER, "."),
            ]))
            .unwrap();

        assert_eq!(config.token_length, 48);
        assert_eq!(config.token_prefix, "pk_");
        assert!(config.is_unlimited());
        assert_eq!(
            config.signing_key,
            Some(SigningKey::Hmac("env-key".to_string()))
        );
        assert_eq!(config.ability_delimiter, ".");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_apply_env_rs256_reads_pem_pair() {
        let mut config = TokenConfig::default();
        config
            .apply_env(env_lookup(&[
                (constants::TOKENKEEP_SIGNING_METHOD, "RS256"),
                (constants::TOKENKEEP_SIGNING_KEY, "stray-hmac-key"),
                (constants::TOKENKEEP_RSA_PRIVATE_KEY, "private-pem"),
                (constants::TOKENKEEP_RSA_PUBLIC_KEY, "public-pem"),
            ]))
            .unwrap();

        assert_eq!(config.signing_method, SigningMethod::Rs256);
        assert_eq!(
            config.signing_key,
            Some(SigningKey::Rsa {
                private_key_pem: "private-pem".to_string(),
                public_key_pem: "public-pem".to_string(),
            })
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_apply_env_rs256_ignores_hmac_key() {
        let mut config = TokenConfig::default();
        config
            .apply_env(env_lookup(&[
                (constants::TOKENKEEP_SIGNING_METHOD, "RS256"),
                (constants::TOKENKEEP_SIGNING_KEY, "stray-hmac-key"),
            ]))
            .unwrap();

        assert_eq!(config.signing_key, None);
        assert_eq!(config.validate(), Err(ConfigError::MissingRsaKeyPair));
    }

    #[test]
    fn test_apply_env_keeps_unset_values() {
        let mut config = TokenConfig::default();
        config.apply_env(env_lookup(&[])).unwrap();
        assert_eq!(config, TokenConfig::default());
    }

    #[test]
    fn test_apply_env_invalid_number() {
        let mut config = TokenConfig::default();
        let err = config
            .apply_env(env_lookup(&[(constants::TOKENKEEP_TOKEN_LENGTH, "lots")]))
            .unwrap_err();

        assert_eq!(
            err,
            ConfigError::InvalidEnvValue {
                var: constants::TOKENKEEP_TOKEN_LENGTH.to_string(),
                value: "lots".to_string(),
            }
        );
    }
}
