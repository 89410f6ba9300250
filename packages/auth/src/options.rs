// ABOUTME: Request type for issuing a personal access token
// ABOUTME: Carries owner, display name, and abilities, and validates them before generation

use tokenkeep_core::{ABILITY_LIST_SEPARATOR, MAX_NAME_LEN};

use crate::error::{AuthError, AuthResult};

/// What to issue a token for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenOptions {
    pub user_id: i64,
    pub name: Option<String>,
    pub abilities: Vec<String>,
}

impl TokenOptions {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_abilities<I, S>(mut self, abilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.abilities = abilities.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> AuthResult<()> {
        if self.user_id <= 0 {
            return Err(AuthError::InvalidOptions(format!(
                "user id must be positive, got {}",
                self.user_id
            )));
        }

        if let Some(name) = &self.name {
            if name.chars().count() > MAX_NAME_LEN {
                return Err(AuthError::InvalidOptions(format!(
                    "name exceeds {} characters",
                    MAX_NAME_LEN
                )));
            }
        }

        // Abilities are persisted comma-joined, so a comma inside one would
        // silently split it into two.
        for ability in &self.abilities {
            if ability.trim().is_empty() {
                return Err(AuthError::InvalidOptions("ability cannot be empty".to_string()));
            }
            if ability.contains(ABILITY_LIST_SEPARATOR) {
                return Err(AuthError::InvalidOptions(format!(
                    "ability '{}' must not contain '{}'",
                    ability, ABILITY_LIST_SEPARATOR
                )));
            }
        }

        Ok(())
    }
}
