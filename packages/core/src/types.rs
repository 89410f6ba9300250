// ABOUTME: Personal access token entity persisted by every storage backend
// ABOUTME: Holds the digest, owner, abilities, and lifecycle timestamps of a token

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{ABILITY_LIST_SEPARATOR, ABILITY_WILDCARD};

/// Personal access token stored by a driver.
///
/// `token` is the digest of the client secret, never the secret itself.
/// `id` is 0 until a driver assigns one on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalAccessToken {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub name: Option<String>,
    pub abilities: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl PersonalAccessToken {
    /// Build an unsaved record; storage assigns the id
    pub fn new(
        user_id: i64,
        token: String,
        name: Option<String>,
        abilities: &[String],
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: 0,
            user_id,
            token,
            name,
            abilities: join_abilities(abilities),
            created_at,
            expires_at,
            last_used_at: None,
        }
    }

    /// Strict expiry check shared by storage and validation: expired only
    /// once `now` is after `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires_at) if now > expires_at)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn ability_list(&self) -> Vec<&str> {
        self.abilities
            .split(ABILITY_LIST_SEPARATOR)
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .collect()
    }

    /// Check whether this token grants `required`.
    ///
    /// Matches `*`, an exact ability, or a segment wildcard: with delimiter
    /// `:`, a granted `read:*` covers `read:posts` and `read:posts:drafts`.
    pub fn has_ability(&self, required: &str, delimiter: &str) -> bool {
        self.ability_list().into_iter().any(|granted| {
            if granted == ABILITY_WILDCARD || granted == required {
                return true;
            }

            let wildcard_suffix = format!("{}{}", delimiter, ABILITY_WILDCARD);
            match granted.strip_suffix(wildcard_suffix.as_str()) {
                Some(scope) => required
                    .strip_prefix(scope)
                    .is_some_and(|rest| rest.starts_with(delimiter)),
                None => false,
            }
        })
    }
}

/// Join an ability list into its persisted form
pub fn join_abilities(abilities: &[String]) -> String {
    abilities.join(&ABILITY_LIST_SEPARATOR.to_string())
}
