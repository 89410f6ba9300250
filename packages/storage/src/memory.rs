// ABOUTME: In-memory token driver for tests and single-process deployments
// ABOUTME: Two indices (by id, by digest) guarded by a single reader/writer lock

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use tokenkeep_core::PersonalAccessToken;

use crate::{StorageError, StorageResult, TokenDriver};

/// Both indices live behind one lock so they can never disagree. `by_id`
/// owns the records and `by_hash` maps each digest to its id.
#[derive(Debug)]
struct TokenIndex {
    by_id: HashMap<i64, PersonalAccessToken>,
    by_hash: HashMap<String, i64>,
    next_id: i64,
}

impl TokenIndex {
    fn new() -> Self {
        Self {
            by_id: HashMap::new(),
            by_hash: HashMap::new(),
            next_id: 1,
        }
    }
}

/// In-memory implementation of [`TokenDriver`].
///
/// Lookups take the read lock; store, revoke, and touch take the write lock.
/// Ids come from a counter that only moves forward, so an id is never handed
/// out twice during the lifetime of the driver, even after deletion.
#[derive(Debug)]
pub struct MemoryDriver {
    index: RwLock<TokenIndex>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self {
            index: RwLock::new(TokenIndex::new()),
        }
    }

    /// Number of stored records, expired ones included
    pub async fn len(&self) -> usize {
        self.index.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_expiry(token: &PersonalAccessToken) -> StorageResult<PersonalAccessToken> {
        if token.is_expired_at(Utc::now()) {
            debug!("Token {} is expired", token.id);
            return Err(StorageError::Expired);
        }
        Ok(token.clone())
    }
}

impl Default for MemoryDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenDriver for MemoryDriver {
    async fn store_token(
        &self,
        mut token: PersonalAccessToken,
    ) -> StorageResult<PersonalAccessToken> {
        let mut index = self.index.write().await;

        if index.by_hash.contains_key(&token.token) {
            return Err(StorageError::Duplicate("token digest already stored".to_string()));
        }

        if token.id < 0 {
            return Err(StorageError::Database(format!("invalid token id {}", token.id)));
        }
        if token.id == 0 {
            token.id = index.next_id;
        } else if index.by_id.contains_key(&token.id) {
            return Err(StorageError::Duplicate(format!("token id {}", token.id)));
        }

        // The counter must stay ahead of every stored id
        let following = token
            .id
            .checked_add(1)
            .ok_or_else(|| StorageError::Database("token id space exhausted".to_string()))?;
        index.next_id = index.next_id.max(following);

        debug!("Storing token {} for user {}", token.id, token.user_id);
        index.by_hash.insert(token.token.clone(), token.id);
        index.by_id.insert(token.id, token.clone());

        Ok(token)
    }

    async fn find_by_hash(&self, digest: &str) -> StorageResult<PersonalAccessToken> {
        let index = self.index.read().await;

        let token = index
            .by_hash
            .get(digest)
            .and_then(|id| index.by_id.get(id))
            .ok_or(StorageError::NotFound)?;

        Self::check_expiry(token)
    }

    async fn find_by_id(&self, id: i64) -> StorageResult<PersonalAccessToken> {
        let index = self.index.read().await;
        let token = index.by_id.get(&id).ok_or(StorageError::NotFound)?;
        Self::check_expiry(token)
    }

    async fn revoke_token(&self, digest: &str) -> StorageResult<()> {
        let mut index = self.index.write().await;

        let id = index.by_hash.remove(digest).ok_or(StorageError::NotFound)?;
        index.by_id.remove(&id);

        debug!("Revoked token {}", id);
        Ok(())
    }

    async fn touch_last_used(&self, id: i64) -> StorageResult<()> {
        let mut index = self.index.write().await;
        let token = index.by_id.get_mut(&id).ok_or(StorageError::NotFound)?;
        token.last_used_at = Some(Utc::now());
        Ok(())
    }
}
