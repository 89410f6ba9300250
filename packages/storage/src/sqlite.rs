// ABOUTME: SQLite token driver backed by an sqlx connection pool
// ABOUTME: Persists tokens in personal_access_tokens, keyed by id with a unique digest index

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, error, info};

use tokenkeep_core::PersonalAccessToken;

use crate::{StorageError, StorageResult, TokenDriver};

/// SQLite connection settings
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    pub path: PathBuf,
    pub enable_wal: bool,
    pub max_connections: u32,
    pub busy_timeout_seconds: u64,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("tokenkeep.db"),
            enable_wal: true,
            max_connections: 10,
            busy_timeout_seconds: 30,
        }
    }
}

impl SqliteConfig {
    /// Single-connection in-memory database; every pool gets its own data
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::from(":memory:"),
            enable_wal: false, // WAL mode not supported for in-memory databases
            max_connections: 1,
            busy_timeout_seconds: 5,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == ":memory:"
    }

    /// Pool settings for this database. An in-memory database lives only as
    /// long as its connection, so that connection is never reaped.
    fn pool_options(&self) -> SqlitePoolOptions {
        let options = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(std::time::Duration::from_secs(self.busy_timeout_seconds));

        if self.is_in_memory() {
            options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            options
        }
    }
}

/// SQLite implementation of [`TokenDriver`]
pub struct SqliteDriver {
    pool: SqlitePool,
}

impl SqliteDriver {
    /// Open (creating if needed) the database described by `config`.
    /// Call [`SqliteDriver::initialize`] before use to apply migrations.
    pub async fn new(config: SqliteConfig) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent).map_err(StorageError::Io)?;
        }

        let database_url = format!("sqlite:{}", config.path.display());

        if !sqlx::Sqlite::database_exists(&database_url)
            .await
            .map_err(StorageError::Sqlx)?
        {
            debug!("Creating database at: {}", database_url);
            sqlx::Sqlite::create_database(&database_url)
                .await
                .map_err(StorageError::Sqlx)?;
        }

        let pool = config
            .pool_options()
            .connect(&database_url)
            .await
            .map_err(StorageError::Sqlx)?;

        if config.enable_wal {
            sqlx::query("PRAGMA journal_mode = WAL")
                .execute(&pool)
                .await
                .map_err(StorageError::Sqlx)?;
        }

        sqlx::query("PRAGMA synchronous = NORMAL")
            .execute(&pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool, e.g. one shared with the rest of an application
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Apply schema migrations
    pub async fn initialize(&self) -> StorageResult<()> {
        info!("Initializing SQLite token storage with migrations");

        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(StorageError::Migration)?;

        info!("SQLite token storage initialized successfully");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Convert a database row to a PersonalAccessToken
    fn row_to_token(row: &SqliteRow) -> StorageResult<PersonalAccessToken> {
        let created_at: String = row.try_get("created_at")?;
        let expires_at: Option<String> = row.try_get("expires_at")?;
        let last_used_at: Option<String> = row.try_get("last_used_at")?;

        Ok(PersonalAccessToken {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            token: row.try_get("token")?,
            name: row.try_get("name")?,
            abilities: row.try_get("abilities")?,
            created_at: parse_timestamp("created_at", &created_at)?,
            expires_at: expires_at
                .map(|t| parse_timestamp("expires_at", &t))
                .transpose()?,
            last_used_at: last_used_at
                .map(|t| parse_timestamp("last_used_at", &t))
                .transpose()?,
        })
    }

    fn check_expiry(token: PersonalAccessToken) -> StorageResult<PersonalAccessToken> {
        if token.is_expired_at(Utc::now()) {
            debug!("Token {} is expired", token.id);
            return Err(StorageError::Expired);
        }
        Ok(token)
    }
}

fn parse_timestamp(column: &str, value: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| StorageError::Database(format!("Invalid {} timestamp", column)))
}

#[async_trait]
impl TokenDriver for SqliteDriver {
    async fn store_token(
        &self,
        mut token: PersonalAccessToken,
    ) -> StorageResult<PersonalAccessToken> {
        debug!("Storing token for user {}", token.user_id);

        if token.id < 0 {
            return Err(StorageError::Database(format!("invalid token id {}", token.id)));
        }

        // NULL lets SQLite assign the next AUTOINCREMENT id
        let explicit_id = (token.id != 0).then_some(token.id);

        let result = sqlx::query(
            r#"
            INSERT INTO personal_access_tokens (
                id, user_id, token, name, abilities,
                created_at, expires_at, last_used_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(explicit_id)
        .bind(token.user_id)
        .bind(&token.token)
        .bind(&token.name)
        .bind(&token.abilities)
        .bind(token.created_at.to_rfc3339())
        .bind(token.expires_at.map(|t| t.to_rfc3339()))
        .bind(token.last_used_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StorageError::Duplicate(db.message().to_string())
            }
            e => {
                error!("Failed to store token: {}", e);
                StorageError::Sqlx(e)
            }
        })?;

        token.id = result.last_insert_rowid();
        debug!("Stored token {}", token.id);
        Ok(token)
    }

    async fn find_by_hash(&self, digest: &str) -> StorageResult<PersonalAccessToken> {
        let row = sqlx::query("SELECT * FROM personal_access_tokens WHERE token = ?")
            .bind(digest)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;

        Self::check_expiry(Self::row_to_token(&row)?)
    }

    async fn find_by_id(&self, id: i64) -> StorageResult<PersonalAccessToken> {
        let row = sqlx::query("SELECT * FROM personal_access_tokens WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;

        Self::check_expiry(Self::row_to_token(&row)?)
    }

    async fn revoke_token(&self, digest: &str) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM personal_access_tokens WHERE token = ?")
            .bind(digest)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        debug!("Revoked token");
        Ok(())
    }

    async fn touch_last_used(&self, id: i64) -> StorageResult<()> {
        let result =
            sqlx::query("UPDATE personal_access_tokens SET last_used_at = ? WHERE id = ?")
                .bind(Utc::now().to_rfc3339())
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
