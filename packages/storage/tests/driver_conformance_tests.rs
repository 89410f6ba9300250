// ABOUTME: Conformance tests shared by every token storage driver
// ABOUTME: Runs the same lifecycle, expiry, and error scenarios against memory and SQLite

use std::sync::Arc;

use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

use tokenkeep_core::{hash_token, PersonalAccessToken};
use tokenkeep_storage::{
    SharedDriver, SqliteConfig, StorageError, StorageFactory, StorageKind, TokenDriver,
};

/// Every backend under test, plus the temp dir keeping the SQLite file alive
async fn drivers() -> (Vec<(&'static str, SharedDriver)>, TempDir) {
    let temp_dir = TempDir::new().unwrap();

    let memory = StorageFactory::create_driver(StorageKind::Memory)
        .await
        .unwrap();

    let sqlite = StorageFactory::create_driver(StorageKind::Sqlite(SqliteConfig {
        path: temp_dir.path().join("tokens.db"),
        max_connections: 4,
        ..SqliteConfig::default()
    }))
    .await
    .unwrap();

    (vec![("memory", memory), ("sqlite", sqlite)], temp_dir)
}

fn create_test_token(secret: &str, expires_in: Option<Duration>) -> PersonalAccessToken {
    let now = Utc::now();
    PersonalAccessToken::new(
        123,
        hash_token(secret),
        Some("Test Token".to_string()),
        &["read:posts".to_string(), "write:comments".to_string()],
        now,
        expires_in.map(|d| now + d),
    )
}

#[tokio::test]
async fn test_store_assigns_id_and_finds_by_hash_and_id() {
    let (drivers, _temp_dir) = drivers().await;

    for (name, driver) in drivers {
        let stored = driver
            .store_token(create_test_token("secret-a", Some(Duration::hours(1))))
            .await
            .unwrap();
        assert!(stored.id > 0, "{name}: id must be assigned");

        let by_hash = driver.find_by_hash(&stored.token).await.unwrap();
        let by_id = driver.find_by_id(stored.id).await.unwrap();

        assert_eq!(by_hash, stored, "{name}");
        assert_eq!(by_id, stored, "{name}");
    }
}

#[tokio::test]
async fn test_missing_records_are_not_found() {
    let (drivers, _temp_dir) = drivers().await;

    for (name, driver) in drivers {
        let digest = hash_token("never-stored");
        assert!(
            matches!(driver.find_by_hash(&digest).await, Err(StorageError::NotFound)),
            "{name}"
        );
        assert!(
            matches!(driver.find_by_id(9999).await, Err(StorageError::NotFound)),
            "{name}"
        );
        assert!(
            matches!(driver.revoke_token(&digest).await, Err(StorageError::NotFound)),
            "{name}"
        );
        assert!(
            matches!(driver.touch_last_used(9999).await, Err(StorageError::NotFound)),
            "{name}"
        );
    }
}

#[tokio::test]
async fn test_expired_records_are_reported_as_expired() {
    let (drivers, _temp_dir) = drivers().await;

    for (name, driver) in drivers {
        let stored = driver
            .store_token(create_test_token("expired", Some(Duration::seconds(-5))))
            .await
            .unwrap();

        assert!(
            matches!(driver.find_by_hash(&stored.token).await, Err(StorageError::Expired)),
            "{name}"
        );
        assert!(
            matches!(driver.find_by_id(stored.id).await, Err(StorageError::Expired)),
            "{name}"
        );
    }
}

#[tokio::test]
async fn test_unlimited_records_never_expire() {
    let (drivers, _temp_dir) = drivers().await;

    for (_, driver) in drivers {
        let stored = driver
            .store_token(create_test_token("forever", None))
            .await
            .unwrap();
        let found = assert_ok!(driver.find_by_hash(&stored.token).await);
        assert_eq!(found.expires_at, None);
    }
}

#[tokio::test]
async fn test_duplicate_digest_is_rejected_not_overwritten() {
    let (drivers, _temp_dir) = drivers().await;

    for (name, driver) in drivers {
        let original = driver
            .store_token(create_test_token("dup", None))
            .await
            .unwrap();

        let mut duplicate = create_test_token("dup", None);
        duplicate.user_id = 999;
        let result = driver.store_token(duplicate).await;
        assert!(matches!(result, Err(StorageError::Duplicate(_))), "{name}");

        let found = driver.find_by_hash(&original.token).await.unwrap();
        assert_eq!(found.user_id, 123, "{name}");
    }
}

#[tokio::test]
async fn test_negative_id_is_rejected() {
    let (drivers, _temp_dir) = drivers().await;

    for (name, driver) in drivers {
        let mut token = create_test_token("negative-id", None);
        token.id = -1;

        let result = driver.store_token(token).await;
        assert!(matches!(result, Err(StorageError::Database(_))), "{name}");
        assert_err!(driver.find_by_hash(&hash_token("negative-id")).await);
    }
}

#[tokio::test]
async fn test_revoke_deletes_and_is_not_idempotent() {
    let (drivers, _temp_dir) = drivers().await;

    for (name, driver) in drivers {
        let stored = driver
            .store_token(create_test_token("revoke-me", None))
            .await
            .unwrap();

        assert_ok!(driver.revoke_token(&stored.token).await);
        assert!(
            matches!(driver.find_by_hash(&stored.token).await, Err(StorageError::NotFound)),
            "{name}"
        );
        assert!(
            matches!(driver.find_by_id(stored.id).await, Err(StorageError::NotFound)),
            "{name}"
        );
        assert!(
            matches!(driver.revoke_token(&stored.token).await, Err(StorageError::NotFound)),
            "{name}: second revoke must fail"
        );
    }
}

#[tokio::test]
async fn test_touch_sets_last_used_at() {
    let (drivers, _temp_dir) = drivers().await;

    for (name, driver) in drivers {
        let stored = driver
            .store_token(create_test_token("touch", None))
            .await
            .unwrap();
        assert_eq!(stored.last_used_at, None, "{name}");

        let before = Utc::now();
        assert_ok!(driver.touch_last_used(stored.id).await);

        let found = driver.find_by_id(stored.id).await.unwrap();
        let last_used_at = found.last_used_at.expect("last_used_at set");
        assert!(last_used_at >= before, "{name}");
    }
}

#[tokio::test]
async fn test_touch_after_revoke_fails() {
    let (drivers, _temp_dir) = drivers().await;

    for (_, driver) in drivers {
        let stored = driver
            .store_token(create_test_token("gone", None))
            .await
            .unwrap();
        driver.revoke_token(&stored.token).await.unwrap();

        assert_err!(driver.touch_last_used(stored.id).await);
    }
}

#[tokio::test]
async fn test_concurrent_stores_get_distinct_ids() {
    let (drivers, _temp_dir) = drivers().await;

    for (name, driver) in drivers {
        let mut handles = Vec::new();
        for i in 0..20 {
            let driver = Arc::clone(&driver);
            handles.push(tokio::spawn(async move {
                driver
                    .store_token(create_test_token(&format!("concurrent-{i}"), None))
                    .await
                    .unwrap()
                    .id
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 20, "{name}");
    }
}

#[tokio::test]
async fn test_sqlite_data_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let config = SqliteConfig {
        path: temp_dir.path().join("persisted.db"),
        ..SqliteConfig::default()
    };

    let stored = {
        let driver = StorageFactory::create_driver(StorageKind::Sqlite(config.clone()))
            .await
            .unwrap();
        driver
            .store_token(create_test_token("persisted", None))
            .await
            .unwrap()
    };

    let reopened = StorageFactory::create_driver(StorageKind::Sqlite(config))
        .await
        .unwrap();
    let found = reopened.find_by_hash(&stored.token).await.unwrap();
    assert_eq!(found.id, stored.id);
}
