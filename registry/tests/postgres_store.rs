//! Integration tests for the Postgres record store
//!
//! Run with: DATABASE_URL=postgres://... cargo test --test postgres_store -- --ignored
//!
//! Note: Tests marked with #[ignore] require a reachable PostgreSQL server.

use std::sync::Arc;

use repo_registry::canon::{normalize, CanonicalRepo};
use repo_registry::storage::{PostgresStore, RecordStore, StoreError};

async fn connect() -> PostgresStore {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let store = PostgresStore::connect(&database_url, 20)
        .await
        .expect("Failed to connect to database");
    store.migrate().await.expect("Failed to run migrations");
    store
}

/// Fresh repository per test run so reruns never see old rows
fn unique_repo(name: &str) -> CanonicalRepo {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    normalize(&format!("https://github.com/registry-tests/{}-{}", name, nanos)).unwrap()
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_create_then_get_round_trip() {
    let store = connect().await;
    let repo = unique_repo("round-trip");

    assert!(store.get(&repo).await.unwrap().is_none());

    let created = store.create(&repo).await.unwrap();
    assert_eq!(created.url, repo.storage_key());

    let fetched = store.get(&repo).await.unwrap().unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_second_create_never_inserts_duplicate() {
    let store = connect().await;
    let repo = unique_repo("duplicate");

    let first = store.create(&repo).await.unwrap();
    assert!(matches!(
        store.create(&repo).await,
        Err(StoreError::AlreadyExists(_))
    ));
    assert_eq!(store.get(&repo).await.unwrap().unwrap(), first);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore] // Requires PostgreSQL
async fn test_concurrent_get_or_create_creates_once() {
    let store = Arc::new(connect().await);
    let repo = unique_repo("concurrent");

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let store = store.clone();
            let repo = repo.clone();
            tokio::spawn(async move { store.get_or_create(&repo).await })
        })
        .collect();

    let mut registrations = Vec::new();
    for handle in handles {
        registrations.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(registrations.iter().filter(|r| r.created).count(), 1);
    let first = &registrations[0].record;
    assert!(registrations.iter().all(|r| &r.record == first));
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_ping() {
    let store = connect().await;
    store.ping().await.unwrap();
    assert_eq!(store.backend(), "postgres");
}
