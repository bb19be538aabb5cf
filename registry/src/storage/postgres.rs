use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use super::{RecordStore, StoreError};
use crate::canon::CanonicalRepo;
use crate::models::RepositoryRecord;

/// Postgres-backed store. The `repositories.url` primary key is what makes
/// `create` an atomic insert-if-absent.
#[derive(Clone)]
pub struct PostgresStore {
    db: PgPool,
}

impl PostgresStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn connect(database_url: &str, pool_size: u32) -> Result<Self, StoreError> {
        let db = PgPoolOptions::new()
            .max_connections(pool_size)
            .connect(database_url)
            .await?;
        info!("Database connected");
        Ok(Self::new(db))
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.db).await?;
        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PostgresStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn get(&self, repo: &CanonicalRepo) -> Result<Option<RepositoryRecord>, StoreError> {
        let record = sqlx::query_as::<_, RepositoryRecord>(
            "SELECT url, added FROM repositories WHERE url = $1",
        )
        .bind(repo.storage_key())
        .fetch_optional(&self.db)
        .await?;

        Ok(record)
    }

    async fn create(&self, repo: &CanonicalRepo) -> Result<RepositoryRecord, StoreError> {
        let key = repo.storage_key();

        // Insert only if absent; a conflicting row yields no RETURNING row
        let inserted = sqlx::query_as::<_, RepositoryRecord>(
            r#"
            INSERT INTO repositories (url, added)
            VALUES ($1, NOW())
            ON CONFLICT (url) DO NOTHING
            RETURNING url, added
            "#,
        )
        .bind(&key)
        .fetch_optional(&self.db)
        .await?;

        inserted.ok_or(StoreError::AlreadyExists(key))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query_as::<_, (i32,)>("SELECT 1")
            .fetch_one(&self.db)
            .await?;
        Ok(())
    }
}
