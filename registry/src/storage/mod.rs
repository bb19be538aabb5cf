//! Repository record storage
//!
//! Records are keyed by the canonical identifier's storage key. Both backends
//! share one contract so the handlers and tests can run against either:
//!
//! - `get` returns `Ok(None)` for an unknown key; `Err` always means the
//!   backend itself failed.
//! - `create` is an atomic insert-if-absent. A second `create` for the same
//!   key fails with `StoreError::AlreadyExists` and writes nothing.
//! - `get_or_create` is linearizable per key: concurrent callers all observe
//!   the single record that won the insert.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::canon::CanonicalRepo;
use crate::models::{Registration, RepositoryRecord};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("repository {0} already exists")]
    AlreadyExists(String),
    #[error("repository {0} conflicted on insert but could not be read back")]
    Inconsistent(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Backend name for logs and health checks
    fn backend(&self) -> &'static str;

    async fn get(&self, repo: &CanonicalRepo) -> Result<Option<RepositoryRecord>, StoreError>;

    /// Insert a new record stamped with the current time, unless one exists.
    async fn create(&self, repo: &CanonicalRepo) -> Result<RepositoryRecord, StoreError>;

    /// Return the stored record for `repo`, creating it if absent.
    ///
    /// A caller that loses the insert race re-fetches the winner's record
    /// instead of writing its own.
    async fn get_or_create(&self, repo: &CanonicalRepo) -> Result<Registration, StoreError> {
        if let Some(record) = self.get(repo).await? {
            return Ok(Registration {
                record,
                created: false,
            });
        }

        match self.create(repo).await {
            Ok(record) => Ok(Registration {
                record,
                created: true,
            }),
            Err(StoreError::AlreadyExists(key)) => {
                debug!("Lost insert race for {}, re-fetching", key);
                let record = self
                    .get(repo)
                    .await?
                    .ok_or(StoreError::Inconsistent(key))?;
                Ok(Registration {
                    record,
                    created: false,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Cheap liveness probe
    async fn ping(&self) -> Result<(), StoreError>;
}
