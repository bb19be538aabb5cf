use std::collections::hash_map::Entry;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{RecordStore, StoreError};
use crate::canon::CanonicalRepo;
use crate::models::{Registration, RepositoryRecord};

/// Process-lifetime store. Every mutation happens under the write lock, so
/// lookups and inserts for a key never interleave.
#[derive(Default)]
pub struct MemoryStore {
    repositories: RwLock<HashMap<String, RepositoryRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.repositories.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.repositories.read().await.is_empty()
    }
}

fn new_record(key: String) -> RepositoryRecord {
    RepositoryRecord {
        url: key,
        added: Utc::now(),
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, repo: &CanonicalRepo) -> Result<Option<RepositoryRecord>, StoreError> {
        Ok(self
            .repositories
            .read()
            .await
            .get(&repo.storage_key())
            .cloned())
    }

    async fn create(&self, repo: &CanonicalRepo) -> Result<RepositoryRecord, StoreError> {
        let mut repositories = self.repositories.write().await;
        match repositories.entry(repo.storage_key()) {
            Entry::Occupied(entry) => Err(StoreError::AlreadyExists(entry.key().clone())),
            Entry::Vacant(entry) => {
                let record = new_record(entry.key().clone());
                Ok(entry.insert(record).clone())
            }
        }
    }

    // Lookup and insert share one write-lock critical section
    async fn get_or_create(&self, repo: &CanonicalRepo) -> Result<Registration, StoreError> {
        let mut repositories = self.repositories.write().await;
        let registration = match repositories.entry(repo.storage_key()) {
            Entry::Occupied(entry) => Registration {
                record: entry.get().clone(),
                created: false,
            },
            Entry::Vacant(entry) => {
                let record = new_record(entry.key().clone());
                Registration {
                    record: entry.insert(record).clone(),
                    created: true,
                }
            }
        };
        Ok(registration)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
