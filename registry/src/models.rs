use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered repository
///
/// Created once per canonical identifier and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RepositoryRecord {
    pub url: String,          // Canonical identifier without scheme: github.com/owner/repo
    pub added: DateTime<Utc>, // When the repository was first registered
}

/// Outcome of a get-or-create call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub record: RepositoryRecord,
    /// true if this call inserted the record, false if it already existed
    pub created: bool,
}
