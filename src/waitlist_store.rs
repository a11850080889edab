//! Storage contract for waitlist entries
//!
//! The store is the only shared mutable resource of the service. All writes go
//! through [`WaitlistStore::insert_unique`], which must enforce email
//! uniqueness atomically inside the storage engine: callers treat
//! [`StoreError::DuplicateEmail`] as the one uniqueness signal and never run
//! an existence check of their own.

use crate::waitlist_entry::{EntryId, NewWaitlistEntry, WaitlistEntry};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Corrupt row {id}: {reason}")]
    CorruptRow { id: EntryId, reason: String },
}

/// Filter accepted by [`WaitlistStore::count`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountFilter {
    /// Only count entries with `signup_date >= signed_up_since`
    pub signed_up_since: Option<DateTime<Utc>>,
}

impl CountFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn since(threshold: DateTime<Utc>) -> Self {
        Self {
            signed_up_since: Some(threshold),
        }
    }
}

/// Categorical fields entries can be grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    FarmType,
    FarmSize,
    Interests,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    SignupDate,
    Email,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One bucket of a grouped count. Serialized in the `{_id, count}` shape of a
/// document-store `$group` stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount {
    #[serde(rename = "_id")]
    pub value: String,
    pub count: u64,
}

#[async_trait]
pub trait WaitlistStore: Send + Sync {
    /// Persist a new entry, failing with [`StoreError::DuplicateEmail`] if an
    /// entry with the same normalized email already exists.
    async fn insert_unique(&self, entry: NewWaitlistEntry) -> Result<EntryId, StoreError>;

    /// Count entries matching `filter`
    async fn count(&self, filter: CountFilter) -> Result<u64, StoreError>;

    /// Count entries per distinct value of `field`, largest group first.
    /// Groups with equal counts keep the order in which they first appeared.
    async fn group_by(&self, field: GroupField) -> Result<Vec<GroupCount>, StoreError>;

    /// Every entry, ordered by `field` in `direction`
    async fn list_all(
        &self,
        field: SortField,
        direction: SortDirection,
    ) -> Result<Vec<WaitlistEntry>, StoreError>;
}
