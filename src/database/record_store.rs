//! Record Store boundary.
//!
//! Every operation is atomic for a single record. No caller may assume a
//! transaction spanning several records, and `query` makes no promise about
//! the order of what it returns.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use crate::types::errors::StoreError;
use crate::types::item::{OrderableItem, OwnerId, Patch};

/// Owner-scoped CRUD over one collection of `T`.
#[async_trait]
pub trait RecordStore<T: OrderableItem>: Send + Sync {
    /// Persists a new record, assigning its identity and creation timestamp.
    async fn create(
        &self,
        owner: &OwnerId,
        draft: T::Draft,
        order: Option<u32>,
    ) -> Result<T, StoreError>;

    /// Returns every record of `owner`, in no particular order.
    async fn query(&self, owner: &OwnerId) -> Result<Vec<T>, StoreError>;

    /// Merges `patch` into the record with the given id.
    async fn patch(&self, id: &str, patch: &Patch) -> Result<(), StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Milliseconds since the UNIX epoch.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Rejects patches that would rewrite identity or ownership.
pub(crate) fn check_patch(patch: &Patch) -> Result<(), StoreError> {
    match patch.immutable_field() {
        Some(field) => Err(StoreError::ImmutableField(field.to_string())),
        None => Ok(()),
    }
}
