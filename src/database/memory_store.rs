//! In-process record store.
//!
//! Behaves like the remote document store (unordered `query`, per-record
//! atomic writes) and adds the hooks tests need: per-operation call counters
//! and failure injection, either for a whole operation or for patches of
//! individual records.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::record_store::{check_patch, now_millis, RecordStore};
use crate::types::errors::StoreError;
use crate::types::item::{OrderableItem, OwnerId, Patch};

/// Store operations that can be counted and made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Create,
    Query,
    Patch,
    Delete,
}

struct Inner<T> {
    records: HashMap<String, T>,
    calls: HashMap<StoreOp, usize>,
    failing: HashSet<StoreOp>,
    failing_patch_ids: HashSet<String>,
}

pub struct MemoryRecordStore<T: OrderableItem> {
    inner: Mutex<Inner<T>>,
}

impl<T: OrderableItem> MemoryRecordStore<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                records: HashMap::new(),
                calls: HashMap::new(),
                failing: HashSet::new(),
                failing_patch_ids: HashSet::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Inserts a record as-is, bypassing identity assignment and counters.
    /// Used to seed legacy records (no `order`, arbitrary `createdAt`).
    pub fn seed(&self, item: T) {
        self.lock().records.insert(item.id().to_string(), item);
    }

    /// Makes every subsequent call of `op` fail until [`heal`](Self::heal).
    pub fn fail(&self, op: StoreOp) {
        self.lock().failing.insert(op);
    }

    /// Makes patches of the record `id` fail until [`heal`](Self::heal).
    pub fn fail_patch_for(&self, id: &str) {
        self.lock().failing_patch_ids.insert(id.to_string());
    }

    /// Clears all injected failures.
    pub fn heal(&self) {
        let mut inner = self.lock();
        inner.failing.clear();
        inner.failing_patch_ids.clear();
    }

    pub fn calls(&self, op: StoreOp) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Number of create, patch and delete calls, successful or not.
    pub fn write_calls(&self) -> usize {
        self.calls(StoreOp::Create) + self.calls(StoreOp::Patch) + self.calls(StoreOp::Delete)
    }

    pub fn total_calls(&self) -> usize {
        self.write_calls() + self.calls(StoreOp::Query)
    }

    /// Current record by id, without counting a call.
    pub fn get(&self, id: &str) -> Option<T> {
        self.lock().records.get(id).cloned()
    }

    /// Number of stored records across all owners.
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counts the call and returns the injected failure, if any.
    fn enter(inner: &mut Inner<T>, op: StoreOp) -> Result<(), StoreError> {
        *inner.calls.entry(op).or_insert(0) += 1;
        if inner.failing.contains(&op) {
            return Err(StoreError::Unavailable(format!("injected {:?} failure", op)));
        }
        Ok(())
    }
}

impl<T: OrderableItem> Default for MemoryRecordStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: OrderableItem> RecordStore<T> for MemoryRecordStore<T> {
    async fn create(
        &self,
        owner: &OwnerId,
        draft: T::Draft,
        order: Option<u32>,
    ) -> Result<T, StoreError> {
        let mut inner = self.lock();
        Self::enter(&mut inner, StoreOp::Create)?;
        let id = Uuid::new_v4().to_string();
        let item = T::from_draft(id.clone(), owner, now_millis(), order, draft);
        inner.records.insert(id, item.clone());
        Ok(item)
    }

    async fn query(&self, owner: &OwnerId) -> Result<Vec<T>, StoreError> {
        let mut inner = self.lock();
        Self::enter(&mut inner, StoreOp::Query)?;
        Ok(inner
            .records
            .values()
            .filter(|item| item.is_owned_by(owner))
            .cloned()
            .collect())
    }

    async fn patch(&self, id: &str, patch: &Patch) -> Result<(), StoreError> {
        let mut inner = self.lock();
        Self::enter(&mut inner, StoreOp::Patch)?;
        if inner.failing_patch_ids.contains(id) {
            return Err(StoreError::Unavailable(format!("injected patch failure for {}", id)));
        }
        check_patch(patch)?;

        let current = inner
            .records
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let mut body = serde_json::to_value(current)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;
        patch.apply_to(&mut body);
        let updated: T = serde_json::from_value(body)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;
        inner.records.insert(id.to_string(), updated);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.lock();
        Self::enter(&mut inner, StoreOp::Delete)?;
        inner
            .records
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}
