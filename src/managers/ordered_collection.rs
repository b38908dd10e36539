//! Ordered Collection over an unordered keyed store.
//!
//! The store keeps each record's `order` as a plain field and returns query
//! results in arbitrary order. This module turns that into a list:
//!
//! - [`compare_items`] is the read-side Sort Rule, applied on every `list`.
//! - [`next_order`] picks the append position (`max(order) + 1`).
//! - [`OrderedCollection::reorder`] rewrites every record's `order` to its
//!   index in the requested sequence, restoring `0..n-1`.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::database::record_store::RecordStore;
use crate::types::errors::{CollectionError, StoreError};
use crate::types::item::{OrderableItem, OwnerId, Patch};

/// The Sort Rule.
///
/// 1. Both have `order`: lower `order` first.
/// 2. Exactly one has `order`: that one first.
/// 3. Neither has `order`: older `createdAt` first (missing counts as 0).
///
/// Ties left after the rule are broken by `id`, so the result does not depend
/// on the order the store happened to return records in.
pub fn compare_items<T: OrderableItem>(a: &T, b: &T) -> Ordering {
    let by_rule = match (a.order(), b.order()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a
            .created_at()
            .unwrap_or(0)
            .cmp(&b.created_at().unwrap_or(0)),
    };
    by_rule.then_with(|| a.id().cmp(b.id()))
}

/// Sorts a snapshot in place with the Sort Rule.
pub fn sort_items<T: OrderableItem>(items: &mut [T]) {
    items.sort_by(compare_items);
}

/// Order value for a record appended after `items`: one past the largest
/// present `order`, or 0 when no record has one.
pub fn next_order<T: OrderableItem>(items: &[T]) -> u32 {
    items
        .iter()
        .filter_map(|item| item.order())
        .max()
        .map_or(0, |max| max.saturating_add(1))
}

type ReorderLocks = Mutex<HashMap<OwnerId, Arc<tokio::sync::Mutex<()>>>>;

/// Ordered view of one collection of `T` in a [`RecordStore`].
pub struct OrderedCollection<T: OrderableItem> {
    store: Arc<dyn RecordStore<T>>,
    reorder_locks: ReorderLocks,
}

impl<T: OrderableItem> OrderedCollection<T> {
    pub fn new(store: Arc<dyn RecordStore<T>>) -> Self {
        Self {
            store,
            reorder_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the owner's records sorted by the Sort Rule.
    ///
    /// Without an owner there is nothing to read and the list is empty.
    pub async fn list(&self, owner: Option<&OwnerId>) -> Result<Vec<T>, CollectionError> {
        let Some(owner) = owner else {
            return Ok(Vec::new());
        };
        let mut items = self.store.query(owner).await?;
        sort_items(&mut items);
        debug!(collection = T::COLLECTION, %owner, count = items.len(), "[OrderedCollection] listed");
        Ok(items)
    }

    /// Creates a record at the end of the owner's list.
    ///
    /// Reads the full list first to find the current maximum `order`, so an
    /// append costs one query plus one create.
    pub async fn append(
        &self,
        owner: Option<&OwnerId>,
        draft: T::Draft,
    ) -> Result<T, CollectionError> {
        let owner = owner.ok_or(CollectionError::NoSession)?;
        let existing = self.list(Some(owner)).await?;
        let order = next_order(&existing);
        let item = self.store.create(owner, draft, Some(order)).await?;
        info!(collection = T::COLLECTION, %owner, id = item.id(), order, "[OrderedCollection] appended");
        Ok(item)
    }

    /// Persists `sequence` as the owner's list order: record `i` gets
    /// `order = i`.
    ///
    /// All writes are issued concurrently and awaited together. When some of
    /// them fail the others are not undone; the store may hold a mix of old
    /// and new values, which the Sort Rule still orders totally. Callers
    /// recover by reloading.
    ///
    /// Reorders for the same owner are serialized, so two quick drags cannot
    /// interleave their writes. Callers must not call this for a move whose
    /// source and destination are equal.
    pub async fn reorder(&self, owner: &OwnerId, sequence: &[T]) -> Result<(), CollectionError> {
        if let Some(foreign) = sequence.iter().find(|item| !item.is_owned_by(owner)) {
            return Err(CollectionError::ForeignItem(foreign.id().to_string()));
        }

        let lock = self.owner_lock(owner);
        let _guard = lock.lock().await;

        let writes = sequence.iter().enumerate().map(|(index, item)| {
            let patch = Patch::order(index as u32);
            async move { self.store.patch(item.id(), &patch).await }
        });
        let results: Vec<Result<(), StoreError>> = join_all(writes).await;

        let total = results.len();
        let mut failures = results.into_iter().filter_map(Result::err);
        match failures.next() {
            None => {
                debug!(collection = T::COLLECTION, %owner, total, "[OrderedCollection] reordered");
                Ok(())
            }
            Some(first) => {
                let failed = 1 + failures.count();
                warn!(collection = T::COLLECTION, %owner, failed, total, error = %first, "[OrderedCollection] reorder partially applied");
                Err(CollectionError::ReorderFailed {
                    failed,
                    total,
                    first,
                })
            }
        }
    }

    /// Field-level update of one record. Never touches sibling order.
    pub async fn patch(&self, id: &str, patch: &Patch) -> Result<(), CollectionError> {
        self.store.patch(id, patch).await?;
        Ok(())
    }

    /// Deletes one record. Siblings are not renumbered; gaps are harmless to
    /// the Sort Rule.
    pub async fn remove(&self, id: &str) -> Result<(), CollectionError> {
        self.store.delete(id).await?;
        Ok(())
    }

    fn owner_lock(&self, owner: &OwnerId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .reorder_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(owner.clone()).or_default().clone()
    }
}
