//! Optimistic Mutation Controller.
//!
//! Holds the in-memory list a UI renders for one collection and applies every
//! mutation in two phases:
//!
//! 1. [`CollectionController::apply_local`] changes the list immediately and
//!    returns a [`PendingHandle`].
//! 2. [`CollectionController::settle`] receives the remote result and either
//!    confirms, or runs the recovery strategy of the mutation kind.
//!
//! | kind    | success          | failure                      |
//! |---------|------------------|------------------------------|
//! | Add     | reload           | reload, error surfaced       |
//! | Toggle  | confirm          | rollback                     |
//! | Edit    | confirm          | rollback                     |
//! | Delete  | confirm          | reload                       |
//! | Reorder | confirm          | reload                       |
//!
//! Toggle and edit are trivially invertible. A failed delete or reorder may
//! leave remote state that no local inverse describes, so only a reload from
//! the store is trusted there.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::ordered_collection::{next_order, OrderedCollection};
use crate::database::record_store::now_millis;
use crate::types::errors::{CollectionError, MutationError};
use crate::types::item::{Completable, OrderableItem, OwnerId};

/// Prefix of locally generated placeholder identities.
pub const PLACEHOLDER_PREFIX: &str = "pending-";

pub fn is_placeholder(id: &str) -> bool {
    id.starts_with(PLACEHOLDER_PREFIX)
}

/// Monotonic source of placeholder identities, derived from the wall clock
/// but never repeating within a session.
#[derive(Debug, Default)]
pub struct PlaceholderClock {
    last: i64,
}

impl PlaceholderClock {
    pub fn next_id(&mut self) -> String {
        self.last = now_millis().max(self.last + 1);
        format!("{}{}", PLACEHOLDER_PREFIX, self.last)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Add,
    Toggle,
    Edit,
    Delete,
    Reorder,
}

/// How a failed mutation is reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Invert the local change; no store read.
    Rollback,
    /// Replace the list with ground truth from the store.
    Reload,
}

impl MutationKind {
    pub fn recovery(self) -> Recovery {
        match self {
            MutationKind::Toggle | MutationKind::Edit => Recovery::Rollback,
            MutationKind::Add | MutationKind::Delete | MutationKind::Reorder => Recovery::Reload,
        }
    }

    /// Add replaces its placeholder through a reload even when it succeeds.
    pub fn reloads_on_success(self) -> bool {
        matches!(self, MutationKind::Add)
    }
}

/// A local change to the in-memory list.
#[derive(Debug, Clone)]
pub enum Mutation<T> {
    /// Append a placeholder item.
    Add(T),
    /// Replace an item with its toggled version.
    Toggle(T),
    /// Replace an item with its edited version.
    Edit(T),
    /// Remove the item with this id.
    Delete(String),
    /// Replace the whole list with a new sequence.
    Reorder(Vec<T>),
}

impl<T> Mutation<T> {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Add(_) => MutationKind::Add,
            Mutation::Toggle(_) => MutationKind::Toggle,
            Mutation::Edit(_) => MutationKind::Edit,
            Mutation::Delete(_) => MutationKind::Delete,
            Mutation::Reorder(_) => MutationKind::Reorder,
        }
    }
}

/// Proof that a mutation was applied locally and still needs settling.
#[must_use = "a pending mutation must be settled"]
#[derive(Debug)]
pub struct PendingHandle<T> {
    kind: MutationKind,
    prior: Option<T>,
}

impl<T> PendingHandle<T> {
    pub fn kind(&self) -> MutationKind {
        self.kind
    }
}

/// How a mutation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Settlement {
    /// Remote write succeeded; the local change stands.
    Confirmed,
    /// Remote write succeeded and the list was replaced by ground truth.
    Refreshed,
    /// Remote write failed; the local change was inverted.
    RolledBack,
    /// Remote write failed; the list was replaced by ground truth.
    Reloaded,
    /// A required reload failed; the list may not match the store.
    Stale,
}

/// In-memory list of one collection for the signed-in owner.
pub struct CollectionController<T: OrderableItem> {
    collection: Arc<OrderedCollection<T>>,
    owner: Option<OwnerId>,
    items: Vec<T>,
    pending_delete: Option<String>,
    clock: PlaceholderClock,
    load_error: Option<String>,
}

impl<T: OrderableItem> CollectionController<T> {
    pub fn new(collection: Arc<OrderedCollection<T>>, owner: Option<OwnerId>) -> Self {
        Self {
            collection,
            owner,
            items: Vec::new(),
            pending_delete: None,
            clock: PlaceholderClock::default(),
            load_error: None,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn owner(&self) -> Option<&OwnerId> {
        self.owner.as_ref()
    }

    pub fn find(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Message of the last failed load, cleared by the next successful one.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Id of the item awaiting delete confirmation.
    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    /// Replaces the list with ground truth from the store.
    ///
    /// On failure the current list is kept and the error is recorded.
    pub async fn reload(&mut self) -> Result<(), CollectionError> {
        match self.collection.list(self.owner.as_ref()).await {
            Ok(items) => {
                self.items = items;
                self.load_error = None;
                Ok(())
            }
            Err(e) => {
                warn!(collection = T::COLLECTION, error = %e, "[CollectionController] reload failed");
                self.load_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Phase one: change the in-memory list immediately.
    pub fn apply_local(&mut self, mutation: Mutation<T>) -> Result<PendingHandle<T>, MutationError> {
        let kind = mutation.kind();
        let prior = match mutation {
            Mutation::Add(item) => {
                self.items.push(item);
                None
            }
            Mutation::Toggle(item) | Mutation::Edit(item) => {
                let slot = self
                    .items
                    .iter_mut()
                    .find(|current| current.id() == item.id())
                    .ok_or_else(|| MutationError::ItemNotFound(item.id().to_string()))?;
                Some(std::mem::replace(slot, item))
            }
            Mutation::Delete(id) => {
                self.items.retain(|item| item.id() != id);
                None
            }
            Mutation::Reorder(sequence) => {
                self.items = sequence;
                for (index, item) in self.items.iter_mut().enumerate() {
                    item.set_order(Some(index as u32));
                }
                None
            }
        };
        Ok(PendingHandle { kind, prior })
    }

    /// Phase two: reconcile the local change with the remote outcome.
    pub async fn settle(
        &mut self,
        handle: PendingHandle<T>,
        remote: Result<(), CollectionError>,
    ) -> Settlement {
        let kind = handle.kind;
        match remote {
            Ok(()) if kind.reloads_on_success() => match self.reload().await {
                Ok(()) => Settlement::Refreshed,
                Err(_) => Settlement::Stale,
            },
            Ok(()) => Settlement::Confirmed,
            Err(e) => {
                warn!(collection = T::COLLECTION, ?kind, error = %e, "[CollectionController] remote write failed");
                match kind.recovery() {
                    Recovery::Rollback => {
                        if let Some(prior) = handle.prior {
                            self.restore(prior);
                        }
                        Settlement::RolledBack
                    }
                    Recovery::Reload => match self.reload().await {
                        Ok(()) => Settlement::Reloaded,
                        Err(_) => Settlement::Stale,
                    },
                }
            }
        }
    }

    fn restore(&mut self, prior: T) {
        if let Some(slot) = self.items.iter_mut().find(|item| item.id() == prior.id()) {
            *slot = prior;
        }
    }

    fn require_owner(&self) -> Result<OwnerId, MutationError> {
        self.owner.clone().ok_or(MutationError::NoSession)
    }

    /// Appends a placeholder, creates the record remotely, then reloads
    /// whatever the outcome.
    ///
    /// This is the one write whose failure reaches the user: the list is
    /// reloaded and `MutationError::AddFailed` is returned.
    pub async fn add(&mut self, draft: T::Draft) -> Result<Settlement, MutationError> {
        let owner = self.require_owner()?;
        let placeholder = T::from_draft(
            self.clock.next_id(),
            &owner,
            now_millis(),
            Some(next_order(&self.items)),
            draft.clone(),
        );
        let handle = self.apply_local(Mutation::Add(placeholder))?;

        let remote = self.collection.append(Some(&owner), draft).await;
        let failure = remote.as_ref().err().map(ToString::to_string);
        let settlement = self.settle(handle, remote.map(|_| ())).await;

        match failure {
            None => {
                info!(collection = T::COLLECTION, ?settlement, "[CollectionController] added");
                Ok(settlement)
            }
            Some(msg) => {
                error!(collection = T::COLLECTION, error = %msg, "[CollectionController] add failed");
                Err(MutationError::AddFailed(msg))
            }
        }
    }

    /// Replaces the editable fields of an item.
    pub async fn edit(&mut self, id: &str, draft: T::Draft) -> Result<Settlement, MutationError> {
        let mut edited = self
            .find(id)
            .cloned()
            .ok_or_else(|| MutationError::ItemNotFound(id.to_string()))?;
        edited.apply_draft(&draft);
        let handle = self.apply_local(Mutation::Edit(edited))?;

        let remote = self.collection.patch(id, &T::draft_patch(&draft)).await;
        Ok(self.settle(handle, remote).await)
    }

    /// Opens the delete confirmation for `id`. Nothing is mutated yet.
    pub fn request_delete(&mut self, id: &str) -> Result<(), MutationError> {
        if self.find(id).is_none() {
            return Err(MutationError::ItemNotFound(id.to_string()));
        }
        self.pending_delete = Some(id.to_string());
        Ok(())
    }

    /// Closes the delete confirmation with no store call and no list change.
    pub fn cancel_delete(&mut self) {
        if let Some(id) = self.pending_delete.take() {
            debug!(collection = T::COLLECTION, %id, "[CollectionController] delete cancelled");
        }
    }

    /// Removes the item awaiting confirmation locally, then remotely.
    pub async fn confirm_delete(&mut self) -> Result<Settlement, MutationError> {
        let id = self
            .pending_delete
            .take()
            .ok_or(MutationError::NoPendingDelete)?;
        let handle = self.apply_local(Mutation::Delete(id.clone()))?;

        let remote = self.collection.remove(&id).await;
        Ok(self.settle(handle, remote).await)
    }

    /// Shows `sequence` immediately and persists it as the new order.
    pub async fn reorder(&mut self, sequence: Vec<T>) -> Result<Settlement, MutationError> {
        let owner = self.require_owner()?;
        let handle = self.apply_local(Mutation::Reorder(sequence))?;

        let remote = self.collection.reorder(&owner, &self.items).await;
        Ok(self.settle(handle, remote).await)
    }
}

impl<T: Completable> CollectionController<T> {
    /// Flips the completion flag locally, then patches it remotely. A failed
    /// patch flips it back without touching the store again.
    pub async fn toggle(&mut self, id: &str) -> Result<Settlement, MutationError> {
        let mut toggled = self
            .find(id)
            .cloned()
            .ok_or_else(|| MutationError::ItemNotFound(id.to_string()))?;
        let done = !toggled.is_done();
        toggled.set_done(done);
        let handle = self.apply_local(Mutation::Toggle(toggled))?;

        let remote = self.collection.patch(id, &T::done_patch(done)).await;
        Ok(self.settle(handle, remote).await)
    }
}
