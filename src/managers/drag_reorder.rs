//! Drag-Reorder Interaction Adapter.
//!
//! Turns the end of a drag gesture into a full new sequence for the reorder
//! path of the [`CollectionController`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::collection_controller::{CollectionController, Settlement};
use crate::types::errors::MutationError;
use crate::types::item::OrderableItem;

/// End of a drag gesture over a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragEnd {
    pub source: usize,
    /// `None` when the item was dropped outside any valid target.
    pub destination: Option<usize>,
}

impl DragEnd {
    pub fn new(source: usize, destination: Option<usize>) -> Self {
        Self {
            source,
            destination,
        }
    }
}

/// Moves the element at `source` to `destination`, shifting the ones in
/// between. Returns `None` for out-of-range indices.
pub fn move_item<T: Clone>(items: &[T], source: usize, destination: usize) -> Option<Vec<T>> {
    if source >= items.len() || destination >= items.len() {
        return None;
    }
    let mut moved = items.to_vec();
    let item = moved.remove(source);
    moved.insert(destination, item);
    Some(moved)
}

/// The sequence a drag produces, or `None` when the drag changes nothing:
/// cancelled, dropped in place, or indices outside the list.
pub fn plan_drag<T: Clone>(items: &[T], drag: DragEnd) -> Option<Vec<T>> {
    let destination = drag.destination?;
    if destination == drag.source {
        return None;
    }
    move_item(items, drag.source, destination)
}

impl<T: OrderableItem> CollectionController<T> {
    /// Applies a finished drag. Returns `Ok(None)` for no-op drags, which
    /// issue no store call at all.
    pub async fn on_drag_end(&mut self, drag: DragEnd) -> Result<Option<Settlement>, MutationError> {
        match plan_drag(self.items(), drag) {
            Some(sequence) => self.reorder(sequence).await.map(Some),
            None => {
                debug!(collection = T::COLLECTION, ?drag, "[DragReorder] no-op drag ignored");
                Ok(None)
            }
        }
    }
}
