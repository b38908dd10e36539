// Startpage state managers
// Managers own list state: ordering over the record store, optimistic mutations, drag reordering.

pub mod collection_controller;
pub mod drag_reorder;
pub mod ordered_collection;
