//! Startpage record storage.
//!
//! The [`RecordStore`] trait is the boundary to the per-record document store.
//! Two implementations ship with the crate:
//!
//! - [`DocumentStore`]: SQLite-backed, one `documents` table shared by all
//!   collections, queried by collection and owner only.
//! - [`MemoryRecordStore`]: in-process store with call counters and failure
//!   injection, used by tests and the `memory` storage backend.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use startpage::database::{Database, DocumentStore};
//!
//! let db = Arc::new(Database::open("startpage.db").expect("failed to open database"));
//! let store = DocumentStore::new(db);
//! ```

pub mod connection;
pub mod document_store;
pub mod memory_store;
pub mod migrations;
pub mod record_store;

pub use connection::Database;
pub use document_store::DocumentStore;
pub use memory_store::{MemoryRecordStore, StoreOp};
pub use record_store::RecordStore;
