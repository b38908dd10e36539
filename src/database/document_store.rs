//! SQLite-backed document store.
//!
//! Implements [`RecordStore`] for every [`OrderableItem`]. Records are kept as
//! JSON bodies in the shared `documents` table; queries filter on collection
//! and owner and carry no `ORDER BY`.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::params;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use super::connection::Database;
use super::record_store::{check_patch, now_millis, RecordStore};
use crate::types::errors::StoreError;
use crate::types::item::{OrderableItem, OwnerId, Patch};

/// Document store backed by a SQLite connection.
#[derive(Clone)]
pub struct DocumentStore {
    db: Arc<Database>,
}

impl DocumentStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn db_err(e: rusqlite::Error) -> StoreError {
        StoreError::DatabaseError(e.to_string())
    }

    fn ser_err(e: serde_json::Error) -> StoreError {
        StoreError::SerializationError(e.to_string())
    }

    /// Loads the raw JSON body of one record in `collection`.
    fn load_body(&self, collection: &str, id: &str) -> Result<Value, StoreError> {
        let conn = self.db.connection();
        let body: String = match conn.query_row(
            "SELECT body FROM documents WHERE id = ?1 AND collection = ?2",
            params![id, collection],
            |row| row.get(0),
        ) {
            Ok(body) => body,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(StoreError::NotFound(id.to_string()))
            }
            Err(e) => return Err(Self::db_err(e)),
        };
        serde_json::from_str(&body).map_err(Self::ser_err)
    }
}

#[async_trait]
impl<T: OrderableItem> RecordStore<T> for DocumentStore {
    async fn create(
        &self,
        owner: &OwnerId,
        draft: T::Draft,
        order: Option<u32>,
    ) -> Result<T, StoreError> {
        let id = Uuid::new_v4().to_string();
        let item = T::from_draft(id.clone(), owner, now_millis(), order, draft);
        let body = serde_json::to_string(&item).map_err(Self::ser_err)?;

        self.db
            .connection()
            .execute(
                "INSERT INTO documents (id, collection, owner_id, body) VALUES (?1, ?2, ?3, ?4)",
                params![id, T::COLLECTION, owner.as_str(), body],
            )
            .map_err(Self::db_err)?;

        debug!(collection = T::COLLECTION, %id, "[DocumentStore] created record");
        Ok(item)
    }

    async fn query(&self, owner: &OwnerId) -> Result<Vec<T>, StoreError> {
        let bodies: Vec<(String, String)> = {
            let conn = self.db.connection();
            let mut stmt = conn
                .prepare("SELECT id, body FROM documents WHERE collection = ?1 AND owner_id = ?2")
                .map_err(Self::db_err)?;
            let rows = stmt
                .query_map(params![T::COLLECTION, owner.as_str()], |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })
                .map_err(Self::db_err)?;

            let mut results = Vec::new();
            for row in rows {
                results.push(row.map_err(Self::db_err)?);
            }
            results
        };

        let mut items = Vec::with_capacity(bodies.len());
        for (id, body) in bodies {
            match serde_json::from_str::<T>(&body) {
                Ok(item) => items.push(item),
                // One unreadable document must not hide the rest of the list.
                Err(e) => warn!(collection = T::COLLECTION, %id, error = %e, "[DocumentStore] skipping malformed record"),
            }
        }
        Ok(items)
    }

    async fn patch(&self, id: &str, patch: &Patch) -> Result<(), StoreError> {
        check_patch(patch)?;
        let mut body = self.load_body(T::COLLECTION, id)?;
        if !patch.apply_to(&mut body) {
            return Err(StoreError::SerializationError(format!(
                "record {} is not a JSON object",
                id
            )));
        }
        // Round-trip through T so a patch cannot store a body the collection can't read.
        let item: T = serde_json::from_value(body).map_err(Self::ser_err)?;
        let body = serde_json::to_string(&item).map_err(Self::ser_err)?;

        let affected = self
            .db
            .connection()
            .execute(
                "UPDATE documents SET body = ?1 WHERE id = ?2 AND collection = ?3",
                params![body, id, T::COLLECTION],
            )
            .map_err(Self::db_err)?;

        if affected == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let affected = self
            .db
            .connection()
            .execute(
                "DELETE FROM documents WHERE id = ?1 AND collection = ?2",
                params![id, T::COLLECTION],
            )
            .map_err(Self::db_err)?;

        if affected == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
