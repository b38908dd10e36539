//! Shared shape of the records that take part in the ordering scheme.
//!
//! The backing store knows nothing about list order. Each record carries an
//! optional integer `order` and an optional `createdAt`; everything else about
//! ordering lives in [`crate::managers::ordered_collection`].

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Persisted name of the order field.
pub const ORDER_FIELD: &str = "order";

/// Fields a patch may never rewrite.
pub const IMMUTABLE_FIELDS: &[&str] = &["id", "ownerId", "createdAt"];

/// Identity of the authenticated owner that scopes every record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Field-level partial update for a single stored document.
///
/// Keys are persisted (camelCase) field names. Applying a patch merges the
/// listed fields into the stored body and leaves every other field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch(Map<String, Value>);

impl Patch {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Adds (or replaces) one field in the patch.
    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    /// Patch that rewrites only the `order` field.
    pub fn order(order: u32) -> Self {
        Self::new().set(ORDER_FIELD, order)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn touches(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Returns the first field of the patch that is not allowed to change.
    pub fn immutable_field(&self) -> Option<&str> {
        IMMUTABLE_FIELDS
            .iter()
            .find(|f| self.0.contains_key(**f))
            .copied()
    }

    /// Merges the patch into a JSON document body.
    ///
    /// Returns `false` if `body` is not a JSON object. A `null` value removes
    /// the field, mirroring how the document store treats cleared fields.
    pub fn apply_to(&self, body: &mut Value) -> bool {
        let Value::Object(map) = body else {
            return false;
        };
        for (key, value) in &self.0 {
            if value.is_null() {
                map.remove(key);
            } else {
                map.insert(key.clone(), value.clone());
            }
        }
        true
    }
}

/// A record that lives in an owner-scoped, unordered collection and is
/// presented to the user as an ordered list.
pub trait OrderableItem:
    Clone + fmt::Debug + PartialEq + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// User-editable fields supplied on creation and edit.
    type Draft: Clone + fmt::Debug + Send + Sync + Serialize + DeserializeOwned + 'static;

    /// Name of the store collection holding this entity type.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
    fn order(&self) -> Option<u32>;
    fn set_order(&mut self, order: Option<u32>);
    fn created_at(&self) -> Option<i64>;
    fn owner_id(&self) -> Option<&str>;

    /// Materializes a record from a draft once identity and timestamps exist.
    fn from_draft(
        id: String,
        owner: &OwnerId,
        created_at: i64,
        order: Option<u32>,
        draft: Self::Draft,
    ) -> Self;

    /// Patch carrying the editable fields of `draft`.
    fn draft_patch(draft: &Self::Draft) -> Patch;

    /// Applies the editable fields of `draft` in place.
    fn apply_draft(&mut self, draft: &Self::Draft);

    /// True when the record belongs to `owner`. Records without an owner
    /// field are treated as foreign.
    fn is_owned_by(&self, owner: &OwnerId) -> bool {
        self.owner_id() == Some(owner.as_str())
    }
}

/// Items with a boolean completion flag that is flipped in place.
pub trait Completable: OrderableItem {
    fn is_done(&self) -> bool;
    fn set_done(&mut self, done: bool);
    fn done_patch(done: bool) -> Patch;
}
