use serde::{Deserialize, Serialize};

use super::item::{OrderableItem, OwnerId, Patch};

/// A shortcut tile on the start page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_name: Option<String>,
    /// Legacy field. Cleared on every edit, never written on creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

/// Editable bookmark fields, as submitted by the add/edit form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkDraft {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon_name: Option<String>,
}

impl OrderableItem for Bookmark {
    type Draft = BookmarkDraft;

    const COLLECTION: &'static str = "sites";

    fn id(&self) -> &str {
        &self.id
    }

    fn order(&self) -> Option<u32> {
        self.order
    }

    fn set_order(&mut self, order: Option<u32>) {
        self.order = order;
    }

    fn created_at(&self) -> Option<i64> {
        self.created_at
    }

    fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    fn from_draft(
        id: String,
        owner: &OwnerId,
        created_at: i64,
        order: Option<u32>,
        draft: BookmarkDraft,
    ) -> Self {
        Self {
            id,
            title: draft.title,
            url: draft.url,
            description: draft.description,
            icon_name: draft.icon_name,
            image_url: None,
            created_at: Some(created_at),
            order,
            owner_id: Some(owner.as_str().to_string()),
        }
    }

    fn draft_patch(draft: &BookmarkDraft) -> Patch {
        Patch::new()
            .set("title", draft.title.as_str())
            .set("url", draft.url.as_str())
            .set("description", draft.description.clone())
            .set("iconName", draft.icon_name.clone())
            .set("imageUrl", serde_json::Value::Null)
    }

    fn apply_draft(&mut self, draft: &BookmarkDraft) {
        self.title = draft.title.clone();
        self.url = draft.url.clone();
        self.description = draft.description.clone();
        self.icon_name = draft.icon_name.clone();
        self.image_url = None;
    }
}
