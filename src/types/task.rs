use serde::{Deserialize, Serialize};

use super::item::{Completable, OrderableItem, OwnerId, Patch};

/// A to-do entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub text: String,
}

impl OrderableItem for Task {
    type Draft = TaskDraft;

    const COLLECTION: &'static str = "todos";

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
        draft: TaskDraft,
    ) -> Self {
        Self {
            id,
            text: draft.text,
            done: false,
            created_at: Some(created_at),
            order,
            owner_id: Some(owner.as_str().to_string()),
        }
    }

    fn draft_patch(draft: &TaskDraft) -> Patch {
        Patch::new().set("text", draft.text.as_str())
    }

    fn apply_draft(&mut self, draft: &TaskDraft) {
        self.text = draft.text.clone();
    }
}

impl Completable for Task {
    fn is_done(&self) -> bool {
        self.done
    }

    fn set_done(&mut self, done: bool) {
        self.done = done;
    }

    fn done_patch(done: bool) -> Patch {
        Patch::new().set("done", done)
    }
}
