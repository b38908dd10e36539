use serde::{Deserialize, Serialize};

use super::item::OwnerId;

/// Profile of the signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    pub fn owner_id(&self) -> OwnerId {
        OwnerId::new(self.uid.clone())
    }
}
