use serde::{Deserialize, Serialize};

use crate::error::{OrganizerError, Result};

/// One remote media file announced by a webhook call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub url: String,
    pub name: String,
    /// 0 means the item has no source-side folder.
    #[serde(default, alias = "parentId")]
    pub parent_id: u64,
}

impl MediaItem {
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            parent_id: 0,
        }
    }

    pub fn with_parent(mut self, parent_id: u64) -> Self {
        self.parent_id = parent_id;
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PayloadShape {
    Bare(Vec<MediaItem>),
    Wrapped { items: Vec<MediaItem> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookPayload {
    pub items: Vec<MediaItem>,
}

impl WebhookPayload {
    /// Accepts `[ {...}, ... ]` or `{ "items": [ ... ] }`.
    pub fn from_json(raw: &str) -> Result<Self> {
        let shape: PayloadShape =
            serde_json::from_str(raw).map_err(|source| OrganizerError::Payload { source })?;
        let items = match shape {
            PayloadShape::Bare(items) | PayloadShape::Wrapped { items } => items,
        };
        Ok(Self { items })
    }
}
