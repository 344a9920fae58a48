use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::storage::{DurableReference, StorageReference};
use crate::error::AppError;

/// A video row as held by the metadata store.
///
/// The pipeline only overwrites `storage_reference` and `updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    /// Encoded durable reference once persisted; a signed URL on read copies.
    pub storage_reference: Option<String>,
    pub content_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoRecord {
    pub fn new(owner_id: Uuid, title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: title.into(),
            description: description.into(),
            thumbnail_url: None,
            storage_reference: None,
            content_type: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    /// Current state of the storage reference.
    pub fn storage_state(&self) -> Result<StorageReference, AppError> {
        StorageReference::classify(self.storage_reference.as_deref())
    }

    /// Point the record at a freshly uploaded object.
    pub fn attach_upload(&mut self, reference: &DurableReference, content_type: &str) {
        self.storage_reference = Some(reference.encode());
        self.content_type = Some(content_type.to_string());
        self.updated_at = Utc::now();
    }
}
