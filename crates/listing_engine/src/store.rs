use listing_core::{MediaId, PersistedMediaItem, PriorityAssignment};
use thiserror::Error;

use crate::NewMedia;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("property not found: {0}")]
    PropertyNotFound(String),
    #[error("media not found: {0}")]
    MediaNotFound(MediaId),
    #[error("backend error: {0}")]
    Backend(String),
}

/// Document-store operations the media editor relies on.
///
/// `reorder_priorities` and `remove_media` are idempotent: repeating a call
/// with the same arguments leaves the store unchanged.
#[async_trait::async_trait]
pub trait MediaStore: Send + Sync {
    async fn list_media(&self, property_id: &str) -> Result<Vec<PersistedMediaItem>, StoreError>;

    async fn reorder_priorities(
        &self,
        property_id: &str,
        order: &[PriorityAssignment],
    ) -> Result<(), StoreError>;

    async fn remove_media(&self, media_id: &MediaId) -> Result<(), StoreError>;

    async fn add_media(&self, media: NewMedia) -> Result<PersistedMediaItem, StoreError>;

    async fn update_description(
        &self,
        media_id: &MediaId,
        description: &str,
    ) -> Result<(), StoreError>;
}
