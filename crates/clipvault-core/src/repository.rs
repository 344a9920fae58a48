//! Metadata-store seam.
//!
//! The store itself lives outside this workspace; the pipeline only needs to
//! fetch one record and write it back.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::VideoRecord;

#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Fetch a record by id, `Ok(None)` when it does not exist.
    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError>;

    /// Overwrite the stored record with `video`.
    async fn update_video(&self, video: &VideoRecord) -> Result<(), AppError>;
}
