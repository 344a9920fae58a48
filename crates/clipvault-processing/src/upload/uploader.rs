//! Streams a local video file to the object store under a fresh key.

use clipvault_core::{Config, DurableReference, OrientationClass};
use clipvault_storage::{ObjectReader, Storage};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::keys::{build_video_key, generate_identifier};
use crate::command::run_bounded;
use crate::error::{PipelineError, PipelineResult};

pub struct VideoUploader {
    storage: Arc<dyn Storage>,
    timeout: Duration,
}

impl VideoUploader {
    pub fn new(storage: Arc<dyn Storage>, config: &Config) -> Self {
        Self::with_timeout(storage, config.storage_timeout)
    }

    pub fn with_timeout(storage: Arc<dyn Storage>, timeout: Duration) -> Self {
        Self { storage, timeout }
    }

    /// Upload `path` under `{orientation}/{random id}.mp4`.
    ///
    /// Returns the reference for the caller to persist; the metadata store is
    /// not touched here. A failed put is not cleaned up.
    pub async fn upload(
        &self,
        path: &Path,
        orientation: OrientationClass,
        content_type: &str,
        cancel: &CancellationToken,
    ) -> PipelineResult<DurableReference> {
        let key = build_video_key(orientation, &generate_identifier());
        let bucket = self.storage.bucket().to_string();

        let file = tokio::fs::File::open(path).await?;
        let reader: ObjectReader = Box::pin(file);

        let storage = self.storage.clone();
        let size = run_bounded("upload", self.timeout, cancel, async {
            storage
                .put_object(&key, reader, content_type)
                .await
                .map_err(|source| PipelineError::UploadFailure {
                    key: key.clone(),
                    source,
                })
        })
        .await?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            orientation = %orientation,
            size_bytes = size,
            "Video uploaded"
        );

        Ok(DurableReference::new(bucket, key))
    }
}
