//! Video ingestion: stage a submission, run the pipeline, persist the reference.

use clipvault_core::constants::VIDEO_MP4_CONTENT_TYPE;
use clipvault_core::{Config, VideoRecord, VideoRepository};
use clipvault_storage::ObjectReader;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::command::run_bounded;
use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::VideoPipeline;

const STAGED_FILE_NAME: &str = "source.mp4";

/// Strip parameters from a MIME type and normalise case.
fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

pub struct IngestService {
    repository: Arc<dyn VideoRepository>,
    pipeline: VideoPipeline,
    temp_dir: PathBuf,
    max_video_size_bytes: u64,
    staging_timeout: Duration,
}

impl IngestService {
    pub fn new(
        repository: Arc<dyn VideoRepository>,
        pipeline: VideoPipeline,
        config: &Config,
    ) -> Self {
        Self {
            repository,
            pipeline,
            temp_dir: config.upload_temp_dir.clone(),
            max_video_size_bytes: config.max_video_size_bytes,
            staging_timeout: config.storage_timeout,
        }
    }

    /// Ingest `body` as the media of video `video_id` on behalf of `caller_id`.
    ///
    /// On success the persisted record holds the new durable reference and is
    /// returned. On any failure the record is left as it was and every staged
    /// file is gone.
    #[tracing::instrument(skip(self, body, cancel), fields(video_id = %video_id, caller_id = %caller_id))]
    pub async fn ingest(
        &self,
        video_id: Uuid,
        caller_id: Uuid,
        content_type: &str,
        body: ObjectReader,
        cancel: &CancellationToken,
    ) -> PipelineResult<VideoRecord> {
        let media_type = media_type(content_type);
        if media_type != VIDEO_MP4_CONTENT_TYPE {
            return Err(PipelineError::UnsupportedMediaType(content_type.to_string()));
        }

        let mut video = self
            .repository
            .get_video(video_id)
            .await
            .map_err(PipelineError::Repository)?
            .ok_or(PipelineError::NotFound(video_id))?;

        if !video.is_owned_by(caller_id) {
            return Err(PipelineError::NotOwner { video_id });
        }

        // Dropping the directory removes the staged file and anything ffmpeg
        // left beside it.
        let staging = tempfile::Builder::new()
            .prefix("clipvault-upload")
            .tempdir_in(&self.temp_dir)?;
        let staged_size = run_bounded(
            "staging",
            self.staging_timeout,
            cancel,
            self.stage(&staging, body),
        )
        .await?;

        tracing::info!(size_bytes = staged_size, "Video staged");

        let processed = self
            .pipeline
            .process_file(&staging.path().join(STAGED_FILE_NAME), &media_type, cancel)
            .await?;

        video.attach_upload(&processed.reference, &media_type);
        self.repository
            .update_video(&video)
            .await
            .map_err(PipelineError::Repository)?;

        tracing::info!(
            bucket = %processed.reference.bucket,
            key = %processed.reference.key,
            orientation = %processed.orientation,
            "Video ingested"
        );

        Ok(video)
    }

    /// Copy `body` into the staging directory, enforcing the size limit.
    async fn stage(&self, staging: &TempDir, body: ObjectReader) -> PipelineResult<u64> {
        let path = staging.path().join(STAGED_FILE_NAME);
        let mut file = tokio::fs::File::create(&path).await?;

        // Read one byte past the limit so an oversized body is detectable.
        let mut limited = body.take(self.max_video_size_bytes.saturating_add(1));
        let copied = tokio::io::copy(&mut limited, &mut file).await?;
        if copied > self.max_video_size_bytes {
            return Err(PipelineError::PayloadTooLarge {
                limit: self.max_video_size_bytes,
            });
        }

        file.flush().await?;
        file.sync_all().await?;
        Ok(copied)
    }
}
