//! Probe → classify → remux → upload for one staged file.

use clipvault_core::{Config, DurableReference, OrientationClass};
use clipvault_storage::Storage;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::PipelineResult;
use crate::upload::VideoUploader;
use crate::video::{
    aspect_ratio_label, fast_start_output_path, FfmpegRemuxer, FfprobeProber, Prober, Remuxer,
    StreamDimensions,
};

/// Outcome of a successful run over one file.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedVideo {
    pub dimensions: StreamDimensions,
    pub aspect_ratio: &'static str,
    pub orientation: OrientationClass,
    pub reference: DurableReference,
}

/// Removes the file at `path` when dropped, if it exists.
struct RemoveOnDrop(PathBuf);

impl Drop for RemoveOnDrop {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.0) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                error = %e,
                path = %self.0.display(),
                "Failed to remove temporary file"
            ),
        }
    }
}

pub struct VideoPipeline {
    prober: Arc<dyn Prober>,
    remuxer: Arc<dyn Remuxer>,
    uploader: VideoUploader,
}

impl VideoPipeline {
    pub fn new(prober: Arc<dyn Prober>, remuxer: Arc<dyn Remuxer>, uploader: VideoUploader) -> Self {
        Self {
            prober,
            remuxer,
            uploader,
        }
    }

    /// Wire the ffprobe/ffmpeg-backed pipeline from configuration.
    pub fn from_config(config: &Config, storage: Arc<dyn Storage>) -> PipelineResult<Self> {
        Ok(Self::new(
            Arc::new(FfprobeProber::new(config)?),
            Arc::new(FfmpegRemuxer::new(config)?),
            VideoUploader::new(storage, config),
        ))
    }

    /// Run the pipeline over `source`, leaving `source` itself in place.
    ///
    /// The fast-start copy written next to `source` is removed on every exit
    /// path, including a failed or cancelled remux that left partial output.
    pub async fn process_file(
        &self,
        source: &Path,
        content_type: &str,
        cancel: &CancellationToken,
    ) -> PipelineResult<ProcessedVideo> {
        let dimensions = self.prober.probe(source, cancel).await?;
        let aspect_ratio = aspect_ratio_label(dimensions.width, dimensions.height);
        let orientation = OrientationClass::from_aspect_label(aspect_ratio);

        tracing::debug!(
            width = dimensions.width,
            height = dimensions.height,
            aspect_ratio = aspect_ratio,
            orientation = %orientation,
            "Video classified"
        );

        let _expected_output = RemoveOnDrop(fast_start_output_path(source));
        let remuxed = self.remuxer.remux(source, cancel).await?;
        let _remuxed_output = RemoveOnDrop(remuxed.clone());

        let reference = self
            .uploader
            .upload(&remuxed, orientation, content_type, cancel)
            .await?;

        Ok(ProcessedVideo {
            dimensions,
            aspect_ratio,
            orientation,
            reference,
        })
    }
}
