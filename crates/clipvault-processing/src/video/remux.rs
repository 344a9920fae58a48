//! Fast-start remuxer - moves the mp4 index to the front without re-encoding

use async_trait::async_trait;
use clipvault_core::constants::FAST_START_SUFFIX;
use clipvault_core::Config;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::command::{run_tool, validate_tool_path};
use crate::error::{PipelineError, PipelineResult};

/// Rewrites a local file for progressive playback.
///
/// Implementations never delete the input or the output; the caller owns
/// both.
#[async_trait]
pub trait Remuxer: Send + Sync {
    async fn remux(&self, input: &Path, cancel: &CancellationToken) -> PipelineResult<PathBuf>;
}

/// Where the fast-start copy of `input` is written.
pub fn fast_start_output_path(input: &Path) -> PathBuf {
    let mut output = input.as_os_str().to_os_string();
    output.push(FAST_START_SUFFIX);
    PathBuf::from(output)
}

/// `Remuxer` backed by the ffmpeg binary.
pub struct FfmpegRemuxer {
    ffmpeg_path: String,
    timeout: Duration,
}

impl FfmpegRemuxer {
    pub fn new(config: &Config) -> PipelineResult<Self> {
        Self::with_path(config.ffmpeg_path.clone(), config.remux_timeout)
    }

    pub fn with_path(ffmpeg_path: String, timeout: Duration) -> PipelineResult<Self> {
        validate_tool_path(&ffmpeg_path)?;
        Ok(Self {
            ffmpeg_path,
            timeout,
        })
    }

    fn args(input: &Path, output: &Path) -> Vec<OsString> {
        vec![
            "-i".into(),
            input.as_os_str().to_os_string(),
            "-c".into(),
            "copy".into(),
            "-movflags".into(),
            "faststart".into(),
            "-f".into(),
            "mp4".into(),
            output.as_os_str().to_os_string(),
        ]
    }
}

#[async_trait]
impl Remuxer for FfmpegRemuxer {
    #[tracing::instrument(skip(self, cancel), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart"
    ))]
    async fn remux(&self, input: &Path, cancel: &CancellationToken) -> PipelineResult<PathBuf> {
        let start = std::time::Instant::now();
        let output_path = fast_start_output_path(input);

        let output = run_tool(
            "ffmpeg",
            &self.ffmpeg_path,
            Self::args(input, &output_path),
            self.timeout,
            cancel,
        )
        .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::warn!(
                exit_code = ?output.status.code(),
                stderr = %stderr,
                "ffmpeg fast-start remux failed"
            );
            return Err(PipelineError::RemuxFailure { stderr });
        }

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            output = %output_path.display(),
            "Fast-start remux completed"
        );

        Ok(output_path)
    }
}
