//! Stream prober - pixel dimensions of the first visual stream via ffprobe

use async_trait::async_trait;
use clipvault_core::Config;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::command::{run_tool, validate_tool_path};
use crate::error::{PipelineError, PipelineResult};

/// Width and height of a visual stream, both strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDimensions {
    pub width: u32,
    pub height: u32,
}

/// Inspects a local media file.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> PipelineResult<StreamDimensions>;
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<i64>,
    height: Option<i64>,
}

/// Pick the first stream with positive dimensions out of ffprobe's JSON.
pub fn parse_probe_output(stdout: &[u8]) -> PipelineResult<StreamDimensions> {
    let output: ProbeOutput =
        serde_json::from_slice(stdout).map_err(PipelineError::ProbeParseFailure)?;

    output
        .streams
        .iter()
        .find_map(|stream| {
            let width = u32::try_from(stream.width?).ok()?;
            let height = u32::try_from(stream.height?).ok()?;
            (width > 0 && height > 0).then_some(StreamDimensions { width, height })
        })
        .ok_or(PipelineError::NoVisualStream)
}

/// `Prober` backed by the ffprobe binary.
pub struct FfprobeProber {
    ffprobe_path: String,
    timeout: Duration,
}

impl FfprobeProber {
    pub fn new(config: &Config) -> PipelineResult<Self> {
        Self::with_path(config.ffprobe_path.clone(), config.probe_timeout)
    }

    pub fn with_path(ffprobe_path: String, timeout: Duration) -> PipelineResult<Self> {
        validate_tool_path(&ffprobe_path)?;
        Ok(Self {
            ffprobe_path,
            timeout,
        })
    }
}

#[async_trait]
impl Prober for FfprobeProber {
    #[tracing::instrument(skip(self, cancel), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn probe(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> PipelineResult<StreamDimensions> {
        let start = std::time::Instant::now();

        let args: Vec<OsString> = vec![
            "-v".into(),
            "error".into(),
            "-print_format".into(),
            "json".into(),
            "-show_streams".into(),
            path.as_os_str().to_os_string(),
        ];

        let output = run_tool("ffprobe", &self.ffprobe_path, args, self.timeout, cancel).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::warn!(
                exit_code = ?output.status.code(),
                stderr = %stderr,
                "ffprobe exited with failure"
            );
            return Err(PipelineError::ProbeFailure { stderr });
        }

        let dimensions = parse_probe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            width = dimensions.width,
            height = dimensions.height,
            "Video probe completed"
        );

        Ok(dimensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_stream_with_positive_dimensions() {
        let json = br#"{
            "streams": [
                {"index": 0, "codec_type": "audio", "codec_name": "aac"},
                {"index": 1, "codec_type": "video", "width": 0, "height": 0},
                {"index": 2, "codec_type": "video", "width": 1920, "height": 1080},
                {"index": 3, "codec_type": "video", "width": 640, "height": 360}
            ]
        }"#;

        let dims = parse_probe_output(json).unwrap();
        assert_eq!(
            dims,
            StreamDimensions {
                width: 1920,
                height: 1080
            }
        );
    }

    #[test]
    fn requires_both_dimensions() {
        let json = br#"{"streams": [{"width": 1080}, {"height": 1920}]}"#;
        assert!(matches!(
            parse_probe_output(json),
            Err(PipelineError::NoVisualStream)
        ));
    }

    #[test]
    fn no_streams_is_no_visual_stream() {
        assert!(matches!(
            parse_probe_output(br#"{"streams": []}"#),
            Err(PipelineError::NoVisualStream)
        ));
        assert!(matches!(
            parse_probe_output(b"{}"),
            Err(PipelineError::NoVisualStream)
        ));
    }

    #[test]
    fn negative_dimensions_are_skipped() {
        let json = br#"{"streams": [{"width": -1, "height": 720}, {"width": 720, "height": 1280}]}"#;
        assert_eq!(
            parse_probe_output(json).unwrap(),
            StreamDimensions {
                width: 720,
                height: 1280
            }
        );
    }

    #[test]
    fn garbage_output_is_parse_failure() {
        assert!(matches!(
            parse_probe_output(b"not json at all"),
            Err(PipelineError::ProbeParseFailure(_))
        ));
    }

    #[test]
    fn rejects_unsafe_ffprobe_path() {
        assert!(FfprobeProber::with_path("ffprobe|sh".to_string(), Duration::from_secs(1)).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_probe_failure() {
        // `false` ignores its arguments and exits 1.
        let prober = FfprobeProber::with_path("false".to_string(), Duration::from_secs(5)).unwrap();
        let result = prober
            .probe(Path::new("/nonexistent.mp4"), &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(PipelineError::ProbeFailure { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cancelled_probe_is_reported() {
        let prober = FfprobeProber::with_path("sleep".to_string(), Duration::from_secs(30)).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        // `sleep` rejects the ffprobe flags, but cancellation is checked first.
        let result = prober.probe(Path::new("10"), &cancel).await;
        assert!(matches!(result, Err(PipelineError::Cancelled { .. })));
    }
}
