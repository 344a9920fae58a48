//! Pipeline error taxonomy.
//!
//! Every variant is terminal for the operation that raised it; nothing in the
//! pipeline retries. Variants carry the captured tool output or the
//! underlying storage error so the caller can log them.

use std::io;
use std::time::Duration;

use clipvault_core::{AppError, ErrorMetadata, LogLevel, VideoRecord};
use clipvault_storage::StorageError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("ffprobe failed: {stderr}")]
    ProbeFailure { stderr: String },

    #[error("Failed to parse ffprobe output: {0}")]
    ProbeParseFailure(#[source] serde_json::Error),

    #[error("No video stream with positive dimensions found")]
    NoVisualStream,

    #[error("Fast-start remux failed: {stderr}")]
    RemuxFailure { stderr: String },

    #[error("Upload of {key} failed: {source}")]
    UploadFailure {
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("Signing {bucket}/{key} failed: {source}")]
    SigningFailure {
        bucket: String,
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("Failed to run {program}: {source}")]
    ProcessSpawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid tool path: {0}")]
    InvalidToolPath(String),

    #[error("{operation} was cancelled")]
    Cancelled { operation: &'static str },

    #[error("{operation} timed out after {}s", .timeout.as_secs())]
    TimedOut {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Video is too large: more than {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("Video {0} not found")]
    NotFound(Uuid),

    #[error("Video {video_id} is not owned by the caller")]
    NotOwner { video_id: Uuid },

    #[error("Malformed storage reference: {0}")]
    MalformedReference(String),

    #[error("Metadata store error: {0}")]
    Repository(#[source] AppError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Static metadata for each variant: (error_code, recoverable, sensitive, log_level).
fn pipeline_error_static_metadata(err: &PipelineError) -> (&'static str, bool, bool, LogLevel) {
    match err {
        PipelineError::ProbeFailure { .. } => ("PROBE_FAILURE", false, true, LogLevel::Warn),
        PipelineError::ProbeParseFailure(_) => ("PROBE_PARSE_FAILURE", false, true, LogLevel::Error),
        PipelineError::NoVisualStream => ("NO_VISUAL_STREAM", false, false, LogLevel::Debug),
        PipelineError::RemuxFailure { .. } => ("REMUX_FAILURE", false, true, LogLevel::Warn),
        PipelineError::UploadFailure { .. } => ("UPLOAD_FAILURE", true, true, LogLevel::Error),
        PipelineError::SigningFailure { .. } => ("SIGNING_FAILURE", true, true, LogLevel::Error),
        PipelineError::ProcessSpawn { .. } => ("PROCESS_SPAWN_FAILURE", false, true, LogLevel::Error),
        PipelineError::InvalidToolPath(_) => ("INVALID_TOOL_PATH", false, true, LogLevel::Error),
        PipelineError::Cancelled { .. } => ("CANCELLED", true, false, LogLevel::Debug),
        PipelineError::TimedOut { .. } => ("TIMED_OUT", true, false, LogLevel::Warn),
        PipelineError::UnsupportedMediaType(_) => {
            ("UNSUPPORTED_MEDIA_TYPE", false, false, LogLevel::Debug)
        }
        PipelineError::PayloadTooLarge { .. } => ("PAYLOAD_TOO_LARGE", false, false, LogLevel::Debug),
        PipelineError::NotFound(_) => ("NOT_FOUND", false, false, LogLevel::Debug),
        PipelineError::NotOwner { .. } => ("NOT_OWNER", false, false, LogLevel::Debug),
        PipelineError::MalformedReference(_) => ("MALFORMED_REFERENCE", false, true, LogLevel::Error),
        PipelineError::Repository(inner) => (inner.error_code(), inner.is_recoverable(), true, LogLevel::Error),
        PipelineError::Io(_) => ("IO_ERROR", true, true, LogLevel::Error),
    }
}

impl ErrorMetadata for PipelineError {
    fn error_code(&self) -> &'static str {
        pipeline_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        pipeline_error_static_metadata(self).1
    }

    fn is_sensitive(&self) -> bool {
        pipeline_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        pipeline_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            PipelineError::ProbeFailure { .. } | PipelineError::ProbeParseFailure(_) => {
                "Unable to read video metadata".to_string()
            }
            PipelineError::NoVisualStream => "File contains no video stream".to_string(),
            PipelineError::RemuxFailure { .. } => "Unable to prepare video for streaming".to_string(),
            PipelineError::UploadFailure { .. } => "Failed to store video".to_string(),
            PipelineError::SigningFailure { .. } => "Failed to create video URL".to_string(),
            PipelineError::Cancelled { .. } => "Request was cancelled".to_string(),
            PipelineError::TimedOut { .. } => "Video processing took too long".to_string(),
            PipelineError::UnsupportedMediaType(_) => "Only mp4 is supported".to_string(),
            PipelineError::PayloadTooLarge { .. } => "Video is too big".to_string(),
            PipelineError::NotFound(_) => "Video not found".to_string(),
            PipelineError::NotOwner { .. } => "User is not video owner".to_string(),
            PipelineError::Repository(inner) => inner.client_message(),
            PipelineError::ProcessSpawn { .. }
            | PipelineError::InvalidToolPath(_)
            | PipelineError::MalformedReference(_)
            | PipelineError::Io(_) => "Internal server error".to_string(),
        }
    }
}

/// Resolution failure, handed back together with the untouched record.
///
/// The caller decides whether to serve the record without a URL or fail the
/// whole response.
#[derive(Debug, Error)]
#[error("Failed to resolve storage reference of video {}: {source}", .record.id)]
pub struct ResolveError {
    pub record: VideoRecord,
    #[source]
    pub source: PipelineError,
}

impl ResolveError {
    pub fn into_parts(self) -> (VideoRecord, PipelineError) {
        (self.record, self.source)
    }
}
