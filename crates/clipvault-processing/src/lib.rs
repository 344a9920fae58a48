//! Clipvault Processing Library
//!
//! The video ingestion-and-delivery pipeline: probe a staged file, classify
//! its orientation, remux it for fast start, upload it under an
//! orientation-prefixed key, and later resolve the stored reference into a
//! signed delivery URL.

pub(crate) mod command;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod resolver;
pub mod upload;
pub mod video;

// Re-export commonly used types
pub use error::{PipelineError, PipelineResult, ResolveError};
pub use ingest::IngestService;
pub use pipeline::{ProcessedVideo, VideoPipeline};
pub use resolver::ReferenceResolver;
pub use upload::{build_video_key, generate_identifier, VideoUploader};
pub use video::{
    aspect_ratio_label, classify_orientation, FfmpegRemuxer, FfprobeProber, Prober, Remuxer,
    StreamDimensions,
};
