//! Fixed values shared across crates.

use std::time::Duration;

/// Validity window of delivery URLs handed out at read time.
pub const SIGNED_URL_TTL: Duration = Duration::from_secs(3600);

/// Separator between bucket and key in a persisted durable reference.
pub const REFERENCE_SEPARATOR: char = ',';

/// Only container format accepted for video submissions.
pub const VIDEO_MP4_CONTENT_TYPE: &str = "video/mp4";

/// Suffix appended to a staged file's path to name its fast-start copy.
pub const FAST_START_SUFFIX: &str = ".processing";

/// File extension of every uploaded video object.
pub const VIDEO_KEY_EXTENSION: &str = "mp4";
