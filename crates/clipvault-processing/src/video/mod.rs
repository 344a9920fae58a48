//! Video inspection and container rewriting

pub mod aspect;
pub mod probe;
pub mod remux;

pub use aspect::{aspect_ratio_label, classify_orientation};
pub use probe::{parse_probe_output, FfprobeProber, Prober, StreamDimensions};
pub use remux::{fast_start_output_path, FfmpegRemuxer, Remuxer};
