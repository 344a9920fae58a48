//! Shared helpers for the `clipvault` operator CLI.

use anyhow::Context;
use clipvault_core::OrientationClass;
use clipvault_processing::{aspect_ratio_label, StreamDimensions};
use serde::Serialize;

/// What `clipvault probe` prints for a file.
#[derive(Debug, Serialize, PartialEq)]
pub struct ProbeReport {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: &'static str,
    pub orientation: OrientationClass,
}

impl From<StreamDimensions> for ProbeReport {
    fn from(dimensions: StreamDimensions) -> Self {
        let aspect_ratio = aspect_ratio_label(dimensions.width, dimensions.height);
        Self {
            width: dimensions.width,
            height: dimensions.height,
            aspect_ratio,
            orientation: OrientationClass::from_aspect_label(aspect_ratio),
        }
    }
}

/// Pretty-print `value` as JSON on stdout.
pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays JSON.
///
/// Production runs emit one JSON object per event for log shipping.
pub fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_for_full_hd() {
        let report = ProbeReport::from(StreamDimensions {
            width: 1920,
            height: 1080,
        });
        assert_eq!(report.aspect_ratio, "16:9");
        assert_eq!(report.orientation, OrientationClass::Landscape);
    }

    #[test]
    fn report_for_vertical_video() {
        let report = ProbeReport::from(StreamDimensions {
            width: 720,
            height: 1280,
        });
        assert_eq!(report.aspect_ratio, "9:16");
        assert_eq!(report.orientation, OrientationClass::Portrait);
    }

    #[test]
    fn report_serializes_orientation_lowercase() {
        let report = ProbeReport::from(StreamDimensions {
            width: 640,
            height: 480,
        });
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["orientation"], "other");
        assert_eq!(json["width"], 640);
    }
}
