//! Aspect-ratio classification.

use clipvault_core::OrientationClass;

pub const LANDSCAPE_LABEL: &str = "16:9";
pub const PORTRAIT_LABEL: &str = "9:16";
pub const OTHER_LABEL: &str = "other";
/// Returned for a zero height instead of dividing.
pub const UNDEFINED_LABEL: &str = "undefined";

/// Maximum absolute distance (exclusive) from a reference ratio.
pub const RATIO_TOLERANCE: f64 = 0.01;

const REFERENCE_RATIOS: [(&str, f64); 2] = [
    (LANDSCAPE_LABEL, 16.0 / 9.0),
    (PORTRAIT_LABEL, 9.0 / 16.0),
];

fn within_tolerance(ratio: f64, reference: f64, tolerance: f64) -> bool {
    (ratio - reference).abs() < tolerance
}

/// Label a frame shape as `"16:9"`, `"9:16"` or `"other"`.
///
/// The prober only forwards positive dimensions, so the `"undefined"` branch
/// is not reachable from ingestion.
pub fn aspect_ratio_label(width: u32, height: u32) -> &'static str {
    if height == 0 {
        return UNDEFINED_LABEL;
    }

    let ratio = f64::from(width) / f64::from(height);

    REFERENCE_RATIOS
        .iter()
        .find(|(_, reference)| within_tolerance(ratio, *reference, RATIO_TOLERANCE))
        .map(|(label, _)| *label)
        .unwrap_or(OTHER_LABEL)
}

pub fn classify_orientation(width: u32, height: u32) -> OrientationClass {
    OrientationClass::from_aspect_label(aspect_ratio_label(width, height))
}
