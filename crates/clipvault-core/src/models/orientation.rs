//! Coarse frame-shape categories used to namespace storage keys.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Orientation folder a video is uploaded under.
///
/// Written into the object key at upload time, so an object's class never
/// changes after it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrientationClass {
    Landscape,
    Portrait,
    Other,
}

impl OrientationClass {
    /// Map an aspect label (`"16:9"`, `"9:16"`, ...) to its folder.
    ///
    /// Anything that is not one of the two reference labels, including the
    /// `"undefined"` sentinel and the empty string, lands in `other`.
    pub fn from_aspect_label(label: &str) -> Self {
        match label {
            "16:9" => OrientationClass::Landscape,
            "9:16" => OrientationClass::Portrait,
            _ => OrientationClass::Other,
        }
    }

    /// Folder name used as the first key segment.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrientationClass::Landscape => "landscape",
            OrientationClass::Portrait => "portrait",
            OrientationClass::Other => "other",
        }
    }
}

impl Display for OrientationClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
