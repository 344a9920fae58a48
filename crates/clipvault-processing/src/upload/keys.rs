//! Storage key generation.
//!
//! Key format: `{orientation}/{identifier}.mp4` where the identifier is 256
//! random bits, URL-safe base64 without padding (43 characters).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use clipvault_core::constants::VIDEO_KEY_EXTENSION;
use clipvault_core::OrientationClass;
use rand::RngCore;

const IDENTIFIER_BYTES: usize = 32;

/// Encoded length of an identifier.
pub const IDENTIFIER_LEN: usize = 43;

/// Generate a fresh random object identifier.
///
/// Uniqueness is left to the entropy; no existence check is made.
pub fn generate_identifier() -> String {
    let mut bytes = [0u8; IDENTIFIER_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn build_video_key(orientation: OrientationClass, identifier: &str) -> String {
    format!(
        "{}/{}.{}",
        orientation.as_str(),
        identifier,
        VIDEO_KEY_EXTENSION
    )
}
