use clipvault_core::VideoRecord;
use clipvault_storage::ObjectReader;
use uuid::Uuid;

/// Bytes standing in for an mp4 upload; the doubles never parse them.
pub const SAMPLE_VIDEO: &[u8] = b"\x00\x00\x00\x18ftypmp42 sample video body";

pub fn video_owned_by(owner_id: Uuid) -> VideoRecord {
    VideoRecord::new(owner_id, "Beach sunset", "Shot on the pier")
}

pub fn body(bytes: &[u8]) -> ObjectReader {
    Box::pin(std::io::Cursor::new(bytes.to_vec()))
}
