//! Storage keys and the streaming uploader

pub mod keys;
pub mod uploader;

pub use keys::{build_video_key, generate_identifier, IDENTIFIER_LEN};
pub use uploader::VideoUploader;
