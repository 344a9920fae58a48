//! Clipvault Storage Library
//!
//! Object-store abstraction used by the ingestion pipeline and the reference
//! resolver, with an S3 backend (AWS or any S3-compatible endpoint) and a
//! local-filesystem backend for development.
//!
//! # Key format
//!
//! Video keys are `{orientation}/{identifier}.mp4`. Keys must not contain `..`
//! or a leading `/`; both backends check this through the `keys` module.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use clipvault_core::StorageBackend;
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ObjectReader, Storage, StorageError, StorageResult};
