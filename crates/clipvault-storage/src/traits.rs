//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use async_trait::async_trait;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Byte stream handed to `put_object`.
pub type ObjectReader = Pin<Box<dyn AsyncRead + Send + Unpin>>;

/// Storage abstraction trait
///
/// Backends are bound to one bucket for writes. Signing takes the bucket from
/// the persisted reference, so records written under a previous bucket stay
/// readable.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Bucket that `put_object` writes into.
    fn bucket(&self) -> &str;

    /// Stream `reader` into the object at `storage_key` until EOF.
    ///
    /// `content_type` is stored as object metadata. Returns the number of
    /// bytes written. A failed put leaves no readable object behind.
    async fn put_object(
        &self,
        storage_key: &str,
        reader: ObjectReader,
        content_type: &str,
    ) -> StorageResult<u64>;

    /// Generate a time-limited GET URL for `bucket`/`storage_key`.
    async fn signed_url(
        &self,
        bucket: &str,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Check if an object exists in the configured bucket
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;
}
