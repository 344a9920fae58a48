//! Clipvault Core Library
//!
//! This crate provides the domain models, error types, configuration and the
//! metadata-store seam shared by the storage, processing and CLI crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod repository;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{DurableReference, OrientationClass, StorageReference, VideoRecord};
pub use repository::VideoRepository;
pub use storage_types::StorageBackend;
