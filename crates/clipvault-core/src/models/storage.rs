//! Storage references: how a video record points at its object.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::constants::REFERENCE_SEPARATOR;
use crate::error::AppError;

/// A persisted `(bucket, key)` pair identifying an object in the remote store.
///
/// Persisted form is `"<bucket>,<key>"`. Bucket names cannot contain a comma,
/// so decoding splits on the first one and keeps the rest of the key intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurableReference {
    pub bucket: String,
    pub key: String,
}

impl DurableReference {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Encode into the form stored on the video record.
    pub fn encode(&self) -> String {
        format!("{}{}{}", self.bucket, REFERENCE_SEPARATOR, self.key)
    }

    /// Decode a persisted reference.
    pub fn decode(raw: &str) -> Result<Self, AppError> {
        let (bucket, key) = raw.split_once(REFERENCE_SEPARATOR).ok_or_else(|| {
            AppError::InvalidInput(format!(
                "storage reference {:?} has no bucket separator",
                raw
            ))
        })?;

        if bucket.is_empty() || key.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "storage reference {:?} has an empty bucket or key",
                raw
            )));
        }

        Ok(Self::new(bucket, key))
    }
}

impl Display for DurableReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.encode())
    }
}

/// The three states a record's storage reference can be in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageReference {
    /// No media uploaded yet.
    Unset,
    /// A directly fetchable URL. Only ever present on transient copies.
    Resolved(String),
    /// A persisted `(bucket, key)` pair.
    Durable(DurableReference),
}

impl StorageReference {
    /// Decide which state a raw stored value is in.
    ///
    /// Anything containing `https` or a `scheme://` separator is taken to be
    /// a URL already. Generated keys never contain `:`, but a bucket or key
    /// containing `https` would be misread; replacing the raw string with a
    /// tagged column only requires changing this function.
    pub fn classify(raw: Option<&str>) -> Result<Self, AppError> {
        match raw {
            None => Ok(StorageReference::Unset),
            Some(value) if value.contains("https") || value.contains("://") => {
                Ok(StorageReference::Resolved(value.to_string()))
            }
            Some(value) => DurableReference::decode(value).map(StorageReference::Durable),
        }
    }
}
