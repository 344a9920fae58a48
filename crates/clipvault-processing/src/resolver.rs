//! Turns persisted storage references into signed delivery URLs.

use clipvault_core::constants::SIGNED_URL_TTL;
use clipvault_core::{Config, StorageReference, VideoRecord};
use clipvault_storage::Storage;
use futures::future::try_join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::command::run_bounded;
use crate::error::{PipelineError, PipelineResult, ResolveError};

pub struct ReferenceResolver {
    storage: Arc<dyn Storage>,
    ttl: Duration,
    timeout: Duration,
}

impl ReferenceResolver {
    pub fn new(storage: Arc<dyn Storage>, config: &Config) -> Self {
        Self::with_timeout(storage, config.storage_timeout)
    }

    pub fn with_timeout(storage: Arc<dyn Storage>, timeout: Duration) -> Self {
        Self {
            storage,
            ttl: SIGNED_URL_TTL,
            timeout,
        }
    }

    /// Resolve a raw stored reference.
    ///
    /// `None` stays `None` and an already-resolved URL is returned untouched,
    /// so neither reaches the store.
    pub async fn resolve_reference(
        &self,
        raw: Option<&str>,
        cancel: &CancellationToken,
    ) -> PipelineResult<Option<String>> {
        let reference = StorageReference::classify(raw)
            .map_err(|e| PipelineError::MalformedReference(e.to_string()))?;

        let durable = match reference {
            StorageReference::Unset => return Ok(None),
            StorageReference::Resolved(url) => return Ok(Some(url)),
            StorageReference::Durable(durable) => durable,
        };

        let storage = self.storage.clone();
        let url = run_bounded("signing", self.timeout, cancel, async {
            storage
                .signed_url(&durable.bucket, &durable.key, self.ttl)
                .await
                .map_err(|source| PipelineError::SigningFailure {
                    bucket: durable.bucket.clone(),
                    key: durable.key.clone(),
                    source,
                })
        })
        .await?;

        tracing::debug!(
            bucket = %durable.bucket,
            key = %durable.key,
            expires_in_secs = self.ttl.as_secs(),
            "Signed video URL"
        );

        Ok(Some(url))
    }

    /// Return a copy of `record` whose storage reference is a delivery URL.
    ///
    /// The copy is for the response only; persisting it would replace the
    /// durable reference with an expiring URL.
    pub async fn resolve(
        &self,
        record: &VideoRecord,
        cancel: &CancellationToken,
    ) -> Result<VideoRecord, ResolveError> {
        match self
            .resolve_reference(record.storage_reference.as_deref(), cancel)
            .await
        {
            Ok(url) => {
                let mut resolved = record.clone();
                resolved.storage_reference = url;
                Ok(resolved)
            }
            Err(source) => {
                tracing::warn!(
                    video_id = %record.id,
                    error = %source,
                    "Failed to resolve storage reference"
                );
                Err(ResolveError {
                    record: record.clone(),
                    source,
                })
            }
        }
    }

    /// Resolve a batch concurrently, failing on the first error.
    pub async fn resolve_all(
        &self,
        records: &[VideoRecord],
        cancel: &CancellationToken,
    ) -> Result<Vec<VideoRecord>, ResolveError> {
        try_join_all(records.iter().map(|record| self.resolve(record, cancel))).await
    }
}
