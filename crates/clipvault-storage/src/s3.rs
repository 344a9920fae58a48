use crate::keys::validate_key;
use crate::traits::{ObjectReader, Storage, StorageError, StorageResult};
use async_trait::async_trait;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::buffered::BufWriter;
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{Attribute, Attributes, ObjectStore, ObjectStoreExt, Result as ObjectResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: Arc<AmazonS3>,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    ///
    /// Credentials come from the standard AWS environment variables.
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let store = build_store(&bucket, &region, endpoint_url.as_deref())?;

        Ok(S3Storage {
            store: Arc::new(store),
            bucket,
            region,
            endpoint_url,
        })
    }

    /// Signer scoped to `bucket`, reusing the client when it is ours.
    fn signer_for(&self, bucket: &str) -> StorageResult<Arc<AmazonS3>> {
        if bucket == self.bucket {
            return Ok(self.store.clone());
        }
        let store = build_store(bucket, &self.region, self.endpoint_url.as_deref())?;
        Ok(Arc::new(store))
    }
}

fn build_store(bucket: &str, region: &str, endpoint_url: Option<&str>) -> StorageResult<AmazonS3> {
    let mut builder = AmazonS3Builder::from_env()
        .with_region(region)
        .with_bucket_name(bucket);

    if let Some(endpoint) = endpoint_url {
        let allow_http = endpoint.starts_with("http://");
        builder = builder.with_endpoint(endpoint).with_allow_http(allow_http);
    }

    builder
        .build()
        .map_err(|e| StorageError::ConfigError(e.to_string()))
}

#[async_trait]
impl Storage for S3Storage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_object(
        &self,
        storage_key: &str,
        mut reader: ObjectReader,
        content_type: &str,
    ) -> StorageResult<u64> {
        validate_key(storage_key)?;
        let start = std::time::Instant::now();
        let location = Path::from(storage_key.to_string());

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());

        let store: Arc<dyn ObjectStore> = self.store.clone();
        let mut writer = BufWriter::new(store, location).with_attributes(attributes);

        // Multipart parts are flushed as the reader is drained; shutdown
        // completes the upload and abort discards whatever was sent.
        let copied = match tokio::io::copy(&mut reader, &mut writer).await {
            Ok(copied) => writer.shutdown().await.map(|_| copied),
            Err(e) => {
                if let Err(abort_err) = writer.abort().await {
                    tracing::warn!(
                        error = %abort_err,
                        bucket = %self.bucket,
                        key = %storage_key,
                        "Failed to abort S3 upload"
                    );
                }
                Err(e)
            }
        };

        let size = copied.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(size)
    }

    async fn signed_url(
        &self,
        bucket: &str,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        validate_key(storage_key)?;
        let signer = self.signer_for(bucket)?;
        let location = Path::from(storage_key.to_string());

        let url_result: ObjectResult<_> = signer
            .signed_url(Method::GET, &location, expires_in)
            .await;

        let url = url_result
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %bucket,
                    key = %storage_key,
                    "S3 URL signing failed"
                );
                StorageError::SigningFailed(e.to_string())
            })?
            .to_string();

        tracing::debug!(
            bucket = %bucket,
            key = %storage_key,
            expires_in_secs = expires_in.as_secs(),
            "S3 URL signed"
        );

        Ok(url)
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        validate_key(storage_key)?;
        let location = Path::from(storage_key.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }
}
