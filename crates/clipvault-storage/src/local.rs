use crate::keys::validate_key;
use crate::traits::{ObjectReader, Storage, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// Objects live at `{base_path}/{bucket}/{key}` and are served from
/// `{base_url}/{bucket}/{key}`.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    bucket: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for object storage (e.g., "/var/lib/clipvault")
    /// * `base_url` - Base URL the root directory is served from
    /// * `bucket` - Directory under `base_path` that uploads are written to
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: String,
        bucket: String,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();

        if bucket.is_empty() || bucket.contains(['/', '\\']) || bucket.contains("..") {
            return Err(StorageError::ConfigError(format!(
                "Invalid local bucket name: {:?}",
                bucket
            )));
        }

        fs::create_dir_all(base_path.join(&bucket))
            .await
            .map_err(|e| {
                StorageError::ConfigError(format!(
                    "Failed to create storage directory {}: {}",
                    base_path.display(),
                    e
                ))
            })?;

        Ok(LocalStorage {
            base_path,
            base_url,
            bucket,
        })
    }

    /// Convert storage key to filesystem path inside our bucket directory
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_key(storage_key)?;
        Ok(self.base_path.join(&self.bucket).join(storage_key))
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_object(
        &self,
        storage_key: &str,
        mut reader: ObjectReader,
        _content_type: &str,
    ) -> StorageResult<u64> {
        let path = self.key_to_path(storage_key)?;
        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        // Write beside the target and rename so a failed copy never leaves a
        // truncated object at the key.
        let partial = path.with_extension("partial");
        let result = async {
            let mut file = fs::File::create(&partial).await?;
            let size = tokio::io::copy(&mut reader, &mut file).await?;
            file.flush().await?;
            file.sync_all().await?;
            fs::rename(&partial, &path).await?;
            Ok::<u64, std::io::Error>(size)
        }
        .await;

        let size = match result {
            Ok(size) => size,
            Err(e) => {
                let _ = fs::remove_file(&partial).await;
                tracing::error!(
                    error = %e,
                    path = %path.display(),
                    key = %storage_key,
                    "Local storage upload failed"
                );
                return Err(StorageError::UploadFailed(format!(
                    "Failed to write file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
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
        if bucket.is_empty() || bucket.contains('/') || bucket.contains("..") {
            return Err(StorageError::InvalidKey(format!(
                "Invalid bucket name: {:?}",
                bucket
            )));
        }

        let expires_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .saturating_add(expires_in)
            .as_secs();

        Ok(format!(
            "{}/{}/{}?expires={}",
            self.base_url.trim_end_matches('/'),
            bucket,
            storage_key,
            expires_at
        ))
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await?)
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tempfile::tempdir;
    use tokio::io::{AsyncRead, ReadBuf};

    async fn storage(dir: &Path) -> LocalStorage {
        LocalStorage::new(
            dir,
            "http://localhost:8091/assets".to_string(),
            "media".to_string(),
        )
        .await
        .unwrap()
    }

    fn reader(data: &[u8]) -> ObjectReader {
        Box::pin(io::Cursor::new(data.to_vec()))
    }

    /// Yields some bytes, then fails.
    struct BrokenReader {
        sent: bool,
    }

    impl AsyncRead for BrokenReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if self.sent {
                return Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone")));
            }
            self.sent = true;
            buf.put_slice(b"partial");
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_local_storage_put_object() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let size = storage
            .put_object("landscape/abc.mp4", reader(b"video bytes"), "video/mp4")
            .await
            .unwrap();

        assert_eq!(size, 11);
        assert!(storage.exists("landscape/abc.mp4").await.unwrap());
        let on_disk = std::fs::read(dir.path().join("media/landscape/abc.mp4")).unwrap();
        assert_eq!(on_disk, b"video bytes");
    }

    #[tokio::test]
    async fn test_failed_put_leaves_no_object() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage
            .put_object(
                "portrait/broken.mp4",
                Box::pin(BrokenReader { sent: false }),
                "video/mp4",
            )
            .await;

        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
        assert!(!storage.exists("portrait/broken.mp4").await.unwrap());
        assert!(!dir.path().join("media/portrait/broken.partial").exists());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage
            .put_object("../../etc/passwd", reader(b"x"), "text/plain")
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.exists("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_signed_url_contains_bucket_key_and_expiry() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let url = storage
            .signed_url("media", "other/xyz.mp4", Duration::from_secs(3600))
            .await
            .unwrap();

        assert!(url.starts_with("http://localhost:8091/assets/media/other/xyz.mp4?expires="));
        let expires: u64 = url.rsplit('=').next().unwrap().parse().unwrap();
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
        assert!(expires >= now + 3590 && expires <= now + 3610);
    }

    #[tokio::test]
    async fn test_exists_reports_io_errors() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        storage
            .put_object("landscape/abc.mp4", reader(b"video"), "video/mp4")
            .await
            .unwrap();

        assert!(!storage.exists("landscape/missing.mp4").await.unwrap());

        // A regular file used as a directory is an error, not a missing object.
        let result = storage.exists("landscape/abc.mp4/nested.mp4").await;
        assert!(matches!(result, Err(StorageError::IoError(_))));
    }

    #[tokio::test]
    async fn test_rejects_bad_bucket_name() {
        let dir = tempdir().unwrap();
        let result =
            LocalStorage::new(dir.path(), "http://localhost".to_string(), "../up".to_string())
                .await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }
}
