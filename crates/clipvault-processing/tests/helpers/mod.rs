//! In-memory doubles for the pipeline's collaborators.
//!
//! Run from workspace root: `cargo test -p clipvault-processing`.

#![allow(dead_code)]

pub mod fixtures;

use async_trait::async_trait;
use clipvault_core::{AppError, Config, VideoRecord, VideoRepository};
use clipvault_processing::video::fast_start_output_path;
use clipvault_processing::{
    IngestService, PipelineError, PipelineResult, Prober, Remuxer, StreamDimensions,
    VideoPipeline, VideoUploader,
};
use clipvault_storage::{ObjectReader, Storage, StorageError, StorageResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub const TEST_BUCKET: &str = "clipvault-test";

/// Metadata store backed by a map.
#[derive(Default)]
pub struct InMemoryVideoRepository {
    videos: Mutex<HashMap<Uuid, VideoRecord>>,
    updates: AtomicUsize,
}

impl InMemoryVideoRepository {
    pub fn insert(&self, video: VideoRecord) {
        self.videos.lock().unwrap().insert(video.id, video);
    }

    pub fn get(&self, id: Uuid) -> Option<VideoRecord> {
        self.videos.lock().unwrap().get(&id).cloned()
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        Ok(self.get(id))
    }

    async fn update_video(&self, video: &VideoRecord) -> Result<(), AppError> {
        let mut videos = self.videos.lock().unwrap();
        if !videos.contains_key(&video.id) {
            return Err(AppError::NotFound(format!("video {}", video.id)));
        }
        videos.insert(video.id, video.clone());
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Object store that keeps bodies in memory and fakes S3-style signed URLs.
#[derive(Default)]
pub struct RecordingStorage {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    puts: AtomicUsize,
    signs: AtomicUsize,
    fail_signing: AtomicBool,
}

impl RecordingStorage {
    pub fn failing_signer() -> Self {
        let storage = Self::default();
        storage.fail_signing.store(true, Ordering::SeqCst);
        storage
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn object(&self, key: &str) -> Option<(Vec<u8>, String)> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn sign_count(&self) -> usize {
        self.signs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    fn bucket(&self) -> &str {
        TEST_BUCKET
    }

    async fn put_object(
        &self,
        storage_key: &str,
        mut reader: ObjectReader,
        content_type: &str,
    ) -> StorageResult<u64> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        let mut body = Vec::new();
        reader.read_to_end(&mut body).await?;
        let size = body.len() as u64;
        self.objects
            .lock()
            .unwrap()
            .insert(storage_key.to_string(), (body, content_type.to_string()));
        Ok(size)
    }

    async fn signed_url(
        &self,
        bucket: &str,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.signs.fetch_add(1, Ordering::SeqCst);
        if self.fail_signing.load(Ordering::SeqCst) {
            return Err(StorageError::SigningFailed("credentials expired".to_string()));
        }
        Ok(format!(
            "https://{}.s3.test.amazonaws.com/{}?X-Amz-Expires={}",
            bucket,
            storage_key,
            expires_in.as_secs()
        ))
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.objects.lock().unwrap().contains_key(storage_key))
    }
}

/// Prober returning a fixed outcome.
pub enum CannedProber {
    Dimensions(u32, u32),
    NoVisualStream,
}

#[async_trait]
impl Prober for CannedProber {
    async fn probe(
        &self,
        path: &Path,
        _cancel: &CancellationToken,
    ) -> PipelineResult<StreamDimensions> {
        assert!(path.exists(), "probe input must be staged");
        match self {
            CannedProber::Dimensions(width, height) => Ok(StreamDimensions {
                width: *width,
                height: *height,
            }),
            CannedProber::NoVisualStream => Err(PipelineError::NoVisualStream),
        }
    }
}

/// Remuxer that copies its input, or rejects it as corrupt.
pub struct CopyRemuxer {
    pub corrupt: bool,
}

#[async_trait]
impl Remuxer for CopyRemuxer {
    async fn remux(&self, input: &Path, _cancel: &CancellationToken) -> PipelineResult<PathBuf> {
        let output = fast_start_output_path(input);
        if self.corrupt {
            // Leave partial output behind, the way a failed ffmpeg run does.
            tokio::fs::write(&output, b"partial").await?;
            return Err(PipelineError::RemuxFailure {
                stderr: "moov atom not found".to_string(),
            });
        }
        tokio::fs::copy(input, &output).await?;
        Ok(output)
    }
}

/// Remuxer that writes partial output and then panics.
pub struct PanickingRemuxer;

#[async_trait]
impl Remuxer for PanickingRemuxer {
    async fn remux(&self, input: &Path, _cancel: &CancellationToken) -> PipelineResult<PathBuf> {
        tokio::fs::write(fast_start_output_path(input), b"partial").await?;
        panic!("remuxer crashed mid-write");
    }
}

/// Wired-up ingestion with doubles and an isolated temp directory.
pub struct TestPipeline {
    pub repository: Arc<InMemoryVideoRepository>,
    pub storage: Arc<RecordingStorage>,
    pub service: Arc<IngestService>,
    pub temp_dir: TempDir,
}

impl TestPipeline {
    pub fn new(prober: CannedProber, remuxer: impl Remuxer + 'static) -> Self {
        Self::with_storage(prober, remuxer, RecordingStorage::default())
    }

    pub fn with_storage(
        prober: CannedProber,
        remuxer: impl Remuxer + 'static,
        storage: RecordingStorage,
    ) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let config = test_config(temp_dir.path());

        let repository = Arc::new(InMemoryVideoRepository::default());
        let storage = Arc::new(storage);
        let uploader = VideoUploader::new(storage.clone(), &config);
        let pipeline = VideoPipeline::new(Arc::new(prober), Arc::new(remuxer), uploader);
        let service = Arc::new(IngestService::new(repository.clone(), pipeline, &config));

        Self {
            repository,
            storage,
            service,
            temp_dir,
        }
    }

    /// Entries left in the ingestion temp directory.
    pub fn leftover_temp_entries(&self) -> usize {
        std::fs::read_dir(self.temp_dir.path())
            .expect("temp dir readable")
            .count()
    }
}

/// Configuration for tests: defaults plus an isolated temp directory.
pub fn test_config(temp_dir: &Path) -> Config {
    let mut config = Config::from_lookup(|_| None).expect("default config");
    config.s3_bucket = Some(TEST_BUCKET.to_string());
    config.upload_temp_dir = temp_dir.to_path_buf();
    config.storage_timeout = Duration::from_secs(5);
    config
}
