//! Configuration module
//!
//! Process-wide settings for storage, external tools and ingestion limits.
//! Built once at startup and handed by reference to every component
//! constructor; nothing reads the environment after that.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::storage_types::StorageBackend;

const PROBE_TIMEOUT_SECS: u64 = 60;
const REMUX_TIMEOUT_SECS: u64 = 600;
const STORAGE_TIMEOUT_SECS: u64 = 900;
const MAX_VIDEO_SIZE_MB: u64 = 1024;
const LOCAL_STORAGE_BUCKET: &str = "local";

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO etc.)
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub local_storage_bucket: String,
    // External tools
    pub ffprobe_path: String,
    pub ffmpeg_path: String,
    pub probe_timeout: Duration,
    pub remux_timeout: Duration,
    pub storage_timeout: Duration,
    // Ingestion
    pub max_video_size_bytes: u64,
    pub upload_temp_dir: PathBuf,
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(value) => value.parse::<StorageBackend>()?,
            None => StorageBackend::S3,
        };

        let secs = |name: &str, default: u64| -> Result<Duration, anyhow::Error> {
            let value = match lookup(name) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| anyhow::anyhow!("{} must be a whole number of seconds", name))?,
                None => default,
            };
            Ok(Duration::from_secs(value))
        };

        let max_video_size_mb = match lookup("MAX_VIDEO_SIZE_MB") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("MAX_VIDEO_SIZE_MB must be a valid number"))?,
            None => MAX_VIDEO_SIZE_MB,
        };
        let max_video_size_bytes = max_video_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| anyhow::anyhow!("MAX_VIDEO_SIZE_MB is too large"))?;

        Ok(Config {
            environment,
            storage_backend,
            s3_bucket: lookup("S3_BUCKET"),
            s3_region: lookup("S3_REGION"),
            s3_endpoint: lookup("S3_ENDPOINT"),
            aws_region: lookup("AWS_REGION"),
            local_storage_path: lookup("LOCAL_STORAGE_PATH"),
            local_storage_base_url: lookup("LOCAL_STORAGE_BASE_URL"),
            local_storage_bucket: lookup("LOCAL_STORAGE_BUCKET")
                .unwrap_or_else(|| LOCAL_STORAGE_BUCKET.to_string()),
            ffprobe_path: lookup("FFPROBE_PATH").unwrap_or_else(|| "ffprobe".to_string()),
            ffmpeg_path: lookup("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            probe_timeout: secs("PROBE_TIMEOUT_SECS", PROBE_TIMEOUT_SECS)?,
            remux_timeout: secs("REMUX_TIMEOUT_SECS", REMUX_TIMEOUT_SECS)?,
            storage_timeout: secs("STORAGE_TIMEOUT_SECS", STORAGE_TIMEOUT_SECS)?,
            max_video_size_bytes,
            upload_temp_dir: lookup("UPLOAD_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    /// Region used for S3, falling back to the generic AWS region.
    pub fn s3_region(&self) -> Option<&str> {
        self.s3_region.as_deref().or(self.aws_region.as_deref())
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.as_deref().map_or(true, str::is_empty) {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region().is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        for (name, timeout) in [
            ("PROBE_TIMEOUT_SECS", self.probe_timeout),
            ("REMUX_TIMEOUT_SECS", self.remux_timeout),
            ("STORAGE_TIMEOUT_SECS", self.storage_timeout),
        ] {
            if timeout.is_zero() {
                return Err(anyhow::anyhow!("{} must be greater than zero", name));
            }
        }

        if self.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_VIDEO_SIZE_MB must be greater than zero"));
        }

        Ok(())
    }
}
