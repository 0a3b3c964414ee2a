//! Application configuration, read from the environment.

use practice_core::DEFAULT_RECENCY_CAPACITY;
use std::path::PathBuf;

pub const DEFAULT_MIRROR_KEY: &str = "flashcards_data.json";
const DATA_FILE_NAME: &str = "flashcards_data.json";

/// Connection details for the S3-compatible mirror bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    pub bucket: String,
    /// Use "auto" for Cloudflare R2.
    pub region: String,
    pub endpoint: Option<String>,
    pub access_key: String,
    pub secret_key: String,
    /// Object key the document is uploaded under.
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_file: PathBuf,
    pub recency_capacity: usize,
    pub mirror: Option<MirrorConfig>,
}

impl AppConfig {
    /// Build the configuration from process environment variables.
    ///
    /// Recognized variables:
    /// - PRACTICE_DATA_FILE: document path
    /// - PRACTICE_RECENCY_CAPACITY: anti-repeat window size (0 disables it)
    /// - S3_BUCKET, S3_REGION, S3_ENDPOINT, S3_ACCESS_KEY, S3_SECRET_KEY
    /// - PRACTICE_MIRROR_KEY: object key of the mirrored document
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let data_file = var("PRACTICE_DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_path);

        let recency_capacity = match var("PRACTICE_RECENCY_CAPACITY") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "invalid PRACTICE_RECENCY_CAPACITY, using default");
                DEFAULT_RECENCY_CAPACITY
            }),
            None => DEFAULT_RECENCY_CAPACITY,
        };

        Self {
            data_file,
            recency_capacity,
            mirror: mirror_config(&var),
        }
    }

    /// Local-only configuration for a given document path.
    pub fn local(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            recency_capacity: DEFAULT_RECENCY_CAPACITY,
            mirror: None,
        }
    }
}

fn mirror_config(var: &dyn Fn(&str) -> Option<String>) -> Option<MirrorConfig> {
    let bucket = var("S3_BUCKET")?;

    let (Some(access_key), Some(secret_key)) = (var("S3_ACCESS_KEY"), var("S3_SECRET_KEY")) else {
        tracing::warn!(%bucket, "S3 credentials not set, cloud mirror disabled");
        return None;
    };

    Some(MirrorConfig {
        bucket,
        region: var("S3_REGION").unwrap_or_else(|| "auto".to_string()),
        endpoint: var("S3_ENDPOINT"),
        access_key,
        secret_key,
        key: var("PRACTICE_MIRROR_KEY").unwrap_or_else(|| DEFAULT_MIRROR_KEY.to_string()),
    })
}

/// Default document location in the user's local data directory.
pub fn default_data_path() -> PathBuf {
    // fall back to the working directory when no data dir is known
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("practice-cards")
        .join(DATA_FILE_NAME)
}
