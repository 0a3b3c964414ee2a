//! Best-effort cloud copy of the persisted document.
//!
//! Uploads run on a small runtime owned by [`CloudMirror`]; the caller gets a
//! [`MirrorTicket`] back immediately and never waits on the network unless it
//! asks to.

use async_trait::async_trait;
use aws_sdk_s3::{
    config::{Credentials, Region},
    primitives::ByteStream,
    Client, Config,
};
use sha2::{Digest, Sha256};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::config::MirrorConfig;

const CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("S3 error: {0}")]
    S3(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("upload abandoned before completion")]
    Abandoned,
}

/// Destination for mirrored documents.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, content: Vec<u8>, content_type: &str) -> Result<(), MirrorError>;
}

/// S3/R2 bucket.
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(config: &MirrorConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,  // session token
            None,  // expiry
            "env", // provider name
        );

        let mut builder = Config::builder()
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .behavior_version_latest();

        // Set custom endpoint for R2 or other S3-compatible services
        if let Some(endpoint_url) = &config.endpoint {
            builder = builder.endpoint_url(endpoint_url);
        }

        Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, content: Vec<u8>, content_type: &str) -> Result<(), MirrorError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(content))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| MirrorError::S3(e.to_string()))?;
        Ok(())
    }
}

struct Upload {
    content: Vec<u8>,
    hash: String,
    reply: oneshot::Sender<Result<(), MirrorError>>,
}

/// Fire-and-forget uploader.
///
/// Uploads are queued and sent one at a time in dispatch order, so the remote
/// copy always ends up matching the most recent dispatch.
pub struct CloudMirror {
    runtime: Runtime,
    queue: mpsc::UnboundedSender<Upload>,
    key: String,
    /// Hash of the most recently dispatched content that has not failed.
    last_dispatched: Arc<Mutex<Option<String>>>,
}

impl CloudMirror {
    pub fn new(store: Arc<dyn ObjectStore>, key: impl Into<String>) -> Result<Self, MirrorError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("cloud-mirror")
            .enable_all()
            .build()
            .map_err(|e| MirrorError::Config(e.to_string()))?;

        let key = key.into();
        let last_dispatched = Arc::new(Mutex::new(None));
        let (queue, uploads) = mpsc::unbounded_channel();
        runtime.spawn(upload_worker(
            store,
            key.clone(),
            uploads,
            Arc::clone(&last_dispatched),
        ));

        Ok(Self {
            runtime,
            queue,
            key,
            last_dispatched,
        })
    }

    /// Mirror backed by the configured S3 bucket.
    pub fn from_config(config: &MirrorConfig) -> Result<Self, MirrorError> {
        Self::new(Arc::new(S3ObjectStore::new(config)), config.key.clone())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Queue `content` for upload in the background.
    ///
    /// Returns `None` when the same content was the last thing dispatched.
    pub fn dispatch(&self, content: &[u8]) -> Option<MirrorTicket> {
        let hash = hash_content(content);
        {
            let mut last = self
                .last_dispatched
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if last.as_deref() == Some(hash.as_str()) {
                tracing::debug!(key = %self.key, "mirror content unchanged, skipping upload");
                return None;
            }
            *last = Some(hash.clone());
        }

        let (reply, rx) = oneshot::channel();
        let upload = Upload {
            content: content.to_vec(),
            hash: hash.clone(),
            reply,
        };
        if self.queue.send(upload).is_err() {
            // worker is gone; the ticket reports the upload as abandoned
            tracing::warn!(key = %self.key, "cloud mirror worker stopped");
            forget_failed(&self.last_dispatched, &hash);
        }

        Some(MirrorTicket { hash, rx })
    }
}

async fn upload_worker(
    store: Arc<dyn ObjectStore>,
    key: String,
    mut uploads: mpsc::UnboundedReceiver<Upload>,
    last_dispatched: Arc<Mutex<Option<String>>>,
) {
    while let Some(upload) = uploads.recv().await {
        let result = store.put(&key, upload.content, CONTENT_TYPE).await;
        match &result {
            Ok(()) => tracing::info!("Mirrored document to {}", key),
            Err(e) => {
                tracing::warn!(error = %e, %key, "cloud mirror upload failed");
                forget_failed(&last_dispatched, &upload.hash);
            }
        }
        // receiver may already be gone; nobody is waiting then
        let _ = upload.reply.send(result);
    }
}

/// Let the next dispatch of `hash` upload again after a failure.
fn forget_failed(last_dispatched: &Mutex<Option<String>>, hash: &str) {
    let mut last = last_dispatched.lock().unwrap_or_else(PoisonError::into_inner);
    if last.as_deref() == Some(hash) {
        *last = None;
    }
}

/// Handle on one in-flight upload.
#[derive(Debug)]
pub struct MirrorTicket {
    hash: String,
    rx: oneshot::Receiver<Result<(), MirrorError>>,
}

impl MirrorTicket {
    /// SHA-256 of the uploaded content.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Outcome if the upload has finished, without blocking.
    pub fn try_outcome(&mut self) -> Option<Result<(), MirrorError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(MirrorError::Abandoned)),
        }
    }

    /// Block until the upload finishes. Must not be called from async code.
    pub fn wait(self) -> Result<(), MirrorError> {
        self.rx.blocking_recv().unwrap_or(Err(MirrorError::Abandoned))
    }
}

/// Compute SHA-256 hash of content.
pub fn hash_content(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingStore {
        puts: AtomicUsize,
    }

    #[async_trait]
    impl ObjectStore for CountingStore {
        async fn put(&self, _key: &str, _content: Vec<u8>, _ct: &str) -> Result<(), MirrorError> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Holds uploads of `slow` back so later dispatches queue behind them.
    struct SlowStore {
        slow: Vec<u8>,
        latest: Mutex<Option<Vec<u8>>>,
    }

    #[async_trait]
    impl ObjectStore for SlowStore {
        async fn put(&self, _key: &str, content: Vec<u8>, _ct: &str) -> Result<(), MirrorError> {
            if content == self.slow {
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            }
            *self.latest.lock().unwrap() = Some(content);
            Ok(())
        }
    }

    struct FailingStore;

    #[async_trait]
    impl ObjectStore for FailingStore {
        async fn put(&self, _key: &str, _content: Vec<u8>, _ct: &str) -> Result<(), MirrorError> {
            Err(MirrorError::S3("bucket unreachable".to_string()))
        }
    }

    #[test]
    fn hash_is_hex_sha256() {
        assert_eq!(
            hash_content(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn identical_content_uploads_once() {
        let store = Arc::new(CountingStore::default());
        let mirror = CloudMirror::new(store.clone(), "doc.json").unwrap();

        mirror.dispatch(b"{}").unwrap().wait().unwrap();
        assert!(mirror.dispatch(b"{}").is_none());
        mirror.dispatch(b"{\"a\":1}").unwrap().wait().unwrap();

        assert_eq!(store.puts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn reverting_during_an_upload_is_mirrored() {
        let store = Arc::new(SlowStore {
            slow: b"B".to_vec(),
            latest: Mutex::new(None),
        });
        let mirror = CloudMirror::new(store.clone(), "doc.json").unwrap();

        mirror.dispatch(b"A").unwrap().wait().unwrap();
        let in_flight = mirror.dispatch(b"B").unwrap();
        let revert = mirror
            .dispatch(b"A")
            .expect("content differs from the last dispatch");

        in_flight.wait().unwrap();
        revert.wait().unwrap();
        assert_eq!(store.latest.lock().unwrap().as_deref(), Some(&b"A"[..]));
    }

    #[test]
    fn failures_are_reported_and_retried_next_time() {
        let mirror = CloudMirror::new(Arc::new(FailingStore), "doc.json").unwrap();
        let err = mirror.dispatch(b"{}").unwrap().wait().unwrap_err();
        assert!(err.to_string().contains("bucket unreachable"));
        // a failed upload does not count as mirrored
        assert!(mirror.dispatch(b"{}").is_some());
    }
}
