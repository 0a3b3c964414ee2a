//! Persistence gateway: authoritative local file plus optional cloud mirror.

pub mod file;
pub mod mirror;

pub use file::FileStore;
pub use mirror::{hash_content, CloudMirror, MirrorError, MirrorTicket, ObjectStore, S3ObjectStore};

use chrono::{DateTime, Utc};
use practice_core::document::{self, DocumentFormat, LoadReport, Snapshot};
use practice_core::{CardStore, SamplingSettings};

use crate::config::AppConfig;
use crate::error::Result;

/// Loads and saves the whole practice document.
pub trait Persistence: Send {
    /// Never fails; anything unreadable degrades to the empty default.
    fn load(&self) -> (Snapshot, LoadReport);

    fn save(&mut self, store: &CardStore, settings: &SamplingSettings) -> Result<SaveReport>;

    /// Whether saves are also copied to the cloud.
    fn mirror_enabled(&self) -> bool {
        false
    }
}

/// What happened to the mirror during a save.
#[derive(Debug)]
pub enum MirrorDispatch {
    Disabled,
    /// Content matches the last dispatched upload.
    Unchanged,
    Pending(MirrorTicket),
}

/// Latest known state of the cloud copy, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum MirrorStatus {
    Disabled,
    /// Nothing dispatched yet this session.
    Idle,
    Pending,
    Uploaded,
    Failed(String),
}

/// Follows the most recent upload so its outcome can be reported later.
#[derive(Debug)]
pub struct MirrorTracker {
    status: MirrorStatus,
    ticket: Option<MirrorTicket>,
}

impl MirrorTracker {
    pub fn new(enabled: bool) -> Self {
        let status = if enabled {
            MirrorStatus::Idle
        } else {
            MirrorStatus::Disabled
        };
        Self { status, ticket: None }
    }

    /// Record what a save did with the mirror.
    ///
    /// An unchanged save keeps following the upload already in flight.
    pub fn track(&mut self, dispatch: MirrorDispatch) {
        match dispatch {
            MirrorDispatch::Disabled => {
                self.ticket = None;
                self.status = MirrorStatus::Disabled;
            }
            MirrorDispatch::Unchanged => {}
            MirrorDispatch::Pending(ticket) => {
                self.ticket = Some(ticket);
                self.status = MirrorStatus::Pending;
            }
        }
    }

    /// Current status without blocking.
    pub fn status(&mut self) -> MirrorStatus {
        if let Some(outcome) = self.ticket.as_mut().and_then(MirrorTicket::try_outcome) {
            self.ticket = None;
            self.settle(outcome);
        }
        self.status.clone()
    }

    /// Block until the latest upload finishes, e.g. before exiting.
    pub fn wait(&mut self) -> MirrorStatus {
        if let Some(ticket) = self.ticket.take() {
            self.settle(ticket.wait());
        }
        self.status.clone()
    }

    fn settle(&mut self, outcome: std::result::Result<(), MirrorError>) {
        self.status = match outcome {
            Ok(()) => MirrorStatus::Uploaded,
            Err(e) => MirrorStatus::Failed(e.to_string()),
        };
    }
}

#[derive(Debug)]
pub struct SaveReport {
    pub saved_at: DateTime<Utc>,
    pub bytes_written: usize,
    pub mirror: MirrorDispatch,
}

/// Local JSON document, mirrored after every successful write.
pub struct Gateway {
    file: FileStore,
    mirror: Option<CloudMirror>,
}

impl Gateway {
    pub fn new(file: FileStore, mirror: Option<CloudMirror>) -> Self {
        Self { file, mirror }
    }

    /// Gateway for `config`; a mirror that cannot start is left out.
    pub fn from_config(config: &AppConfig) -> Self {
        let mirror = config
            .mirror
            .as_ref()
            .and_then(|mirror| match CloudMirror::from_config(mirror) {
                Ok(mirror) => Some(mirror),
                Err(e) => {
                    tracing::warn!(error = %e, "cloud mirror unavailable, saving locally only");
                    None
                }
            });
        Self::new(FileStore::new(&config.data_file), mirror)
    }

    pub fn file(&self) -> &FileStore {
        &self.file
    }
}

impl Persistence for Gateway {
    fn load(&self) -> (Snapshot, LoadReport) {
        let bytes = match self.file.read() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                tracing::info!(path = %self.file.path().display(), "no saved data, starting empty");
                return (Snapshot::default(), LoadReport::default());
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %self.file.path().display(), "failed to read saved data");
                return (Snapshot::default(), LoadReport::default());
            }
        };

        let (snapshot, report) = document::decode(&bytes);
        match report.format {
            DocumentFormat::Invalid => {
                tracing::warn!(path = %self.file.path().display(), "saved data is not a valid document, starting empty");
            }
            _ if report.migrated() => {
                tracing::info!(format = ?report.format, "migrated saved data to the current format");
            }
            _ => {}
        }
        if !report.is_clean() {
            tracing::warn!(
                dropped_folders = report.dropped_folders,
                dropped_levels = report.dropped_levels,
                dropped_cards = report.dropped_cards,
                dropped_images = report.dropped_images,
                assigned_ids = report.assigned_ids,
                settings_reset = report.settings_reset,
                "repaired saved data while loading"
            );
        }
        (snapshot, report)
    }

    fn save(&mut self, store: &CardStore, settings: &SamplingSettings) -> Result<SaveReport> {
        let bytes = document::encode(store, settings)?;
        self.file.write(&bytes)?;
        tracing::info!(path = %self.file.path().display(), cards = store.len(), "saved");

        let mirror = match &self.mirror {
            None => MirrorDispatch::Disabled,
            Some(mirror) => match mirror.dispatch(&bytes) {
                Some(ticket) => MirrorDispatch::Pending(ticket),
                None => MirrorDispatch::Unchanged,
            },
        };

        Ok(SaveReport {
            saved_at: Utc::now(),
            bytes_written: bytes.len(),
            mirror,
        })
    }

    fn mirror_enabled(&self) -> bool {
        self.mirror.is_some()
    }
}
