//! Common test utilities for integration tests.
//!
//! Every test gets its own temporary data directory, so tests never touch the
//! user's real practice data and can run in parallel.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

use practice_cards_lib::commands::{self, AddCardRequest};
use practice_cards_lib::state::AppState;
use practice_cards_lib::storage::{CloudMirror, FileStore, Gateway, MirrorError, ObjectStore};
use practice_core::CardLocation;

pub const SEED: u64 = 7;

/// Test context owning a temporary data directory and a session on top of it.
pub struct TestContext {
    pub dir: TempDir,
    pub state: AppState,
    pub mirror: Option<Arc<MemoryObjectStore>>,
}

impl TestContext {
    /// Local-only session on an empty data file.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let state = open_state(&dir, None);
        Self { dir, state, mirror: None }
    }

    /// Session that also mirrors to an in-memory object store.
    pub fn with_mirror() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let objects = Arc::new(MemoryObjectStore::default());
        let state = open_state(&dir, Some(objects.clone()));
        Self {
            dir,
            state,
            mirror: Some(objects),
        }
    }

    /// Session over a data file written beforehand.
    pub fn with_document(content: &[u8]) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        std::fs::write(data_file(&dir), content).expect("Failed to write document");
        let state = open_state(&dir, None);
        Self { dir, state, mirror: None }
    }

    pub fn data_file(&self) -> PathBuf {
        data_file(&self.dir)
    }

    pub fn read_document(&self) -> Vec<u8> {
        std::fs::read(self.data_file()).expect("Failed to read document")
    }

    /// A second session over the same data file, as after an application restart.
    pub fn reopen(&self) -> AppState {
        open_state(&self.dir, None)
    }

    /// Add a card through the command layer.
    pub fn add(&mut self, folder: &str, question: &str, answer: &str) -> CardLocation {
        commands::add_card(
            &mut self.state,
            AddCardRequest {
                folder: folder.to_string(),
                question: question.to_string(),
                answer: answer.to_string(),
                question_image: None,
                answer_image: None,
            },
        )
        .expect("Failed to add card")
    }
}

fn data_file(dir: &TempDir) -> PathBuf {
    dir.path().join("flashcards_data.json")
}

fn open_state(dir: &TempDir, objects: Option<Arc<MemoryObjectStore>>) -> AppState {
    let mirror = objects.map(|objects| {
        CloudMirror::new(objects, "flashcards_data.json").expect("Failed to start mirror")
    });
    let gateway = Gateway::new(FileStore::new(data_file(dir)), mirror);
    AppState::open(Box::new(gateway), 50).with_rng(StdRng::seed_from_u64(SEED))
}

/// Object store keeping uploads in memory.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    puts: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryObjectStore {
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Make subsequent uploads fail.
    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, content: Vec<u8>, _content_type: &str) -> Result<(), MirrorError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(MirrorError::S3("simulated outage".to_string()));
        }
        self.objects.lock().unwrap().insert(key.to_string(), content);
        Ok(())
    }
}
