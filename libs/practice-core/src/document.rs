//! Persisted document format and its validation.
//!
//! # Format
//! ```json
//! {
//!   "version": 2,
//!   "folders": {
//!     "All Cards": { "level_1": [ { "id": "...", "question": "...", "answer": "...",
//!                                   "question_image": null, "answer_image": "<base64>" } ],
//!                    "level_2": [], "level_3": [], "level_4": [] }
//!   },
//!   "settings": { "draw_chances": { "level_1": 0.5, ... }, "folder_weights": {} }
//! }
//! ```
//!
//! Decoding never fails. Older shapes are accepted and normalized:
//! a flat `{ "level_1": [...], ... }` document is wrapped into the default
//! folder, and a bare `{ folder: { level: [...] } }` map (optionally carrying
//! a `settings` key) is read as the folder map.

use crate::level::Level;
use crate::settings::SamplingSettings;
use crate::store::{CardStore, Folder, DEFAULT_FOLDER};
use crate::types::{Card, CardId, CardImage};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

/// Version written by [`encode`].
pub const DOCUMENT_VERSION: u32 = 2;

const VERSION_KEY: &str = "version";
const FOLDERS_KEY: &str = "folders";
const SETTINGS_KEY: &str = "settings";

/// Everything that is persisted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub store: CardStore,
    pub settings: SamplingSettings,
}

/// Shape the decoded document was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    /// Nothing to read; defaults were used.
    #[default]
    Missing,
    /// Not JSON, or not a JSON object; defaults were used.
    Invalid,
    /// Flat level map from before folders existed.
    Legacy,
    /// Folder map without the versioned wrapper.
    BareFolders,
    Current,
}

/// Normalizations applied while decoding.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LoadReport {
    pub format: DocumentFormat,
    pub dropped_folders: usize,
    /// Known level keys whose value was not a card list.
    pub dropped_levels: usize,
    pub dropped_cards: usize,
    pub dropped_images: usize,
    pub assigned_ids: usize,
    pub settings_reset: bool,
}

impl LoadReport {
    /// True when the document was read without any repair.
    pub fn is_clean(&self) -> bool {
        self.dropped_folders == 0
            && self.dropped_levels == 0
            && self.dropped_cards == 0
            && self.dropped_images == 0
            && self.assigned_ids == 0
            && !self.settings_reset
            && !matches!(self.format, DocumentFormat::Invalid)
    }

    /// True when the document was upgraded from an older shape.
    pub fn migrated(&self) -> bool {
        matches!(self.format, DocumentFormat::Legacy | DocumentFormat::BareFolders)
    }
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    version: u32,
    folders: &'a CardStore,
    settings: SamplingSettings,
}

/// Serialize to pretty JSON with deterministic key order.
///
/// Settings are normalized on the way out.
pub fn encode(store: &CardStore, settings: &SamplingSettings) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec_pretty(&DocumentRef {
        version: DOCUMENT_VERSION,
        folders: store,
        settings: settings.normalized(),
    })
}

/// Decode a document, falling back to defaults for anything unreadable.
pub fn decode(bytes: &[u8]) -> (Snapshot, LoadReport) {
    let mut report = LoadReport::default();

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return (Snapshot::default(), report);
    }

    let root = match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(root)) => root,
        _ => {
            report.format = DocumentFormat::Invalid;
            return (Snapshot::default(), report);
        }
    };

    let mut decoder = Decoder {
        report,
        seen_ids: HashSet::new(),
    };
    let snapshot = decoder.snapshot(root);
    (snapshot, decoder.report)
}

struct Decoder {
    report: LoadReport,
    seen_ids: HashSet<CardId>,
}

impl Decoder {
    fn snapshot(&mut self, mut root: Map<String, Value>) -> Snapshot {
        if is_current(&root) {
            self.report.format = DocumentFormat::Current;
            let folders = match root.remove(FOLDERS_KEY) {
                Some(Value::Object(folders)) => folders,
                _ => Map::new(),
            };
            return Snapshot {
                store: self.store(folders),
                settings: self.settings(root.remove(SETTINGS_KEY)),
            };
        }

        // older shapes may carry settings next to the folders
        let settings = match root.get(SETTINGS_KEY) {
            Some(value) if is_settings(value) => root.remove(SETTINGS_KEY),
            _ => None,
        };

        let folders = if is_legacy(&root) {
            self.report.format = DocumentFormat::Legacy;
            wrap_default(root)
        } else {
            self.report.format = DocumentFormat::BareFolders;
            root
        };

        Snapshot {
            store: self.store(folders),
            settings: self.settings(settings),
        }
    }

    fn store(&mut self, folders: Map<String, Value>) -> CardStore {
        let mut decoded = BTreeMap::new();
        for (name, value) in folders {
            let name = name.trim();
            match value {
                Value::Object(levels) if !name.is_empty() => {
                    let mut folder = self.folder(levels);
                    // names differing only in surrounding whitespace merge
                    let target: &mut Folder = decoded.entry(name.to_string()).or_default();
                    for level in Level::ALL {
                        target.cards_mut(level).append(folder.cards_mut(level));
                    }
                }
                _ => self.report.dropped_folders += 1,
            }
        }
        CardStore::from_folders(decoded)
    }

    fn folder(&mut self, levels: Map<String, Value>) -> Folder {
        let mut folder = Folder::new();
        for (key, value) in levels {
            let Some(level) = Level::from_key(&key) else {
                continue;
            };
            let Value::Array(cards) = value else {
                self.report.dropped_levels += 1;
                continue;
            };
            for card in cards {
                if let Some(card) = self.card(card) {
                    folder.cards_mut(level).push(card);
                }
            }
        }
        folder
    }

    fn card(&mut self, value: Value) -> Option<Card> {
        let Value::Object(fields) = value else {
            self.report.dropped_cards += 1;
            return None;
        };

        let text = |key: &str| {
            fields
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let (Some(question), Some(answer)) = (text("question"), text("answer")) else {
            self.report.dropped_cards += 1;
            return None;
        };

        let id = self.card_id(fields.get("id"));
        let question_image = self.image(fields.get("question_image"));
        let answer_image = self.image(fields.get("answer_image"));

        Some(Card {
            id,
            question,
            answer,
            question_image,
            answer_image,
        })
    }

    fn card_id(&mut self, value: Option<&Value>) -> CardId {
        let parsed = value
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            .map(CardId::from)
            .filter(|id| !self.seen_ids.contains(id));

        let id = parsed.unwrap_or_else(|| {
            self.report.assigned_ids += 1;
            CardId::new()
        });
        self.seen_ids.insert(id);
        id
    }

    fn image(&mut self, value: Option<&Value>) -> Option<CardImage> {
        match value {
            None | Some(Value::Null) => None,
            Some(Value::String(encoded)) if encoded.trim().is_empty() => None,
            Some(Value::String(encoded)) => match CardImage::from_base64(encoded) {
                Ok(image) => Some(image),
                Err(_) => {
                    self.report.dropped_images += 1;
                    None
                }
            },
            Some(_) => {
                self.report.dropped_images += 1;
                None
            }
        }
    }

    fn settings(&mut self, value: Option<Value>) -> SamplingSettings {
        let Some(value) = value else {
            return SamplingSettings::default();
        };
        match serde_json::from_value::<SamplingSettings>(value) {
            Ok(settings) => settings.normalized(),
            Err(_) => {
                self.report.settings_reset = true;
                SamplingSettings::default()
            }
        }
    }
}

/// Versioned wrapper: a numeric `version` next to a `folders` object.
fn is_current(root: &Map<String, Value>) -> bool {
    root.get(VERSION_KEY).is_some_and(Value::is_number)
        && root.get(FOLDERS_KEY).is_some_and(Value::is_object)
}

/// Flat level map from before folders existed: level keys holding card lists.
fn is_legacy(root: &Map<String, Value>) -> bool {
    !root.is_empty()
        && root
            .iter()
            .all(|(key, value)| Level::from_key(key).is_some() && value.is_array())
}

/// A sampling settings section rather than a folder that happens to be
/// called "settings".
fn is_settings(value: &Value) -> bool {
    match value {
        Value::Object(fields) => {
            !fields.is_empty()
                && fields
                    .keys()
                    .all(|key| key == "draw_chances" || key == "folder_weights")
        }
        _ => false,
    }
}

fn wrap_default(levels: Map<String, Value>) -> Map<String, Value> {
    let mut folders = Map::new();
    folders.insert(DEFAULT_FOLDER.to_string(), Value::Object(levels));
    folders
}
