//! Persistence of the workout list in a key-value store.
//!
//! The browser build writes to `window.localStorage`; tests and sessions
//! without storage access use [`MemoryStorage`].
//!
//! # Stored format
//! A versioned envelope `{"version": 1, "workouts": [...]}`. The unversioned
//! JSON array written by earlier releases is still accepted on load. Records
//! keep the field names `id`, `date`, `coords`, `distance`, `duration`,
//! `type`, `cadence`/`elevationGain`, `pace`/`speed` and `description`.

use crate::config::{STORAGE_FORMAT_VERSION, STORAGE_KEY};
use crate::workout::{Coords, Discipline, Origin, ValidationError, Workout, WorkoutId};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// No storage backend could be obtained.
    Unavailable,
    Read(String),
    Write(String),
    Serialize(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable => write!(f, "Persistent storage is unavailable"),
            StorageError::Read(e) => write!(f, "Failed to read from storage: {}", e),
            StorageError::Write(e) => write!(f, "Failed to write to storage: {}", e),
            StorageError::Serialize(e) => write!(f, "Failed to serialize workouts: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

fn js_error(err: JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}

/// Minimal string key-value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// `window.localStorage`.
#[derive(Clone)]
pub struct LocalStorage {
    inner: web_sys::Storage,
}

impl LocalStorage {
    /// Obtain the page's local storage. Fails when the browser denies access.
    pub fn open() -> Result<Self, StorageError> {
        match gloo_utils::window().local_storage() {
            Ok(Some(inner)) => Ok(Self { inner }),
            Ok(None) => Err(StorageError::Unavailable),
            Err(e) => Err(StorageError::Read(js_error(e))),
        }
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner
            .get_item(key)
            .map_err(|e| StorageError::Read(js_error(e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner
            .set_item(key, value)
            .map_err(|e| StorageError::Write(js_error(e)))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner
            .remove_item(key)
            .map_err(|e| StorageError::Write(js_error(e)))
    }
}

/// In-memory store. Clones share the same items.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
    read_only: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects every write.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Write("storage is read-only".into()));
        }
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Write("storage is read-only".into()));
        }
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Wire records

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkoutRecord {
    id: WorkoutId,
    date: DateTime<Utc>,
    coords: Coords,
    distance: f64,
    duration: f64,
    #[serde(flatten)]
    discipline: DisciplineRecord,
    // Derived on load; written for readers of the plain array format.
    #[serde(default, skip_deserializing)]
    description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum DisciplineRecord {
    Running {
        cadence: f64,
        #[serde(default, skip_deserializing)]
        pace: f64,
    },
    Cycling {
        #[serde(rename = "elevationGain")]
        elevation_gain: f64,
        #[serde(default, skip_deserializing)]
        speed: f64,
    },
}

impl From<&Workout> for WorkoutRecord {
    fn from(w: &Workout) -> Self {
        let discipline = match w.discipline() {
            Discipline::Running { cadence } => DisciplineRecord::Running {
                cadence,
                pace: w.pace().unwrap_or_default(),
            },
            Discipline::Cycling { elevation_gain } => DisciplineRecord::Cycling {
                elevation_gain,
                speed: w.speed().unwrap_or_default(),
            },
        };
        Self {
            id: w.id().clone(),
            date: w.date(),
            coords: w.coords(),
            distance: w.distance(),
            duration: w.duration(),
            discipline,
            description: w.description().to_string(),
        }
    }
}

impl TryFrom<WorkoutRecord> for Workout {
    type Error = ValidationError;

    fn try_from(r: WorkoutRecord) -> Result<Self, Self::Error> {
        let discipline = match r.discipline {
            DisciplineRecord::Running { cadence, .. } => Discipline::Running { cadence },
            DisciplineRecord::Cycling { elevation_gain, .. } => {
                Discipline::Cycling { elevation_gain }
            }
        };
        Workout::from_parts(
            r.id,
            r.date,
            r.coords,
            r.distance,
            r.duration,
            discipline,
            Origin::Stored,
        )
    }
}

#[derive(Serialize)]
struct Envelope {
    version: u32,
    workouts: Vec<WorkoutRecord>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredDocument {
    Versioned {
        version: u32,
        workouts: Vec<serde_json::Value>,
    },
    Legacy(Vec<serde_json::Value>),
}

/// Serialize `workouts` into the current stored format.
pub fn encode(workouts: &[Workout]) -> Result<String, StorageError> {
    let envelope = Envelope {
        version: STORAGE_FORMAT_VERSION,
        workouts: workouts.iter().map(WorkoutRecord::from).collect(),
    };
    serde_json::to_string(&envelope).map_err(|e| StorageError::Serialize(e.to_string()))
}

/// Decode stored text. Anything unreadable yields an empty history; single
/// bad records are skipped.
pub fn decode(text: &str) -> Vec<Workout> {
    let values = match serde_json::from_str::<StoredDocument>(text) {
        Ok(StoredDocument::Versioned { version, workouts }) => {
            if version > STORAGE_FORMAT_VERSION {
                warn!(
                    "Stored workouts use unknown format version {} (supported: {}), ignoring",
                    version, STORAGE_FORMAT_VERSION
                );
                return Vec::new();
            }
            workouts
        }
        Ok(StoredDocument::Legacy(workouts)) => {
            debug!("Loading {} workouts from unversioned storage", workouts.len());
            workouts
        }
        Err(e) => {
            debug!("Stored workouts are not readable, starting empty: {}", e);
            return Vec::new();
        }
    };

    values
        .into_iter()
        .enumerate()
        .filter_map(|(idx, value)| {
            let record: WorkoutRecord = match serde_json::from_value(value) {
                Ok(r) => r,
                Err(e) => {
                    warn!("Skipping stored workout #{}: {}", idx, e);
                    return None;
                }
            };
            match Workout::try_from(record) {
                Ok(w) => Some(w),
                Err(e) => {
                    warn!("Skipping stored workout #{}: {}", idx, e);
                    None
                }
            }
        })
        .collect()
}

/// The workout list under a single fixed key.
pub struct Persistence<S: KeyValueStore> {
    storage: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Replace the stored list with `workouts`.
    pub fn save(&self, workouts: &[Workout]) -> Result<(), StorageError> {
        let text = encode(workouts)?;
        self.storage.set(STORAGE_KEY, &text)?;
        debug!("Persisted {} workouts ({} bytes)", workouts.len(), text.len());
        Ok(())
    }

    /// Read back the stored list; empty when absent or unreadable.
    pub fn load(&self) -> Vec<Workout> {
        match self.storage.get(STORAGE_KEY) {
            Ok(Some(text)) => decode(&text),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("{}", e);
                Vec::new()
            }
        }
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(STORAGE_KEY)
    }
}
