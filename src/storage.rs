use crate::errors::EditError;
use crate::models::{DiscountRecord, ReadSet, UserSession};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::{fs, io};
use tracing::{error, warn};

pub const DISCOUNTS_KEY: &str = "discounts_app_discounts_v1";
pub const USER_KEY: &str = "discounts_app_user_v1";
pub const READ_KEY: &str = "discounts_app_read_ids_v1";

/// Key-value substrate holding one serialized JSON document per key.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Load/save contract for the discounts, read-ids and user documents.
///
/// Loads never fail: a missing or unparsable document degrades to its empty
/// value. Saves replace the whole document.
#[derive(Clone)]
pub struct RecordStore {
    backend: Arc<dyn KeyValueStore>,
}

impl RecordStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::default()))
    }

    /// Persisted records in insertion order. `null` fields take their default;
    /// unparsable or incomplete records and repeated ids are dropped.
    pub fn load(&self) -> Vec<DiscountRecord> {
        let entries: Vec<Value> = self.load_json(DISCOUNTS_KEY, Vec::new());
        let mut seen = HashSet::new();
        entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match parse_record(entry) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(index, "dropping unreadable discount record: {err}");
                    None
                }
            })
            .filter(|record| {
                if !record.is_well_formed() {
                    warn!(id = %record.id, "dropping malformed discount record");
                    return false;
                }
                if !seen.insert(record.id.clone()) {
                    warn!(id = %record.id, "dropping discount record with duplicate id");
                    return false;
                }
                true
            })
            .collect()
    }

    pub fn save(&self, records: &[DiscountRecord]) -> Result<(), EditError> {
        self.save_json(DISCOUNTS_KEY, records)
    }

    pub fn load_read_set(&self) -> ReadSet {
        self.load_json(READ_KEY, ReadSet::new())
    }

    pub fn save_read_set(&self, read_set: &ReadSet) -> Result<(), EditError> {
        self.save_json(READ_KEY, read_set)
    }

    /// Adds `id` to the persisted read set. Returns whether it was new.
    pub fn mark_read(&self, id: &str) -> Result<bool, EditError> {
        let mut read_set = self.load_read_set();
        if !crate::read_state::mark_read(&mut read_set, id) {
            return Ok(false);
        }
        self.save_read_set(&read_set)?;
        Ok(true)
    }

    pub fn load_user(&self) -> Option<UserSession> {
        self.load_json(USER_KEY, None)
    }

    pub fn save_user(&self, user: &UserSession) -> Result<(), EditError> {
        self.save_json(USER_KEY, user)
    }

    fn load_json<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) if !raw.trim().is_empty() => raw,
            Ok(_) => return fallback,
            Err(err) => {
                error!("failed to read {key}: {err}");
                return fallback;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!("failed to parse {key}, using empty value: {err}");
                fallback
            }
        }
    }

    fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), EditError> {
        let storage_error = |message: String| EditError::Storage {
            key: key.to_string(),
            message,
        };
        let payload = serde_json::to_string(value).map_err(|err| storage_error(err.to_string()))?;
        self.backend.set(key, &payload).map_err(|err| {
            error!("failed to write {key}: {err}");
            storage_error(err.to_string())
        })
    }
}

fn parse_record(mut entry: Value) -> Result<DiscountRecord, serde_json::Error> {
    if let Value::Object(fields) = &mut entry {
        fields.retain(|_, value| !value.is_null());
    }
    serde_json::from_value(entry)
}
