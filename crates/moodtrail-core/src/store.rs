//! Store: access to raw emotion-timeline payloads.
//!
//! The store hands back untrusted JSON exactly as it was written; nothing here
//! interprets the payload. Pair it with the normalizer before display.
//!
//! [`FsStore`] reads the local JSON data store laid out as
//! `<root>/<device_id>/<YYYY-MM-DD>.json`. [`MemoryStore`] keeps the same
//! shape in memory for tests and embedding.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid device id {0:?}")]
    InvalidDevice(String),
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Source of raw timeline payloads keyed by device and day.
pub trait TimelineStore {
    /// All known device ids, sorted.
    fn devices(&self) -> Result<Vec<String>, StoreError>;

    /// Days with a stored payload for `device`, sorted ascending.
    fn dates(&self, device: &str) -> Result<Vec<String>, StoreError>;

    /// The raw payload for `device` on `date`, or `None` if nothing is stored.
    fn load(&self, device: &str, date: &str) -> Result<Option<Value>, StoreError>;
}

// ---------------------------------------------------------------------------
// Key validation
// ---------------------------------------------------------------------------

/// Device ids become directory names, so only `[A-Za-z0-9_-]` is allowed.
pub fn validate_device(device: &str) -> Result<(), StoreError> {
    let ok = !device.is_empty()
        && device
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidDevice(device.to_string()))
    }
}

pub fn validate_date(date: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        // parse_from_str accepts unpadded fields; file names must be canonical.
        .filter(|d| d.format("%Y-%m-%d").to_string() == date)
        .ok_or_else(|| StoreError::InvalidDate(date.to_string()))
}

// ---------------------------------------------------------------------------
// Filesystem store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, device: &str, date: &str) -> Result<PathBuf, StoreError> {
        validate_device(device)?;
        validate_date(date)?;
        Ok(self.root.join(device).join(format!("{date}.json")))
    }

    /// Write a raw payload, creating the device directory as needed.
    pub fn save(&self, device: &str, date: &str, raw: &Value) -> Result<PathBuf, StoreError> {
        let path = self.path_for(device, date)?;
        let io_err = |source| StoreError::Io { path: path.clone(), source };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let body = serde_json::to_vec_pretty(raw).map_err(|source| StoreError::Parse {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&path, body).map_err(io_err)?;
        Ok(path)
    }
}

impl TimelineStore for FsStore {
    fn devices(&self) -> Result<Vec<String>, StoreError> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io { path: self.root.clone(), source });
            }
        };

        let mut devices = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io { path: self.root.clone(), source })?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if validate_device(name).is_ok() {
                    devices.push(name.to_string());
                }
            }
        }
        devices.sort();
        Ok(devices)
    }

    fn dates(&self, device: &str) -> Result<Vec<String>, StoreError> {
        validate_device(device)?;
        let dir = self.root.join(device);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path: dir, source }),
        };

        let mut dates = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io { path: dir.clone(), source })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_date(stem).is_ok() {
                    dates.push(stem.to_string());
                }
            }
        }
        dates.sort();
        Ok(dates)
    }

    fn load(&self, device: &str, date: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(device, date)?;
        let body = match std::fs::read(&path) {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no stored timeline");
                return Ok(None);
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|source| StoreError::Parse { path, source })
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, device: &str, date: &str, raw: Value) -> Result<(), StoreError> {
        validate_device(device)?;
        validate_date(date)?;
        self.entries
            .entry(device.to_string())
            .or_default()
            .insert(date.to_string(), raw);
        Ok(())
    }
}

impl TimelineStore for MemoryStore {
    fn devices(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn dates(&self, device: &str) -> Result<Vec<String>, StoreError> {
        validate_device(device)?;
        Ok(self
            .entries
            .get(device)
            .map(|days| days.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn load(&self, device: &str, date: &str) -> Result<Option<Value>, StoreError> {
        validate_device(device)?;
        validate_date(date)?;
        Ok(self.entries.get(device).and_then(|days| days.get(date)).cloned())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn device_validation() {
        assert!(validate_device("cam-01_kitchen").is_ok());
        for bad in ["", "../etc", "a/b", "with space"] {
            assert!(matches!(validate_device(bad), Err(StoreError::InvalidDevice(_))), "{bad}");
        }
    }

    #[test]
    fn date_validation() {
        assert!(validate_date("2025-03-01").is_ok());
        for bad in ["2025-3-1", "2025-02-30", "yesterday", "2025-03-01.json"] {
            assert!(matches!(validate_date(bad), Err(StoreError::InvalidDate(_))), "{bad}");
        }
    }

    #[test]
    fn fs_round_trip_and_listing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        let raw = json!({ "timePoints": ["09:00"], "emotionScores": ["NaN"] });

        store.save("cam-02", "2025-03-02", &raw).unwrap();
        store.save("cam-02", "2025-03-01", &raw).unwrap();
        store.save("cam-01", "2025-03-01", &json!({})).unwrap();
        std::fs::write(dir.path().join("cam-02").join("notes.txt"), "x").unwrap();

        assert_eq!(store.devices().unwrap(), vec!["cam-01", "cam-02"]);
        assert_eq!(store.dates("cam-02").unwrap(), vec!["2025-03-01", "2025-03-02"]);
        assert_eq!(store.load("cam-02", "2025-03-02").unwrap(), Some(raw));
        assert_eq!(store.load("cam-02", "2025-03-09").unwrap(), None);
    }

    #[test]
    fn fs_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path().join("nope"));
        assert!(store.devices().unwrap().is_empty());
        assert!(store.dates("cam-01").unwrap().is_empty());
    }

    #[test]
    fn fs_invalid_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let device_dir = dir.path().join("cam-01");
        std::fs::create_dir_all(&device_dir).unwrap();
        std::fs::write(device_dir.join("2025-03-01.json"), "{ not json").unwrap();

        let err = FsStore::new(dir.path()).load("cam-01", "2025-03-01").unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[test]
    fn memory_store() {
        let mut store = MemoryStore::new();
        store.insert("cam-01", "2025-03-01", json!({ "date": "2025-03-01" })).unwrap();
        assert!(store.insert("../x", "2025-03-01", json!({})).is_err());

        assert_eq!(store.devices().unwrap(), vec!["cam-01"]);
        assert_eq!(store.dates("cam-01").unwrap(), vec!["2025-03-01"]);
        assert_eq!(store.dates("cam-09").unwrap(), Vec::<String>::new());
        assert!(store.load("cam-01", "2025-03-01").unwrap().is_some());
    }
}
