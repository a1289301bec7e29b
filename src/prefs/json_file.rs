//! JSON snapshot of a Flutter `SharedPreferences` file
//!
//! The snapshot is a flat JSON object (`{"flutter.nv_fajr": "05:12", ...}`).
//! It is read fully into memory on open; writes stay in memory until
//! [`JsonFileStore::flush`] is called.

use super::{MemoryStore, PrefValue, PreferenceStore};
use anyhow::{Context, Result};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Open a snapshot file. A missing file yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is not a
    /// JSON object.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                "Preference snapshot not found at {}, starting empty",
                path.display()
            );
            return Ok(Self {
                path: path.to_path_buf(),
                inner: MemoryStore::new(),
            });
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read preference snapshot: {}", path.display()))?;
        let values: BTreeMap<String, serde_json::Value> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse preference snapshot: {}", path.display()))?;

        let mut parsed = BTreeMap::new();
        for (key, value) in values {
            match serde_json::from_value::<PrefValue>(value) {
                Ok(v) => {
                    parsed.insert(key, v);
                }
                // Lists and nested objects have no meaning to native code
                Err(_) => debug!("Ignoring non-scalar preference {}", key),
            }
        }
        debug!("Loaded {} preferences from {}", parsed.len(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            inner: MemoryStore::from_map(parsed),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current contents back to the snapshot file
    pub fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create preference directory")?;
        }
        let contents = serde_json::to_string_pretty(&self.inner.snapshot())
            .context("Failed to serialize preferences")?;
        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write preferences: {}", self.path.display()))?;
        Ok(())
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<PrefValue> {
        self.inner.get(key)
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }

    fn set(&self, key: &str, value: PrefValue) {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) {
        self.inner.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_prefs_path() -> PathBuf {
        use std::thread;
        use std::time::{SystemTime, UNIX_EPOCH};

        let mut base = std::env::temp_dir();
        base.push("namazvakti_tests");
        base.push("json_file");

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let tid = format!("{:?}", thread::current().id());
        base.push(format!("t_{nanos}_{tid}"));

        let _ = fs::create_dir_all(&base);

        base.join("shared_prefs.json")
    }

    #[test]
    fn test_open_parses_scalar_values() {
        let path = temp_prefs_path();
        let contents = r#"{
            "flutter.nv_fajr": "05:12",
            "flutter.nv_notif_ogle_minutes": 10,
            "flutter.auto_dark_mode": true,
            "flutter.ratio": 0.5,
            "flutter.list": ["a", "b"]
        }"#;
        fs::write(&path, contents).expect("Failed to write temp prefs");

        let store = JsonFileStore::open(&path).expect("Failed to open prefs");
        assert_eq!(store.get("flutter.nv_fajr"), Some(PrefValue::Str("05:12".into())));
        assert_eq!(store.get("flutter.nv_notif_ogle_minutes"), Some(PrefValue::Int(10)));
        assert_eq!(store.get("flutter.auto_dark_mode"), Some(PrefValue::Bool(true)));
        assert_eq!(store.get("flutter.ratio"), Some(PrefValue::Double(0.5)));
        assert_eq!(store.get("flutter.list"), None, "lists are ignored");

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let path = temp_prefs_path();
        let _ = fs::remove_file(&path);
        let store = JsonFileStore::open(&path).expect("Missing file should not fail");
        assert!(store.keys().is_empty());
    }

    #[test]
    fn test_invalid_json_is_error() {
        let path = temp_prefs_path();
        fs::write(&path, "not json").expect("Failed to write temp prefs");
        let result = JsonFileStore::open(&path);
        assert!(result.is_err());
        if let Err(e) = result {
            assert!(format!("{:#}", e).contains("Failed to parse"));
        }
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_flush_roundtrip() {
        let path = temp_prefs_path();
        let store = JsonFileStore::open(&path).expect("Failed to open prefs");
        store.set("nv_saved_ringer_mode", PrefValue::Int(2));
        store.flush().expect("Failed to flush");

        let reopened = JsonFileStore::open(&path).expect("Failed to reopen prefs");
        assert_eq!(reopened.get("nv_saved_ringer_mode"), Some(PrefValue::Int(2)));

        fs::remove_file(path).ok();
    }
}
