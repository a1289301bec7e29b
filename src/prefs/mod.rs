//! Shared preference store
//!
//! The Flutter app writes prayer times, notification settings and widget
//! styles into a flat key-value store. Native code only reads it, apart from
//! a handful of keys owned by silent mode and auto-dark theming.
//!
//! Readers here never fail: a missing key, a value of the wrong type, or a
//! blank string is simply "absent" and the caller falls back to a default.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use crate::constants::{FLUTTER_PREFIX, MAX_VARIANT_INDEX, NOTIF_KEY_PREFIX};
use crate::prayer::{NotificationKey, PrayerId};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single stored value, as the platform preference APIs hand them out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(String),
}

impl From<bool> for PrefValue {
    fn from(v: bool) -> Self {
        PrefValue::Bool(v)
    }
}

impl From<i64> for PrefValue {
    fn from(v: i64) -> Self {
        PrefValue::Int(v)
    }
}

impl From<&str> for PrefValue {
    fn from(v: &str) -> Self {
        PrefValue::Str(v.to_string())
    }
}

impl From<String> for PrefValue {
    fn from(v: String) -> Self {
        PrefValue::Str(v)
    }
}

impl PrefValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PrefValue::Bool(b) => Some(*b),
            PrefValue::Int(i) => Some(*i != 0),
            PrefValue::Str(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            PrefValue::Double(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PrefValue::Int(i) => Some(*i),
            PrefValue::Str(s) => s.trim().parse::<i64>().ok(),
            PrefValue::Bool(_) | PrefValue::Double(_) => None,
        }
    }

    /// Non-blank string contents
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PrefValue::Str(s) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Key-value storage shared with the Flutter app.
///
/// Implementations provide atomic per-key reads and writes; nothing in this
/// crate relies on multi-key transactions.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<PrefValue>;
    fn keys(&self) -> Vec<String>;
    fn set(&self, key: &str, value: PrefValue);
    fn remove(&self, key: &str);
}

/// The key the Flutter plugin uses for `key`
pub fn flutter_key(key: &str) -> String {
    format!("{FLUTTER_PREFIX}{key}")
}

/// Look up `flutter.<key>` first, then the bare `<key>`, and return the first
/// value `convert` accepts.
fn read_compat<S, T, F>(store: &S, key: &str, convert: F) -> Option<T>
where
    S: PreferenceStore + ?Sized,
    F: Fn(&PrefValue) -> Option<T>,
{
    [flutter_key(key), key.to_string()]
        .iter()
        .filter_map(|k| store.get(k))
        .find_map(|v| convert(&v))
}

pub fn read_bool<S: PreferenceStore + ?Sized>(store: &S, key: &str) -> Option<bool> {
    read_compat(store, key, PrefValue::as_bool)
}

pub fn read_int<S: PreferenceStore + ?Sized>(store: &S, key: &str) -> Option<i64> {
    read_compat(store, key, PrefValue::as_int)
}

pub fn read_string<S: PreferenceStore + ?Sized>(store: &S, key: &str) -> Option<String> {
    read_compat(store, key, |v| v.as_str().map(str::to_string))
}

/// Read a value stored under an exact key (no `flutter.` fallback)
pub fn read_int_exact<S: PreferenceStore + ?Sized>(store: &S, key: &str) -> Option<i64> {
    store.get(key).and_then(|v| v.as_int())
}

/// Numbered variants configured for `base`.
///
/// A variant exists when a key `[flutter.]nv_notif_<base>_<n>_enabled` is
/// present, whatever its value. Results are sorted and deduplicated; index 0,
/// non-numeric suffixes and indices above `MAX_VARIANT_INDEX` are ignored.
pub fn discover_variants<S: PreferenceStore + ?Sized>(
    store: &S,
    base: PrayerId,
) -> Vec<NotificationKey> {
    const ENABLED_SUFFIX: &str = "_enabled";
    let bare = format!("{NOTIF_KEY_PREFIX}{base}_");
    let prefixed = flutter_key(&bare);

    let mut indices = BTreeSet::new();
    for key in store.keys() {
        let rest = key
            .strip_prefix(prefixed.as_str())
            .or_else(|| key.strip_prefix(bare.as_str()));
        let Some(raw) = rest.and_then(|r| r.strip_suffix(ENABLED_SUFFIX)) else {
            continue;
        };
        match raw.parse::<u32>() {
            Ok(index) if index > 0 && index <= MAX_VARIANT_INDEX => {
                indices.insert(index);
            }
            Ok(index) if index > MAX_VARIANT_INDEX => {
                warn!("Ignoring {}: variant {} is above {}", key, index, MAX_VARIANT_INDEX);
            }
            _ => {}
        }
    }

    indices
        .into_iter()
        .filter_map(|i| NotificationKey::variant(base, i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compat_prefers_flutter_prefix() {
        let store = MemoryStore::new();
        store.set("flutter.nv_fajr", "05:10".into());
        store.set("nv_fajr", "06:00".into());
        assert_eq!(read_string(&store, "nv_fajr").as_deref(), Some("05:10"));
    }

    #[test]
    fn test_compat_falls_back_to_bare_key() {
        let store = MemoryStore::new();
        store.set("nv_notif_ogle_minutes", 12.into());
        assert_eq!(read_int(&store, "nv_notif_ogle_minutes"), Some(12));
    }

    #[test]
    fn test_compat_skips_unusable_values() {
        let store = MemoryStore::new();
        store.set("flutter.nv_notif_ogle_minutes", "ten".into());
        store.set("nv_notif_ogle_minutes", "10".into());
        assert_eq!(
            read_int(&store, "nv_notif_ogle_minutes"),
            Some(10),
            "unparseable prefixed value should not hide the bare key"
        );
    }

    #[test]
    fn test_bool_coercion() {
        assert_eq!(PrefValue::Str("true".into()).as_bool(), Some(true));
        assert_eq!(PrefValue::Str("yes".into()).as_bool(), None);
        assert_eq!(PrefValue::Int(0).as_bool(), Some(false));
        assert_eq!(PrefValue::Int(3).as_bool(), Some(true));
    }

    #[test]
    fn test_blank_string_is_absent() {
        let store = MemoryStore::new();
        store.set("flutter.nv_dua_last_title", "   ".into());
        assert_eq!(read_string(&store, "nv_dua_last_title"), None);
    }

    #[test]
    fn test_discover_variants() {
        let store = MemoryStore::new();
        store.set("flutter.nv_notif_ikindi_enabled", true.into());
        store.set("flutter.nv_notif_ikindi_3_enabled", true.into());
        store.set("nv_notif_ikindi_2_enabled", false.into());
        store.set("flutter.nv_notif_ikindi_2_enabled", true.into());
        store.set("flutter.nv_notif_ikindi_0_enabled", true.into());
        store.set("flutter.nv_notif_ikindi_x_enabled", true.into());
        store.set("flutter.nv_notif_ikindi_4_minutes", 10.into());
        store.set("flutter.nv_notif_aksam_5_enabled", true.into());

        let variants = discover_variants(&store, PrayerId::Ikindi);
        assert_eq!(
            variants,
            vec![
                NotificationKey::variant(PrayerId::Ikindi, 2).unwrap(),
                NotificationKey::variant(PrayerId::Ikindi, 3).unwrap(),
            ]
        );
    }

    #[test]
    fn test_discover_variants_ignores_out_of_range_indices() {
        let store = MemoryStore::new();
        store.set("flutter.nv_notif_imsak_30000000_enabled", true.into());
        store.set("flutter.nv_notif_imsak_99999999999_enabled", true.into());
        store.set("flutter.nv_notif_imsak_100_enabled", true.into());
        store.set("flutter.nv_notif_imsak_99_enabled", true.into());

        assert_eq!(
            discover_variants(&store, PrayerId::Imsak),
            vec![NotificationKey::variant(PrayerId::Imsak, MAX_VARIANT_INDEX).unwrap()]
        );
    }
}
