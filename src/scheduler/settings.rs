use crate::constants::{
    CUMA_DEFAULT_OFFSET_MINUTES, CUMA_MIN_OFFSET_MINUTES, DEFAULT_OFFSET_MINUTES, NOTIF_KEY_PREFIX,
    SOUND_DEFAULT,
};
use crate::prayer::{NotificationKey, PrayerId};
use crate::prefs::{read_bool, read_int, read_string, PreferenceStore};

/// Per-reminder user settings (`nv_notif_<key>_{enabled,minutes,sound}`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSetting {
    pub enabled: bool,
    /// Minutes before the prayer time; always 0 for dua
    pub offset_minutes: u32,
    pub sound_id: String,
}

fn setting_key(key: &NotificationKey, field: &str) -> String {
    format!("{NOTIF_KEY_PREFIX}{key}_{field}")
}

/// Default reminder offset for an id
pub fn default_offset(base: PrayerId) -> u32 {
    match base {
        PrayerId::Cuma => CUMA_DEFAULT_OFFSET_MINUTES,
        PrayerId::Dua => 0,
        _ => DEFAULT_OFFSET_MINUTES,
    }
}

/// Apply per-id rules to a configured offset
pub fn effective_offset(base: PrayerId, configured: u32) -> u32 {
    match base {
        PrayerId::Dua => 0,
        PrayerId::Cuma => configured.max(CUMA_MIN_OFFSET_MINUTES),
        _ => configured,
    }
}

impl NotificationSetting {
    pub fn load<S: PreferenceStore + ?Sized>(store: &S, key: &NotificationKey) -> Self {
        let enabled = read_bool(store, &setting_key(key, "enabled")).unwrap_or(true);

        let configured = read_int(store, &setting_key(key, "minutes"))
            .and_then(|m| u32::try_from(m).ok())
            .unwrap_or_else(|| default_offset(key.base));

        let sound_id = read_string(store, &setting_key(key, "sound"))
            .unwrap_or_else(|| SOUND_DEFAULT.to_string());

        Self {
            enabled,
            offset_minutes: effective_offset(key.base, configured),
            sound_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::MemoryStore;

    #[test]
    fn test_defaults() {
        let store = MemoryStore::new();
        let s = NotificationSetting::load(&store, &NotificationKey::base(PrayerId::Ogle));
        assert!(s.enabled);
        assert_eq!(s.offset_minutes, 5);
        assert_eq!(s.sound_id, "default");

        let cuma = NotificationSetting::load(&store, &NotificationKey::base(PrayerId::Cuma));
        assert_eq!(cuma.offset_minutes, 45);

        let dua = NotificationSetting::load(&store, &NotificationKey::base(PrayerId::Dua));
        assert_eq!(dua.offset_minutes, 0);
    }

    #[test]
    fn test_cuma_offset_floor() {
        let store = MemoryStore::new();
        store.set("flutter.nv_notif_cuma_minutes", 5.into());
        store.set("flutter.nv_notif_ikindi_minutes", 5.into());

        let cuma = NotificationSetting::load(&store, &NotificationKey::base(PrayerId::Cuma));
        assert_eq!(cuma.offset_minutes, 15, "cuma offset is floored at 15");

        let ikindi = NotificationSetting::load(&store, &NotificationKey::base(PrayerId::Ikindi));
        assert_eq!(ikindi.offset_minutes, 5);
    }

    #[test]
    fn test_dua_offset_always_zero() {
        let store = MemoryStore::new();
        store.set("flutter.nv_notif_dua_minutes", 30.into());
        let dua = NotificationSetting::load(&store, &NotificationKey::base(PrayerId::Dua));
        assert_eq!(dua.offset_minutes, 0);
    }

    #[test]
    fn test_variant_settings_are_independent() {
        let store = MemoryStore::new();
        store.set("flutter.nv_notif_ikindi_2_enabled", true.into());
        store.set("flutter.nv_notif_ikindi_2_minutes", 10.into());
        store.set("flutter.nv_notif_ikindi_2_sound", "adhan".into());
        store.set("flutter.nv_notif_ikindi_enabled", false.into());

        let base = NotificationSetting::load(&store, &NotificationKey::base(PrayerId::Ikindi));
        let v2_key = NotificationKey::variant(PrayerId::Ikindi, 2).unwrap();
        let v2 = NotificationSetting::load(&store, &v2_key);
        assert!(!base.enabled);
        assert!(v2.enabled);
        assert_eq!(v2.offset_minutes, 10);
        assert_eq!(v2.sound_id, "adhan");
    }

    #[test]
    fn test_negative_minutes_use_default() {
        let store = MemoryStore::new();
        store.set("flutter.nv_notif_aksam_minutes", (-3).into());
        let s = NotificationSetting::load(&store, &NotificationKey::base(PrayerId::Aksam));
        assert_eq!(s.offset_minutes, 5);
    }
}
