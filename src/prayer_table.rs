//! Today's and tomorrow's stored prayer times
//!
//! The app writes both days once per day. If native code runs after midnight
//! but before the app's next write, the stored "today" is really yesterday;
//! the date markers let us detect that and promote tomorrow's times.

use crate::constants::{KEY_TODAY_ISO, KEY_TOMORROW_ISO};
use crate::prayer::{DayOffset, PrayerId, TimeOfDay};
use crate::prefs::{read_string, PreferenceStore};
use chrono::NaiveDate;
use log::debug;

/// Six optional slots in canonical order
pub type DaySlots = [Option<TimeOfDay>; 6];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrayerTable {
    pub today: DaySlots,
    pub tomorrow: DaySlots,
    /// Tomorrow's imsak as the resolver sees it. Survives a rollover as an
    /// approximation of the following day's imsak.
    pub tomorrow_imsak: Option<TimeOfDay>,
    /// Whether stored tomorrow times were promoted to today
    pub rolled_over: bool,
}

fn slot_index(id: PrayerId) -> Option<usize> {
    PrayerId::DAILY.iter().position(|d| *d == id)
}

fn parse_key<S: PreferenceStore + ?Sized>(store: &S, key: &str) -> Option<TimeOfDay> {
    read_string(store, key).and_then(|s| TimeOfDay::parse(&s))
}

/// Both spellings the app has used for tomorrow's keys
fn tomorrow_keys(today_key: &str) -> (String, String) {
    let stem = today_key.trim_start_matches("nv_");
    (format!("nv_tomorrow_{stem}"), format!("{today_key}_tomorrow"))
}

impl PrayerTable {
    /// Read the stored times, applying the date-rollover correction for `today`.
    pub fn load<S: PreferenceStore + ?Sized>(store: &S, today: NaiveDate) -> Self {
        let mut table = PrayerTable::default();

        for (i, id) in PrayerId::DAILY.into_iter().enumerate() {
            let Some(key) = id.time_key() else { continue };
            table.today[i] = parse_key(store, key);

            let (primary, secondary) = tomorrow_keys(key);
            table.tomorrow[i] = parse_key(store, &primary).or_else(|| parse_key(store, &secondary));
        }
        table.tomorrow_imsak = table.tomorrow[0];

        let today_iso = today.format("%Y-%m-%d").to_string();
        let saved_today = read_string(store, KEY_TODAY_ISO);
        let saved_tomorrow = read_string(store, KEY_TOMORROW_ISO);

        let stale = saved_today.as_deref().is_some_and(|s| s != today_iso);
        if stale && saved_tomorrow.as_deref() == Some(today_iso.as_str()) {
            debug!(
                "Stored day {:?} is stale, promoting stored tomorrow ({})",
                saved_today, today_iso
            );
            for i in 0..table.today.len() {
                table.today[i] = table.tomorrow[i].or(table.today[i]);
            }
            table.tomorrow = [None; 6];
            table.rolled_over = true;
        }

        table
    }

    /// Stored time of a daily slot for the given day
    pub fn time_of(&self, id: PrayerId, day: DayOffset) -> Option<TimeOfDay> {
        let i = slot_index(id)?;
        match day {
            DayOffset::Today => self.today[i],
            DayOffset::Tomorrow => self.tomorrow[i],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.today.iter().all(Option::is_none) && self.tomorrow_imsak.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::MemoryStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_load_reads_both_tomorrow_spellings() {
        let store = MemoryStore::new();
        store.set("flutter.nv_fajr", "05:00".into());
        store.set("flutter.nv_tomorrow_fajr", "05:02".into());
        store.set("flutter.nv_asr_tomorrow", "15:01".into());

        let table = PrayerTable::load(&store, date(2026, 3, 10));
        assert_eq!(table.time_of(PrayerId::Imsak, DayOffset::Today), TimeOfDay::new(5, 0));
        assert_eq!(table.time_of(PrayerId::Imsak, DayOffset::Tomorrow), TimeOfDay::new(5, 2));
        assert_eq!(table.time_of(PrayerId::Ikindi, DayOffset::Tomorrow), TimeOfDay::new(15, 1));
        assert_eq!(table.time_of(PrayerId::Cuma, DayOffset::Today), None);
        assert!(!table.rolled_over);
    }

    #[test]
    fn test_rollover_promotes_tomorrow() {
        let store = MemoryStore::new();
        store.set("flutter.nv_today_date_iso", "2026-03-09".into());
        store.set("flutter.nv_tomorrow_date_iso", "2026-03-10".into());
        store.set("flutter.nv_fajr", "05:00".into());
        store.set("flutter.nv_sunrise", "06:30".into());
        store.set("flutter.nv_fajr_tomorrow", "04:58".into());

        let table = PrayerTable::load(&store, date(2026, 3, 10));
        assert!(table.rolled_over);
        assert_eq!(table.today[0], TimeOfDay::new(4, 58));
        assert_eq!(
            table.today[1],
            TimeOfDay::new(6, 30),
            "slots without a tomorrow value keep the old today value"
        );
        assert_eq!(table.tomorrow, [None; 6]);
    }

    #[test]
    fn test_no_rollover_when_markers_do_not_line_up() {
        let store = MemoryStore::new();
        store.set("flutter.nv_today_date_iso", "2026-03-08".into());
        store.set("flutter.nv_tomorrow_date_iso", "2026-03-09".into());
        store.set("flutter.nv_fajr", "05:00".into());
        store.set("flutter.nv_fajr_tomorrow", "04:58".into());

        let table = PrayerTable::load(&store, date(2026, 3, 10));
        assert!(!table.rolled_over);
        assert_eq!(table.today[0], TimeOfDay::new(5, 0));
    }

    #[test]
    fn test_malformed_slot_is_absent() {
        let store = MemoryStore::new();
        store.set("flutter.nv_dhuhr", "25:99".into());
        store.set("flutter.nv_asr", "abc".into());
        let table = PrayerTable::load(&store, date(2026, 3, 10));
        assert!(table.is_empty());
    }
}
