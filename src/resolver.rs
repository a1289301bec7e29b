//! Next-prayer resolution
//!
//! Given "now" and the stored times, pick the first slot strictly after now
//! and compute the countdown. Used by widgets and by the widget refresh tick.

use crate::constants::{
    DIRECT_EPOCH_MAX_AHEAD_HOURS, KEY_COUNTDOWN_TEXT, KEY_NEXT_EPOCH_MS, KEY_NEXT_PRAYER_NAME,
};
use crate::prayer::{DayOffset, PrayerId};
use crate::prayer_table::PrayerTable;
use crate::prefs::{read_int, read_string, PreferenceStore};
use chrono::{DateTime, Duration, TimeZone};

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<Tz: TimeZone> {
    /// Computed from stored times
    Computed {
        id: PrayerId,
        at: DateTime<Tz>,
        remaining: Duration,
    },
    /// Target instant the app wrote directly, with its display name
    Direct { name: Option<String>, remaining: Duration },
    /// Last texts the app rendered itself; no countdown is known
    Cached { name: String, countdown: String },
    Unknown,
}

impl<Tz: TimeZone> Resolution<Tz> {
    pub fn prayer_id(&self) -> Option<PrayerId> {
        match self {
            Resolution::Computed { id, .. } => Some(*id),
            _ => None,
        }
    }

    pub fn remaining(&self) -> Option<Duration> {
        match self {
            Resolution::Computed { remaining, .. } | Resolution::Direct { remaining, .. } => {
                Some(*remaining)
            }
            _ => None,
        }
    }
}

/// First slot of `table` strictly after `now`, falling back to tomorrow's imsak
pub fn next_from_table<Tz: TimeZone>(
    table: &PrayerTable,
    now: &DateTime<Tz>,
) -> Option<(PrayerId, DateTime<Tz>)> {
    let tz = now.timezone();
    let today = now.date_naive();

    for (id, slot) in PrayerId::DAILY.into_iter().zip(table.today.iter()) {
        let Some(time) = slot else { continue };
        let Some(at) = time.instant_on(&tz, today, 0) else { continue };
        if *now < at {
            return Some((id, at));
        }
    }

    let tomorrow = DayOffset::Tomorrow.date_from(today)?;
    let at = table.tomorrow_imsak?.instant_on(&tz, tomorrow, 0)?;
    Some((PrayerId::Imsak, at))
}

/// Resolve the next prayer and its countdown from the stored times.
///
/// Order of precedence: today's slots (strict `now < instant`), tomorrow's
/// imsak, the app's cached name/countdown texts, and finally `Unknown`.
pub fn resolve_next_prayer<S, Tz>(store: &S, now: &DateTime<Tz>) -> Resolution<Tz>
where
    S: PreferenceStore + ?Sized,
    Tz: TimeZone,
{
    let table = PrayerTable::load(store, now.date_naive());
    if let Some((id, at)) = next_from_table(&table, now) {
        let remaining = at.clone() - now.clone();
        return Resolution::Computed { id, at, remaining };
    }

    match (
        read_string(store, KEY_NEXT_PRAYER_NAME),
        read_string(store, KEY_COUNTDOWN_TEXT),
    ) {
        (Some(name), Some(countdown)) => Resolution::Cached { name, countdown },
        _ => Resolution::Unknown,
    }
}

/// Widget variant: trust a fresh `nv_next_epoch_ms` written by the app before
/// computing from stored times.
pub fn resolve_for_widget<S, Tz>(store: &S, now: &DateTime<Tz>) -> Resolution<Tz>
where
    S: PreferenceStore + ?Sized,
    Tz: TimeZone,
{
    if let Some(epoch) = read_int(store, KEY_NEXT_EPOCH_MS) {
        let ahead = epoch - now.timestamp_millis();
        if ahead > 0 && ahead < DIRECT_EPOCH_MAX_AHEAD_HOURS * 3_600_000 {
            return Resolution::Direct {
                name: read_string(store, KEY_NEXT_PRAYER_NAME),
                remaining: Duration::milliseconds(ahead),
            };
        }
    }
    resolve_next_prayer(store, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::MemoryStore;
    use chrono::FixedOffset;

    fn at(h: u32, m: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 3, 10, h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_exact_instant_is_not_next() {
        let store = MemoryStore::new();
        store.set("flutter.nv_fajr", "05:00".into());
        store.set("flutter.nv_sunrise", "06:30".into());

        let res = resolve_next_prayer(&store, &at(5, 0));
        assert_eq!(res.prayer_id(), Some(PrayerId::Gunes));
        assert_eq!(res.remaining(), Some(Duration::minutes(90)));
    }

    #[test]
    fn test_cached_fallback_requires_both_texts() {
        let store = MemoryStore::new();
        store.set("flutter.nv_next_prayer_name", "Öğle".into());
        assert_eq!(resolve_next_prayer(&store, &at(7, 0)), Resolution::Unknown);

        store.set("flutter.nv_countdown_text", "2 saat".into());
        assert_eq!(
            resolve_next_prayer(&store, &at(7, 0)),
            Resolution::Cached {
                name: "Öğle".into(),
                countdown: "2 saat".into()
            }
        );
    }

    #[test]
    fn test_direct_epoch_preferred_when_fresh() {
        let store = MemoryStore::new();
        store.set("flutter.nv_fajr", "05:00".into());
        let now = at(4, 0);
        let epoch = now.timestamp_millis() + 30 * 60_000;
        store.set("flutter.nv_next_epoch_ms", epoch.to_string().into());
        store.set("flutter.nv_next_prayer_name", "İmsak".into());

        match resolve_for_widget(&store, &now) {
            Resolution::Direct { name, remaining } => {
                assert_eq!(name.as_deref(), Some("İmsak"));
                assert_eq!(remaining, Duration::minutes(30));
            }
            other => panic!("expected direct resolution, got {:?}", other),
        }
    }

    #[test]
    fn test_direct_epoch_ignored_when_stale() {
        let store = MemoryStore::new();
        store.set("flutter.nv_fajr", "05:00".into());
        let now = at(4, 0);
        store.set("flutter.nv_next_epoch_ms", (now.timestamp_millis() - 1).into());

        assert_eq!(resolve_for_widget(&store, &now).prayer_id(), Some(PrayerId::Imsak));
    }
}
