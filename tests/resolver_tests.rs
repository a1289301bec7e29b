use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use namazvakti::prayer::PrayerId;
use namazvakti::prefs::{MemoryStore, PreferenceStore};
use namazvakti::resolver::{resolve_for_widget, resolve_next_prayer, Resolution};

fn at(day: u32, h: u32, m: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(3 * 3600)
        .unwrap()
        .with_ymd_and_hms(2026, 3, day, h, m, 0)
        .unwrap()
}

fn full_day() -> MemoryStore {
    let store = MemoryStore::new();
    store.set("flutter.nv_fajr", "05:00".into());
    store.set("flutter.nv_sunrise", "06:30".into());
    store.set("flutter.nv_dhuhr", "12:00".into());
    store.set("flutter.nv_asr", "15:00".into());
    store.set("flutter.nv_maghrib", "18:00".into());
    store.set("flutter.nv_isha", "19:30".into());
    store
}

#[test]
fn test_morning_resolves_to_ogle() {
    let res = resolve_next_prayer(&full_day(), &at(10, 7, 0));
    assert_eq!(res.prayer_id(), Some(PrayerId::Ogle));
    assert_eq!(res.remaining(), Some(Duration::hours(5)));
}

#[test]
fn test_after_yatsi_rolls_to_tomorrow_imsak() {
    let store = full_day();
    store.set("flutter.nv_tomorrow_fajr", "05:10".into());

    match resolve_next_prayer(&store, &at(10, 20, 0)) {
        Resolution::Computed { id, at: when, remaining } => {
            assert_eq!(id, PrayerId::Imsak);
            assert_eq!(when, at(11, 5, 10), "should be tomorrow's date");
            assert_eq!(remaining, Duration::hours(9) + Duration::minutes(10));
        }
        other => panic!("expected computed tomorrow imsak, got {:?}", other),
    }
}

#[test]
fn test_after_yatsi_without_tomorrow_is_unknown() {
    let res = resolve_next_prayer(&full_day(), &at(10, 20, 0));
    assert_eq!(res, Resolution::Unknown);
}

#[test]
fn test_malformed_times_are_absent() {
    let store = full_day();
    store.set("flutter.nv_dhuhr", "25:99".into());
    store.set("flutter.nv_asr", "abc".into());

    let res = resolve_next_prayer(&store, &at(10, 7, 0));
    assert_eq!(
        res.prayer_id(),
        Some(PrayerId::Aksam),
        "malformed ogle and ikindi should be skipped"
    );
    assert_eq!(res.remaining(), Some(Duration::hours(11)));
}

#[test]
fn test_stale_day_uses_stored_tomorrow() {
    let store = full_day();
    store.set("flutter.nv_today_date_iso", "2026-03-09".into());
    store.set("flutter.nv_tomorrow_date_iso", "2026-03-10".into());
    store.set("flutter.nv_tomorrow_dhuhr", "12:05".into());

    let res = resolve_next_prayer(&store, &at(10, 7, 0));
    assert_eq!(res.prayer_id(), Some(PrayerId::Ogle));
    assert_eq!(
        res.remaining(),
        Some(Duration::hours(5) + Duration::minutes(5)),
        "promoted tomorrow time should win over the stale one"
    );
}

#[test]
fn test_cached_texts_when_nothing_is_stored() {
    let store = MemoryStore::new();
    store.set("flutter.nv_next_prayer_name", "Öğle".into());
    store.set("flutter.nv_countdown_text", "2saat 10dk".into());

    assert_eq!(
        resolve_next_prayer(&store, &at(10, 9, 0)),
        Resolution::Cached {
            name: "Öğle".into(),
            countdown: "2saat 10dk".into()
        }
    );
}

#[test]
fn test_widget_prefers_fresh_direct_epoch() {
    let store = full_day();
    let now = at(10, 7, 0);
    store.set(
        "flutter.nv_next_epoch_ms",
        (now.timestamp_millis() + 60_000).into(),
    );
    store.set("flutter.nv_next_prayer_name", "Öğle".into());

    match resolve_for_widget(&store, &now) {
        Resolution::Direct { name, remaining } => {
            assert_eq!(name.as_deref(), Some("Öğle"));
            assert_eq!(remaining, Duration::minutes(1));
        }
        other => panic!("expected direct resolution, got {:?}", other),
    }

    store.set(
        "flutter.nv_next_epoch_ms",
        (now.timestamp_millis() - 1).into(),
    );
    assert_eq!(
        resolve_for_widget(&store, &now).prayer_id(),
        Some(PrayerId::Ogle),
        "a past epoch should fall back to stored times"
    );
}
