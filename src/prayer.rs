//! Prayer identifiers, notification keys and time-of-day values
//!
//! Everything the Flutter app stores as loose strings ("ikindi_2", "05:12")
//! is parsed into these types once, at the preference boundary.

use crate::constants::{
    DAY_OFFSET_CODE_STRIDE, MAX_VARIANT_INDEX, UNKNOWN_BASE_CODE, VARIANT_CODE_STRIDE,
};
use chrono::{NaiveDate, NaiveDateTime, TimeZone, DateTime};
use std::fmt;

/// One of the six daily prayer/solar slots, plus the two derived ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrayerId {
    Imsak,
    Gunes,
    Ogle,
    Ikindi,
    Aksam,
    Yatsi,
    /// Friday-only duplicate of ogle
    Cuma,
    /// Fixed daily 10:00 reminder, not tied to a solar time
    Dua,
}

impl PrayerId {
    /// Canonical scan order of the six daily slots
    pub const DAILY: [PrayerId; 6] = [
        PrayerId::Imsak,
        PrayerId::Gunes,
        PrayerId::Ogle,
        PrayerId::Ikindi,
        PrayerId::Aksam,
        PrayerId::Yatsi,
    ];

    pub const ALL: [PrayerId; 8] = [
        PrayerId::Imsak,
        PrayerId::Gunes,
        PrayerId::Ogle,
        PrayerId::Ikindi,
        PrayerId::Aksam,
        PrayerId::Yatsi,
        PrayerId::Cuma,
        PrayerId::Dua,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PrayerId::Imsak => "imsak",
            PrayerId::Gunes => "gunes",
            PrayerId::Ogle => "ogle",
            PrayerId::Ikindi => "ikindi",
            PrayerId::Aksam => "aksam",
            PrayerId::Yatsi => "yatsi",
            PrayerId::Cuma => "cuma",
            PrayerId::Dua => "dua",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        PrayerId::ALL.into_iter().find(|id| id.as_str() == s)
    }

    /// Base OS request code for this id (variant and day offset are added on top)
    pub fn base_code(self) -> i32 {
        match self {
            PrayerId::Imsak => 101,
            PrayerId::Gunes => 102,
            PrayerId::Ogle => 103,
            PrayerId::Ikindi => 104,
            PrayerId::Aksam => 105,
            PrayerId::Yatsi => 106,
            PrayerId::Cuma => 107,
            PrayerId::Dua => 108,
        }
    }

    /// Shared-preferences key holding today's "HH:MM" for a daily slot
    pub fn time_key(self) -> Option<&'static str> {
        match self {
            PrayerId::Imsak => Some("nv_fajr"),
            PrayerId::Gunes => Some("nv_sunrise"),
            PrayerId::Ogle => Some("nv_dhuhr"),
            PrayerId::Ikindi => Some("nv_asr"),
            PrayerId::Aksam => Some("nv_maghrib"),
            PrayerId::Yatsi => Some("nv_isha"),
            PrayerId::Cuma | PrayerId::Dua => None,
        }
    }

    pub fn is_daily(self) -> bool {
        self.time_key().is_some()
    }
}

impl fmt::Display for PrayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Today's or tomorrow's occurrence of a scheduled event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DayOffset {
    Today = 0,
    Tomorrow = 1,
}

impl DayOffset {
    pub const BOTH: [DayOffset; 2] = [DayOffset::Today, DayOffset::Tomorrow];

    pub fn days(self) -> u64 {
        self as u64
    }

    /// Calendar date this offset refers to, counted from `today`
    pub fn date_from(self, today: NaiveDate) -> Option<NaiveDate> {
        today.checked_add_days(chrono::Days::new(self.days()))
    }
}

/// Identity of one independently configured reminder: a prayer plus an
/// optional numbered variant ("ikindi" vs "ikindi_2").
///
/// The variant index is at most `MAX_VARIANT_INDEX`, so request codes never
/// overflow or reach into another reminder's codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationKey {
    pub base: PrayerId,
    variant: Option<u32>,
}

impl NotificationKey {
    pub fn base(base: PrayerId) -> Self {
        Self { base, variant: None }
    }

    /// `None` when `index` is above `MAX_VARIANT_INDEX`
    pub fn variant(base: PrayerId, index: u32) -> Option<Self> {
        if index > MAX_VARIANT_INDEX {
            return None;
        }
        // Index 0 would share the base reminder's request codes
        let variant = (index != 0).then_some(index);
        Some(Self { base, variant })
    }

    /// Parse `<id>` or `<id>_<n>`. Unknown ids, non-numeric and out-of-range
    /// suffixes are rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s.split_once('_') {
            None => PrayerId::parse(s).map(Self::base),
            Some((id, suffix)) => {
                let base = PrayerId::parse(id)?;
                let index = suffix.parse::<u32>().ok()?;
                Self::variant(base, index)
            }
        }
    }

    pub fn variant_index(&self) -> u32 {
        self.variant.unwrap_or(0)
    }

    /// Deterministic OS request code for this key on the given day.
    ///
    /// `base_code(id) + variant * 100 + day_offset * 10`
    pub fn request_code(&self, day: DayOffset) -> i32 {
        request_code_for(Some(self.base), self.variant_index(), day)
    }
}

impl fmt::Display for NotificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.variant {
            Some(n) => write!(f, "{}_{}", self.base, n),
            None => write!(f, "{}", self.base),
        }
    }
}

/// Request code formula, also used for ids outside the base table.
/// `variant` must not exceed `MAX_VARIANT_INDEX`.
fn request_code_for(base: Option<PrayerId>, variant: u32, day: DayOffset) -> i32 {
    let base_code = base.map(PrayerId::base_code).unwrap_or(UNKNOWN_BASE_CODE);
    base_code + variant as i32 * VARIANT_CODE_STRIDE + day as i32 * DAY_OFFSET_CODE_STRIDE
}

/// A validated wall-clock time of day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    /// Parse "HH:MM". Anything malformed or out of range is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split(':');
        let hour = parts.next()?.parse::<u32>().ok()?;
        let minute = parts.next()?.parse::<u32>().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Self::new(hour, minute)
    }

    pub fn on(&self, date: NaiveDate, millis: u32) -> Option<NaiveDateTime> {
        date.and_hms_milli_opt(self.hour, self.minute, 0, millis)
    }

    /// The instant this time falls on `date` in `tz`.
    ///
    /// Returns `None` when the local time does not exist (DST gap); an
    /// ambiguous local time resolves to its earlier instant.
    pub fn instant_on<Tz: TimeZone>(
        &self,
        tz: &Tz,
        date: NaiveDate,
        millis: u32,
    ) -> Option<DateTime<Tz>> {
        let naive = self.on(date, millis)?;
        tz.from_local_datetime(&naive).earliest()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day_parse_valid() {
        assert_eq!(TimeOfDay::parse("05:12"), TimeOfDay::new(5, 12));
        assert_eq!(TimeOfDay::parse("0:0"), TimeOfDay::new(0, 0));
        assert_eq!(TimeOfDay::parse("23:59"), TimeOfDay::new(23, 59));
    }

    #[test]
    fn test_time_of_day_parse_malformed() {
        for bad in ["25:99", "24:00", "12:60", "abc", "", "12", "12:30:00", "12-30", "a:10", " 5:10"] {
            assert_eq!(TimeOfDay::parse(bad), None, "{:?} should be absent", bad);
        }
    }

    #[test]
    fn test_notification_key_parse() {
        assert_eq!(
            NotificationKey::parse("ikindi"),
            Some(NotificationKey::base(PrayerId::Ikindi))
        );
        assert_eq!(
            NotificationKey::parse("ikindi_2"),
            NotificationKey::variant(PrayerId::Ikindi, 2)
        );
        assert_eq!(NotificationKey::parse("ikindi_x"), None);
        assert_eq!(NotificationKey::parse("ikindi_100"), None);
        assert_eq!(NotificationKey::parse("imsak_30000000"), None);
        assert_eq!(NotificationKey::parse("sabah"), None);
        assert_eq!(
            NotificationKey::parse("ogle_0"),
            Some(NotificationKey::base(PrayerId::Ogle)),
            "variant 0 folds into the base key"
        );
    }

    #[test]
    fn test_notification_key_display_roundtrip() {
        let key = NotificationKey::variant(PrayerId::Yatsi, 3).unwrap();
        assert_eq!(key.to_string(), "yatsi_3");
        assert_eq!(NotificationKey::parse(&key.to_string()), Some(key));
    }

    #[test]
    fn test_request_codes() {
        let ikindi = NotificationKey::base(PrayerId::Ikindi);
        assert_eq!(ikindi.request_code(DayOffset::Today), 104);
        assert_eq!(ikindi.request_code(DayOffset::Tomorrow), 114);

        let ikindi2 = NotificationKey::variant(PrayerId::Ikindi, 2).unwrap();
        assert_eq!(ikindi2.request_code(DayOffset::Today), 304);
        assert_eq!(ikindi2.request_code(DayOffset::Tomorrow), 314);

        assert_eq!(request_code_for(None, 0, DayOffset::Today), 199);
    }

    #[test]
    fn test_variant_index_is_bounded() {
        let last = NotificationKey::variant(PrayerId::Yatsi, MAX_VARIANT_INDEX).unwrap();
        assert_eq!(last.request_code(DayOffset::Tomorrow), 106 + 9_900 + 10);
        assert_eq!(NotificationKey::variant(PrayerId::Yatsi, MAX_VARIANT_INDEX + 1), None);
        assert_eq!(NotificationKey::variant(PrayerId::Imsak, u32::MAX), None);
    }

    #[test]
    fn test_request_codes_unique_across_keys() {
        use std::collections::HashSet;
        let mut seen = HashSet::new();
        for id in PrayerId::ALL {
            for variant in 0..=MAX_VARIANT_INDEX {
                let key = NotificationKey::variant(id, variant).unwrap();
                for day in DayOffset::BOTH {
                    let code = key.request_code(day);
                    assert!(seen.insert(code), "duplicate request code {}", code);
                }
            }
        }
    }
}
