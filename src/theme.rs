//! Automatic dark theme between midnight and sunrise
//!
//! At midnight the app theme is switched to black and the user's theme mode
//! is remembered; at sunrise the remembered mode and its colour come back.
//! Both steps are no-ops while the `auto_dark_mode` flag is off.

use crate::constants::{
    BLACK_THEME_COLOR, DEFAULT_THEME_COLOR, KEY_AUTO_DARK_MODE, KEY_AUTO_DARK_ORIGINAL_MODE,
    KEY_CURRENT_THEME_COLOR, KEY_SELECTED_THEME_COLOR, KEY_THEME_COLOR_MODE,
};
use crate::prayer::PrayerId;
use crate::prayer_table::PrayerTable;
use crate::prefs::{flutter_key, read_bool, read_int, read_string, PreferenceStore, PrefValue};
use chrono::{DateTime, TimeZone};
use log::{debug, info};

const MODE_BLACK: &str = "black";
const MODE_STATIC: &str = "static";
const MODE_SYSTEM: &str = "system";
const MODE_DYNAMIC: &str = "dynamic";

/// What an auto-dark alarm did to the stored theme
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeChange {
    Darkened { previous_mode: String },
    Restored { mode: String, color: i64 },
    Unchanged,
}

impl ThemeChange {
    pub fn is_changed(&self) -> bool {
        !matches!(self, ThemeChange::Unchanged)
    }
}

/// ARGB colour associated with a daily slot
pub fn prayer_color(id: PrayerId) -> i64 {
    match id {
        PrayerId::Imsak => 0xFF12_1838,
        PrayerId::Gunes | PrayerId::Aksam => 0xFF86_5B5B,
        PrayerId::Ogle => 0xFFD1_AA48,
        PrayerId::Ikindi => 0xFFD2_954F,
        PrayerId::Yatsi => 0xFF21_2556,
        PrayerId::Cuma | PrayerId::Dua => DEFAULT_THEME_COLOR,
    }
}

/// Colour of the slot currently in effect: the one before the next upcoming
/// slot, wrapping to yatsi before imsak and after the last slot.
pub fn current_prayer_color<S, Tz>(store: &S, now: &DateTime<Tz>) -> i64
where
    S: PreferenceStore + ?Sized,
    Tz: TimeZone,
{
    let table = PrayerTable::load(store, now.date_naive());
    let tz = now.timezone();
    let today = now.date_naive();

    for (i, slot) in table.today.iter().enumerate() {
        let upcoming = slot
            .and_then(|t| t.instant_on(&tz, today, 0))
            .is_some_and(|at| *now < at);
        if upcoming {
            let current = if i == 0 {
                PrayerId::Yatsi
            } else {
                PrayerId::DAILY[i - 1]
            };
            return prayer_color(current);
        }
    }
    prayer_color(PrayerId::Yatsi)
}

fn auto_dark_enabled<S: PreferenceStore + ?Sized>(store: &S) -> bool {
    read_bool(store, KEY_AUTO_DARK_MODE).unwrap_or(false)
}

/// Midnight: remember the current mode and switch to black
pub fn apply_night<S: PreferenceStore + ?Sized>(store: &S) -> ThemeChange {
    if !auto_dark_enabled(store) {
        debug!("Auto-dark disabled, ignoring night alarm");
        return ThemeChange::Unchanged;
    }

    let current = read_string(store, KEY_THEME_COLOR_MODE).unwrap_or_else(|| MODE_STATIC.to_string());
    if current == MODE_BLACK {
        return ThemeChange::Unchanged;
    }

    store.set(&flutter_key(KEY_AUTO_DARK_ORIGINAL_MODE), current.clone().into());
    store.set(&flutter_key(KEY_THEME_COLOR_MODE), MODE_BLACK.into());
    store.set(&flutter_key(KEY_CURRENT_THEME_COLOR), PrefValue::Int(BLACK_THEME_COLOR));
    info!("Auto-dark: switched theme from {} to black", current);

    ThemeChange::Darkened {
        previous_mode: current,
    }
}

/// Sunrise: restore the mode remembered at midnight along with its colour
pub fn apply_sunrise<S, Tz>(store: &S, now: &DateTime<Tz>) -> ThemeChange
where
    S: PreferenceStore + ?Sized,
    Tz: TimeZone,
{
    if !auto_dark_enabled(store) {
        debug!("Auto-dark disabled, ignoring sunrise alarm");
        return ThemeChange::Unchanged;
    }

    let Some(mode) = read_string(store, KEY_AUTO_DARK_ORIGINAL_MODE) else {
        return ThemeChange::Unchanged;
    };

    let color = match mode.as_str() {
        MODE_STATIC | MODE_SYSTEM => {
            read_int(store, KEY_SELECTED_THEME_COLOR).unwrap_or(DEFAULT_THEME_COLOR)
        }
        MODE_DYNAMIC => current_prayer_color(store, now),
        _ => DEFAULT_THEME_COLOR,
    };

    store.set(&flutter_key(KEY_THEME_COLOR_MODE), mode.clone().into());
    store.set(&flutter_key(KEY_CURRENT_THEME_COLOR), PrefValue::Int(color));
    store.remove(&flutter_key(KEY_AUTO_DARK_ORIGINAL_MODE));
    info!("Auto-dark: restored theme mode {} ({:#010X})", mode, color);

    ThemeChange::Restored { mode, color }
}
