//! Centralized constants for Namaz Vaktim scheduling
//!
//! This module contains all fixed numerical values and preference key names
//! used throughout the crate. Each constant includes documentation on its
//! purpose, unit, and valid range.

// ============================================================================
// ALARM REQUEST CODES
// ============================================================================

/// Request code used for notification ids that are not in the base table.
/// Unit: OS alarm request code
/// Range: Fixed, must not overlap any base code
pub const UNKNOWN_BASE_CODE: i32 = 199;

/// Request code stride between numbered variants of the same prayer.
/// Unit: request code delta per variant index
/// Range: Fixed, must be larger than DAY_OFFSET_CODE_STRIDE * 2
pub const VARIANT_CODE_STRIDE: i32 = 100;

/// Highest numbered variant a reminder may have. Keys with a larger suffix
/// are ignored.
/// Unit: variant index
/// Range: Fixed, keeps every prayer code below 10_200
pub const MAX_VARIANT_INDEX: u32 = 99;

/// Request code stride between today's and tomorrow's occurrence.
/// Unit: request code delta per day offset
/// Range: Fixed
pub const DAY_OFFSET_CODE_STRIDE: i32 = 10;

/// Auto-dark midnight alarm request code.
/// Unit: OS alarm request code
pub const AUTO_DARK_NIGHT_CODE: i32 = 109;

/// Auto-dark sunrise alarm request code (today; tomorrow adds one).
/// Shares numbers with prayer codes; the alarm kind keeps them apart.
/// Unit: OS alarm request code
pub const AUTO_DARK_SUNRISE_CODE: i32 = 110;

/// Widget refresh tick request code.
/// Unit: OS alarm request code
pub const WIDGET_TICK_CODE: i32 = 0x857;

/// Base of the silent-mode restore request codes (low byte is a prayer id hash).
/// Unit: OS alarm request code
pub const SILENT_RESTORE_CODE_BASE: i32 = 0x700;

/// Default request code for silent-mode start alarms requested by the app.
/// Unit: OS alarm request code
pub const SILENT_START_DEFAULT_CODE: i32 = 0x600;

/// Request code of the restore alarm the app schedules directly.
/// Unit: OS alarm request code
pub const SILENT_APP_RESTORE_CODE: i32 = 0x800;

// ============================================================================
// NOTIFICATION DEFAULTS
// ============================================================================

/// Default reminder offset before a regular prayer time.
/// Unit: minutes
pub const DEFAULT_OFFSET_MINUTES: u32 = 5;

/// Default reminder offset before Friday prayer.
/// Unit: minutes
pub const CUMA_DEFAULT_OFFSET_MINUTES: u32 = 45;

/// Minimum reminder offset before Friday prayer.
/// Unit: minutes
/// Range: Fixed floor, configured values below this are raised
pub const CUMA_MIN_OFFSET_MINUTES: u32 = 15;

/// Fixed local time of the daily dua reminder.
/// Unit: hour of day / minute of hour
pub const DUA_HOUR: u32 = 10;
pub const DUA_MINUTE: u32 = 0;

/// Sound id meaning "system default notification sound".
pub const SOUND_DEFAULT: &str = "default";

/// Sound id meaning "no sound".
pub const SOUND_SILENT: &str = "silent";

// ============================================================================
// TRIGGER HANDLING
// ============================================================================

/// Default coalescing window for repeated system triggers.
/// Unit: milliseconds
/// Recommended range: 1000-3000
pub const DEBOUNCE_DEFAULT_MS: u64 = 2000;

/// Minimum configurable coalescing window.
/// Unit: milliseconds
pub const DEBOUNCE_MIN_MS: u64 = 250;

/// Maximum configurable coalescing window.
/// Unit: milliseconds
pub const DEBOUNCE_MAX_MS: u64 = 10_000;

/// A direct next-prayer epoch written by the app is trusted only this far ahead.
/// Unit: hours
pub const DIRECT_EPOCH_MAX_AHEAD_HOURS: i64 = 36;

/// Delay after a prayer instant before the widget refreshes itself.
/// Unit: milliseconds
pub const WIDGET_TICK_GRACE_MS: i64 = 1000;

/// Offset past the minute boundary for the fallback widget tick.
/// Unit: milliseconds
pub const WIDGET_MINUTE_TICK_OFFSET_MS: i64 = 500;

/// Sunrise auto-dark alarms fire this far into the minute.
/// Unit: milliseconds
pub const AUTO_DARK_SUNRISE_MILLIS: u32 = 500;

/// Default length of a silent-mode window.
/// Unit: minutes
pub const SILENT_DEFAULT_DURATION_MINUTES: u32 = 15;

// ============================================================================
// THEME COLORS (ARGB)
// ============================================================================

/// Fallback theme color when nothing else is known.
pub const DEFAULT_THEME_COLOR: i64 = 0xFF58_8066;

/// Theme color used while auto-dark night mode is active.
pub const BLACK_THEME_COLOR: i64 = 0xFF00_0000;

// ============================================================================
// WIDGET STYLE DEFAULTS
// ============================================================================

/// Default card overlay alpha.
/// Unit: 0-255
pub const CARD_ALPHA_DEFAULT: i64 = 204;

/// Default card corner radius.
/// Unit: dp
/// Range: 0-120
pub const CARD_RADIUS_DEFAULT_DP: i64 = 75;
pub const CARD_RADIUS_MAX_DP: i64 = 120;

// ============================================================================
// PREFERENCE KEYS
// ============================================================================

/// Prefix the Flutter plugin adds to every key it writes.
pub const FLUTTER_PREFIX: &str = "flutter.";

/// Per-notification key prefix (`nv_notif_<id>_<field>`).
pub const NOTIF_KEY_PREFIX: &str = "nv_notif_";

pub const KEY_TODAY_ISO: &str = "nv_today_date_iso";
pub const KEY_TOMORROW_ISO: &str = "nv_tomorrow_date_iso";
pub const KEY_NEXT_PRAYER_NAME: &str = "nv_next_prayer_name";
pub const KEY_COUNTDOWN_TEXT: &str = "nv_countdown_text";
pub const KEY_NEXT_EPOCH_MS: &str = "nv_next_epoch_ms";
pub const KEY_WIDGET_LOCALE: &str = "nv_widget_locale";
pub const KEY_AUTO_DARK_MODE: &str = "auto_dark_mode";
pub const KEY_THEME_COLOR_MODE: &str = "theme_color_mode";
pub const KEY_CURRENT_THEME_COLOR: &str = "current_theme_color";
pub const KEY_SELECTED_THEME_COLOR: &str = "selected_theme_color";
pub const KEY_AUTO_DARK_ORIGINAL_MODE: &str = "auto_dark_mode_original_theme_color_mode";
pub const KEY_DUA_LAST_TITLE: &str = "nv_dua_last_title";
pub const KEY_DUA_LAST_BODY: &str = "nv_dua_last_body";

pub const KEY_SAVED_RINGER_MODE: &str = "nv_saved_ringer_mode";
pub const KEY_SAVED_MUSIC_VOLUME: &str = "nv_saved_music_volume";
pub const KEY_SAVED_NOTIFICATION_VOLUME: &str = "nv_saved_notification_volume";
pub const KEY_SAVED_RING_VOLUME: &str = "nv_saved_ring_volume";
