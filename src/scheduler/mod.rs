//! Alarm scheduling pass
//!
//! Registers one-shot alarms for every enabled (prayer, variant, day) entry
//! whose trigger instant is still ahead. Request codes are a pure function of
//! the entry, so re-running a pass replaces rather than duplicates, and a full
//! cancel needs no record of what was scheduled before.

pub mod alarm;
pub mod settings;
pub mod templates;

pub use alarm::{
    AlarmBackend, AlarmKind, AlarmTable, AlarmTarget, NotificationPayload, Precision,
    ScheduledAlarm, TableEntry,
};
pub use settings::NotificationSetting;

use crate::app_state::AppState;
use crate::constants::{
    AUTO_DARK_NIGHT_CODE, AUTO_DARK_SUNRISE_CODE, AUTO_DARK_SUNRISE_MILLIS, DUA_HOUR, DUA_MINUTE,
    KEY_AUTO_DARK_MODE, WIDGET_MINUTE_TICK_OFFSET_MS, WIDGET_TICK_CODE, WIDGET_TICK_GRACE_MS,
};
use crate::prayer::{DayOffset, NotificationKey, PrayerId, TimeOfDay};
use crate::prayer_table::PrayerTable;
use crate::prefs::{discover_variants, read_bool, PreferenceStore};
use crate::resolver::Resolution;
use anyhow::{bail, Result};
use chrono::{DateTime, Datelike, Duration, TimeZone, Weekday};
use log::{debug, error, info, warn};

/// Outcome of one scheduling pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleReport {
    pub registered: Vec<i32>,
    pub cancelled: Vec<i32>,
    /// Entries whose trigger instant was already at or before now
    pub skipped_past: usize,
    /// Entries the backend refused
    pub failed: usize,
    pub precision: Option<Precision>,
}

impl ScheduleReport {
    pub fn summary(&self) -> String {
        format!(
            "{} registered, {} cancelled, {} past, {} failed",
            self.registered.len(),
            self.cancelled.len(),
            self.skipped_past,
            self.failed
        )
    }
}

/// Every reminder key for `base`: the base key followed by discovered variants
pub fn keys_for<S: PreferenceStore + ?Sized>(store: &S, base: PrayerId) -> Vec<NotificationKey> {
    let mut keys = vec![NotificationKey::base(base)];
    keys.extend(discover_variants(store, base));
    keys
}

pub struct AlarmScheduler<'a> {
    store: &'a dyn PreferenceStore,
    backend: &'a dyn AlarmBackend,
}

impl<'a> AlarmScheduler<'a> {
    pub fn new(store: &'a dyn PreferenceStore, backend: &'a dyn AlarmBackend) -> Self {
        Self { store, backend }
    }

    fn precision(&self) -> Precision {
        if self.backend.can_schedule_exact() {
            Precision::Exact
        } else {
            warn!("Exact alarms not permitted, falling back to inexact delivery");
            Precision::Inexact
        }
    }

    /// Register every pending alarm for today and tomorrow.
    ///
    /// Entries that are disabled, or that have no occurrence on a given day
    /// (missing time, cuma on a non-Friday), are cancelled under their code.
    /// Entries whose trigger is already past are skipped. A backend failure
    /// on one entry is logged and does not stop the pass, but a pass in which
    /// the backend refused every registration is an error.
    pub fn schedule_all<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<ScheduleReport> {
        let precision = self.precision();
        let table = PrayerTable::load(self.store, now.date_naive());
        let mut report = ScheduleReport {
            precision: Some(precision),
            ..Default::default()
        };

        if table.rolled_over {
            info!("Stored prayer times were a day behind, using stored tomorrow as today");
        }

        for base in PrayerId::ALL {
            for key in keys_for(self.store, base) {
                let setting = NotificationSetting::load(self.store, &key);
                for day in DayOffset::BOTH {
                    self.schedule_entry(&key, &setting, day, &table, now, precision, &mut report);
                }
            }
        }

        self.schedule_auto_dark(&table, now, precision, &mut report);

        if report.registered.is_empty() && report.failed > 0 {
            bail!(
                "Alarm backend refused every registration ({})",
                report.summary()
            );
        }

        info!("Scheduling pass complete: {}", report.summary());
        Ok(report)
    }

    #[allow(clippy::too_many_arguments)]
    fn schedule_entry<Tz: TimeZone>(
        &self,
        key: &NotificationKey,
        setting: &NotificationSetting,
        day: DayOffset,
        table: &PrayerTable,
        now: &DateTime<Tz>,
        precision: Precision,
        report: &mut ScheduleReport,
    ) {
        let code = key.request_code(day);

        if !setting.enabled {
            debug!("{} (day +{}) disabled", key, day.days());
            self.cancel_into(AlarmKind::Prayer, code, report);
            return;
        }

        let Some(instant) = occurrence(key.base, day, table, now) else {
            debug!("{} (day +{}) has no occurrence", key, day.days());
            self.cancel_into(AlarmKind::Prayer, code, report);
            return;
        };

        let trigger = instant - Duration::minutes(i64::from(setting.offset_minutes));
        if trigger <= *now {
            debug!("{} (day +{}) trigger {} already past", key, day.days(), trigger.to_rfc3339());
            report.skipped_past += 1;
            return;
        }

        let (title, body) = match key.base {
            PrayerId::Dua => (
                templates::dua_title(self.store, day),
                templates::dua_body(self.store, day),
            ),
            base => (
                templates::title_for(base).to_string(),
                templates::body_for(base, setting.offset_minutes),
            ),
        };

        let alarm = ScheduledAlarm {
            request_code: code,
            trigger_epoch_millis: trigger.timestamp_millis(),
            target: AlarmTarget::Prayer(NotificationPayload {
                title,
                body,
                sound_id: setting.sound_id.clone(),
                notification_id: key.to_string(),
            }),
        };

        match self.backend.register(&alarm, precision) {
            Ok(()) => {
                debug!("Registered {} (code {}) at {}", key, code, trigger.to_rfc3339());
                report.registered.push(code);
            }
            Err(e) => {
                warn!("Failed to register {} (code {}): {:#}", key, code, e);
                report.failed += 1;
            }
        }
    }

    /// Midnight and sunrise alarms for automatic dark theme, kept only while
    /// the `auto_dark_mode` flag is on.
    fn schedule_auto_dark<Tz: TimeZone>(
        &self,
        table: &PrayerTable,
        now: &DateTime<Tz>,
        precision: Precision,
        report: &mut ScheduleReport,
    ) {
        let sunrise_codes = DayOffset::BOTH.map(|d| AUTO_DARK_SUNRISE_CODE + d as i32);

        if !read_bool(self.store, KEY_AUTO_DARK_MODE).unwrap_or(false) {
            for code in std::iter::once(AUTO_DARK_NIGHT_CODE).chain(sunrise_codes) {
                self.cancel_into(AlarmKind::AutoDark, code, report);
            }
            return;
        }

        let tz = now.timezone();
        let today = now.date_naive();
        let midnight = TimeOfDay::new(0, 0)
            .and_then(|t| t.instant_on(&tz, today, 0))
            .filter(|m| m > now)
            .or_else(|| {
                let tomorrow = DayOffset::Tomorrow.date_from(today)?;
                TimeOfDay::new(0, 0)?.instant_on(&tz, tomorrow, 0)
            });

        match midnight {
            Some(at) => self.register_into(
                ScheduledAlarm {
                    request_code: AUTO_DARK_NIGHT_CODE,
                    trigger_epoch_millis: at.timestamp_millis(),
                    target: AlarmTarget::AutoDarkNight,
                },
                precision,
                report,
            ),
            None => warn!("Could not compute next local midnight, night alarm not armed"),
        }

        for (day, code) in DayOffset::BOTH.into_iter().zip(sunrise_codes) {
            let sunrise = table
                .time_of(PrayerId::Gunes, day)
                .zip(day.date_from(today))
                .and_then(|(t, date)| t.instant_on(&tz, date, AUTO_DARK_SUNRISE_MILLIS));

            match sunrise {
                Some(at) if at > *now => self.register_into(
                    ScheduledAlarm {
                        request_code: code,
                        trigger_epoch_millis: at.timestamp_millis(),
                        target: AlarmTarget::AutoDarkSunrise,
                    },
                    precision,
                    report,
                ),
                Some(_) => report.skipped_past += 1,
                None => self.cancel_into(AlarmKind::AutoDark, code, report),
            }
        }
    }

    fn register_into(&self, alarm: ScheduledAlarm, precision: Precision, report: &mut ScheduleReport) {
        match self.backend.register(&alarm, precision) {
            Ok(()) => report.registered.push(alarm.request_code),
            Err(e) => {
                warn!("Failed to register alarm {}: {:#}", alarm.request_code, e);
                report.failed += 1;
            }
        }
    }

    fn cancel_into(&self, kind: AlarmKind, code: i32, report: &mut ScheduleReport) {
        match self.backend.cancel(kind, code) {
            Ok(()) => report.cancelled.push(code),
            Err(e) => warn!("Failed to cancel alarm {}: {:#}", code, e),
        }
    }

    /// Cancel every alarm this scheduler could have registered.
    ///
    /// Codes are rebuilt from base ids, currently discovered variants and both
    /// day offsets, plus the auto-dark codes. Returns the codes cancelled.
    pub fn cancel_all(&self) -> Vec<i32> {
        let mut report = ScheduleReport::default();
        for base in PrayerId::ALL {
            for key in keys_for(self.store, base) {
                for day in DayOffset::BOTH {
                    self.cancel_into(AlarmKind::Prayer, key.request_code(day), &mut report);
                }
            }
        }
        for code in [
            AUTO_DARK_NIGHT_CODE,
            AUTO_DARK_SUNRISE_CODE,
            AUTO_DARK_SUNRISE_CODE + DayOffset::Tomorrow as i32,
        ] {
            self.cancel_into(AlarmKind::AutoDark, code, &mut report);
        }
        info!("Cancelled {} alarm codes", report.cancelled.len());
        report.cancelled
    }

    /// Run a full pass, recording its outcome in `state`.
    ///
    /// Never propagates a failure: it is recorded as `PassOutcome::Failed` and
    /// the next trigger retries.
    pub fn run_schedule_pass<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
        state: &AppState,
    ) -> Option<ScheduleReport> {
        match self.schedule_all(now) {
            Ok(report) => {
                state.record_pass_success(now.timestamp_millis(), &report);
                Some(report)
            }
            Err(e) => {
                error!("Scheduling pass failed: {:#}", e);
                state.record_pass_failure(now.timestamp_millis(), format!("{:#}", e));
                None
            }
        }
    }
}

/// Base instant (before the reminder offset) of `base` on `day`
fn occurrence<Tz: TimeZone>(
    base: PrayerId,
    day: DayOffset,
    table: &PrayerTable,
    now: &DateTime<Tz>,
) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let date = day.date_from(now.date_naive())?;
    let time = match base {
        PrayerId::Dua => TimeOfDay::new(DUA_HOUR, DUA_MINUTE)?,
        PrayerId::Cuma if date.weekday() != Weekday::Fri => return None,
        PrayerId::Cuma => table.time_of(PrayerId::Ogle, day)?,
        daily => table.time_of(daily, day)?,
    };
    time.instant_on(&tz, date, 0)
}

/// The widget's own refresh alarm: just after the next prayer when its
/// countdown is known, otherwise at the next minute boundary.
pub fn widget_tick_alarm<Tz: TimeZone>(
    now: &DateTime<Tz>,
    resolution: &Resolution<Tz>,
) -> ScheduledAlarm {
    let now_ms = now.timestamp_millis();
    let trigger_epoch_millis = match resolution.remaining() {
        Some(remaining) if remaining > Duration::zero() => {
            now_ms + remaining.num_milliseconds() + WIDGET_TICK_GRACE_MS
        }
        _ => (now_ms.div_euclid(60_000) + 1) * 60_000 + WIDGET_MINUTE_TICK_OFFSET_MS,
    };
    ScheduledAlarm {
        request_code: WIDGET_TICK_CODE,
        trigger_epoch_millis,
        target: AlarmTarget::WidgetTick,
    }
}
