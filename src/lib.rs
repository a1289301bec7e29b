// Library interface for Namaz Vaktim
// Alarm scheduling, next-prayer resolution and widget state over the app's
// shared preferences; the CLI binary and tests drive it through this facade.

pub mod app_state;
pub mod config;
pub mod config_file;
pub mod constants;
pub mod dispatch;
pub mod localization;
pub mod notify;
pub mod prayer;
pub mod prayer_table;
pub mod prefs;
pub mod resolver;
pub mod scheduler;
pub mod silent_mode;
pub mod theme;
pub mod widget;

use anyhow::{Context, Result};
use app_state::AppState;
use chrono::{DateTime, TimeZone};
use dispatch::{Dispatcher, SchedulingAction, SystemEvent};
use localization::Locale;
use log::{debug, info, warn};
use notify::NotificationSink;
use prefs::PreferenceStore;
use resolver::Resolution;
use scheduler::{AlarmBackend, AlarmScheduler, Precision, ScheduleReport, ScheduledAlarm};
use silent_mode::{RingerControl, SilentModeController};
use std::sync::Arc;
use widget::{WidgetRefresher, WidgetStyleSettings};

/// The platform surfaces the core drives
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn PreferenceStore>,
    pub alarms: Arc<dyn AlarmBackend>,
    pub notifier: Arc<dyn NotificationSink>,
    pub widgets: Arc<dyn WidgetRefresher>,
    pub ringer: Arc<dyn RingerControl>,
}

/// Core functionality shared between the CLI and platform hosts
pub struct NamazVaktiCore {
    pub state: AppState,
    io: Collaborators,
    dispatcher: Dispatcher,
    locale: Option<Locale>,
}

impl NamazVaktiCore {
    pub fn new(io: Collaborators, state: AppState) -> Self {
        Self {
            dispatcher: Dispatcher::new(state.clone()),
            state,
            io,
            locale: None,
        }
    }

    /// Force a widget locale instead of the app's `nv_widget_locale`
    pub fn set_locale(&mut self, locale: Option<Locale>) {
        if let Some(locale) = locale {
            info!("Widget locale forced to {}", locale.code());
        }
        self.locale = locale;
    }

    pub fn store(&self) -> &dyn PreferenceStore {
        self.io.store.as_ref()
    }

    fn scheduler(&self) -> AlarmScheduler<'_> {
        AlarmScheduler::new(self.io.store.as_ref(), self.io.alarms.as_ref())
    }

    fn precision(&self) -> Precision {
        if self.io.alarms.can_schedule_exact() {
            Precision::Exact
        } else {
            Precision::Inexact
        }
    }

    /// Dispatch a platform event and carry out the resulting actions.
    ///
    /// A failing action is logged and does not stop the ones after it.
    /// Returns the actions that were attempted.
    pub fn handle<Tz: TimeZone>(
        &self,
        event: &SystemEvent,
        now: &DateTime<Tz>,
    ) -> Vec<SchedulingAction> {
        let actions = self.dispatcher.on_trigger(event, now.timestamp_millis());
        for action in &actions {
            if let Err(e) = self.execute(action, now) {
                warn!("Action {:?} failed: {:#}", action, e);
            }
        }
        actions
    }

    pub fn execute<Tz: TimeZone>(&self, action: &SchedulingAction, now: &DateTime<Tz>) -> Result<()> {
        match action {
            SchedulingAction::EnsureChannels => self
                .io
                .notifier
                .ensure_channels(&notify::channel_specs())
                .context("Failed to create notification channels"),
            SchedulingAction::ScheduleAll => {
                self.schedule_all(now);
                Ok(())
            }
            SchedulingAction::CancelAll => {
                self.cancel_all();
                Ok(())
            }
            SchedulingAction::ScheduleWidgetTicks => self.schedule_widget_tick(now),
            SchedulingAction::RefreshWidgets => self.refresh_widgets(now).map(|_| ()),
            SchedulingAction::ShowNotification(request) => self.io.notifier.show(request),
            SchedulingAction::Dismiss(code) => self.io.notifier.dismiss(*code),
            SchedulingAction::SilenceRinger {
                prayer_id,
                duration_minutes,
            } => {
                let restore = SilentModeController::new(self.store(), self.io.ringer.as_ref())
                    .silence(prayer_id, *duration_minutes, now.timestamp_millis())?;
                self.register(&restore)
            }
            SchedulingAction::RestoreRinger => {
                SilentModeController::new(self.store(), self.io.ringer.as_ref()).restore()
            }
            SchedulingAction::ApplyNightTheme => {
                if theme::apply_night(self.store()).is_changed() {
                    self.refresh_widgets(now)?;
                }
                Ok(())
            }
            SchedulingAction::ApplySunriseTheme => {
                if theme::apply_sunrise(self.store(), now).is_changed() {
                    self.refresh_widgets(now)?;
                }
                Ok(())
            }
            SchedulingAction::RegisterAlarm(alarm) => self.register(alarm),
            SchedulingAction::CancelAlarm(kind, code) => self
                .io
                .alarms
                .cancel(*kind, *code)
                .with_context(|| format!("Failed to cancel {:?} alarm {}", kind, code)),
        }
    }

    fn register(&self, alarm: &ScheduledAlarm) -> Result<()> {
        self.io
            .alarms
            .register(alarm, self.precision())
            .with_context(|| format!("Failed to register alarm {}", alarm.request_code))
    }

    /// Full scheduling pass; failures are recorded in the app state
    pub fn schedule_all<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<ScheduleReport> {
        self.scheduler().run_schedule_pass(now, &self.state)
    }

    pub fn cancel_all(&self) -> Vec<i32> {
        self.scheduler().cancel_all()
    }

    pub fn next_prayer<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Resolution<Tz> {
        resolver::resolve_next_prayer(self.store(), now)
    }

    /// Re-arm the widget refresh alarm for the next prayer
    pub fn schedule_widget_tick<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<()> {
        let resolution = resolver::resolve_for_widget(self.store(), now);
        let tick = scheduler::widget_tick_alarm(now, &resolution);
        debug!("Widget tick at {}", tick.trigger_epoch_millis);
        self.register(&tick)
    }

    /// Render every widget the host shows. Returns how many were rendered.
    pub fn refresh_widgets<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<usize> {
        let view = widget::build_widget_view(self.store(), now, self.locale);
        let mut rendered = 0;
        for id in self.io.widgets.widget_ids() {
            let style = WidgetStyleSettings::load(self.store(), id);
            match self.io.widgets.render(id, &view, &style) {
                Ok(()) => rendered += 1,
                Err(e) => warn!("Failed to render widget {}: {:#}", id, e),
            }
        }
        debug!("Refreshed {} widgets: {}", rendered, view.title);
        Ok(rendered)
    }
}
