//! Turning OS events into scheduling work
//!
//! [`Dispatcher::on_trigger`] is the single entry point for everything the
//! platform delivers: boot, clock changes, fired alarms and explicit requests
//! from the app. It only decides what to do; [`crate::NamazVaktiCore`]
//! carries the actions out.

use crate::app_state::AppState;
use crate::constants::{SILENT_APP_RESTORE_CODE, SILENT_START_DEFAULT_CODE};
use crate::notify::NotificationRequest;
use crate::scheduler::{AlarmKind, AlarmTarget, ScheduledAlarm};
use crate::silent_mode;
use log::debug;

/// Requests the app makes over its platform channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppRequest {
    /// Prayer times or notification settings changed
    DataUpdated,
    /// The user signed out or reset the app
    DataCleared,
    ScheduleSilentMode {
        request_code: Option<i32>,
        epoch_millis: i64,
        prayer_id: String,
        duration_minutes: u32,
    },
    ScheduleSilentModeRestore {
        minutes: u32,
    },
    CancelSilentModeRestore,
    RefreshWidgets,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemEvent {
    BootCompleted,
    TimeChanged,
    TimezoneChanged,
    DateChanged,
    UserPresent,
    ConfigurationChanged,
    UiModeChanged,
    AlarmFired(ScheduledAlarm),
    NotificationDismissed { code: i32 },
    App(AppRequest),
}

impl SystemEvent {
    /// Broadcasts that tend to arrive in bursts and are coalesced
    pub fn is_debounced(&self) -> bool {
        matches!(
            self,
            SystemEvent::BootCompleted
                | SystemEvent::TimeChanged
                | SystemEvent::TimezoneChanged
                | SystemEvent::DateChanged
                | SystemEvent::UserPresent
                | SystemEvent::ConfigurationChanged
                | SystemEvent::UiModeChanged
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulingAction {
    EnsureChannels,
    ScheduleAll,
    CancelAll,
    /// Re-arm each widget's own refresh alarm
    ScheduleWidgetTicks,
    RefreshWidgets,
    ShowNotification(NotificationRequest),
    Dismiss(i32),
    SilenceRinger {
        prayer_id: String,
        duration_minutes: u32,
    },
    RestoreRinger,
    ApplyNightTheme,
    ApplySunriseTheme,
    RegisterAlarm(ScheduledAlarm),
    CancelAlarm(AlarmKind, i32),
}

/// Pure event → action mapping, with trigger coalescing
#[derive(Clone)]
pub struct Dispatcher {
    state: AppState,
}

impl Dispatcher {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn on_trigger(&self, event: &SystemEvent, now_millis: i64) -> Vec<SchedulingAction> {
        use SchedulingAction::*;

        if event.is_debounced() && !self.state.accept_trigger(now_millis) {
            debug!("{:?} coalesced into an earlier trigger", event);
            return Vec::new();
        }

        let actions = match event {
            SystemEvent::BootCompleted
            | SystemEvent::TimeChanged
            | SystemEvent::TimezoneChanged
            | SystemEvent::DateChanged => {
                vec![EnsureChannels, ScheduleAll, ScheduleWidgetTicks, RefreshWidgets]
            }
            SystemEvent::UserPresent => vec![ScheduleWidgetTicks, RefreshWidgets],
            SystemEvent::ConfigurationChanged | SystemEvent::UiModeChanged => vec![RefreshWidgets],
            SystemEvent::AlarmFired(alarm) => on_alarm(alarm),
            SystemEvent::NotificationDismissed { code } => vec![Dismiss(*code)],
            SystemEvent::App(request) => on_app_request(request, now_millis),
        };

        debug!("{:?} -> {:?}", event, actions);
        actions
    }
}

fn on_alarm(alarm: &ScheduledAlarm) -> Vec<SchedulingAction> {
    use SchedulingAction::*;

    match &alarm.target {
        AlarmTarget::Prayer(payload) => vec![ShowNotification(NotificationRequest::from_payload(
            alarm.request_code,
            payload,
        ))],
        // The pass re-arms midnight for the following day
        AlarmTarget::AutoDarkNight => vec![ApplyNightTheme, ScheduleAll],
        AlarmTarget::AutoDarkSunrise => vec![ApplySunriseTheme],
        AlarmTarget::SilentModeStart {
            prayer_id,
            duration_minutes,
        } => vec![SilenceRinger {
            prayer_id: prayer_id.clone(),
            duration_minutes: *duration_minutes,
        }],
        AlarmTarget::SilentModeRestore { .. } => vec![RestoreRinger],
        AlarmTarget::WidgetTick => vec![RefreshWidgets, ScheduleWidgetTicks],
    }
}

fn on_app_request(request: &AppRequest, now_millis: i64) -> Vec<SchedulingAction> {
    use SchedulingAction::*;

    match request {
        AppRequest::DataUpdated => vec![ScheduleAll, ScheduleWidgetTicks, RefreshWidgets],
        AppRequest::DataCleared => vec![CancelAll, RefreshWidgets],
        AppRequest::ScheduleSilentMode {
            request_code,
            epoch_millis,
            prayer_id,
            duration_minutes,
        } => vec![RegisterAlarm(silent_mode::start_alarm(
            request_code.unwrap_or(SILENT_START_DEFAULT_CODE),
            *epoch_millis,
            prayer_id,
            *duration_minutes,
        ))],
        AppRequest::ScheduleSilentModeRestore { minutes } => {
            vec![RegisterAlarm(silent_mode::app_restore_alarm(now_millis, *minutes))]
        }
        AppRequest::CancelSilentModeRestore => {
            vec![CancelAlarm(AlarmKind::SilentMode, SILENT_APP_RESTORE_CODE)]
        }
        AppRequest::RefreshWidgets => vec![RefreshWidgets],
    }
}
