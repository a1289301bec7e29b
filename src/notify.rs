//! Showing prayer notifications when their alarms fire
//!
//! Each sound gets its own channel, because on the platforms the app targets
//! a channel's sound is fixed once the channel exists. The `silent` sound is
//! still shown, on a channel with no sound and no vibration.

use crate::constants::{SOUND_DEFAULT, SOUND_SILENT};
use crate::scheduler::NotificationPayload;
use anyhow::{Context, Result};
use log::{debug, info};
use parking_lot::Mutex;

pub const DEFAULT_CHANNEL_ID: &str = "nv_prayer_default_v2";
pub const SILENT_CHANNEL_ID: &str = "nv_prayer_silent_v2";

/// Bundled sounds, each with a dedicated channel
pub const CUSTOM_SOUNDS: [&str; 7] = ["alarm", "bird", "soft", "hard", "adhanarabic", "adhan", "sela"];

const APP_NAME: &str = "Namaz Vaktim";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSpec {
    pub id: String,
    pub name: String,
    /// Bundled sound resource; `None` means the system default (or none when silent)
    pub sound: Option<String>,
    pub silent: bool,
}

/// Channel a notification with `sound_id` is posted to
pub fn channel_for_sound(sound_id: &str) -> String {
    match sound_id {
        "" | SOUND_DEFAULT => DEFAULT_CHANNEL_ID.to_string(),
        SOUND_SILENT => SILENT_CHANNEL_ID.to_string(),
        other => format!("nv_prayer_sound_{}_v2", other.to_lowercase()),
    }
}

/// Every channel the app posts to
pub fn channel_specs() -> Vec<ChannelSpec> {
    let mut specs = vec![
        ChannelSpec {
            id: DEFAULT_CHANNEL_ID.to_string(),
            name: "Namaz Vakitleri".to_string(),
            sound: None,
            silent: false,
        },
        ChannelSpec {
            id: SILENT_CHANNEL_ID.to_string(),
            name: "Namaz Vakitleri (Sessiz)".to_string(),
            sound: None,
            silent: true,
        },
    ];
    specs.extend(CUSTOM_SOUNDS.iter().map(|sound| ChannelSpec {
        id: channel_for_sound(sound),
        name: format!("Namaz Vakitleri ({sound})"),
        sound: Some(sound.to_string()),
        silent: false,
    }));
    specs
}

/// A notification ready to hand to the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    /// Platform notification id; the alarm's request code, so a re-fire replaces
    pub code: i32,
    pub channel_id: String,
    pub title: String,
    pub body: String,
    pub sound_id: String,
    pub notification_id: String,
}

impl NotificationRequest {
    pub fn from_payload(code: i32, payload: &NotificationPayload) -> Self {
        Self {
            code,
            channel_id: channel_for_sound(&payload.sound_id),
            title: payload.title.clone(),
            body: payload.body.clone(),
            sound_id: payload.sound_id.clone(),
            notification_id: payload.notification_id.clone(),
        }
    }

    pub fn is_silent(&self) -> bool {
        self.channel_id == SILENT_CHANNEL_ID
    }
}

/// The platform notification surface
pub trait NotificationSink: Send + Sync {
    fn ensure_channels(&self, channels: &[ChannelSpec]) -> Result<()>;
    fn show(&self, request: &NotificationRequest) -> Result<()>;
    fn dismiss(&self, code: i32) -> Result<()>;
}

/// Desktop notifications through the system notification daemon
pub struct DesktopNotifier {
    timeout_ms: u32,
}

impl DesktopNotifier {
    pub fn new(timeout_ms: u32) -> Self {
        Self { timeout_ms }
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl NotificationSink for DesktopNotifier {
    fn ensure_channels(&self, channels: &[ChannelSpec]) -> Result<()> {
        // Desktop daemons have no channel concept
        debug!("{} channels requested, nothing to create", channels.len());
        Ok(())
    }

    fn show(&self, request: &NotificationRequest) -> Result<()> {
        info!(
            "Showing notification {} ({}) on {}",
            request.code, request.notification_id, request.channel_id
        );
        notify_rust::Notification::new()
            .appname(APP_NAME)
            .summary(&request.title)
            .body(&request.body)
            .timeout(notify_rust::Timeout::Milliseconds(self.timeout_ms))
            .show()
            .map(|_| ())
            .with_context(|| format!("Failed to show notification {}", request.code))
    }

    fn dismiss(&self, code: i32) -> Result<()> {
        debug!("Dismiss of notification {} left to the notification daemon", code);
        Ok(())
    }
}

/// Keeps everything it is asked to show; used by tests and dry runs
#[derive(Default)]
pub struct RecordingSink {
    shown: Mutex<Vec<NotificationRequest>>,
    dismissed: Mutex<Vec<i32>>,
    channels: Mutex<Vec<ChannelSpec>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<NotificationRequest> {
        self.shown.lock().clone()
    }

    pub fn dismissed(&self) -> Vec<i32> {
        self.dismissed.lock().clone()
    }

    pub fn channels(&self) -> Vec<ChannelSpec> {
        self.channels.lock().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn ensure_channels(&self, channels: &[ChannelSpec]) -> Result<()> {
        let mut existing = self.channels.lock();
        for spec in channels {
            if !existing.iter().any(|c| c.id == spec.id) {
                existing.push(spec.clone());
            }
        }
        Ok(())
    }

    fn show(&self, request: &NotificationRequest) -> Result<()> {
        let mut shown = self.shown.lock();
        shown.retain(|n| n.code != request.code);
        shown.push(request.clone());
        Ok(())
    }

    fn dismiss(&self, code: i32) -> Result<()> {
        self.shown.lock().retain(|n| n.code != code);
        self.dismissed.lock().push(code);
        Ok(())
    }
}
