//! Silencing the phone for a while after a prayer time
//!
//! On start the current ringer mode and stream volumes are saved into the
//! preference store, everything is muted, and a restore alarm is returned for
//! the caller to register. Restore puts the saved values back and forgets them.

use crate::constants::{
    KEY_SAVED_MUSIC_VOLUME, KEY_SAVED_NOTIFICATION_VOLUME, KEY_SAVED_RINGER_MODE,
    KEY_SAVED_RING_VOLUME, SILENT_APP_RESTORE_CODE, SILENT_RESTORE_CODE_BASE,
};
use crate::prefs::{read_int_exact, PrefValue, PreferenceStore};
use crate::scheduler::{AlarmTarget, ScheduledAlarm};
use anyhow::{Context, Result};
use log::{info, warn};
use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingerMode {
    Silent,
    Vibrate,
    Normal,
}

impl RingerMode {
    /// Platform integer value
    pub fn code(self) -> i64 {
        match self {
            RingerMode::Silent => 0,
            RingerMode::Vibrate => 1,
            RingerMode::Normal => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(RingerMode::Silent),
            1 => Some(RingerMode::Vibrate),
            2 => Some(RingerMode::Normal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    Music,
    Notification,
    Ring,
}

impl Stream {
    pub const ALL: [Stream; 3] = [Stream::Music, Stream::Notification, Stream::Ring];

    fn saved_key(self) -> &'static str {
        match self {
            Stream::Music => KEY_SAVED_MUSIC_VOLUME,
            Stream::Notification => KEY_SAVED_NOTIFICATION_VOLUME,
            Stream::Ring => KEY_SAVED_RING_VOLUME,
        }
    }
}

/// The device's audio controls
pub trait RingerControl: Send + Sync {
    fn ringer_mode(&self) -> Result<RingerMode>;
    fn set_ringer_mode(&self, mode: RingerMode) -> Result<()>;
    fn volume(&self, stream: Stream) -> Result<i32>;
    fn max_volume(&self, stream: Stream) -> Result<i32>;
    fn set_volume(&self, stream: Stream, volume: i32) -> Result<()>;
}

/// 32-bit string hash used to spread restore codes by prayer id
fn string_hash(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Request code of the restore alarm belonging to `prayer_id`
pub fn restore_request_code(prayer_id: &str) -> i32 {
    SILENT_RESTORE_CODE_BASE + (string_hash(prayer_id) & 0xFF)
}

/// Alarm that silences the phone at `epoch_millis`
pub fn start_alarm(
    request_code: i32,
    epoch_millis: i64,
    prayer_id: &str,
    duration_minutes: u32,
) -> ScheduledAlarm {
    ScheduledAlarm {
        request_code,
        trigger_epoch_millis: epoch_millis,
        target: AlarmTarget::SilentModeStart {
            prayer_id: prayer_id.to_string(),
            duration_minutes,
        },
    }
}

/// Restore alarm requested by the app itself, `minutes` from now
pub fn app_restore_alarm(now_millis: i64, minutes: u32) -> ScheduledAlarm {
    ScheduledAlarm {
        request_code: SILENT_APP_RESTORE_CODE,
        trigger_epoch_millis: now_millis + i64::from(minutes) * 60_000,
        target: AlarmTarget::SilentModeRestore {
            prayer_id: String::new(),
            duration_minutes: minutes,
        },
    }
}

pub struct SilentModeController<'a> {
    store: &'a dyn PreferenceStore,
    ringer: &'a dyn RingerControl,
}

impl<'a> SilentModeController<'a> {
    pub fn new(store: &'a dyn PreferenceStore, ringer: &'a dyn RingerControl) -> Self {
        Self { store, ringer }
    }

    /// Save the current audio state, mute everything and return the restore
    /// alarm to register `duration_minutes` after `now_millis`.
    pub fn silence(
        &self,
        prayer_id: &str,
        duration_minutes: u32,
        now_millis: i64,
    ) -> Result<ScheduledAlarm> {
        let mode = self.ringer.ringer_mode().context("Failed to read ringer mode")?;
        self.store
            .set(KEY_SAVED_RINGER_MODE, PrefValue::Int(mode.code()));

        for stream in Stream::ALL {
            let volume = self
                .ringer
                .volume(stream)
                .with_context(|| format!("Failed to read {:?} volume", stream))?;
            self.store
                .set(stream.saved_key(), PrefValue::Int(i64::from(volume)));
        }

        self.ringer
            .set_ringer_mode(RingerMode::Silent)
            .context("Failed to silence ringer")?;
        for stream in Stream::ALL {
            self.ringer
                .set_volume(stream, 0)
                .with_context(|| format!("Failed to mute {:?}", stream))?;
        }
        info!("Silent mode on for {} ({} min)", prayer_id, duration_minutes);

        Ok(ScheduledAlarm {
            request_code: restore_request_code(prayer_id),
            trigger_epoch_millis: now_millis + i64::from(duration_minutes) * 60_000,
            target: AlarmTarget::SilentModeRestore {
                prayer_id: prayer_id.to_string(),
                duration_minutes,
            },
        })
    }

    /// Put back the saved ringer mode and volumes, then clear the saved keys.
    ///
    /// A missing ringer mode restores to normal; a missing volume leaves that
    /// stream alone. Volumes are clamped to the stream's current maximum. A
    /// stream the ringer refuses is logged and skipped; the saved keys are
    /// cleared regardless.
    pub fn restore(&self) -> Result<()> {
        let mode = read_int_exact(self.store, KEY_SAVED_RINGER_MODE)
            .and_then(RingerMode::from_code)
            .unwrap_or(RingerMode::Normal);

        if let Err(e) = self.ringer.set_ringer_mode(mode) {
            warn!("Failed to restore ringer mode {:?}: {:#}", mode, e);
        }

        for stream in Stream::ALL {
            let Some(saved) = read_int_exact(self.store, stream.saved_key()).filter(|v| *v >= 0) else {
                warn!("No saved {:?} volume, leaving it unchanged", stream);
                continue;
            };
            let max = match self.ringer.max_volume(stream) {
                Ok(max) => max,
                Err(e) => {
                    warn!("Failed to read {:?} max volume: {:#}", stream, e);
                    continue;
                }
            };
            let volume = i32::try_from(saved).unwrap_or(i32::MAX).clamp(0, max.max(0));
            if let Err(e) = self.ringer.set_volume(stream, volume) {
                warn!("Failed to restore {:?} volume to {}: {:#}", stream, volume, e);
            }
        }

        self.store.remove(KEY_SAVED_RINGER_MODE);
        for stream in Stream::ALL {
            self.store.remove(stream.saved_key());
        }
        info!("Silent mode off, ringer restored to {:?}", mode);
        Ok(())
    }
}

struct RingerInner {
    mode: RingerMode,
    volumes: [i32; 3],
    max: [i32; 3],
}

/// In-memory ringer for tests and dry runs
pub struct MemoryRinger {
    inner: Mutex<RingerInner>,
}

fn stream_index(stream: Stream) -> usize {
    match stream {
        Stream::Music => 0,
        Stream::Notification => 1,
        Stream::Ring => 2,
    }
}

impl MemoryRinger {
    pub fn new(mode: RingerMode, volumes: [i32; 3], max: [i32; 3]) -> Self {
        Self {
            inner: Mutex::new(RingerInner { mode, volumes, max }),
        }
    }
}

impl Default for MemoryRinger {
    fn default() -> Self {
        Self::new(RingerMode::Normal, [7, 5, 5], [15, 7, 7])
    }
}

impl RingerControl for MemoryRinger {
    fn ringer_mode(&self) -> Result<RingerMode> {
        Ok(self.inner.lock().mode)
    }

    fn set_ringer_mode(&self, mode: RingerMode) -> Result<()> {
        self.inner.lock().mode = mode;
        Ok(())
    }

    fn volume(&self, stream: Stream) -> Result<i32> {
        Ok(self.inner.lock().volumes[stream_index(stream)])
    }

    fn max_volume(&self, stream: Stream) -> Result<i32> {
        Ok(self.inner.lock().max[stream_index(stream)])
    }

    fn set_volume(&self, stream: Stream, volume: i32) -> Result<()> {
        self.inner.lock().volumes[stream_index(stream)] = volume;
        Ok(())
    }
}
