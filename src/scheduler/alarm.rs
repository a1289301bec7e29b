//! One-shot OS alarm registrations and the backend that holds them

use anyhow::Result;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Notification contents carried by a prayer alarm until it fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub sound_id: String,
    /// `<id>[_<variant>]` of the reminder that produced this alarm
    pub notification_id: String,
}

/// What happens when an alarm fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmTarget {
    Prayer(NotificationPayload),
    AutoDarkNight,
    AutoDarkSunrise,
    SilentModeStart { prayer_id: String, duration_minutes: u32 },
    SilentModeRestore { prayer_id: String, duration_minutes: u32 },
    WidgetTick,
}

/// Receiver an alarm is delivered to.
///
/// Request codes are only unique within one kind: auto-dark sunrise 111 and
/// tomorrow's imsak 111 are different alarms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlarmKind {
    Prayer,
    AutoDark,
    SilentMode,
    WidgetTick,
}

impl AlarmTarget {
    pub fn kind(&self) -> AlarmKind {
        match self {
            AlarmTarget::Prayer(_) => AlarmKind::Prayer,
            AlarmTarget::AutoDarkNight | AlarmTarget::AutoDarkSunrise => AlarmKind::AutoDark,
            AlarmTarget::SilentModeStart { .. } | AlarmTarget::SilentModeRestore { .. } => {
                AlarmKind::SilentMode
            }
            AlarmTarget::WidgetTick => AlarmKind::WidgetTick,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledAlarm {
    pub request_code: i32,
    pub trigger_epoch_millis: i64,
    pub target: AlarmTarget,
}

impl ScheduledAlarm {
    pub fn kind(&self) -> AlarmKind {
        self.target.kind()
    }
}

/// Delivery guarantee requested from the OS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Precision {
    /// Fire at the exact instant, even in idle/doze
    Exact,
    /// Let the OS batch or defer delivery
    Inexact,
}

/// The platform alarm table.
///
/// An alarm is identified by its kind and request code. Registering under an
/// identity that is already in use replaces the earlier registration.
/// Cancelling an unknown identity is not an error.
pub trait AlarmBackend: Send + Sync {
    /// Whether exact alarms are currently permitted (OS version / user grant)
    fn can_schedule_exact(&self) -> bool {
        true
    }

    fn register(&self, alarm: &ScheduledAlarm, precision: Precision) -> Result<()>;

    fn cancel(&self, kind: AlarmKind, request_code: i32) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    pub alarm: ScheduledAlarm,
    pub precision: Precision,
}

/// In-memory last-write-wins alarm table
#[derive(Debug)]
pub struct AlarmTable {
    entries: Mutex<BTreeMap<(AlarmKind, i32), TableEntry>>,
    exact_allowed: bool,
}

impl AlarmTable {
    pub fn new() -> Self {
        Self::with_exact_permission(true)
    }

    pub fn with_exact_permission(exact_allowed: bool) -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            exact_allowed,
        }
    }

    pub fn entries(&self) -> Vec<TableEntry> {
        self.entries.lock().values().cloned().collect()
    }

    /// Request codes of every entry, grouped by kind
    pub fn codes(&self) -> Vec<i32> {
        self.entries.lock().keys().map(|(_, code)| *code).collect()
    }

    pub fn codes_of(&self, kind: AlarmKind) -> Vec<i32> {
        self.entries
            .lock()
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, code)| *code)
            .collect()
    }

    pub fn get(&self, kind: AlarmKind, request_code: i32) -> Option<TableEntry> {
        self.entries.lock().get(&(kind, request_code)).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Remove and return every alarm due at or before `epoch_millis`
    pub fn take_due(&self, epoch_millis: i64) -> Vec<ScheduledAlarm> {
        let mut entries = self.entries.lock();
        let due: Vec<(AlarmKind, i32)> = entries
            .iter()
            .filter(|(_, e)| e.alarm.trigger_epoch_millis <= epoch_millis)
            .map(|(id, _)| *id)
            .collect();
        due.into_iter()
            .filter_map(|id| entries.remove(&id))
            .map(|e| e.alarm)
            .collect()
    }
}

impl Default for AlarmTable {
    fn default() -> Self {
        Self::new()
    }
}

impl AlarmBackend for AlarmTable {
    fn can_schedule_exact(&self) -> bool {
        self.exact_allowed
    }

    fn register(&self, alarm: &ScheduledAlarm, precision: Precision) -> Result<()> {
        self.entries.lock().insert(
            (alarm.kind(), alarm.request_code),
            TableEntry {
                alarm: alarm.clone(),
                precision,
            },
        );
        Ok(())
    }

    fn cancel(&self, kind: AlarmKind, request_code: i32) -> Result<()> {
        self.entries.lock().remove(&(kind, request_code));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alarm(code: i32, at: i64) -> ScheduledAlarm {
        ScheduledAlarm {
            request_code: code,
            trigger_epoch_millis: at,
            target: AlarmTarget::WidgetTick,
        }
    }

    #[test]
    fn test_register_replaces_same_code() {
        let table = AlarmTable::new();
        table.register(&alarm(104, 1_000), Precision::Exact).unwrap();
        table.register(&alarm(104, 2_000), Precision::Exact).unwrap();
        assert_eq!(table.len(), 1);
        let entry = table.get(AlarmKind::WidgetTick, 104).unwrap();
        assert_eq!(entry.alarm.trigger_epoch_millis, 2_000);
    }

    #[test]
    fn test_cancel_unknown_code_is_ok() {
        let table = AlarmTable::new();
        assert!(table.cancel(AlarmKind::Prayer, 999).is_ok());
    }

    #[test]
    fn test_same_code_different_kinds_coexist() {
        let table = AlarmTable::new();
        let sunrise = ScheduledAlarm {
            request_code: 111,
            trigger_epoch_millis: 3_000,
            target: AlarmTarget::AutoDarkSunrise,
        };
        let imsak = ScheduledAlarm {
            request_code: 111,
            trigger_epoch_millis: 4_000,
            target: AlarmTarget::Prayer(NotificationPayload {
                title: "İmsak Vakti".into(),
                body: "İmsak vaktine 5 dakika kaldı.".into(),
                sound_id: "default".into(),
                notification_id: "imsak".into(),
            }),
        };
        table.register(&sunrise, Precision::Exact).unwrap();
        table.register(&imsak, Precision::Exact).unwrap();
        assert_eq!(table.len(), 2);

        table.cancel(AlarmKind::AutoDark, 111).unwrap();
        assert!(table.get(AlarmKind::AutoDark, 111).is_none());
        assert_eq!(table.get(AlarmKind::Prayer, 111).unwrap().alarm, imsak);
        assert_eq!(table.codes_of(AlarmKind::Prayer), vec![111]);
    }

    #[test]
    fn test_take_due() {
        let table = AlarmTable::new();
        table.register(&alarm(101, 1_000), Precision::Exact).unwrap();
        table.register(&alarm(102, 5_000), Precision::Exact).unwrap();
        let due = table.take_due(1_000);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].request_code, 101);
        assert_eq!(table.codes(), vec![102]);
    }
}
