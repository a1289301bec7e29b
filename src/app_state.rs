use crate::scheduler::ScheduleReport;
use parking_lot::Mutex;
use std::sync::Arc;

pub use crate::constants::{DEBOUNCE_DEFAULT_MS, DEBOUNCE_MAX_MS, DEBOUNCE_MIN_MS};

/// Result of the most recent scheduling pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    Completed {
        at_millis: i64,
        registered: usize,
        summary: String,
    },
    Failed {
        at_millis: i64,
        error: String,
    },
}

/// State shared between the dispatcher and the core facade
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Mutex<AppStateInner>>,
}

pub struct AppStateInner {
    /// Epoch millis of the last system trigger that was let through
    pub last_accepted_trigger: Option<i64>,
    /// Coalescing window for system triggers (see DEBOUNCE_DEFAULT_MS)
    pub debounce_ms: u64,
    pub passes_completed: u64,
    pub passes_failed: u64,
    pub last_outcome: Option<PassOutcome>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_debounce_ms(DEBOUNCE_DEFAULT_MS)
    }

    pub fn with_debounce_ms(debounce_ms: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(AppStateInner {
                last_accepted_trigger: None,
                debounce_ms,
                passes_completed: 0,
                passes_failed: 0,
                last_outcome: None,
            })),
        }
    }

    pub fn lock(&self) -> parking_lot::MutexGuard<'_, AppStateInner> {
        self.inner.lock()
    }

    pub fn debounce_ms(&self) -> u64 {
        self.inner.lock().debounce_ms
    }

    pub fn set_debounce_ms(&self, debounce_ms: u64) {
        self.inner.lock().debounce_ms = debounce_ms;
    }

    /// Let a debounced trigger through unless one was accepted within the window.
    ///
    /// Only accepted triggers move the window, so a steady stream of events
    /// cannot postpone work forever.
    pub fn accept_trigger(&self, now_millis: i64) -> bool {
        let mut state = self.inner.lock();
        let window = state.debounce_ms as i64;

        if let Some(last) = state.last_accepted_trigger {
            let elapsed = now_millis - last;
            if (0..window).contains(&elapsed) {
                log::debug!("Trigger dropped, {}ms since last accepted", elapsed);
                return false;
            }
        }

        state.last_accepted_trigger = Some(now_millis);
        true
    }

    pub fn record_pass_success(&self, at_millis: i64, report: &ScheduleReport) {
        let mut state = self.inner.lock();
        state.passes_completed += 1;
        state.last_outcome = Some(PassOutcome::Completed {
            at_millis,
            registered: report.registered.len(),
            summary: report.summary(),
        });
    }

    pub fn record_pass_failure(&self, at_millis: i64, error: String) {
        let mut state = self.inner.lock();
        state.passes_failed += 1;
        state.last_outcome = Some(PassOutcome::Failed { at_millis, error });
    }

    pub fn last_outcome(&self) -> Option<PassOutcome> {
        self.inner.lock().last_outcome.clone()
    }

    /// (completed, failed) pass counts since startup
    pub fn pass_counts(&self) -> (u64, u64) {
        let state = self.inner.lock();
        (state.passes_completed, state.passes_failed)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
