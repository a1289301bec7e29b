//! Home-screen widget view model
//!
//! Turns the resolver's answer plus per-widget style preferences into the
//! texts and settings a widget host draws. Drawing itself belongs to the host.

use crate::constants::{CARD_ALPHA_DEFAULT, CARD_RADIUS_DEFAULT_DP, CARD_RADIUS_MAX_DP};
use crate::localization::Locale;
use crate::prefs::{read_bool, read_int, PreferenceStore};
use crate::resolver::{resolve_for_widget, Resolution};
use crate::scheduler::widget_tick_alarm;
use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone};
use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Second line of the widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subtitle {
    /// "2saat 30dk" or "45dakika"
    Countdown(String),
    /// Under a minute left: the host runs a live seconds counter
    LiveSeconds { remaining_ms: i64, unit: String },
    /// No countdown is known; last cached text or "--"
    Static(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetView {
    pub title: String,
    pub subtitle: Subtitle,
    pub locale: Locale,
    /// When the widget should refresh itself next
    pub next_refresh_epoch_millis: i64,
}

impl WidgetView {
    /// Content signature for render memoization
    pub fn signature(&self, style: &WidgetStyleSettings) -> String {
        format!(
            "t={}|s={:?}|l={}|a={}|r={}|g={}|b={}|x={}",
            self.title,
            self.subtitle,
            self.locale.code(),
            style.card_alpha,
            style.radius_dp,
            style.gradient_mode,
            style.bg_color_mode,
            style.text_color_mode
        )
    }
}

fn countdown_subtitle(locale: Locale, remaining: Duration) -> Subtitle {
    let ms = remaining.num_milliseconds();
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;

    if hours > 0 {
        Subtitle::Countdown(locale.format_time_remaining(hours, minutes, 0))
    } else if minutes > 0 {
        Subtitle::Countdown(locale.format_time_remaining(0, minutes, 0))
    } else {
        Subtitle::LiveSeconds {
            remaining_ms: ms,
            unit: locale.second().to_string(),
        }
    }
}

/// Build the widget texts for `now`. `locale` overrides the app's setting.
pub fn build_widget_view<S, Tz>(store: &S, now: &DateTime<Tz>, locale: Option<Locale>) -> WidgetView
where
    S: PreferenceStore + ?Sized,
    Tz: TimeZone,
{
    let locale = locale.unwrap_or_else(|| Locale::from_store(store));
    let resolution = resolve_for_widget(store, now);

    let name = match &resolution {
        Resolution::Computed { id, .. } => Some(locale.prayer_name(*id).to_string()),
        Resolution::Direct { name, .. } => name.as_deref().map(|n| locale.translate_cached_name(n)),
        Resolution::Cached { name, .. } => Some(locale.translate_cached_name(name)),
        Resolution::Unknown => None,
    };

    let title = match name {
        Some(name) => format!("{} {}", name, locale.next_prayer_suffix()),
        None => locale.calculating().to_string(),
    };

    let subtitle = match (&resolution, resolution.remaining()) {
        (_, Some(remaining)) if remaining > Duration::zero() => countdown_subtitle(locale, remaining),
        (Resolution::Cached { countdown, .. }, _) => Subtitle::Static(countdown.clone()),
        _ => Subtitle::Static("--".to_string()),
    };

    WidgetView {
        title,
        subtitle,
        locale,
        next_refresh_epoch_millis: widget_tick_alarm(now, &resolution).trigger_epoch_millis,
    }
}

/// Per-instance style, falling back to the app-wide values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetStyleSettings {
    /// Card overlay alpha, 0-255
    pub card_alpha: i64,
    /// Corner radius in dp, 0-120
    pub radius_dp: i64,
    /// 0 none, 1 top gradient, 2 coloured card
    pub gradient_mode: i64,
    /// 0 system, 1 dark, 2 light
    pub bg_color_mode: i64,
    /// 0 system, 1 dark, 2 light
    pub text_color_mode: i64,
}

impl WidgetStyleSettings {
    pub fn load<S: PreferenceStore + ?Sized>(store: &S, widget_id: i32) -> Self {
        let scoped = |key: &str| read_int(store, &format!("widget_{widget_id}_{key}"));
        let int = |key: &str, default: i64| scoped(key).or_else(|| read_int(store, key)).unwrap_or(default);

        let gradient_mode = match scoped("nv_gradient_mode").or_else(|| read_int(store, "nv_gradient_mode")) {
            Some(mode @ 0..=2) => mode,
            _ => {
                if read_bool(store, "nv_gradient_on").unwrap_or(true) {
                    1
                } else {
                    0
                }
            }
        };

        Self {
            card_alpha: int("nv_card_alpha", CARD_ALPHA_DEFAULT).clamp(0, 255),
            radius_dp: int("nv_card_radius_dp", CARD_RADIUS_DEFAULT_DP).clamp(0, CARD_RADIUS_MAX_DP),
            gradient_mode,
            bg_color_mode: int("nv_bg_color_mode", 0).clamp(0, 2),
            text_color_mode: int("nv_text_color_mode", 0).clamp(0, 2),
        }
    }
}

/// Signature-keyed memo of rendered output, owned by the renderer
#[derive(Debug)]
pub struct RenderCache<V> {
    entries: HashMap<String, V>,
    hits: u64,
    misses: u64,
}

impl<V> Default for RenderCache<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<V> RenderCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached output for `signature`, rendering it on a miss
    pub fn get_or_render<F>(&mut self, signature: &str, render: F) -> &V
    where
        F: FnOnce() -> V,
    {
        if self.entries.contains_key(signature) {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        self.entries
            .entry(signature.to_string())
            .or_insert_with(render)
    }

    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// The widget host
pub trait WidgetRefresher: Send + Sync {
    fn widget_ids(&self) -> Vec<i32>;
    fn render(&self, widget_id: i32, view: &WidgetView, style: &WidgetStyleSettings) -> Result<()>;
}

/// Host that keeps the last text each widget shows; used by tests and dry runs
#[derive(Default)]
pub struct RecordingWidgetHost {
    ids: Vec<i32>,
    cache: Mutex<RenderCache<String>>,
    shown: Mutex<HashMap<i32, String>>,
}

impl RecordingWidgetHost {
    pub fn new(ids: Vec<i32>) -> Self {
        Self {
            ids,
            ..Default::default()
        }
    }

    /// Last rendered text of a widget
    pub fn shown(&self, widget_id: i32) -> Option<String> {
        self.shown.lock().get(&widget_id).cloned()
    }

    /// (cache hits, cache misses)
    pub fn cache_stats(&self) -> (u64, u64) {
        self.cache.lock().stats()
    }
}

impl WidgetRefresher for RecordingWidgetHost {
    fn widget_ids(&self) -> Vec<i32> {
        self.ids.clone()
    }

    fn render(&self, widget_id: i32, view: &WidgetView, style: &WidgetStyleSettings) -> Result<()> {
        let signature = view.signature(style);
        let text = self
            .cache
            .lock()
            .get_or_render(&signature, || {
                let subtitle = match &view.subtitle {
                    Subtitle::Countdown(s) | Subtitle::Static(s) => s.clone(),
                    Subtitle::LiveSeconds { remaining_ms, unit } => {
                        format!("{} {}", remaining_ms / 1000, unit)
                    }
                };
                format!("{}\n{}", view.title, subtitle)
            })
            .clone();
        debug!("Widget {} rendered", widget_id);
        self.shown.lock().insert(widget_id, text);
        Ok(())
    }
}
