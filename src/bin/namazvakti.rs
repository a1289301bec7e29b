// Namaz Vaktim CLI - drive the scheduler against a preference snapshot
// Plans alarms, answers "what is next" and replays platform events so the
// behaviour of a phone install can be inspected from a terminal.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};
use namazvakti::app_state::AppState;
use namazvakti::dispatch::{AppRequest, SystemEvent};
use namazvakti::localization::Locale;
use namazvakti::notify::{self, DesktopNotifier, NotificationSink, RecordingSink};
use namazvakti::prefs::JsonFileStore;
use namazvakti::resolver::Resolution;
use namazvakti::scheduler::{AlarmKind, AlarmTable};
use namazvakti::silent_mode::MemoryRinger;
use namazvakti::widget::{self, RecordingWidgetHost};
use namazvakti::{config, config_file::Config, Collaborators, NamazVaktiCore};
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;

/// Prayer-time alarm planner for Namaz Vaktim preference snapshots
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Prayer-time alarm planner for Namaz Vaktim preference snapshots",
    long_about = "Reads the app's shared preferences (a flat JSON snapshot) and computes the
alarms, notifications and widget texts the phone would produce.

The snapshot path comes from, in order:
  --prefs, NAMAZVAKTI_PREFS, prefs_path in the config file

Configuration file:
  ~/.config/namazvakti/config.toml (Linux)
  ~/Library/Application Support/namazvakti/config.toml (macOS)

Use --now with an RFC 3339 timestamp to evaluate at a fixed instant, e.g.
  namazvakti --now 2026-03-13T10:00:00+03:00 plan"
)]
struct Args {
    /// Preference snapshot (overrides env and config file)
    #[arg(long, global = true)]
    prefs: Option<PathBuf>,

    /// Config file to use instead of the standard location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Widget locale: tr, en or ar (overrides config file)
    #[arg(long, global = true)]
    locale: Option<String>,

    /// Evaluate at this RFC 3339 instant instead of the local clock
    #[arg(long, global = true)]
    now: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scheduling pass and list the resulting alarm table
    Plan,
    /// Cancel every alarm code the app can own
    Cancel,
    /// Show the next prayer and the widget texts
    Next,
    /// Replay a platform event and show what it caused
    Event {
        #[arg(value_enum)]
        kind: EventKind,

        /// Write preference changes (theme, silent mode) back to the snapshot
        #[arg(long)]
        write: bool,
    },
    /// Plan, then fire the alarm registered under a request code
    Fire {
        code: i32,

        /// Receiver the code belongs to; codes repeat across kinds
        #[arg(long, value_enum, default_value_t = FireKind::Prayer)]
        kind: FireKind,

        /// Post the notification to the desktop instead of printing it
        #[arg(long)]
        desktop: bool,
    },
    /// List notification channels
    Channels,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum EventKind {
    Boot,
    TimeChanged,
    TimezoneChanged,
    DateChanged,
    UserPresent,
    ConfigChanged,
    UiModeChanged,
    DataUpdated,
    DataCleared,
    RefreshWidgets,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FireKind {
    Prayer,
    AutoDark,
    SilentMode,
    WidgetTick,
}

impl From<FireKind> for AlarmKind {
    fn from(kind: FireKind) -> Self {
        match kind {
            FireKind::Prayer => AlarmKind::Prayer,
            FireKind::AutoDark => AlarmKind::AutoDark,
            FireKind::SilentMode => AlarmKind::SilentMode,
            FireKind::WidgetTick => AlarmKind::WidgetTick,
        }
    }
}

impl EventKind {
    fn event(self) -> SystemEvent {
        match self {
            EventKind::Boot => SystemEvent::BootCompleted,
            EventKind::TimeChanged => SystemEvent::TimeChanged,
            EventKind::TimezoneChanged => SystemEvent::TimezoneChanged,
            EventKind::DateChanged => SystemEvent::DateChanged,
            EventKind::UserPresent => SystemEvent::UserPresent,
            EventKind::ConfigChanged => SystemEvent::ConfigurationChanged,
            EventKind::UiModeChanged => SystemEvent::UiModeChanged,
            EventKind::DataUpdated => SystemEvent::App(AppRequest::DataUpdated),
            EventKind::DataCleared => SystemEvent::App(AppRequest::DataCleared),
            EventKind::RefreshWidgets => SystemEvent::App(AppRequest::RefreshWidgets),
        }
    }
}

/// Everything a subcommand works with
struct Session {
    core: NamazVaktiCore,
    store: Arc<JsonFileStore>,
    alarms: Arc<AlarmTable>,
    notifications: Arc<RecordingSink>,
    widgets: Arc<RecordingWidgetHost>,
    config: Config,
}

fn load_config(args: &Args) -> Result<Config> {
    match &args.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load_or_default(),
    }
}

fn open_session(args: &Args, notifier: Option<Arc<dyn NotificationSink>>) -> Result<Session> {
    let config = load_config(args).context("Failed to load configuration")?;

    // Precedence: CLI > env > config file
    let prefs_path = args
        .prefs
        .clone()
        .or_else(config::parse_prefs_path)
        .or_else(|| config.prefs_path.clone())
        .context("No preference snapshot given (use --prefs, NAMAZVAKTI_PREFS or prefs_path)")?;

    let locale = match args.locale.as_deref().or(config.locale.as_deref()) {
        Some(code @ ("tr" | "en" | "ar")) => Some(Locale::from_code(code)),
        Some(code) => anyhow::bail!("Unsupported locale '{}' (expected tr, en or ar)", code),
        None => None,
    };

    let debounce_ms = config::parse_debounce_ms().unwrap_or(config.debounce_ms);

    info!("Using preference snapshot: {}", prefs_path.display());
    let store = Arc::new(JsonFileStore::open(&prefs_path)?);
    let alarms = Arc::new(AlarmTable::with_exact_permission(config.exact_alarms));
    let notifications = Arc::new(RecordingSink::new());
    let widgets = Arc::new(RecordingWidgetHost::new(config.widget_ids.clone()));

    let io = Collaborators {
        store: store.clone(),
        alarms: alarms.clone(),
        notifier: notifier.unwrap_or_else(|| notifications.clone() as Arc<dyn NotificationSink>),
        widgets: widgets.clone(),
        ringer: Arc::new(MemoryRinger::default()),
    };

    let mut core = NamazVaktiCore::new(io, AppState::with_debounce_ms(debounce_ms));
    core.set_locale(locale);

    Ok(Session {
        core,
        store,
        alarms,
        notifications,
        widgets,
        config,
    })
}

fn format_epoch<Tz>(tz: &Tz, epoch_millis: i64) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match tz.timestamp_millis_opt(epoch_millis).single() {
        Some(at) => at.format("%Y-%m-%d %H:%M:%S %z").to_string(),
        None => format!("@{}", epoch_millis),
    }
}

fn print_alarm_table<Tz>(session: &Session, now: &DateTime<Tz>)
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let entries = session.alarms.entries();
    if entries.is_empty() {
        println!("No alarms registered");
        return;
    }
    println!(
        "{:<10}  {:>6}  {:<26}  {:<8}  TARGET",
        "KIND", "CODE", "TRIGGER", "MODE"
    );
    for entry in entries {
        println!(
            "{:<10}  {:>6}  {:<26}  {:<8}  {:?}",
            format!("{:?}", entry.alarm.kind()),
            entry.alarm.request_code,
            format_epoch(&now.timezone(), entry.alarm.trigger_epoch_millis),
            format!("{:?}", entry.precision),
            entry.alarm.target
        );
    }
}

fn print_widgets(session: &Session) {
    for id in &session.config.widget_ids {
        if let Some(text) = session.widgets.shown(*id) {
            println!("widget {}: {}", id, text.replace('\n', " | "));
        }
    }
}

fn run<Tz>(args: &Args, now: DateTime<Tz>) -> Result<()>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    info!("Evaluating at {}", now.format("%Y-%m-%d %H:%M:%S %z"));

    match &args.command {
        Command::Plan => {
            let session = open_session(args, None)?;
            let report = session
                .core
                .schedule_all(&now)
                .context("Scheduling pass failed")?;
            println!("{}", report.summary());
            print_alarm_table(&session, &now);
        }
        Command::Cancel => {
            let session = open_session(args, None)?;
            let codes = session.core.cancel_all();
            println!("Cancelled {} codes", codes.len());
        }
        Command::Next => {
            let session = open_session(args, None)?;
            match session.core.next_prayer(&now) {
                Resolution::Computed { id, at, remaining } => println!(
                    "{} at {} (in {} min)",
                    id,
                    at.format("%H:%M"),
                    remaining.num_minutes()
                ),
                Resolution::Direct { name, remaining } => println!(
                    "{} (in {} min, app-provided)",
                    name.as_deref().unwrap_or("?"),
                    remaining.num_minutes()
                ),
                Resolution::Cached { name, countdown } => {
                    println!("{} {} (cached)", name, countdown)
                }
                Resolution::Unknown => println!("No prayer times available"),
            }
            let view = widget::build_widget_view(session.core.store(), &now, None);
            println!("{}", view.title);
            println!("{:?}", view.subtitle);
        }
        Command::Event { kind, write } => {
            let session = open_session(args, None)?;
            let actions = session.core.handle(&kind.event(), &now);
            for action in &actions {
                println!("{:?}", action);
            }
            print_alarm_table(&session, &now);
            print_widgets(&session);
            if *write {
                session.store.flush()?;
                info!("Preference changes written to {}", session.store.path().display());
            }
        }
        Command::Fire {
            code,
            kind,
            desktop,
        } => {
            let notifier: Option<Arc<dyn NotificationSink>> = if *desktop {
                Some(Arc::new(DesktopNotifier::default()))
            } else {
                None
            };
            let session = open_session(args, notifier)?;
            session.core.schedule_all(&now);
            let kind = AlarmKind::from(*kind);
            let entry = session
                .alarms
                .get(kind, *code)
                .with_context(|| format!("No {:?} alarm registered under code {}", kind, code))?;
            session
                .core
                .handle(&SystemEvent::AlarmFired(entry.alarm), &now);
            for shown in session.notifications.shown() {
                println!("[{}] {}: {}", shown.channel_id, shown.title, shown.body);
            }
            print_widgets(&session);
        }
        Command::Channels => {
            for spec in notify::channel_specs() {
                println!(
                    "{:<32} {:<28} sound={} silent={}",
                    spec.id,
                    spec.name,
                    spec.sound.as_deref().unwrap_or("default"),
                    spec.silent
                );
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();

    let result = match args.now.as_deref() {
        Some(raw) => {
            let now = DateTime::parse_from_rfc3339(raw)
                .with_context(|| format!("Invalid --now timestamp: {}", raw))?;
            run(&args, now)
        }
        None => run(&args, Local::now()),
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}
