//! Logging setup and configuration

use anyhow::{Context, Result};
use indexmap::IndexMap;
use once_cell::sync::{Lazy, OnceCell};
use serde_json::Value;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, filter::LevelFilter, layer::SubscriberExt, reload,
    util::SubscriberInitExt,
};

use crate::config::DEFAULT_LOG_LEVEL;
use crate::errors::{NanosError, NanosResult};

/// Target of every event a [`Logger`] emits. Its own name travels in the
/// `logger` field.
pub const LOGGER_TARGET: &str = "nanos::logger";

static LOGGER_LEVELS: Lazy<RwLock<LoggerLevels>> =
    Lazy::new(|| RwLock::new(LoggerLevels::default()));

/// Levels for [`Logger`] channels, looked up by logger name.
///
/// A name matches itself and every `::` path below it; the longest match
/// wins. Without a match the default applies, and without a default every
/// level passes on to the subscriber.
#[derive(Debug, Clone, Default)]
pub struct LoggerLevels {
    default: Option<LevelFilter>,
    overrides: IndexMap<String, LevelFilter>,
}

impl LoggerLevels {
    pub fn new(default: LevelFilter) -> Self {
        Self {
            default: Some(default),
            overrides: IndexMap::new(),
        }
    }

    pub fn set(&mut self, name: &str, level: LevelFilter) {
        self.overrides.insert(name.to_string(), level);
    }

    pub fn level_for(&self, name: &str) -> Option<LevelFilter> {
        self.overrides
            .iter()
            .filter(|(prefix, _)| {
                name == prefix.as_str()
                    || name
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with("::"))
            })
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, level)| *level)
            .or(self.default)
    }

    /// Most verbose level any logger may use.
    pub fn loudest(&self) -> Option<LevelFilter> {
        self.overrides.values().copied().chain(self.default).max()
    }
}

fn logger_enabled(name: &str, level: Level) -> bool {
    match LOGGER_LEVELS.read() {
        Ok(levels) => levels.level_for(name).is_none_or(|allowed| level <= allowed),
        Err(_) => true,
    }
}

fn publish_logger_levels(update: impl FnOnce(&mut LoggerLevels)) -> NanosResult<LoggerLevels> {
    let mut levels = LOGGER_LEVELS.write().map_err(|_| NanosError::Logging {
        message: "logger level table poisoned".to_string(),
    })?;
    update(&mut levels);
    Ok(levels.clone())
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    /// Level for every target without an override.
    pub level: LevelFilter,
    /// Append log lines to this file as well as the console.
    pub file: Option<PathBuf>,
    /// Per-target overrides, applied in order.
    pub targets: Vec<(String, LevelFilter)>,
    pub ansi: bool,
    /// Write the file as JSON lines instead of compact text.
    pub json_file: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL,
            file: None,
            targets: Vec::new(),
            ansi: true,
            json_file: false,
        }
    }
}

/// Keeps the file writer alive and allows changing levels at runtime.
pub struct LoggingGuard {
    filter: reload::Handle<EnvFilter, Registry>,
    default_level: LevelFilter,
    targets: Mutex<IndexMap<String, LevelFilter>>,
    _worker: Option<WorkerGuard>,
}

impl LoggingGuard {
    /// Set `level` for one or several names. A name is both a `tracing`
    /// target and a [`Logger`] name.
    pub fn set_level_for_logger(
        &self,
        names: impl Into<LoggerNames>,
        level: LevelFilter,
    ) -> NanosResult<()> {
        let names = names.into();
        let mut targets = self.targets.lock().map_err(|_| NanosError::Logging {
            message: "level table poisoned".to_string(),
        })?;
        for name in names.iter() {
            targets.insert(name.to_string(), level);
        }
        let loggers = publish_logger_levels(|levels| {
            for name in names.iter() {
                levels.set(name, level);
            }
        })?;

        let directives = logger_directives(self.default_level, &targets, &loggers);
        let filter = EnvFilter::try_new(&directives).map_err(|e| NanosError::Logging {
            message: format!("{}: {}", directives, e),
        })?;
        self.filter.reload(filter).map_err(|e| NanosError::Logging {
            message: format!("Failed to reload filter: {}", e),
        })?;
        tracing::debug!(filter = %directives, "log levels updated");
        Ok(())
    }

    /// The filter currently in force, as `EnvFilter` directives.
    pub fn current_filter(&self) -> String {
        let loggers = match LOGGER_LEVELS.read() {
            Ok(levels) => levels.clone(),
            Err(_) => LoggerLevels::new(self.default_level),
        };
        match self.targets.lock() {
            Ok(targets) => logger_directives(self.default_level, &targets, &loggers),
            Err(_) => self.default_level.to_string().to_lowercase(),
        }
    }
}

/// Install the global subscriber: stderr output, an optional append-only
/// file, and a filter that [`LoggingGuard::set_level_for_logger`] can change.
///
/// Fails if a global subscriber is already installed.
pub fn setup_logging(settings: &LoggingSettings) -> Result<Arc<LoggingGuard>> {
    let targets: IndexMap<String, LevelFilter> = settings.targets.iter().cloned().collect();
    let mut loggers = LoggerLevels::new(settings.level);
    for (name, level) in &targets {
        loggers.set(name, *level);
    }
    let directives = logger_directives(settings.level, &targets, &loggers);
    let (filter, handle) = reload::Layer::new(
        EnvFilter::try_new(&directives).with_context(|| format!("invalid filter {}", directives))?,
    );

    let (file_layer, worker) = match &settings.file {
        Some(path) => {
            let (writer, worker) = tracing_appender::non_blocking(open_log_file(path)?);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_thread_ids(false)
                .with_level(true)
                .with_ansi(false);
            let layer = if settings.json_file {
                layer.json().boxed()
            } else {
                layer.compact().boxed()
            };
            (Some(layer), Some(worker))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_ansi(settings.ansi)
                .with_level(true),
        )
        .with(file_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;
    publish_logger_levels(|levels| *levels = loggers)?;

    Ok(Arc::new(LoggingGuard {
        filter: handle,
        default_level: settings.level,
        targets: Mutex::new(targets),
        _worker: worker,
    }))
}

fn open_log_file(path: &Path) -> Result<RollingFileAppender> {
    let file_name = path
        .file_name()
        .with_context(|| format!("log file path has no file name: {}", path.display()))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(&directory)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

/// Render a default level and per-target overrides as `EnvFilter` directives,
/// e.g. `info,nanos::data=debug`.
pub fn filter_directives<'a, I>(default: LevelFilter, targets: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a LevelFilter)>,
{
    let mut directives = vec![default.to_string().to_lowercase()];
    for (target, level) in targets {
        directives.push(format!("{}={}", target, level.to_string().to_lowercase()));
    }
    directives.join(",")
}

/// Filter directives plus the [`LOGGER_TARGET`] ceiling. Loggers gate
/// themselves by name, so the filter only has to let their loudest level
/// through.
fn logger_directives(
    default: LevelFilter,
    targets: &IndexMap<String, LevelFilter>,
    loggers: &LoggerLevels,
) -> String {
    let mut directives = filter_directives(default, targets.iter());
    if let Some(loudest) = loggers.loudest().filter(|loudest| *loudest > default) {
        directives.push_str(&format!(
            ",{}={}",
            LOGGER_TARGET,
            loudest.to_string().to_lowercase()
        ));
    }
    directives
}

/// One logger name or an ordered list of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggerNames {
    One(String),
    Many(Vec<String>),
}

impl LoggerNames {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let names: &[String] = match self {
            LoggerNames::One(name) => std::slice::from_ref(name),
            LoggerNames::Many(names) => names,
        };
        names.iter().map(String::as_str)
    }
}

impl From<&str> for LoggerNames {
    fn from(name: &str) -> Self {
        LoggerNames::One(name.to_string())
    }
}

impl From<String> for LoggerNames {
    fn from(name: String) -> Self {
        LoggerNames::One(name)
    }
}

impl From<Vec<String>> for LoggerNames {
    fn from(names: Vec<String>) -> Self {
        LoggerNames::Many(names)
    }
}

impl From<Vec<&str>> for LoggerNames {
    fn from(names: Vec<&str>) -> Self {
        LoggerNames::Many(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for LoggerNames {
    fn from(names: &[&str]) -> Self {
        LoggerNames::Many(names.iter().map(|n| n.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for LoggerNames {
    fn from(names: [&str; N]) -> Self {
        LoggerNames::Many(names.iter().map(|n| n.to_string()).collect())
    }
}

impl TryFrom<&Value> for LoggerNames {
    type Error = NanosError;

    fn try_from(value: &Value) -> NanosResult<Self> {
        let mismatch = || NanosError::InvalidLoggerNames {
            found: value.to_string(),
        };
        match value {
            Value::String(name) => Ok(LoggerNames::One(name.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string).ok_or_else(mismatch))
                .collect::<NanosResult<Vec<_>>>()
                .map(LoggerNames::Many),
            _ => Err(mismatch()),
        }
    }
}

/// A named logging channel.
///
/// Events go to the [`LOGGER_TARGET`] target with the name in a `logger`
/// field. [`LoggingGuard::set_level_for_logger`] with this name (or a `::`
/// prefix of it) controls what the channel emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Logger {
    name: &'static str,
}

impl Logger {
    pub fn named(name: &'static str) -> Self {
        Self { name }
    }

    /// Logger named after `T`'s full path, e.g. `my_crate::jobs::Importer`.
    pub fn for_type<T: ?Sized>() -> Self {
        Self::named(std::any::type_name::<T>())
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn enabled(&self, level: Level) -> bool {
        logger_enabled(self.name, level)
    }

    pub fn trace(&self, message: impl Display) {
        if self.enabled(Level::TRACE) {
            tracing::trace!(target: LOGGER_TARGET, logger = self.name, "{}", message);
        }
    }

    pub fn debug(&self, message: impl Display) {
        if self.enabled(Level::DEBUG) {
            tracing::debug!(target: LOGGER_TARGET, logger = self.name, "{}", message);
        }
    }

    pub fn info(&self, message: impl Display) {
        if self.enabled(Level::INFO) {
            tracing::info!(target: LOGGER_TARGET, logger = self.name, "{}", message);
        }
    }

    pub fn warn(&self, message: impl Display) {
        if self.enabled(Level::WARN) {
            tracing::warn!(target: LOGGER_TARGET, logger = self.name, "{}", message);
        }
    }

    pub fn error(&self, message: impl Display) {
        if self.enabled(Level::ERROR) {
            tracing::error!(target: LOGGER_TARGET, logger = self.name, "{}", message);
        }
    }
}

/// Lazily built, per-instance [`Logger`]. Embed it as a field and implement
/// [`HasLogger`].
#[derive(Debug, Clone, Default)]
pub struct LoggerCell(OnceCell<Logger>);

impl LoggerCell {
    pub const fn new() -> Self {
        Self(OnceCell::new())
    }

    pub fn get_or_init<T: ?Sized>(&self) -> &Logger {
        self.0.get_or_init(Logger::for_type::<T>)
    }
}

/// Gives a type a memoized logger named after the concrete type.
pub trait HasLogger {
    fn logger_cell(&self) -> &LoggerCell;

    fn logger(&self) -> &Logger
    where
        Self: Sized,
    {
        self.logger_cell().get_or_init::<Self>()
    }
}
