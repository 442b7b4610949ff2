use super::GlobalConfig;
use core::fmt::Display;
use hashbrown::HashMap;
use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::PathBuf,
    sync::Arc,
};

/// Configuration for one logging channel of gantry, parameterized by a log level type.
///
/// Note that you can use multiple sinks at the same time.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(bound = "")]
pub struct LoggerConfig<L: LogLevel> {
    /// Path to the log file, if file logging is enabled.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Whether to append to the log file (true) or overwrite it (false). Defaults to true.
    ///
    /// ## Notes
    ///
    /// When two channels share a file, the first one registered decides.
    #[serde(default = "append_default")]
    pub append: bool,

    /// Whether to log to standard output.
    #[serde(default)]
    pub stdout: bool,

    /// Whether to log to standard error.
    #[serde(default)]
    pub stderr: bool,

    /// Optional crate-level logging configuration (e.g., warn, info, debug).
    #[serde(default)]
    pub log: Option<LogCrateLevel>,

    /// The log level for this channel, determining verbosity.
    #[serde(default)]
    pub level: L,
}

impl<L: LogLevel> LoggerConfig<L> {
    /// A configuration forwarding every message to the `log` crate at the given level.
    pub fn with_log_crate(level: LogCrateLevel) -> Self {
        Self {
            file: None,
            append: true,
            stdout: false,
            stderr: false,
            log: Some(level),
            level: L::default(),
        }
    }
}

impl<L: LogLevel> Default for LoggerConfig<L> {
    fn default() -> Self {
        Self {
            file: None,
            append: true,
            stdout: false,
            stderr: false,
            log: None,
            level: L::default(),
        }
    }
}

/// Log levels using the `log` crate.
#[derive(
    Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, Hash, PartialEq, Eq,
)]
pub enum LogCrateLevel {
    /// Logs warnings.
    #[serde(rename = "warn")]
    Warn,

    /// Logs informational messages.
    #[default]
    #[serde(rename = "info")]
    Info,

    /// Logs debugging messages.
    #[serde(rename = "debug")]
    Debug,

    /// Logs trace-level messages.
    #[serde(rename = "trace")]
    Trace,
}

fn append_default() -> bool {
    true
}

/// Trait for types that can be used as log levels in `LoggerConfig`.
pub trait LogLevel:
    serde::de::DeserializeOwned + serde::Serialize + Clone + Copy + core::fmt::Debug + Default
{
    /// Whether messages of the channel are emitted at all.
    fn is_enabled(&self) -> bool;
}

/// The sinks of the diagnostic and selection channels.
///
/// A sink shared by both channels (the same file, stream or `log` level) is opened once. All
/// methods take `&self`, so a logger can be shared behind an [Arc] and no lock is held while a
/// `log` backend runs.
#[derive(Debug, Default)]
pub struct Logger {
    sinks: Vec<Sink>,
    diagnostics: Vec<usize>,
    selection: Vec<usize>,
}

impl Logger {
    /// Creates a new `Logger` instance based on the global configuration.
    ///
    /// Note that creating a logger opens its files, keep it around instead of recreating it.
    pub fn new() -> Self {
        Self::from_config(GlobalConfig::get())
    }

    /// Creates a new `Logger` instance based on the provided configuration.
    pub fn from_config(config: Arc<GlobalConfig>) -> Self {
        let mut builder = SinkRegistry::default();

        let diagnostics = builder.channel(&config.diagnostics.logger);
        let selection = builder.channel(&config.accelerator.logger);

        Self {
            sinks: builder.sinks,
            diagnostics,
            selection,
        }
    }

    /// Logs a warning on every sink of the diagnostic channel.
    pub fn log_warning<S: Display>(&self, msg: &S) {
        self.write(&self.diagnostics, msg);
    }

    /// Logs an accelerator selection message on every sink of the selection channel.
    pub fn log_selection<S: Display>(&self, msg: &S) {
        self.write(&self.selection, msg);
    }

    fn write<S: Display>(&self, channel: &[usize], msg: &S) {
        match channel {
            [] => {}
            [index] => self.sinks[*index].write(msg),
            indices => {
                let msg = msg.to_string();
                for index in indices {
                    self.sinks[*index].write(&msg);
                }
            }
        }
    }
}

#[derive(Hash, PartialEq, Eq)]
enum SinkId {
    File(PathBuf),
    Stdout,
    Stderr,
    LogCrate(LogCrateLevel),
}

#[derive(Default)]
struct SinkRegistry {
    sinks: Vec<Sink>,
    ids: HashMap<SinkId, usize>,
}

impl SinkRegistry {
    // Indices of the sinks a channel writes to, empty when the channel is disabled.
    fn channel<L: LogLevel>(&mut self, config: &LoggerConfig<L>) -> Vec<usize> {
        let mut channel = Vec::new();
        if !config.level.is_enabled() {
            return channel;
        }

        if let Some(path) = &config.file {
            self.attach(&mut channel, SinkId::File(path.clone()), || {
                FileSink::open(path, config.append).map(|file| Sink::File(spin::Mutex::new(file)))
            });
        }
        if config.stdout {
            self.attach(&mut channel, SinkId::Stdout, || Some(Sink::Stdout));
        }
        if config.stderr {
            self.attach(&mut channel, SinkId::Stderr, || Some(Sink::Stderr));
        }
        if let Some(level) = config.log {
            self.attach(&mut channel, SinkId::LogCrate(level), || {
                Some(Sink::Log(level))
            });
        }

        channel
    }

    fn attach(&mut self, channel: &mut Vec<usize>, id: SinkId, open: impl FnOnce() -> Option<Sink>) {
        if let Some(index) = self.ids.get(&id) {
            channel.push(*index);
            return;
        }

        if let Some(sink) = open() {
            let index = self.sinks.len();
            self.sinks.push(sink);
            self.ids.insert(id, index);
            channel.push(index);
        }
    }
}

#[derive(Debug)]
enum Sink {
    File(spin::Mutex<FileSink>),
    Stdout,
    Stderr,
    Log(LogCrateLevel),
}

impl Sink {
    fn write<S: Display>(&self, msg: &S) {
        match self {
            Sink::File(file) => file.lock().write(msg),
            Sink::Stdout => println!("{msg}"),
            Sink::Stderr => eprintln!("{msg}"),
            Sink::Log(level) => match level {
                LogCrateLevel::Warn => log::warn!("{msg}"),
                LogCrateLevel::Info => log::info!("{msg}"),
                LogCrateLevel::Debug => log::debug!("{msg}"),
                LogCrateLevel::Trace => log::trace!("{msg}"),
            },
        }
    }
}

#[derive(Debug)]
struct FileSink {
    writer: BufWriter<File>,
}

impl FileSink {
    // Opens the log file, or returns `None` when it can't be opened.
    fn open(path: &PathBuf, append: bool) -> Option<Self> {
        let file = OpenOptions::new()
            .write(true)
            .append(append)
            .truncate(!append)
            .create(true)
            .open(path);

        match file {
            Ok(file) => Some(Self {
                writer: BufWriter::new(file),
            }),
            Err(err) => {
                log::warn!("Can't open log file {}: {err}", path.display());
                None
            }
        }
    }

    // Write failures are dropped, logging must never abort a run.
    fn write<S: Display>(&mut self, msg: &S) {
        let _ = writeln!(self.writer, "{msg}").and_then(|_| self.writer.flush());
    }
}
