//! Leveled logging for simulation subjects.
//!
//! Every subject (grid, vehicle, charge station) holds a [`Logger`]
//! capability with its own configured verbosity. A message reaches the sink
//! only if its level is at or below the subject's level in the total order
//! `None < Error < Warn < Info < All`.

use std::fmt;
use std::rc::Rc;

/// Verbosity levels, ordered from silent to chatty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Suppresses everything, including errors.
    None,
    Error,
    Warn,
    Info,
    All,
}

impl LogLevel {
    /// Returns `true` if a message at this level passes a subject
    /// configured at `subject_level`.
    ///
    /// `None` is never emitted; it exists only as a subject setting.
    pub fn enabled_under(self, subject_level: LogLevel) -> bool {
        self != LogLevel::None && self <= subject_level
    }

    /// Parses a lowercase level name as used in scenario files.
    pub fn from_name(name: &str) -> Option<LogLevel> {
        match name {
            "none" => Some(LogLevel::None),
            "error" => Some(LogLevel::Error),
            "warn" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "all" => Some(LogLevel::All),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::None => "NONE",
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::All => "ALL",
        };
        write!(f, "{name}")
    }
}

/// Destination for subject log output.
///
/// The provided [`emit`](LogSink::emit) applies the level gate and the
/// uniform `[SUBJECT (ID: XX) ~ LEVEL]: message` framing; implementors only
/// decide where a formatted line goes.
pub trait LogSink {
    /// Emits one message on behalf of a subject, applying the level gate.
    fn emit(
        &self,
        subject: &str,
        id: &str,
        message: &str,
        subject_level: LogLevel,
        message_level: LogLevel,
    ) {
        if message_level.enabled_under(subject_level) {
            self.write_line(&format!(
                "[{} (ID: {}) ~ {}]: {}",
                subject.to_uppercase(),
                id.to_uppercase(),
                message_level,
                message
            ));
        }
    }

    /// Writes one already-formatted line.
    fn write_line(&self, line: &str);
}

/// Sink that prints to stdout.
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn write_line(&self, line: &str) {
        println!("{line}");
    }
}

/// Per-subject logging capability: a shared sink plus the subject's name,
/// registry id, and configured verbosity.
#[derive(Clone)]
pub struct Logger {
    sink: Rc<dyn LogSink>,
    subject: String,
    id: String,
    level: LogLevel,
}

impl Logger {
    /// Creates a logger for one subject.
    pub fn new(
        sink: Rc<dyn LogSink>,
        subject: impl Into<String>,
        id: impl Into<String>,
        level: LogLevel,
    ) -> Self {
        Self {
            sink,
            subject: subject.into(),
            id: id.into(),
            level,
        }
    }

    /// Logs a message at the given level, subject to the level gate.
    pub fn log(&self, level: LogLevel, message: &str) {
        self.sink
            .emit(&self.subject, &self.id, message, self.level, level);
    }

    /// The subject's configured verbosity.
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Reconfigures the subject's verbosity.
    pub fn set_level(&mut self, level: LogLevel) {
        self.level = level;
    }

    /// A handle to the underlying sink, for deriving sibling loggers.
    pub fn sink(&self) -> Rc<dyn LogSink> {
        Rc::clone(&self.sink)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("subject", &self.subject)
            .field("id", &self.id)
            .field("level", &self.level)
            .finish()
    }
}
