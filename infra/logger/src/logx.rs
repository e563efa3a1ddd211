use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::LoggerError;

/// Structured key/value pairs attached to a log line.
///
/// A `BTreeMap` keeps emitted keys in a stable order.
pub type Fields = BTreeMap<String, serde_json::Value>;

/// Severity of a log event, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl Level {
    /// Upper-case label used by the text format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        }
    }

    /// Lower-case label used by the JSON format.
    #[must_use]
    pub const fn as_lower_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "fatal" => Ok(Self::Fatal),
            other => Err(LoggerError::InvalidConfiguration {
                message: format!("unknown log level '{other}'").into(),
                context: None,
            }),
        }
    }
}

/// Per-call context: request correlation ids plus ad-hoc fields.
///
/// Context fields take precedence over the fields bound to a logger with
/// [`Logx::with`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogContext {
    request_id: Option<String>,
    trace_id: Option<String>,
    fields: Fields,
}

impl LogContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    #[must_use]
    pub const fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Merges `base` (logger-bound fields) with this context's fields.
    #[must_use]
    pub fn merged_fields(&self, base: &Fields) -> Fields {
        let mut merged = base.clone();
        merged.extend(self.fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}

/// The uniform logging interface every backend implements.
///
/// Implementations must be cheap to share; loggers are handed around as
/// `Arc<dyn Logx>`.
pub trait Logx: Send + Sync + fmt::Debug {
    /// Emits one event.
    fn log(&self, level: Level, ctx: &LogContext, message: &str);

    /// Returns a child logger that always includes `fields`.
    ///
    /// Keys in `fields` replace keys already bound on `self`. The receiver is
    /// left untouched.
    fn with(&self, fields: Fields) -> Arc<dyn Logx>;

    /// Writes out anything the backend still buffers. Backends without a
    /// buffer keep the default no-op.
    fn flush(&self) {}

    fn debug(&self, ctx: &LogContext, message: &str) {
        self.log(Level::Debug, ctx, message);
    }

    fn info(&self, ctx: &LogContext, message: &str) {
        self.log(Level::Info, ctx, message);
    }

    fn warn(&self, ctx: &LogContext, message: &str) {
        self.log(Level::Warn, ctx, message);
    }

    fn error(&self, ctx: &LogContext, message: &str) {
        self.log(Level::Error, ctx, message);
    }

    /// Logs at [`Level::Fatal`] and terminates the process with exit code 1.
    fn fatal(&self, ctx: &LogContext, message: &str) -> ! {
        self.log(Level::Fatal, ctx, message);
        std::process::exit(1)
    }
}

/// A logger that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardLogger;

impl Logx for DiscardLogger {
    fn log(&self, _level: Level, _ctx: &LogContext, _message: &str) {}

    fn with(&self, _fields: Fields) -> Arc<dyn Logx> {
        Arc::new(Self)
    }
}

/// Builds a [`Fields`] map from `key => value` pairs.
///
/// ```rust
/// let fields = blocks_logger::fields! { "user" => "ann", "attempt" => 3 };
/// assert_eq!(fields.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    () => { $crate::Fields::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::Fields::new();
        $( fields.insert(::std::string::String::from($key), $crate::__private::Value::from($value)); )+
        fields
    }};
}
