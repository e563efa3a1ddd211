use parking_lot::Mutex;
use serde::Deserialize;
use std::fmt::{self, Write as _};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use crate::error::LoggerError;
use crate::logx::{Fields, Level, LogContext, Logx};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";
const TIMESTAMP_KEY: &str = "timestamp";
const RESERVED_KEYS: [&str; 5] = [TIMESTAMP_KEY, "level", "message", "request_id", "trace_id"];

/// Line format of the writer-based backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Text,
    Json,
}

/// Rotation period for file output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationPeriod {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

impl From<RotationPeriod> for Rotation {
    fn from(period: RotationPeriod) -> Self {
        match period {
            RotationPeriod::Minutely => Self::MINUTELY,
            RotationPeriod::Hourly => Self::HOURLY,
            RotationPeriod::Daily => Self::DAILY,
            RotationPeriod::Never => Self::NEVER,
        }
    }
}

/// File rotation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    pub rotation: RotationPeriod,
    /// Number of rotated files to keep.
    pub max_files: usize,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self { rotation: RotationPeriod::Daily, max_files: 3 }
    }
}

/// In-memory sink, mostly useful for asserting on log output in tests.
#[derive(Debug, Clone, Default)]
pub struct BufferWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl BufferWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }

    /// Written lines, without trailing newlines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }
}

impl Write for BufferWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct Sink {
    writer: Mutex<Box<dyn Write + Send>>,
    format: Format,
    prefix: String,
    min_level: Level,
}

/// Writer-backed logger emitting text or JSON lines.
///
/// Children created through [`Logx::with`] share the same sink.
#[derive(Clone)]
pub struct StdLogger {
    sink: Arc<Sink>,
    fields: Fields,
}

impl fmt::Debug for StdLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdLogger")
            .field("format", &self.sink.format)
            .field("prefix", &self.sink.prefix)
            .field("min_level", &self.sink.min_level)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

impl StdLogger {
    /// Returns a builder writing text lines to stdout.
    #[must_use]
    pub fn builder() -> StdLoggerBuilder {
        StdLoggerBuilder::default()
    }

    fn render(&self, level: Level, ctx: &LogContext, message: &str) -> String {
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        let fields = ctx.merged_fields(&self.fields);
        match self.sink.format {
            Format::Text => render_text(&timestamp, level, &self.sink.prefix, ctx, message, &fields),
            Format::Json => render_json(&timestamp, level, &self.sink.prefix, ctx, message, &fields),
        }
    }
}

impl Logx for StdLogger {
    fn log(&self, level: Level, ctx: &LogContext, message: &str) {
        if level < self.sink.min_level {
            return;
        }
        let line = self.render(level, ctx, message);
        let mut writer = self.sink.writer.lock();
        let _ = writer.write_all(line.as_bytes());
        if level == Level::Fatal {
            let _ = writer.flush();
        }
    }

    fn with(&self, fields: Fields) -> Arc<dyn Logx> {
        let mut merged = self.fields.clone();
        merged.extend(fields);
        Arc::new(Self { sink: Arc::clone(&self.sink), fields: merged })
    }

    fn flush(&self) {
        let _ = self.sink.writer.lock().flush();
    }
}

/// Builder for [`StdLogger`].
#[must_use = "builders do nothing unless you call .build()"]
pub struct StdLoggerBuilder {
    writer: Box<dyn Write + Send>,
    format: Format,
    prefix: String,
    min_level: Level,
    fields: Fields,
}

impl Default for StdLoggerBuilder {
    fn default() -> Self {
        Self {
            writer: Box::new(io::stdout()),
            format: Format::Text,
            prefix: String::new(),
            min_level: Level::Debug,
            fields: Fields::new(),
        }
    }
}

impl fmt::Debug for StdLoggerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdLoggerBuilder")
            .field("format", &self.format)
            .field("prefix", &self.prefix)
            .field("min_level", &self.min_level)
            .finish_non_exhaustive()
    }
}

impl StdLoggerBuilder {
    pub const fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Text prepended to every message.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Events below `level` are dropped.
    pub const fn level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    pub fn fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    pub fn stdout(self) -> Self {
        self.writer(io::stdout())
    }

    pub fn stderr(self) -> Self {
        self.writer(io::stderr())
    }

    pub fn writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.writer = Box::new(writer);
        self
    }

    /// Writes to a rolling file. `path` names the active file; its stem and
    /// extension become the rotated files' prefix and suffix.
    ///
    /// # Errors
    /// Returns [`LoggerError::InvalidConfiguration`] for a path without a file
    /// name or `max_files == 0`, and [`LoggerError::Appender`] when the
    /// appender cannot be created.
    pub fn file(self, path: impl AsRef<Path>, rotation: RotationConfig) -> Result<Self, LoggerError> {
        let path = path.as_ref();
        if rotation.max_files == 0 {
            return Err(LoggerError::InvalidConfiguration {
                message: "max_files must be greater than zero".into(),
                context: None,
            });
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            return Err(LoggerError::InvalidConfiguration {
                message: format!("log path '{}' has no file name", path.display()).into(),
                context: None,
            });
        };
        let suffix = path.extension().and_then(|s| s.to_str()).unwrap_or("log");
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));

        let appender = RollingFileAppender::builder()
            .rotation(rotation.rotation.into())
            .filename_prefix(stem)
            .filename_suffix(suffix)
            .max_log_files(rotation.max_files)
            .build(dir)?;

        Ok(self.writer(appender))
    }

    #[must_use]
    pub fn build(self) -> StdLogger {
        StdLogger {
            sink: Arc::new(Sink {
                writer: Mutex::new(self.writer),
                format: self.format,
                prefix: self.prefix,
                min_level: self.min_level,
            }),
            fields: self.fields,
        }
    }
}

fn render_text(
    timestamp: &str,
    level: Level,
    prefix: &str,
    ctx: &LogContext,
    message: &str,
    fields: &Fields,
) -> String {
    let mut line = format!("{timestamp} [{level}] {prefix}{message}");
    if let Some(id) = ctx.request_id() {
        let _ = write!(line, " request_id={id}");
    }
    if let Some(id) = ctx.trace_id() {
        let _ = write!(line, " trace_id={id}");
    }
    for (key, value) in fields {
        match value {
            serde_json::Value::String(s) => {
                let _ = write!(line, " {key}={s}");
            },
            other => {
                let _ = write!(line, " {key}={other}");
            },
        }
    }
    line.push('\n');
    line
}

fn render_json(
    timestamp: &str,
    level: Level,
    prefix: &str,
    ctx: &LogContext,
    message: &str,
    fields: &Fields,
) -> String {
    let mut entry = serde_json::Map::new();
    entry.insert(TIMESTAMP_KEY.to_owned(), timestamp.into());
    entry.insert("level".to_owned(), level.as_lower_str().into());
    entry.insert("message".to_owned(), format!("{prefix}{message}").into());
    if let Some(id) = ctx.request_id() {
        entry.insert("request_id".to_owned(), id.into());
    }
    if let Some(id) = ctx.trace_id() {
        entry.insert("trace_id".to_owned(), id.into());
    }
    for (key, value) in fields {
        let key = if RESERVED_KEYS.contains(&key.as_str()) { format!("fields.{key}") } else { key.clone() };
        entry.insert(key, value.clone());
    }

    let mut line = serde_json::Value::Object(entry).to_string();
    line.push('\n');
    line
}
