use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{LoggerError, LoggerErrorExt};
use crate::logx::{DiscardLogger, Level, Logx};
use crate::std_logger::{Format, RotationConfig, StdLogger};
use crate::tracing_logger::TracingLogger;

/// Which backend [`new_logger`] builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggerKind {
    /// Plain writer backend ([`StdLogger`]).
    #[default]
    Std,
    /// Bridges into the global `tracing` subscriber.
    Tracing,
    Discard,
}

/// Where the [`LoggerKind::Std`] backend writes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputTarget {
    #[default]
    Stdout,
    Stderr,
    File(PathBuf),
}

/// Declarative logger settings, usually loaded from configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogxConfig {
    pub kind: LoggerKind,
    pub format: Format,
    pub output: OutputTarget,
    pub prefix: String,
    pub level: Level,
    pub rotation: RotationConfig,
}

/// Builds a logger from `config`.
///
/// # Errors
/// Returns a [`LoggerError`] when file output cannot be prepared.
pub fn new_logger(config: &LogxConfig) -> Result<Arc<dyn Logx>, LoggerError> {
    match config.kind {
        LoggerKind::Discard => Ok(Arc::new(DiscardLogger)),
        LoggerKind::Tracing => Ok(Arc::new(TracingLogger::new())),
        LoggerKind::Std => {
            let builder = StdLogger::builder()
                .format(config.format)
                .prefix(config.prefix.clone())
                .level(config.level);
            let builder = match &config.output {
                OutputTarget::Stdout => builder.stdout(),
                OutputTarget::Stderr => builder.stderr(),
                OutputTarget::File(path) => {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent)
                            .context(format!("creating log directory {}", parent.display()))?;
                    }
                    builder.file(path, config.rotation)?
                },
            };
            Ok(Arc::new(builder.build()))
        },
    }
}

/// Text lines on stdout.
#[must_use]
pub fn default_logger() -> Arc<dyn Logx> {
    Arc::new(StdLogger::builder().build())
}

/// JSON lines on stdout.
#[must_use]
pub fn json_logger() -> Arc<dyn Logx> {
    Arc::new(StdLogger::builder().format(Format::Json).build())
}

#[must_use]
pub fn tracing_logger() -> Arc<dyn Logx> {
    Arc::new(TracingLogger::new())
}

#[must_use]
pub fn discard_logger() -> Arc<dyn Logx> {
    Arc::new(DiscardLogger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logx::LogContext;

    #[test]
    fn config_deserializes_with_defaults() {
        let cfg: LogxConfig = serde_json::from_str(r#"{"format":"json","level":"warn"}"#).unwrap();
        assert_eq!(cfg.kind, LoggerKind::Std);
        assert_eq!(cfg.format, Format::Json);
        assert_eq!(cfg.output, OutputTarget::Stdout);
        assert_eq!(cfg.level, Level::Warn);
        assert_eq!(cfg.rotation.max_files, 3);
    }

    #[test]
    fn file_output_is_parsed_from_config() {
        let cfg: LogxConfig = serde_json::from_str(r#"{"output":{"file":"logs/app.log"}}"#).unwrap();
        assert_eq!(cfg.output, OutputTarget::File(PathBuf::from("logs/app.log")));
    }

    #[test]
    fn factory_creates_file_logger_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("svc.log");
        let cfg = LogxConfig { output: OutputTarget::File(path), ..LogxConfig::default() };

        let logger = new_logger(&cfg).unwrap();
        logger.info(&LogContext::new(), "to disk");

        let written = std::fs::read_dir(dir.path().join("nested"))
            .unwrap()
            .flatten()
            .any(|entry| entry.file_name().to_string_lossy().starts_with("svc"));
        assert!(written, "a rotated svc.* file should exist");
    }

    #[test]
    fn discard_kind_never_fails() {
        let cfg = LogxConfig { kind: LoggerKind::Discard, ..LogxConfig::default() };
        let logger = new_logger(&cfg).unwrap();
        logger.error(&LogContext::new(), "ignored");
        let _child = logger.with(crate::fields! { "a" => 1 });
    }
}
