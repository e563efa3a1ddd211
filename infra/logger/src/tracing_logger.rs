use std::io::Write;
use std::sync::Arc;

use crate::logx::{Fields, Level, LogContext, Logx};

/// Forwards events to the `tracing` dispatcher installed by
/// [`Logger::builder`](crate::Logger::builder) or by the host application.
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    fields: Fields,
}

impl TracingLogger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Logx for TracingLogger {
    fn log(&self, level: Level, ctx: &LogContext, message: &str) {
        let merged = ctx.merged_fields(&self.fields);
        let fields = if merged.is_empty() {
            None
        } else {
            serde_json::to_string(&merged).ok()
        };
        let request_id = ctx.request_id();
        let trace_id = ctx.trace_id();

        match level {
            Level::Debug => tracing::debug!(request_id, trace_id, fields, "{message}"),
            Level::Info => tracing::info!(request_id, trace_id, fields, "{message}"),
            Level::Warn => tracing::warn!(request_id, trace_id, fields, "{message}"),
            Level::Error => tracing::error!(request_id, trace_id, fields, "{message}"),
            Level::Fatal => tracing::error!(fatal = true, request_id, trace_id, fields, "{message}"),
        }
    }

    fn with(&self, fields: Fields) -> Arc<dyn Logx> {
        let mut merged = self.fields.clone();
        merged.extend(fields);
        Arc::new(Self { fields: merged })
    }

    /// Flushes stdout, where the console layer writes. File output drains
    /// when the [`Logger`](crate::Logger) handle is dropped.
    fn flush(&self) {
        let _ = std::io::stdout().flush();
    }
}
