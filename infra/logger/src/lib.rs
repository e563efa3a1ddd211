//! # Logger
//!
//! Two layers of logging for blocks-based services:
//!
//! * [`Logx`] is a small, object-safe facade (`debug`/`info`/`warn`/`error`,
//!   plus `fatal` and `with`) that application code and libraries log
//!   through. Backends are chosen at runtime with [`new_logger`]:
//!   [`StdLogger`] writes text or JSON lines to stdout, stderr, a rolling file
//!   or any writer; [`TracingLogger`] forwards into `tracing`;
//!   [`DiscardLogger`] drops everything.
//! * [`Logger::builder`] installs the process-wide `tracing` subscriber
//!   (console, optional non-blocking rolling files, `RUST_LOG` filtering).
//!
//! ## Example
//!
//! ```rust
//! use blocks_logger::{LogContext, Logx, StdLogger, BufferWriter, fields};
//!
//! let out = BufferWriter::new();
//! let log = StdLogger::builder().writer(out.clone()).build();
//! let auth = log.with(fields! { "component" => "auth" });
//!
//! auth.info(&LogContext::new().with_request_id("req-42"), "user signed in");
//! assert!(out.contents().contains("user signed in request_id=req-42 component=auth"));
//! ```

mod error;
mod factory;
mod logx;
mod std_logger;
mod subscriber;
mod tracing_logger;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use crate::factory::{
    LoggerKind, LogxConfig, OutputTarget, default_logger, discard_logger, json_logger, new_logger,
    tracing_logger,
};
pub use crate::logx::{DiscardLogger, Fields, Level, LogContext, Logx};
pub use crate::std_logger::{
    BufferWriter, Format, RotationConfig, RotationPeriod, StdLogger, StdLoggerBuilder,
};
pub use crate::subscriber::{Logger, LoggerBuilder, NoFile, NoName, WithFile, WithName};
pub use crate::tracing_logger::TracingLogger;
pub use tracing::level_filters::LevelFilter;

#[doc(hidden)]
pub mod __private {
    pub use serde_json::Value;
}
