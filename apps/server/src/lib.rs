//! # Blocks Ping
//!
//! A small service wiring the blocks packages together: configuration from
//! an optional `ping.*` file plus `BLOCKS__*` variables, a [`Logx`] logger,
//! shutdown hooks and the JSON response envelopes.
//!
//! ## Example
//! ```no_run
//! use blocks_hooks::Hook;
//! use blocks_logger::default_logger;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cfg = blocks_ping::load_config("ping")?;
//!     let hooks = Hook::new(Duration::from_secs(10));
//!     blocks_ping::build(&cfg, default_logger(), hooks)?.run().await?;
//!     Ok(())
//! }
//! ```

mod router;

use blocks_config::{ConfigError, ConfigLoader};
use blocks_hooks::Hook;
use blocks_logger::{Logx, LogxConfig};
use blocks_server::{Server, ServerConfig, ServerError};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

pub use crate::router::{CATALOG_SIZE, Item, register};

/// Top-level configuration: `[server]` and `[logger]` tables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logger: LogxConfig,
}

/// Reads `path` when present, overlaid by `BLOCKS__*` environment variables.
///
/// # Errors
/// Returns [`ConfigError`] for malformed files or values.
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    ConfigLoader::new().file(path).required(false).load()
}

/// Builds the server with route printing enabled and every route registered.
///
/// # Errors
/// Returns [`ServerError`] for an invalid address or unusable TLS files.
pub fn build(cfg: &AppConfig, logger: Arc<dyn Logx>, hooks: Hook) -> Result<Server, ServerError> {
    let server = Server::builder()
        .config(cfg.server.clone())
        .print_routes(true)
        .logger(logger)
        .hooks(hooks)
        .build()?;
    Ok(register(server))
}

/// Registers a shutdown callback that flushes `logger`.
pub fn flush_on_shutdown(hooks: &Hook, logger: &Arc<dyn Logx>) {
    let logger = Arc::clone(logger);
    hooks.add(move |_ctx| async move { logger.flush() });
}
