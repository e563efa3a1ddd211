//! # Server
//!
//! A thin bootstrap around `axum` and `axum-server`.
//!
//! [`Server::builder`] collects the listen address, timeouts, logger, TLS
//! files and middleware toggles. The built [`Server`] records routes as they
//! are registered so they can be printed, then [`Server::run`] serves until
//! SIGINT/SIGTERM, drains in-flight requests within the stop timeout and runs
//! any [`blocks_hooks::Hook`] callbacks.
//!
//! Enabled by default: `x-request-id` assignment and propagation, real client
//! IP resolution ([`RealIp`]), panic recovery, a 60 s request timeout
//! answered with `504`, and `tower-http` tracing. CORS is enabled by listing
//! allowed origins.

mod config;
mod error;
mod extract;
mod middleware;
mod routes;
mod server;

pub use crate::config::{ServerConfig, TlsConfig};
pub use crate::error::{ServerError, ServerErrorExt};
pub use crate::extract::{RealIp, RequestId};
pub use crate::routes::RouteInfo;
pub use crate::server::{Server, ServerBuilder};
