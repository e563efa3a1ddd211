use serde::Deserialize;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ServerError;

pub(crate) const DEFAULT_ADDRESS: &str = ":4433";
pub(crate) const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(10);
pub(crate) const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Declarative server settings, typically the `[server]` table of a config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// `host:port`; a bare `:port` listens on all interfaces.
    pub address: String,
    pub stop_timeout_secs: u64,
    /// Per-request budget; `0` disables the timeout middleware.
    pub request_timeout_secs: u64,
    pub print_routes: bool,
    pub request_id: bool,
    pub real_ip: bool,
    pub recover: bool,
    pub trace: bool,
    /// Allowed CORS origins; empty disables CORS, `"*"` mirrors any origin.
    pub cors_origins: Vec<String>,
    pub tls: Option<TlsConfig>,
}

/// PEM certificate chain and private key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_owned(),
            stop_timeout_secs: DEFAULT_STOP_TIMEOUT.as_secs(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            print_routes: false,
            request_id: true,
            real_ip: true,
            recover: true,
            trace: true,
            cors_origins: Vec::new(),
            tls: None,
        }
    }
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

/// Resolves a listen address, accepting the `:port` shorthand.
pub(crate) fn parse_address(raw: &str) -> Result<SocketAddr, ServerError> {
    let raw = raw.trim();
    let candidate = if raw.starts_with(':') { format!("0.0.0.0{raw}") } else { raw.to_owned() };

    candidate
        .to_socket_addrs()
        .map_err(|e| ServerError::InvalidAddress {
            message: format!("'{raw}': {e}").into(),
            context: None,
        })?
        .next()
        .ok_or_else(|| ServerError::InvalidAddress {
            message: format!("'{raw}' did not resolve to any address").into(),
            context: None,
        })
}
