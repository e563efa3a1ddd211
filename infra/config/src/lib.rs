//! # Config
//!
//! Layered configuration: an optional (or required) file overlaid by
//! environment variables, deserialized into any `serde` type.
//!
//! Environment variables use a prefix and `__` as separator, so with the
//! default prefix `BLOCKS__SERVER__ADDRESS=:8080` maps to `server.address`.
//! The file format follows its extension (`.toml`, `.yaml`, `.json`, ...);
//! a path without extension is probed for each supported format.

use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment prefix applied when none is configured.
pub const DEFAULT_ENV_PREFIX: &str = "BLOCKS";

#[blocks_derive::blocks_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Builder for a layered configuration source.
///
/// ```rust
/// use blocks_config::ConfigLoader;
///
/// #[derive(Debug, Default, serde::Deserialize)]
/// #[serde(default)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = ConfigLoader::new().file("does-not-exist").required(false).load().unwrap();
/// assert_eq!(cfg.port, 0);
/// ```
#[derive(Debug, Clone)]
#[must_use = "call .load() to read the configuration"]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    required: bool,
    env_prefix: String,
    env_vars: Option<HashMap<String, String>>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self { file: None, required: true, env_prefix: DEFAULT_ENV_PREFIX.to_owned(), env_vars: None }
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Whether a missing file is an error. Defaults to `true`.
    pub const fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Reads environment overrides from `vars` instead of the process
    /// environment.
    pub fn env_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.env_vars = Some(vars);
        self
    }

    /// Reads every source and deserializes the merged result.
    ///
    /// # Errors
    /// Returns [`ConfigError::Config`] when a required file is missing, a
    /// source cannot be parsed, or the merged values do not fit `T`.
    pub fn load<T: DeserializeOwned>(self) -> Result<T, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = &self.file {
            info!(path = %path.display(), required = self.required, "loading configuration");
            builder = builder.add_source(File::from(path.as_path()).required(self.required));
        }

        builder = builder.add_source(
            Environment::with_prefix(&self.env_prefix)
                .separator("__")
                .convert_case(config::Case::Snake)
                .try_parsing(true)
                .source(self.env_vars.clone()),
        );

        let origin = self
            .file
            .as_ref()
            .map_or_else(|| "environment".to_owned(), |path| path.display().to_string());

        builder
            .build()
            .context(format!("reading {origin}"))?
            .try_deserialize::<T>()
            .context(format!("deserializing {origin}"))
    }
}

/// Loads `path` (required) overlaid by `BLOCKS__*` environment variables.
///
/// # Errors
/// See [`ConfigLoader::load`].
pub fn load_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    ConfigLoader::new().file(path).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Sample {
        name: String,
        port: u16,
        nested: Nested,
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Nested {
        enabled: bool,
    }

    #[test]
    fn reads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.toml");
        fs::write(&path, "name = \"svc\"\nport = 8080\n[nested]\nenabled = true\n").unwrap();

        let cfg: Sample = load_config(&path).unwrap();
        assert_eq!(cfg, Sample { name: "svc".to_owned(), port: 8080, nested: Nested { enabled: true } });
    }

    #[test]
    fn missing_required_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = load_config::<Sample>(&path).unwrap_err();
        assert!(err.to_string().starts_with("Config error (reading "), "{err}");
        assert!(err.to_string().contains("absent.toml"), "{err}");
    }

    #[test]
    fn optional_missing_file_yields_defaults() {
        let cfg: Sample =
            ConfigLoader::new().file("/nonexistent/app.toml").required(false).load().unwrap();
        assert_eq!(cfg, Sample::default());
    }

    #[test]
    fn environment_overrides_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("svc.toml");
        fs::write(&path, "name = \"svc\"\nport = 8080\n").unwrap();
        let env = HashMap::from([
            ("APP__PORT".to_owned(), "9000".to_owned()),
            ("APP__NESTED__ENABLED".to_owned(), "true".to_owned()),
        ]);

        let cfg: Sample = ConfigLoader::new().file(&path).env_prefix("APP").env_vars(env).load().unwrap();
        assert_eq!(cfg.name, "svc");
        assert_eq!(cfg.port, 9000);
        assert!(cfg.nested.enabled);
    }

    #[test]
    fn type_mismatch_reports_deserialization_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "port = \"not-a-number\"\n").unwrap();

        let err = load_config::<Sample>(&path).unwrap_err();
        assert!(err.to_string().contains("deserializing "), "{err}");
        assert!(err.to_string().contains("bad.toml"), "{err}");
    }
}
