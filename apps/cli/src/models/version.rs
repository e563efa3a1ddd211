use serde::Serialize;
use std::fmt;

/// Build information baked in at compile time.
///
/// `BLOCKS_GIT_COMMIT` and `BLOCKS_BUILT_AT` are read from the build
/// environment when set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub version: String,
    pub commit: String,
    pub built_at: String,
    pub platform: String,
}

impl BuildInfo {
    #[must_use]
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_owned(),
            commit: option_env!("BLOCKS_GIT_COMMIT").unwrap_or("none").to_owned(),
            built_at: option_env!("BLOCKS_BUILT_AT").unwrap_or("unknown").to_owned(),
            platform: format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH),
        }
    }

    /// Development builds carry an empty version or a `-dev` suffix.
    #[must_use]
    pub fn is_dev(&self) -> bool {
        self.version.is_empty() || self.version.ends_with("-dev")
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "blocks {}", self.version)?;
        writeln!(f, "  commit:   {}", self.commit)?;
        writeln!(f, "  built at: {}", self.built_at)?;
        write!(f, "  platform: {}", self.platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_keys_are_camel_case() {
        let json = serde_json::to_value(BuildInfo::current()).unwrap();
        assert!(json.get("builtAt").is_some());
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn dev_versions() {
        let mut info = BuildInfo::current();
        info.version = "1.2.0-dev".to_owned();
        assert!(info.is_dev());
        info.version = String::new();
        assert!(info.is_dev());
        info.version = "1.2.0".to_owned();
        assert!(!info.is_dev());
    }
}
