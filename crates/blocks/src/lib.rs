//! Facade for the blocks packages.
//!
//! Every package is re-exported as a module behind a Cargo feature of the
//! same name; `full` enables all of them. Keep this crate thin: it composes
//! the packages and adds no behavior of its own.
//!
//! ```toml
//! blocks = { version = "0.1", features = ["server", "response"] }
//! ```

#[cfg(feature = "config")]
pub use blocks_config as config;
#[cfg(feature = "derive")]
pub use blocks_derive as derive;
#[cfg(feature = "hooks")]
pub use blocks_hooks as hooks;
#[cfg(feature = "jwt")]
pub use blocks_jwt as jwt;
#[cfg(feature = "logger")]
pub use blocks_logger as logger;
#[cfg(feature = "password")]
pub use blocks_password as password;
#[cfg(feature = "redis")]
pub use blocks_redis as redis;
#[cfg(feature = "response")]
pub use blocks_response as response;
#[cfg(feature = "server")]
pub use blocks_server as server;
#[cfg(feature = "strings")]
pub use blocks_strings as strings;

/// Packages compiled into this build, by feature name.
pub const ENABLED: &[&str] = &[
    #[cfg(feature = "config")]
    "config",
    #[cfg(feature = "derive")]
    "derive",
    #[cfg(feature = "hooks")]
    "hooks",
    #[cfg(feature = "jwt")]
    "jwt",
    #[cfg(feature = "logger")]
    "logger",
    #[cfg(feature = "password")]
    "password",
    #[cfg(feature = "redis")]
    "redis",
    #[cfg(feature = "response")]
    "response",
    #[cfg(feature = "server")]
    "server",
    #[cfg(feature = "strings")]
    "strings",
    #[cfg(feature = "tls")]
    "tls",
];

#[must_use]
pub fn is_enabled(name: &str) -> bool {
    ENABLED.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_pulls_in_its_dependencies() {
        if is_enabled("server") {
            assert!(is_enabled("logger"));
            assert!(is_enabled("hooks"));
        }
    }

    #[test]
    fn unknown_names_are_disabled() {
        assert!(!is_enabled("graphql"));
    }

    #[cfg(feature = "strings")]
    #[test]
    fn strings_module_is_reachable() {
        assert_eq!(crate::strings::snake_case("Hello World"), "hello_world");
    }
}
