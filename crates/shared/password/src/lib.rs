//! # Password
//!
//! bcrypt hashing with a per-hash random salt.
//!
//! ```rust
//! let hash = blocks_password::hash_with_cost("correct horse", 4)?;
//! assert!(blocks_password::compare_passwords(&hash, "correct horse"));
//! assert!(!blocks_password::compare_passwords(&hash, "battery staple"));
//! # Ok::<(), blocks_password::PasswordError>(())
//! ```

use std::borrow::Cow;

pub use bcrypt::DEFAULT_COST;

#[blocks_derive::blocks_error]
pub enum PasswordError {
    #[error("Bcrypt error{}: {source}", format_context(.context))]
    Bcrypt { source: bcrypt::BcryptError, context: Option<Cow<'static, str>> },
}

/// Hashes `password` with [`DEFAULT_COST`].
///
/// # Errors
/// [`PasswordError::Bcrypt`] if hashing fails.
pub fn hash_and_salt(password: &str) -> Result<String, PasswordError> {
    hash_with_cost(password, DEFAULT_COST)
}

/// Hashes `password` with an explicit work factor.
///
/// # Errors
/// [`PasswordError::Bcrypt`] when `cost` is outside `4..=31`.
pub fn hash_with_cost(password: &str, cost: u32) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// `true` when `plain` matches `hashed`. A malformed hash never matches.
#[must_use]
pub fn compare_passwords(hashed: &str, plain: &str) -> bool {
    bcrypt::verify(plain, hashed).unwrap_or_else(|err| {
        tracing::debug!("password hash rejected: {err}");
        false
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_salted() {
        let a = hash_with_cost("secret", 4).unwrap();
        let b = hash_with_cost("secret", 4).unwrap();
        assert_ne!(a, b);
        assert!(compare_passwords(&a, "secret"));
        assert!(compare_passwords(&b, "secret"));
    }

    #[test]
    fn default_cost_hash_verifies() {
        let hash = hash_and_salt("pa55word").unwrap();
        assert!(hash.starts_with("$2b$12$"));
        assert!(compare_passwords(&hash, "pa55word"));
        assert!(!compare_passwords(&hash, "Pa55word"));
    }

    #[test]
    fn cost_out_of_range_is_an_error() {
        assert!(matches!(hash_with_cost("x", 3), Err(PasswordError::Bcrypt { .. })));
        assert!(matches!(hash_with_cost("x", 32), Err(PasswordError::Bcrypt { .. })));
    }

    #[test]
    fn malformed_hash_never_matches() {
        assert!(!compare_passwords("not-a-bcrypt-hash", "anything"));
        assert!(!compare_passwords("", ""));
    }
}
