//! # JWT
//!
//! Access/refresh token pairs signed with HS512 and a shared secret.
//! Validation checks the signature, `exp` and `nbf` without leeway, and that
//! the token's `subject` matches the expected [`TokenKind`], so a refresh
//! token can't be used as an access token.

mod error;
mod manager;

pub use crate::error::{JwtError, JwtErrorExt};
pub use crate::manager::{Claims, JwtConfig, JwtManager, TokenKind, TokenPair};
