use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::{JwtError, JwtErrorExt};

const DEFAULT_ACCESS_TTL_SECS: u64 = 15 * 60;
const DEFAULT_REFRESH_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Which half of a [`TokenPair`] a token is. Stored in the `subject` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub username: String,
    /// The user's role.
    pub sub: String,
    /// `"access"` or `"refresh"`.
    pub subject: String,
    pub exp: i64,
    pub iat: i64,
    pub nbf: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// File/env settings for [`JwtManager::from_config`].
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            access_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
            refresh_ttl_secs: DEFAULT_REFRESH_TTL_SECS,
        }
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"***")
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish()
    }
}

/// Issues and validates HS512 token pairs with a shared secret.
///
/// ```rust
/// use blocks_jwt::{JwtManager, TokenKind};
/// use std::time::Duration;
///
/// let jwt = JwtManager::new("s3cr3t", Duration::from_secs(900), Duration::from_secs(3600))?;
/// let pair = jwt.generate_token_pair(7, "ada", "admin")?;
///
/// let claims = jwt.validate_token(&pair.access_token, TokenKind::Access)?;
/// assert_eq!(claims.user_id, 7);
/// assert!(jwt.validate_token(&pair.access_token, TokenKind::Refresh).is_err());
/// # Ok::<(), blocks_jwt::JwtError>(())
/// ```
#[derive(Clone)]
pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtManager")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    /// # Errors
    /// [`JwtError::InvalidConfiguration`] when `secret` is empty.
    pub fn new(
        secret: impl AsRef<[u8]>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<Self, JwtError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(JwtError::InvalidConfiguration {
                message: "secret must not be empty".into(),
                context: None,
            });
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl,
            refresh_ttl,
        })
    }

    /// # Errors
    /// [`JwtError::InvalidConfiguration`] when the secret is empty.
    pub fn from_config(cfg: &JwtConfig) -> Result<Self, JwtError> {
        Self::new(
            &cfg.secret,
            Duration::from_secs(cfg.access_ttl_secs),
            Duration::from_secs(cfg.refresh_ttl_secs),
        )
    }

    #[must_use]
    pub const fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    #[must_use]
    pub const fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Issues an access and a refresh token for the same user.
    ///
    /// # Errors
    /// [`JwtError::Jwt`] when signing fails.
    pub fn generate_token_pair(
        &self,
        user_id: u64,
        username: &str,
        role: &str,
    ) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self.generate_token(TokenKind::Access, user_id, username, role)?,
            refresh_token: self.generate_token(TokenKind::Refresh, user_id, username, role)?,
            expires_in: self.access_ttl.as_secs(),
        })
    }

    /// Issues a single token of `kind`.
    ///
    /// # Errors
    /// [`JwtError::Jwt`] when signing fails.
    pub fn generate_token(
        &self,
        kind: TokenKind,
        user_id: u64,
        username: &str,
        role: &str,
    ) -> Result<String, JwtError> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id,
            username: username.to_owned(),
            sub: role.to_owned(),
            subject: kind.as_str().to_owned(),
            exp: now.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)),
            iat: now,
            nbf: now,
        };

        encode(&Header::new(Algorithm::HS512), &claims, &self.encoding)
            .context(format!("signing {kind} token"))
    }

    /// Verifies signature, expiry and not-before (no leeway), and that the
    /// token is of `kind`.
    ///
    /// # Errors
    /// [`JwtError::ExpiredToken`] once `exp` has passed, otherwise
    /// [`JwtError::InvalidToken`] for any failure.
    pub fn validate_token(&self, token: &str, kind: TokenKind) -> Result<Claims, JwtError> {
        let claims = decode::<Claims>(token, &self.decoding, &validation())
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken { context: None },
                _ => JwtError::InvalidToken { context: None },
            })?
            .claims;

        if claims.subject != kind.as_str() {
            return Err(JwtError::InvalidToken { context: Some(format!("expected {kind} token").into()) });
        }
        Ok(claims)
    }
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS512);
    validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
    validation.leeway = 0;
    validation.validate_nbf = true;
    validation.set_required_spec_claims(&["exp", "nbf"]);
    validation
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> JwtManager {
        JwtManager::new("unit-test-secret", Duration::from_secs(60), Duration::from_secs(600)).unwrap()
    }

    fn sign(claims: &Claims, alg: Algorithm, secret: &[u8]) -> String {
        encode(&Header::new(alg), claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    fn claims(subject: &str, exp_offset: i64, nbf_offset: i64) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            user_id: 1,
            username: "ada".to_owned(),
            sub: "admin".to_owned(),
            subject: subject.to_owned(),
            exp: now + exp_offset,
            iat: now,
            nbf: now + nbf_offset,
        }
    }

    #[test]
    fn pair_carries_identity_and_kinds() {
        let jwt = manager();
        let pair = jwt.generate_token_pair(42, "grace", "editor").unwrap();
        assert_eq!(pair.expires_in, 60);

        let access = jwt.validate_token(&pair.access_token, TokenKind::Access).unwrap();
        assert_eq!((access.user_id, access.username.as_str(), access.sub.as_str()), (42, "grace", "editor"));
        assert_eq!(access.subject, "access");
        assert_eq!(access.exp - access.iat, 60);

        let refresh = jwt.validate_token(&pair.refresh_token, TokenKind::Refresh).unwrap();
        assert_eq!(refresh.exp - refresh.iat, 600);
    }

    #[test]
    fn header_is_hs512() {
        let token = manager().generate_token(TokenKind::Access, 1, "a", "r").unwrap();
        assert_eq!(jsonwebtoken::decode_header(&token).unwrap().alg, Algorithm::HS512);
    }

    #[test]
    fn wrong_kind_is_invalid() {
        let jwt = manager();
        let refresh = jwt.generate_token(TokenKind::Refresh, 1, "a", "r").unwrap();
        assert!(matches!(
            jwt.validate_token(&refresh, TokenKind::Access),
            Err(JwtError::InvalidToken { .. })
        ));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let token = sign(&claims("access", -10, -20), Algorithm::HS512, b"unit-test-secret");
        assert!(matches!(manager().validate_token(&token, TokenKind::Access), Err(JwtError::ExpiredToken { .. })));
    }

    #[test]
    fn future_nbf_is_invalid() {
        let token = sign(&claims("access", 600, 300), Algorithm::HS512, b"unit-test-secret");
        assert!(matches!(manager().validate_token(&token, TokenKind::Access), Err(JwtError::InvalidToken { .. })));
    }

    #[test]
    fn other_hmac_algorithms_are_accepted() {
        let token = sign(&claims("access", 600, 0), Algorithm::HS256, b"unit-test-secret");
        assert!(manager().validate_token(&token, TokenKind::Access).is_ok());
    }

    #[test]
    fn bad_signature_and_garbage_are_invalid() {
        let jwt = manager();
        let forged = sign(&claims("access", 600, 0), Algorithm::HS512, b"someone-else");
        assert!(matches!(jwt.validate_token(&forged, TokenKind::Access), Err(JwtError::InvalidToken { .. })));
        assert!(matches!(jwt.validate_token("not.a.jwt", TokenKind::Access), Err(JwtError::InvalidToken { .. })));
        assert!(matches!(jwt.validate_token("", TokenKind::Access), Err(JwtError::InvalidToken { .. })));
    }

    #[test]
    fn empty_secret_is_rejected() {
        let err = JwtManager::from_config(&JwtConfig::default()).unwrap_err();
        assert!(matches!(err, JwtError::InvalidConfiguration { .. }));
    }

    #[test]
    fn config_defaults() {
        let cfg: JwtConfig = serde_json::from_str(r#"{"secret":"x"}"#).unwrap();
        assert_eq!((cfg.access_ttl_secs, cfg.refresh_ttl_secs), (900, 604_800));
        assert!(!format!("{cfg:?}").contains("\"x\""));

        let jwt = JwtManager::from_config(&cfg).unwrap();
        assert_eq!(jwt.access_ttl(), Duration::from_secs(900));
        assert_eq!(jwt.refresh_ttl(), Duration::from_secs(604_800));
    }
}
