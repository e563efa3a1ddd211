use std::borrow::Cow;

#[blocks_derive::blocks_error]
pub enum JwtError {
    /// Bad signature, malformed token, wrong algorithm or token kind, or not
    /// yet valid.
    #[error("Invalid token{}", format_context(.context))]
    InvalidToken { context: Option<Cow<'static, str>> },

    #[error("Token has expired{}", format_context(.context))]
    ExpiredToken { context: Option<Cow<'static, str>> },

    #[error("Invalid JWT configuration{}: {message}", format_context(.context))]
    InvalidConfiguration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Signing failed.
    #[error("JWT error{}: {source}", format_context(.context))]
    Jwt { source: jsonwebtoken::errors::Error, context: Option<Cow<'static, str>> },
}
