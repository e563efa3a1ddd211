use bb8_redis::redis;
use std::borrow::Cow;

#[blocks_derive::blocks_error]
pub enum RedisError {
    #[error("Redis error{}: {source}", format_context(.context))]
    Redis { source: redis::RedisError, context: Option<Cow<'static, str>> },

    /// A value could not be encoded to or decoded from JSON.
    #[error("Serialization error{}: {source}", format_context(.context))]
    Serialization { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// The command or the pool checkout exceeded its time budget.
    #[error("Redis timeout{}: {message}", format_context(.context))]
    Timeout { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Arguments rejected before any I/O.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Redis client not initialized, call blocks_redis::init first{}", format_context(.context))]
    NotInitialized { context: Option<Cow<'static, str>> },

    #[error("Internal redis error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
