use std::borrow::Cow;

#[blocks_derive::blocks_error]
pub enum ServerError {
    /// Binding, accepting or serving failed.
    #[error("Server IO error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Invalid server address{}: {message}", format_context(.context))]
    InvalidAddress { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Certificate or key missing, unreadable, or TLS support not compiled in.
    #[error("TLS error{}: {message}", format_context(.context))]
    Tls { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal server error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
