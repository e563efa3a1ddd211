use std::borrow::Cow;

#[blocks_derive::blocks_error]
pub enum TemplateError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Template directory walk failed{}: {source}", format_context(.context))]
    Walk { source: walkdir::Error, context: Option<Cow<'static, str>> },

    #[error("Invalid template.yaml{}: {source}", format_context(.context))]
    Manifest { source: serde_yaml::Error, context: Option<Cow<'static, str>> },

    #[error("Render error{}: {source}", format_context(.context))]
    Render { source: minijinja::Error, context: Option<Cow<'static, str>> },

    #[error("Template not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

