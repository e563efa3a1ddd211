use std::borrow::Cow;

#[blocks_derive::blocks_error]
pub enum SampleError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Parse error{}: {source}", format_context(.context))]
    Parse { source: std::num::ParseIntError, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn parse(raw: &str) -> Result<i32, SampleError> {
    Ok(raw.parse::<i32>()?)
}

#[test]
fn blocks_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/blocks_error_pass.rs");
    t.compile_fail("tests/ui/blocks_error_tuple_variant.rs");
    t.compile_fail("tests/ui/blocks_error_no_context.rs");
    t.compile_fail("tests/ui/blocks_error_bad_context_type.rs");
}

#[test]
fn question_mark_converts_source_errors() {
    let err = parse("nope").unwrap_err();
    assert!(matches!(err, SampleError::Parse { context: None, .. }));
    assert!(err.to_string().starts_with("Parse error: "));
}

#[test]
fn context_is_rendered_in_message() {
    let err = "x".parse::<i32>().context("reading port").unwrap_err();
    assert!(err.to_string().starts_with("Parse error (reading port): "));
}

#[test]
fn context_overrides_on_crate_error() {
    let result: Result<(), SampleError> = Err("exploded".into());
    let err = result.context("startup").unwrap_err();
    assert_eq!(err.to_string(), "Internal error (startup): exploded");
}

#[test]
fn owned_strings_map_to_internal() {
    let err: SampleError = format!("code {}", 7).into();
    assert!(matches!(err, SampleError::Internal { ref message, .. } if message == "code 7"));
}
