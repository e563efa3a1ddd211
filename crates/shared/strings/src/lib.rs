//! # Strings
//!
//! Small, allocation-light helpers shared by services and the scaffolding
//! CLI: emptiness checks, joining, integer parsing with readable errors,
//! slugs, and case conversions.

mod case;
mod parse;

use std::borrow::Cow;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

pub use crate::case::{camel_case, capitalize_words, kebab_case, pascal_case, snake_case, title_case};
pub use crate::parse::{parse_i32, parse_i64, parse_u64};

#[blocks_derive::blocks_error]
pub enum StringsError {
    /// The context names the parsing operation.
    #[error("Empty value{}", format_context(.context))]
    Empty { context: Option<Cow<'static, str>> },

    #[error("Parse error{}: {source}", format_context(.context))]
    Parse { source: std::num::ParseIntError, context: Option<Cow<'static, str>> },
}

#[must_use]
pub const fn is_empty(s: &str) -> bool {
    s.is_empty()
}

#[must_use]
pub const fn is_not_empty(s: &str) -> bool {
    !s.is_empty()
}

#[must_use]
pub fn concat(values: &[&str]) -> String {
    values.concat()
}

/// Joins `values` with `separator` between items only.
#[must_use]
pub fn concat_with_separator(separator: &str, values: &[&str]) -> String {
    values.join(separator)
}

/// Decodes UTF-8, replacing invalid sequences with `U+FFFD`.
#[must_use]
pub fn bytes_to_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[must_use]
pub fn string_to_bytes(s: &str) -> Vec<u8> {
    s.as_bytes().to_vec()
}

/// Reverses by Unicode scalar value.
#[must_use]
pub fn reverse(s: &str) -> String {
    s.chars().rev().collect()
}

/// Strips accents, lowercases, and collapses every run of characters
/// outside `[a-z0-9]` into one `-`.
///
/// Leading and trailing separators are kept: `"¡Hola, Señor!"` becomes
/// `"-hola-senor-"`.
#[must_use]
pub fn slugify(s: &str) -> String {
    let mut slug = String::with_capacity(s.len());
    let mut in_gap = false;
    for ch in s.nfd().filter(|c| !is_combining_mark(*c)) {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            in_gap = false;
        } else if !in_gap {
            slug.push('-');
            in_gap = true;
        }
    }
    slug
}

/// Non-empty and ASCII letters only.
#[must_use]
pub fn is_alpha(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphabetic())
}

/// Non-empty and ASCII digits only.
#[must_use]
pub fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
