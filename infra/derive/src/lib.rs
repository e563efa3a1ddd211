#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Derive
//!
//! Procedural macros used across the blocks packages.
//!
//! Every package reports failures through a single error enum. The
//! [`macro@blocks_error`] attribute wires that enum into `thiserror`, adds
//! `From` conversions for wrapped library errors and a `.context(..)`
//! extension, so call sites can annotate failures without writing `map_err`
//! closures.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for package error enums.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already present.
/// * `<ErrorName>Ext` trait with `.context(...)` for `Result<T, ErrorName>` and for
///   `Result<T, SourceError>` of every variant that wraps a source error.
/// * `From<SourceError>` for every variant with a `source` field (or a field marked
///   `#[source]`/`#[from]`).
/// * `From<&'static str>` and `From<String>` when an `Internal { message, context }`
///   variant is present.
/// * A module-private `format_context` helper for use inside `#[error(...)]`.
///
/// # Requirements
///
/// 1. Applied to an **enum** with named-field variants only.
/// 2. Variants with a source must carry `context: Option<Cow<'static, str>>`.
/// 3. Two variants must not wrap the same source type.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[blocks_derive::blocks_error]
/// pub enum CacheError {
///     #[error("Redis error{}: {source}", format_context(.context))]
///     Redis { source: redis::RedisError, context: Option<Cow<'static, str>> },
///
///     #[error("Internal cache error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// async fn load(conn: &mut Conn) -> Result<String, CacheError> {
///     conn.get("user:1").await.context("GET user:1")
/// }
/// ```
#[proc_macro_attribute]
pub fn blocks_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}
