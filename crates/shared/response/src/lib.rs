//! # Response
//!
//! Uniform JSON bodies for axum handlers:
//!
//! * success: `{"data": ...}` via [`ok`], [`created`], [`accepted`], or
//!   `{"data": ..., "meta": {...}}` via [`paged`];
//! * errors: `{"code", "message", "details"?}` via [`ApiError`], one
//!   constructor per HTTP error status;
//! * [`Pagination`], an extractor for `?limit=&offset=`.
//!
//! ```rust
//! use axum::response::Response;
//! use blocks_response::{ApiError, Pagination, paged};
//!
//! async fn list(page: Pagination) -> Result<Response, ApiError> {
//!     let items: Vec<u32> = (0..page.limit).collect();
//!     Ok(paged(items, page.meta(1_000)))
//! }
//! ```

mod envelope;
mod error;
mod pagination;

pub use crate::envelope::{
    ErrorResponse, PageMeta, PageResponse, Response, accepted, created, no_content, ok, paged,
};
pub use crate::error::{ApiError, ErrorKind};
pub use crate::pagination::{DEFAULT_LIMIT, MAX_LIMIT, Pagination};
