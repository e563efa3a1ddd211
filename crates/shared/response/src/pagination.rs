use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;

use crate::envelope::PageMeta;

pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

/// `limit`/`offset` query parameters with defaults and bounds.
///
/// `limit` defaults to 20 and is clamped to `1..=100`; `offset` defaults to
/// 0 and negative values become 0. Unparsable values fall back to the
/// defaults, so extraction never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { limit: DEFAULT_LIMIT, offset: 0 }
    }
}

impl Pagination {
    /// Parses a raw query string such as `"limit=10&offset=30"`.
    ///
    /// Values are percent-decoded. Only the first occurrence of a key counts,
    /// even when it is empty.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).unwrap_or_default();
        let mut page = Self::default();
        if let Some(limit) = param(&pairs, "limit") {
            page.limit = u32::try_from(limit.clamp(1, i64::from(MAX_LIMIT))).unwrap_or(DEFAULT_LIMIT);
        }
        if let Some(offset) = param(&pairs, "offset") {
            page.offset = u64::try_from(offset).unwrap_or(0);
        }
        page
    }

    /// Metadata for a page of a collection holding `count` items.
    #[must_use]
    pub const fn meta(&self, count: u64) -> PageMeta {
        PageMeta { limit: self.limit, offset: self.offset, count }
    }
}

/// First value of `name`, when it parses as an integer.
fn param(pairs: &[(String, String)], name: &str) -> Option<i64> {
    pairs.iter().find(|(key, _)| key == name).and_then(|(_, value)| value.trim().parse().ok())
}

impl<S: Send + Sync> FromRequestParts<S> for Pagination {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_query(parts.uri.query().unwrap_or_default()))
    }
}
