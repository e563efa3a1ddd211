use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use blocks_logger::LogContext;
use std::convert::Infallible;
use std::net::IpAddr;

const X_REQUEST_ID: &str = "x-request-id";

/// The request's `x-request-id`, empty when the header is absent.
///
/// With the request-id middleware enabled the header is always set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A [`LogContext`] carrying this id.
    #[must_use]
    pub fn log_context(&self) -> LogContext {
        if self.0.is_empty() { LogContext::new() } else { LogContext::new().with_request_id(&self.0) }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RequestId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        Ok(Self(id))
    }
}

/// Client address resolved by the real-ip middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealIp(pub IpAddr);

impl<S: Send + Sync> FromRequestParts<S> for RealIp {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .copied()
            .or_else(|| crate::middleware::client_ip(&parts.headers).map(Self))
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "client address unavailable"))
    }
}
