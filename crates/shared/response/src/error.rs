use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response as HttpResponse};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use crate::envelope::ErrorResponse;

macro_rules! error_kinds {
    ($($kind:ident => $status:literal, $code:literal, $message:literal;)+) => {
        /// Every client and server error status with its wire code and
        /// default message.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ErrorKind {
            $($kind,)+
        }

        impl ErrorKind {
            pub const ALL: &'static [Self] = &[$(Self::$kind,)+];

            #[must_use]
            pub const fn status_u16(self) -> u16 {
                match self {
                    $(Self::$kind => $status,)+
                }
            }

            #[must_use]
            pub fn status(self) -> StatusCode {
                StatusCode::from_u16(self.status_u16()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }

            /// The `code` field of the error body, e.g. `"not_found"`.
            #[must_use]
            pub const fn code(self) -> &'static str {
                match self {
                    $(Self::$kind => $code,)+
                }
            }

            #[must_use]
            pub const fn default_message(self) -> &'static str {
                match self {
                    $(Self::$kind => $message,)+
                }
            }

            #[must_use]
            pub fn from_status(status: StatusCode) -> Option<Self> {
                match status.as_u16() {
                    $($status => Some(Self::$kind),)+
                    _ => None,
                }
            }
        }
    };
}

error_kinds! {
    BadRequest => 400, "bad_request", "Invalid request";
    Unauthorized => 401, "unauthorized", "Unauthorized";
    PaymentRequired => 402, "payment_required", "Payment required";
    Forbidden => 403, "forbidden", "Forbidden";
    NotFound => 404, "not_found", "Resource not found";
    MethodNotAllowed => 405, "method_not_allowed", "Method not allowed";
    NotAcceptable => 406, "not_acceptable", "Not acceptable";
    ProxyAuthRequired => 407, "proxy_auth_required", "Proxy authentication required";
    RequestTimeout => 408, "request_timeout", "Request timeout";
    Conflict => 409, "conflict", "Conflict";
    Gone => 410, "gone", "Resource is gone";
    LengthRequired => 411, "length_required", "Length required";
    PreconditionFailed => 412, "precondition_failed", "Precondition failed";
    RequestEntityTooLarge => 413, "request_entity_too_large", "Request entity too large";
    RequestUriTooLong => 414, "request_uri_too_long", "Request URI too long";
    UnsupportedMediaType => 415, "unsupported_media_type", "Unsupported media type";
    RangeNotSatisfiable => 416, "range_not_satisfiable", "Requested range not satisfiable";
    ExpectationFailed => 417, "expectation_failed", "Expectation failed";
    Teapot => 418, "teapot", "I'm a teapot";
    MisdirectedRequest => 421, "misdirected_request", "Misdirected request";
    Validation => 422, "validation_error", "Validation error";
    Locked => 423, "locked", "Resource is locked";
    FailedDependency => 424, "failed_dependency", "Failed dependency";
    TooEarly => 425, "too_early", "Too early";
    UpgradeRequired => 426, "upgrade_required", "Upgrade required";
    PreconditionRequired => 428, "precondition_required", "Precondition required";
    TooManyRequests => 429, "too_many_requests", "Too many requests";
    RequestHeaderFieldsTooLarge => 431, "request_header_fields_too_large", "Request header fields too large";
    UnavailableForLegalReasons => 451, "unavailable_for_legal_reasons", "Unavailable for legal reasons";
    Internal => 500, "internal_error", "Internal server error";
    NotImplemented => 501, "not_implemented", "Not implemented";
    BadGateway => 502, "bad_gateway", "Bad gateway";
    ServiceUnavailable => 503, "service_unavailable", "Service unavailable";
    GatewayTimeout => 504, "gateway_timeout", "Gateway timeout";
    HttpVersionNotSupported => 505, "http_version_not_supported", "HTTP version not supported";
    VariantAlsoNegotiates => 506, "variant_also_negotiates", "Variant also negotiates";
    InsufficientStorage => 507, "insufficient_storage", "Insufficient storage";
    LoopDetected => 508, "loop_detected", "Loop detected";
    NotExtended => 510, "not_extended", "Not extended";
    NetworkAuthenticationRequired => 511, "network_authentication_required", "Network authentication required";
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// An error that renders as an [`ErrorResponse`] body with its status.
///
/// Return it from handlers as `Result<_, ApiError>`:
///
/// ```rust
/// use blocks_response::ApiError;
///
/// async fn show(id: u64) -> Result<axum::response::Response, ApiError> {
///     if id == 0 {
///         return Err(ApiError::not_found(format!("user {id} does not exist")));
///     }
///     Ok(blocks_response::ok(id))
/// }
/// ```
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{status} {code}: {message}")]
pub struct ApiError {
    status: StatusCode,
    code: Cow<'static, str>,
    message: Cow<'static, str>,
    details: Option<serde_json::Value>,
}

impl From<ErrorKind> for ApiError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

macro_rules! shortcuts {
    ($($name:ident => $kind:ident),+ $(,)?) => {
        $(
            #[doc = concat!("`", stringify!($kind), "` with `message`, or the default message when empty.")]
            pub fn $name(message: impl Into<Cow<'static, str>>) -> Self {
                Self::new(ErrorKind::$kind).with_message(message)
            }
        )+
    };
}

impl ApiError {
    /// `kind` with its default message and no details.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            status: kind.status(),
            code: Cow::Borrowed(kind.code()),
            message: Cow::Borrowed(kind.default_message()),
            details: None,
        }
    }

    /// Any status, code and message.
    pub fn custom(
        status: StatusCode,
        code: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
        details: Option<serde_json::Value>,
    ) -> Self {
        Self { status, code: code.into(), message: message.into(), details }
    }

    /// Replaces the message; an empty one restores the kind's default.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        let message = message.into();
        if !message.is_empty() {
            self.message = message;
        } else if let Some(kind) = ErrorKind::from_status(self.status) {
            self.message = Cow::Borrowed(kind.default_message());
        }
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub const fn details(&self) -> Option<&serde_json::Value> {
        self.details.as_ref()
    }

    #[must_use]
    pub fn to_body(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.code.clone().into_owned(),
            message: self.message.clone().into_owned(),
            details: self.details.clone(),
        }
    }

    /// `400` with the default message and optional details.
    #[must_use]
    pub fn bad_request(details: Option<serde_json::Value>) -> Self {
        Self { details, ..Self::new(ErrorKind::BadRequest) }
    }

    /// `422` with per-field messages as details.
    #[must_use]
    pub fn unprocessable_entity(field_errors: BTreeMap<String, Vec<String>>) -> Self {
        let details = serde_json::to_value(field_errors).ok();
        Self { details, ..Self::new(ErrorKind::Validation) }
    }

    /// `500` whose message is the error's text, or the default message.
    #[must_use]
    pub fn internal(err: Option<&dyn fmt::Display>) -> Self {
        let error = Self::new(ErrorKind::Internal);
        match err {
            Some(err) => error.with_message(err.to_string()),
            None => error,
        }
    }

    shortcuts! {
        unauthorized => Unauthorized,
        payment_required => PaymentRequired,
        forbidden => Forbidden,
        not_found => NotFound,
        method_not_allowed => MethodNotAllowed,
        not_acceptable => NotAcceptable,
        proxy_auth_required => ProxyAuthRequired,
        request_timeout => RequestTimeout,
        conflict => Conflict,
        gone => Gone,
        length_required => LengthRequired,
        precondition_failed => PreconditionFailed,
        request_entity_too_large => RequestEntityTooLarge,
        request_uri_too_long => RequestUriTooLong,
        unsupported_media_type => UnsupportedMediaType,
        range_not_satisfiable => RangeNotSatisfiable,
        expectation_failed => ExpectationFailed,
        teapot => Teapot,
        misdirected_request => MisdirectedRequest,
        locked => Locked,
        failed_dependency => FailedDependency,
        too_early => TooEarly,
        upgrade_required => UpgradeRequired,
        precondition_required => PreconditionRequired,
        too_many_requests => TooManyRequests,
        request_header_fields_too_large => RequestHeaderFieldsTooLarge,
        unavailable_for_legal_reasons => UnavailableForLegalReasons,
        not_implemented => NotImplemented,
        bad_gateway => BadGateway,
        service_unavailable => ServiceUnavailable,
        gateway_timeout => GatewayTimeout,
        http_version_not_supported => HttpVersionNotSupported,
        variant_also_negotiates => VariantAlsoNegotiates,
        insufficient_storage => InsufficientStorage,
        loop_detected => LoopDetected,
        not_extended => NotExtended,
        network_authentication_required => NetworkAuthenticationRequired,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> HttpResponse {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, code = %self.code, "{}", self.message);
        }
        (self.status, Json(self.to_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_kind_round_trips_through_its_status() {
        for kind in ErrorKind::ALL {
            assert_eq!(ErrorKind::from_status(kind.status()), Some(*kind), "{kind}");
            assert!(kind.status().is_client_error() || kind.status().is_server_error());
            assert!(!kind.default_message().is_empty());
        }
        assert_eq!(ErrorKind::ALL.len(), 40);
        assert_eq!(ErrorKind::from_status(StatusCode::OK), None);
    }

    #[test]
    fn documented_codes() {
        assert_eq!(ErrorKind::Validation.code(), "validation_error");
        assert_eq!(ErrorKind::Validation.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ErrorKind::Internal.code(), "internal_error");
        assert_eq!(ErrorKind::Teapot.status().as_u16(), 418);
        assert_eq!(ErrorKind::NotFound.default_message(), "Resource not found");
    }

    #[test]
    fn empty_message_falls_back_to_default() {
        assert_eq!(ApiError::not_found("").message(), "Resource not found");
        assert_eq!(ApiError::conflict("email taken").message(), "email taken");
        assert_eq!(ApiError::forbidden("nope").with_message("").message(), "Forbidden");
    }

    #[test]
    fn bad_request_and_validation_carry_details() {
        let err = ApiError::bad_request(Some(json!({ "field": "name" })));
        assert_eq!(err.message(), "Invalid request");
        assert_eq!(err.details(), Some(&json!({ "field": "name" })));
        assert_eq!(ApiError::bad_request(None).details(), None);

        let fields = BTreeMap::from([("email".to_owned(), vec!["is required".to_owned()])]);
        let err = ApiError::unprocessable_entity(fields);
        assert_eq!(err.code(), "validation_error");
        assert_eq!(err.details(), Some(&json!({ "email": ["is required"] })));
    }

    #[test]
    fn internal_uses_error_text() {
        let io = std::io::Error::other("disk on fire");
        assert_eq!(ApiError::internal(Some(&io)).message(), "disk on fire");
        assert_eq!(ApiError::internal(None).message(), "Internal server error");
    }

    #[test]
    fn custom_keeps_everything() {
        let err = ApiError::custom(StatusCode::IM_USED, "im_used", "Delta encoded", None);
        assert_eq!(err.status().as_u16(), 226);
        assert_eq!(err.to_string(), "226 IM Used im_used: Delta encoded");
    }
}
