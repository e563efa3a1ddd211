use axum::Router;
use axum::extract::{ConnectInfo, Request};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::Response;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::extract::RealIp;

const CORS_MAX_AGE: Duration = Duration::from_secs(12 * 60 * 60);
const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";
const TRUE_CLIENT_IP: &str = "true-client-ip";

/// Toggles for the standard middleware stack.
#[derive(Debug, Clone)]
pub(crate) struct MiddlewareSettings {
    pub(crate) request_id: bool,
    pub(crate) real_ip: bool,
    pub(crate) recover: bool,
    pub(crate) trace: bool,
    pub(crate) request_timeout: Option<Duration>,
    pub(crate) cors_origins: Vec<String>,
}

/// Wraps `router` with the enabled middleware.
///
/// Outermost first: request id, tracing, id propagation, panic recovery,
/// timeout, real ip, CORS.
pub(crate) fn apply(mut router: Router, settings: &MiddlewareSettings) -> Router {
    if !settings.cors_origins.is_empty() {
        router = router.layer(cors_layer(&settings.cors_origins));
    }
    if settings.real_ip {
        router = router.layer(middleware::from_fn(resolve_real_ip));
    }
    if let Some(timeout) = settings.request_timeout {
        router = router.layer(TimeoutLayer::with_status_code(StatusCode::GATEWAY_TIMEOUT, timeout));
    }
    if settings.recover {
        router = router.layer(CatchPanicLayer::new());
    }
    if settings.request_id {
        router = router.layer(PropagateRequestIdLayer::x_request_id());
    }
    if settings.trace {
        router = router.layer(TraceLayer::new_for_http());
    }
    if settings.request_id {
        router = router.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));
    }
    router
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(origins.iter().filter_map(|o| HeaderValue::from_str(o).ok()))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::PUT,
            Method::PATCH,
            Method::GET,
            Method::POST,
            Method::OPTIONS,
            Method::DELETE,
        ])
        .allow_headers([header::ORIGIN, header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_LENGTH])
        .allow_credentials(true)
        .max_age(CORS_MAX_AGE)
}

async fn resolve_real_ip(mut req: Request, next: Next) -> Response {
    let peer = req.extensions().get::<ConnectInfo<SocketAddr>>().map(|info| info.0.ip());
    if let Some(ip) = client_ip(req.headers()).or(peer) {
        req.extensions_mut().insert(RealIp(ip));
    }
    next.run(req).await
}

/// Client address as reported by proxy headers, most trusted first.
pub(crate) fn client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let forwarded = headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok());

    forwarded
        .or_else(|| header_ip(headers, X_REAL_IP))
        .or_else(|| header_ip(headers, TRUE_CLIENT_IP))
}

fn header_ip(headers: &HeaderMap, name: &str) -> Option<IpAddr> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}
