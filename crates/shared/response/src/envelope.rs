use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response as HttpResponse};
use serde::{Deserialize, Serialize};

/// `{"data": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response<T> {
    pub data: T,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub limit: u32,
    pub offset: u64,
    /// Total number of items, not the size of this page.
    pub count: u64,
}

/// `{"data": ..., "meta": {"limit", "offset", "count"}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub data: T,
    pub meta: PageMeta,
}

/// `{"code": ..., "message": ..., "details": ...}`, `details` omitted when
/// absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

fn respond<T: Serialize>(status: StatusCode, data: T) -> HttpResponse {
    (status, Json(Response { data })).into_response()
}

/// `200 OK` with `{"data": data}`.
pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    respond(StatusCode::OK, data)
}

pub fn created<T: Serialize>(data: T) -> HttpResponse {
    respond(StatusCode::CREATED, data)
}

pub fn accepted<T: Serialize>(data: T) -> HttpResponse {
    respond(StatusCode::ACCEPTED, data)
}

/// `204` with an empty body.
#[must_use]
pub fn no_content() -> HttpResponse {
    StatusCode::NO_CONTENT.into_response()
}

/// `200 OK` with data and pagination metadata.
pub fn paged<T: Serialize>(data: T, meta: PageMeta) -> HttpResponse {
    (StatusCode::OK, Json(PageResponse { data, meta })).into_response()
}
