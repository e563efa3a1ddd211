use axum::extract::Path;
use axum::response::Response;
use blocks_response::{ApiError, Pagination, ok, paged};
use blocks_server::{RequestId, Server};
use serde::Serialize;
use tracing::debug;

/// Number of items in the demo catalog.
pub const CATALOG_SIZE: u64 = 42;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: u64,
    pub name: String,
}

impl Item {
    fn new(id: u64) -> Self {
        Self { id, name: format!("item-{id:03}") }
    }
}

#[derive(Serialize)]
struct Pong {
    message: &'static str,
}

async fn ping() -> Response {
    ok(Pong { message: "pong" })
}

async fn list_items(page: Pagination) -> Response {
    let first = page.offset.saturating_add(1);
    let last = page.offset.saturating_add(u64::from(page.limit)).min(CATALOG_SIZE);
    let items: Vec<Item> = (first..=last).map(Item::new).collect();
    paged(items, page.meta(CATALOG_SIZE))
}

async fn get_item(id: RequestId, Path(item_id): Path<u64>) -> Result<Response, ApiError> {
    if (1..=CATALOG_SIZE).contains(&item_id) {
        return Ok(ok(Item::new(item_id)));
    }
    debug!(request_id = id.as_str(), item_id, "item not found");
    Err(ApiError::not_found(format!("item {item_id} does not exist")))
}

/// Adds the service routes to `server`.
pub fn register(server: Server) -> Server {
    server.get("/ping", ping).get("/items", list_items).get("/items/{id}", get_item)
}
