use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::routing::get;
use axum::{Json, Router};
use blocks_hooks::Hook;
use blocks_logger::{BufferWriter, StdLogger, discard_logger};
use blocks_server::{RealIp, RequestId, Server, ServerConfig, ServerError};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tower::ServiceExt;

async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}

async fn whoami(RealIp(ip): RealIp) -> String {
    ip.to_string()
}

async fn echo_id(id: RequestId) -> String {
    id.as_str().to_owned()
}

async fn boom() -> &'static str {
    panic!("handler exploded")
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(5)).await;
    "late"
}

fn server() -> Server {
    Server::builder()
        .addr("127.0.0.1:0")
        .logger(discard_logger())
        .build()
        .expect("valid address")
        .get("/ping", ping)
        .get("/whoami", whoami)
        .get("/id", echo_id)
        .get("/boom", boom)
}

async fn body_string(res: axum::response::Response) -> String {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn ping_returns_pong_with_request_id() {
    let res = server()
        .into_router()
        .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = serde_json::from_str(&body_string(res).await).unwrap();
    assert_eq!(body, json!({ "message": "pong" }));
}

#[tokio::test]
async fn incoming_request_id_is_preserved() {
    let res = server()
        .into_router()
        .oneshot(Request::get("/id").header("x-request-id", "abc-123").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.headers()["x-request-id"], "abc-123");
    assert_eq!(body_string(res).await, "abc-123");
}

#[tokio::test]
async fn real_ip_comes_from_forwarded_header() {
    let res = server()
        .into_router()
        .oneshot(
            Request::get("/whoami")
                .header("x-forwarded-for", "198.51.100.4, 10.0.0.1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(body_string(res).await, "198.51.100.4");
}

#[tokio::test]
async fn panics_become_internal_server_errors() {
    let res = server()
        .into_router()
        .oneshot(Request::get("/boom").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn slow_handlers_time_out_with_gateway_timeout() {
    let router = Server::builder()
        .logger(discard_logger())
        .request_timeout(Some(Duration::from_millis(20)))
        .build()
        .unwrap()
        .get("/slow", slow)
        .into_router();

    let res = router.oneshot(Request::get("/slow").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let router = Server::builder()
        .logger(discard_logger())
        .cors(["https://app.example.com"])
        .build()
        .unwrap()
        .post("/items", ping)
        .into_router();

    let res = router
        .oneshot(
            Request::options("/items")
                .header(header::ORIGIN, "https://app.example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://app.example.com");
    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(res.headers()[header::ACCESS_CONTROL_MAX_AGE], "43200");
}

#[test]
fn routes_are_recorded_with_handler_names() {
    let server = server()
        .route("/any", get(ping))
        .merge(Router::new().route("/hidden", get(ping)));

    let methods: Vec<(&str, &str)> =
        server.routes().iter().map(|r| (r.method.as_str(), r.path.as_str())).collect();
    assert_eq!(
        methods,
        vec![("GET", "/ping"), ("GET", "/whoami"), ("GET", "/id"), ("GET", "/boom"), ("ANY", "/any")]
    );
    assert!(server.routes()[0].handler.ends_with("::ping"));

    let table = server.render_routes(&["/who", "/boom"]);
    assert!(table.contains("/ping"));
    assert!(!table.contains("/whoami"));
    assert!(!table.contains("/boom"));
}

#[test]
fn config_is_applied_by_builder() {
    let cfg = ServerConfig { address: ":5098".to_owned(), ..ServerConfig::default() };
    let server = Server::builder().config(cfg).logger(discard_logger()).build().unwrap();
    assert_eq!(server.local_addr().port(), 5098);
}

#[test]
fn missing_tls_files_fail_the_build() {
    let err = Server::builder().tls("/nope/cert.pem", "/nope/key.pem").build().unwrap_err();
    assert!(matches!(err, ServerError::Tls { .. }));
}

#[tokio::test]
async fn run_until_stops_and_runs_hooks() {
    let ran = Arc::new(AtomicBool::new(false));
    let hooks = Hook::new(Duration::from_secs(1));
    let flag = Arc::clone(&ran);
    hooks.add(move |_| async move { flag.store(true, Ordering::SeqCst) });

    let server = Server::builder()
        .addr("127.0.0.1:0")
        .logger(discard_logger())
        .stop_timeout(Duration::from_millis(100))
        .hooks(hooks)
        .build()
        .unwrap()
        .get("/ping", ping);

    tokio::time::timeout(Duration::from_secs(5), server.run_until(async {}))
        .await
        .expect("server should stop promptly")
        .expect("server should exit cleanly");

    assert!(ran.load(Ordering::SeqCst));
}

fn recording_server(addr: String, buf: &BufferWriter) -> Server {
    Server::builder()
        .addr(addr)
        .logger(Arc::new(StdLogger::builder().writer(buf.clone()).build()))
        .stop_timeout(Duration::from_millis(100))
        .build()
        .unwrap()
        .get("/ping", ping)
}

#[tokio::test]
async fn listening_is_logged_with_the_bound_address() {
    let buf = BufferWriter::new();
    let server = recording_server("127.0.0.1:0".to_owned(), &buf);

    tokio::time::timeout(
        Duration::from_secs(5),
        server.run_until(tokio::time::sleep(Duration::from_millis(300))),
    )
    .await
    .expect("server should stop promptly")
    .expect("server should exit cleanly");

    let lines = buf.lines();
    assert!(lines[0].contains("HTTP server starting on 127.0.0.1:0"), "got: {lines:?}");
    assert!(lines.iter().any(|l| l.contains("HTTP server listening on 127.0.0.1:")), "got: {lines:?}");
    assert!(!lines.iter().any(|l| l.contains("listening on 127.0.0.1:0")), "got: {lines:?}");
}

#[tokio::test]
async fn bind_failure_is_never_reported_as_listening() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let buf = BufferWriter::new();
    let server = recording_server(taken.local_addr().unwrap().to_string(), &buf);

    let result =
        tokio::time::timeout(Duration::from_secs(5), server.run_until(std::future::pending::<()>()))
            .await
            .expect("bind failure should return promptly");

    assert!(result.is_err());
    assert!(!buf.contents().contains("listening"), "got: {}", buf.contents());
}
