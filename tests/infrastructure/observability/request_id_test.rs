use axum::Router;
use axum::body::Body;
use axum::extract::Extension;
use axum::http::Request;
use axum::routing::get;
use tower::ServiceExt;

use stt_lanes::infrastructure::observability::{REQUEST_ID_HEADER, RequestId, request_id_middleware};

fn echo_router() -> Router {
    Router::new()
        .route("/", get(|Extension(id): Extension<RequestId>| async move { id.0 }))
        .layer(axum::middleware::from_fn(request_id_middleware))
}

#[test]
fn given_request_id_header_constant_when_accessed_then_returns_correct_value() {
    assert_eq!(REQUEST_ID_HEADER, "x-request-id");
}

#[tokio::test]
async fn given_caller_request_id_when_handling_then_echoes_and_exposes_it() {
    let response = echo_router()
        .oneshot(
            Request::builder()
                .uri("/")
                .header(REQUEST_ID_HEADER, "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()[REQUEST_ID_HEADER], "abc-123");
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"abc-123");
}

#[tokio::test]
async fn given_no_request_id_when_handling_then_generates_one() {
    let response = echo_router()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let generated = response.headers()[REQUEST_ID_HEADER].to_str().unwrap().to_string();
    assert_eq!(generated.len(), 36);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body, generated.as_bytes());
}

#[tokio::test]
async fn given_empty_request_id_when_handling_then_generates_one() {
    let response = echo_router()
        .oneshot(
            Request::builder()
                .uri("/")
                .header(REQUEST_ID_HEADER, "")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(!response.headers()[REQUEST_ID_HEADER].is_empty());
}

#[tokio::test]
async fn given_oversized_request_id_when_handling_then_replaces_it() {
    let response = echo_router()
        .oneshot(
            Request::builder()
                .uri("/")
                .header(REQUEST_ID_HEADER, "x".repeat(200))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()[REQUEST_ID_HEADER].len(), 36);
}

#[test]
fn given_printable_header_when_resolving_request_id_then_reuses_it() {
    let mut headers = axum::http::HeaderMap::new();
    headers.insert(REQUEST_ID_HEADER, "job-7".parse().unwrap());

    assert_eq!(RequestId::from_headers(&headers), RequestId("job-7".to_string()));
}

#[test]
fn given_header_with_spaces_when_resolving_request_id_then_generates_one() {
    let mut headers = axum::http::HeaderMap::new();
    headers.insert(REQUEST_ID_HEADER, "two words".parse().unwrap());

    let id = RequestId::from_headers(&headers);

    assert_ne!(id.0, "two words");
    assert_eq!(id.0.len(), 36);
}
