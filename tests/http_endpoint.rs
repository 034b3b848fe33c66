mod common;

use axum::body::{Body, Bytes};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use common::hash;
use futures::stream;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tangle_router::errors::ErrorKind;
use tangle_router::transport::{Endpoint, HttpEndpoint};
use tangle_router::trytes::TryteString;
use tangle_router::{Operation, OperationRouter, RoutingClient};

/// Minimal node: answers a few commands and rejects everything else the way
/// a real node does, with an `error` field and http 400.
async fn fake_node(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if headers.get("x-iota-api-version").and_then(|v| v.to_str().ok()) != Some("1") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid API Version" })),
        );
    }
    match body["command"].as_str() {
        Some("findTransactions") if body["bundles"] == json!([hash('X')]) => {
            (StatusCode::OK, Json(json!({ "hashes": [hash('B')], "duration": 3 })))
        }
        Some("getTrytes") => (StatusCode::OK, Json(json!({ "trytes": "not-a-list" }))),
        Some("getTransactionsToApprove") => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            (StatusCode::OK, Json(json!({})))
        }
        Some("storeTransactions") => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid trytes input" })),
        ),
        Some("interruptAttachingToTangle") => (StatusCode::OK, Json(json!([]))),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Command parameter has not been specified" })),
        ),
    }
}

/// Sends the headers and half a JSON object, then stalls.
async fn stalling_node() -> Response {
    let chunks = stream::unfold(0u8, |step| async move {
        match step {
            0 => Some((Ok::<_, Infallible>(Bytes::from_static(b"{\"hashes\": []")), 1)),
            1 => {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Some((Ok(Bytes::from_static(b"}")), 2))
            }
            _ => None,
        }
    });
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from_stream(chunks))
        .unwrap()
}

async fn start_node() -> String {
    serve(Router::new().route("/", post(fake_node))).await
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/")
}

async fn http_client(timeout: Duration) -> RoutingClient {
    let url = start_node().await;
    let endpoint = HttpEndpoint::with_timeout(url, timeout).unwrap();
    RoutingClient::new(OperationRouter::new(Arc::new(endpoint)))
}

#[tokio::test]
async fn sends_command_with_api_version_header() {
    let client = http_client(Duration::from_secs(5)).await;
    let hashes = client.find_transactions(&[hash('X')]).await.unwrap();
    assert_eq!(hashes, vec![hash('B')]);
}

#[tokio::test]
async fn node_error_response_is_a_protocol_error() {
    let client = http_client(Duration::from_secs(5)).await;
    let err = client
        .store_transactions(&[TryteString::null(2673)])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert!(err.to_string().contains("Invalid trytes input"));
}

#[tokio::test]
async fn unexpected_response_shape_is_a_protocol_error() {
    let client = http_client(Duration::from_secs(5)).await;
    let err = client.get_trytes(&[hash('B')]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

#[tokio::test]
async fn non_object_body_is_a_protocol_error() {
    let client = http_client(Duration::from_secs(5)).await;
    let err = client.interrupt_attaching_to_tangle().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

#[tokio::test]
async fn slow_node_times_out_as_transport_error() {
    let client = http_client(Duration::from_millis(200)).await;
    let err = client.get_transactions_to_approve(3).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.to_string().contains("timed out"));
}

#[tokio::test]
async fn body_stalling_past_timeout_is_a_transport_error() {
    let url = serve(Router::new().route("/", post(stalling_node))).await;
    let endpoint = HttpEndpoint::with_timeout(url, Duration::from_millis(300)).unwrap();
    let client = RoutingClient::new(OperationRouter::new(Arc::new(endpoint)));

    let err = client.find_transactions(&[hash('X')]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn unreachable_node_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let endpoint = HttpEndpoint::with_timeout(format!("http://{addr}/"), Duration::from_secs(2)).unwrap();
    let client = RoutingClient::new(OperationRouter::new(Arc::new(endpoint)));
    let err = client.find_transactions(&[hash('X')]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn composite_operations_have_no_wire_command() {
    let endpoint = HttpEndpoint::new(start_node().await).unwrap();
    let err = endpoint
        .execute(Operation::SendTransfer, json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
