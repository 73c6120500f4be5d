//! Assistant client tests
//!
//! These tests use wiremock to stand in for the assistant backend.

use finassist_core::{
    AssistantClient, ChartError, ConversationState, ExchangeController, ExchangeError, Message,
    ERROR_PLACEHOLDER,
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> AssistantClient {
    AssistantClient::new(&server.uri(), &format!("{}/chart", server.uri()))
}

async fn chat_server(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

// ============================================================================
// /chat
// ============================================================================

#[tokio::test]
async fn test_query_posts_user_input_and_returns_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(serde_json::json!({ "user_input": "AAPL price?" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "reply": "AAPL is at 190.12" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server).query("AAPL price?").await.unwrap();
    assert_eq!(reply, "AAPL is at 190.12");
}

#[tokio::test]
async fn test_query_non_2xx_is_status_error() {
    let server = chat_server(ResponseTemplate::new(500).set_body_string(r#"{"detail": "boom"}"#)).await;

    let err = client_for(&server).query("hi").await.unwrap_err();
    match err {
        ExchangeError::Status { status, body } => {
            assert_eq!(status.as_u16(), 500);
            assert!(body.contains("boom"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_query_missing_reply_field_is_malformed() {
    let server = chat_server(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "answer": "x" }))).await;

    let err = client_for(&server).query("hi").await.unwrap_err();
    assert!(matches!(err, ExchangeError::Malformed(_)));
}

#[tokio::test]
async fn test_query_non_json_body_is_malformed() {
    let server = chat_server(ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;

    let err = client_for(&server).query("hi").await.unwrap_err();
    assert!(matches!(err, ExchangeError::Malformed(_)));
}

#[tokio::test]
async fn test_query_unreachable_host_is_network_error() {
    // Nothing listens on port 9 on a test host
    let client = AssistantClient::new("http://127.0.0.1:9", "http://127.0.0.1:9/chart");

    let err = client.query("hi").await.unwrap_err();
    assert!(matches!(err, ExchangeError::Network(_)));
}

// ============================================================================
// Full exchanges over HTTP
// ============================================================================

#[tokio::test]
async fn test_exchange_with_chart_reply() {
    let server = chat_server(
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "reply": "see stock.png attached" })),
    )
    .await;
    let controller = ExchangeController::new(client_for(&server));
    let mut state = ConversationState::new();

    controller.submit(&mut state, "AAPL price?").await.unwrap();

    assert_eq!(
        state.messages(),
        &[
            Message::user("AAPL price?"),
            Message::assistant("see stock.png attached"),
        ]
    );
    assert!(state.chart_visible());
    assert!(!state.is_waiting());
}

#[tokio::test]
async fn test_exchange_failure_becomes_placeholder() {
    let server = chat_server(ResponseTemplate::new(503)).await;
    let controller = ExchangeController::new(client_for(&server));
    let mut state = ConversationState::new();

    controller.submit(&mut state, "plot MSFT").await.unwrap();

    assert_eq!(
        state.messages(),
        &[Message::user("plot MSFT"), Message::assistant(ERROR_PLACEHOLDER)]
    );
    assert!(!state.is_waiting());
    assert!(!state.chart_visible());
}

// ============================================================================
// Chart download
// ============================================================================

#[tokio::test]
async fn test_download_chart_writes_file() {
    let server = MockServer::start().await;
    let png = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 1, 2, 3];
    Mock::given(method("GET"))
        .and(path("/chart"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(png.clone()),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("charts").join("stock_chart.png");

    let written = client_for(&server).download_chart(&target).await.unwrap();

    assert_eq!(written, png.len() as u64);
    assert_eq!(std::fs::read(&target).unwrap(), png);
}

#[tokio::test]
async fn test_download_chart_missing_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chart"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("stock_chart.png");

    let err = client_for(&server).download_chart(&target).await.unwrap_err();
    assert!(matches!(err, ChartError::Status(s) if s.as_u16() == 404));
    assert!(!target.exists());
}
