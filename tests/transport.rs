//! `OpenAiTransport` against a one-shot local HTTP responder.
//!
//! These exercise the real reqwest client end to end: headers, body shape,
//! status mapping, and the URL download path of the input resolver.

mod common;

use common::{completion, init_tracing, serve_once, white_jpeg};
use serde_json::json;
use whiteboard_summary::pipeline::encode::EncodedPayload;
use whiteboard_summary::pipeline::llm::{build_request, request_summary};
use whiteboard_summary::{
    summarize, ChatTransport, Credential, ExportFormat, OpenAiTransport, SummaryConfig,
    SummaryError,
};

fn config_for(base_url: &str) -> SummaryConfig {
    SummaryConfig::builder()
        .base_url(format!("{base_url}/v1"))
        .build()
        .unwrap()
}

fn payload() -> EncodedPayload {
    EncodedPayload {
        bytes: vec![0xFF, 0xD8, 0xFF, 0xD9],
        width: 1,
        height: 1,
    }
}

fn transport(config: &SummaryConfig) -> OpenAiTransport {
    OpenAiTransport::new(Credential::new("sk-test-123").unwrap(), config).unwrap()
}

#[tokio::test]
async fn success_posts_bearer_json_to_chat_completions() {
    init_tracing();
    let body = serde_json::to_vec(&completion("Q1 targets: 50 units")).unwrap();
    let (base_url, server) = serve_once(200, "application/json", body).await;
    let config = config_for(&base_url);

    let reply = request_summary(&transport(&config), &payload(), &config)
        .await
        .unwrap();
    assert_eq!(reply.summary, "Q1 targets: 50 units");
    assert_eq!((reply.input_tokens, reply.output_tokens), (85, 9));

    let captured = server.await.unwrap();
    assert!(
        captured.head.starts_with("post /v1/chat/completions http/1.1"),
        "{}",
        captured.head
    );
    assert!(captured.head.contains("authorization: bearer sk-test-123"));
    assert!(captured.head.contains("content-type: application/json"));

    let sent = captured.json();
    assert_eq!(sent, serde_json::to_value(build_request(&payload(), &config)).unwrap());
    assert_eq!(sent["messages"][0]["content"][1]["type"], "image_url");
    assert_eq!(
        sent["messages"][0]["content"][1]["image_url"]["url"],
        "data:image/jpeg;base64,/9j/2Q=="
    );
}

#[tokio::test]
async fn unauthorized_keeps_the_service_message() {
    let body = json!({
        "error": {
            "message": "Incorrect API key provided: sk-test-123.",
            "type": "invalid_request_error",
            "code": "invalid_api_key"
        }
    });
    let (base_url, server) =
        serve_once(401, "application/json", serde_json::to_vec(&body).unwrap()).await;
    let config = config_for(&base_url);

    let err = transport(&config)
        .send(&build_request(&payload(), &config))
        .await
        .unwrap_err();
    match err {
        SummaryError::Auth { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key provided: sk-test-123.");
        }
        other => panic!("expected Auth, got {other:?}"),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn server_error_is_a_transport_error() {
    let (base_url, server) =
        serve_once(503, "text/plain", b"upstream overloaded".to_vec()).await;
    let config = config_for(&base_url);

    let err = transport(&config)
        .send(&build_request(&payload(), &config))
        .await
        .unwrap_err();
    assert!(matches!(err, SummaryError::Transport { .. }), "got {err:?}");
    assert!(err.to_string().contains("upstream overloaded"));
    server.await.unwrap();
}

#[tokio::test]
async fn bad_request_is_rejected_not_retried() {
    let body = json!({ "error": { "message": "The model `nope` does not exist" } });
    let (base_url, server) =
        serve_once(404, "application/json", serde_json::to_vec(&body).unwrap()).await;
    let config = config_for(&base_url);

    let err = transport(&config)
        .send(&build_request(&payload(), &config))
        .await
        .unwrap_err();
    assert!(
        matches!(err, SummaryError::Rejected { status: 404, ref message } if message.contains("nope")),
        "got {err:?}"
    );
    server.await.unwrap();
}

#[tokio::test]
async fn non_json_success_is_a_response_error() {
    let (base_url, server) = serve_once(200, "text/html", b"<html>hi</html>".to_vec()).await;
    let config = config_for(&base_url);

    let err = transport(&config)
        .send(&build_request(&payload(), &config))
        .await
        .unwrap_err();
    assert!(matches!(err, SummaryError::Response { .. }), "got {err:?}");
    server.await.unwrap();
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let config = config_for(&base_url);

    let err = transport(&config)
        .send(&build_request(&payload(), &config))
        .await
        .unwrap_err();
    assert!(matches!(err, SummaryError::Transport { .. }), "got {err:?}");
}

#[tokio::test]
async fn url_input_is_downloaded_then_summarised() {
    init_tracing();
    let (image_base, image_server) = serve_once(200, "image/jpeg", white_jpeg(100, 100)).await;
    let body = serde_json::to_vec(&completion("From a URL")).unwrap();
    let (api_base, api_server) = serve_once(200, "application/json", body).await;

    let config = config_for(&api_base);
    let credential = Credential::new("sk-test-123").unwrap();
    let output = summarize(format!("{image_base}/board.jpg"), &credential, &config)
        .await
        .unwrap();

    assert_eq!(output.summary, "From a URL");
    assert_eq!((output.stats.image_width, output.stats.image_height), (100, 100));
    assert!(output.artifact(ExportFormat::Pdf).is_some());

    let download = image_server.await.unwrap();
    assert!(download.head.starts_with("get /board.jpg"));
    let api = api_server.await.unwrap();
    assert!(api.head.contains("authorization: bearer sk-test-123"));
}

#[tokio::test]
async fn failed_download_sends_no_request() {
    let (image_base, image_server) = serve_once(404, "text/plain", b"gone".to_vec()).await;
    // Nothing listens here; reaching it would be a Transport error instead.
    let config = config_for("http://127.0.0.1:9");
    let credential = Credential::new("sk-test-123").unwrap();

    let err = summarize(format!("{image_base}/board.jpg"), &credential, &config)
        .await
        .unwrap_err();
    assert!(matches!(err, SummaryError::DownloadFailed { .. }), "got {err:?}");
    image_server.await.unwrap();
}
