//! Integration tests for Telegram delivery

use crate::fixtures;
use margin_signal::config::TelegramConfig;
use margin_signal::delivery::{DeliveryError, MessageSink, TelegramSink};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEND_PATH: &str = "/bot123:abc/sendMessage";

#[tokio::test]
async fn test_send_escapes_markdown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(body_partial_json(json!({
            "chat_id": "-100",
            "parse_mode": "MarkdownV2",
            "text": "\\#*PEPE* \\+12\\.5%",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let sink = TelegramSink::new(&fixtures::telegram_config(&server, None)).unwrap();
    tokio_test::assert_ok!(sink.send("#*PEPE* +12.5%").await);
}

#[tokio::test]
async fn test_rejected_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: can't parse entities",
        })))
        .mount(&server)
        .await;

    let sink = TelegramSink::new(&fixtures::telegram_config(&server, None)).unwrap();
    let err = sink.send("hello").await.unwrap_err();

    match err {
        DeliveryError::Rejected { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("can't parse entities"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_channel() {
    // Reserve a port, then free it so nothing listens there
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let server = MockServer::start().await;
    let config = TelegramConfig {
        api_url: format!("http://{addr}"),
        ..fixtures::telegram_config(&server, None)
    };

    let sink = TelegramSink::new(&config).unwrap();
    let err = sink.send("hello").await.unwrap_err();
    assert!(matches!(err, DeliveryError::Transport(_)));
}

#[tokio::test]
async fn test_alert_goes_to_error_chat_as_plain_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let sink = TelegramSink::new(&fixtures::telegram_config(&server, Some("-200"))).unwrap();
    sink.alert("Borrow snapshot fetch failed: timeout.").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["chat_id"], "-200");
    assert_eq!(body["text"], "Borrow snapshot fetch failed: timeout.");
    assert!(body.get("parse_mode").is_none());
}
