//! End-to-end poll cycles against mocked Binance and Telegram

use crate::fixtures::{self, anchor, BORROW_REPAY_PATH, INVENTORY_PATH};
use chrono::Duration;
use margin_signal::config::PollConfig;
use margin_signal::cycle::{CycleDriver, CycleOutcome, CycleState};
use margin_signal::delivery::TelegramSink;
use margin_signal::exchange::{BinanceClient, BinanceConfig};
use serde_json::Value;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEND_PATH: &str = "/bot123:abc/sendMessage";

async fn mount_borrow_sequence(server: &MockServer, sequence: &[&[(&str, &str)]]) {
    for (i, coins) in sequence.iter().enumerate() {
        let mock = Mock::given(method("GET"))
            .and(path(BORROW_REPAY_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::borrow_repay(coins)));
        // The last response keeps answering
        let mock = if i + 1 < sequence.len() {
            mock.up_to_n_times(1)
        } else {
            mock
        };
        mock.mount(server).await;
    }

    Mock::given(method("GET"))
        .and(path(INVENTORY_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(fixtures::inventory(&[("PEPE", "2500")])),
        )
        .mount(server)
        .await;
}

fn driver(server: &MockServer) -> CycleDriver<BinanceClient, TelegramSink> {
    let exchange_config = fixtures::exchange_config(server);
    let exchange =
        Arc::new(BinanceClient::with_config(BinanceConfig::from(&exchange_config)).unwrap());
    let sink = Arc::new(TelegramSink::new(&fixtures::telegram_config(server, Some("-200"))).unwrap());
    let poll = PollConfig {
        retry_delay_ms: 0,
        ..PollConfig::default()
    };
    CycleDriver::new(exchange, sink, &exchange_config, &poll)
}

async fn sent_texts(server: &MockServer) -> Vec<(String, String)> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == SEND_PATH)
        .map(|r| {
            let body: Value = serde_json::from_slice(&r.body).unwrap();
            (
                body["chat_id"].as_str().unwrap_or_default().to_string(),
                body["text"].as_str().unwrap_or_default().to_string(),
            )
        })
        .collect()
}

#[tokio::test]
async fn test_borrow_increase_posts_report() {
    let server = MockServer::start().await;
    mount_borrow_sequence(
        &server,
        &[&[("PEPE", "1000"), ("USDT", "5")], &[("PEPE", "1500"), ("USDT", "9")]],
    )
    .await;
    fixtures::mount_market_data(&server, "PEPEUSDT").await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let driver = driver(&server);
    let mut state = CycleState::default();
    let now = anchor() + Duration::minutes(6);

    let first = driver.run_cycle(&mut state, now - Duration::minutes(5)).await;
    assert_eq!(first, CycleOutcome::Seeded { tracked: 1 });

    let second = driver.run_cycle(&mut state, now).await;
    assert_eq!(
        second,
        CycleOutcome::Reported {
            triggered: vec!["PEPE".to_string()],
            delivered: 1,
            failed: 0,
        }
    );

    let sent = sent_texts(&server).await;
    assert_eq!(sent.len(), 1);
    let (chat_id, text) = &sent[0];
    assert_eq!(chat_id, "-100");
    assert!(text.starts_with("\\#*PEPE*"));
    assert!(text.contains("Borrowed *$15\\.5* \\(1\\.5K PEPE\\) \\+50%"));
    assert!(text.contains("💣 OI: • _5m_ *\\-0\\.99*%"));
    assert!(text.contains("Funding rate *0\\.01*% in *1h 54min*"));
    assert!(text.ends_with("Last signal: never"));
}

#[tokio::test]
async fn test_snapshot_failure_alerts_and_recovers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(BORROW_REPAY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::borrow_repay(&[(
            "PEPE", "1000",
        )])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(BORROW_REPAY_PATH))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({ "code": "100001", "message": "bad" })),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_borrow_sequence(&server, &[&[("PEPE", "1000")]]).await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
        .mount(&server)
        .await;

    let driver = driver(&server);
    let mut state = CycleState::default();
    let now = anchor() + Duration::minutes(6);

    driver.run_cycle(&mut state, now).await;
    let failed = driver.run_cycle(&mut state, now).await;
    assert_eq!(failed, CycleOutcome::FetchFailed);
    assert!(state.previous.is_some());

    let recovered = driver.run_cycle(&mut state, now).await;
    assert_eq!(recovered, CycleOutcome::NoChange { new_assets: 0 });

    let sent = sent_texts(&server).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "-200");
    assert!(sent[0].1.starts_with("Borrow snapshot fetch failed"));
}
