//! Canned Binance payloads

use chrono::{DateTime, Duration, TimeZone, Utc};
use margin_signal::config::{ExchangeConfig, TelegramConfig};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const BORROW_REPAY_PATH: &str =
    "/bapi/margin/v1/public/margin/statistics/24h-borrow-and-repay";
pub const INVENTORY_PATH: &str = "/bapi/margin/v1/public/margin/marketStats/available-inventory";

/// Newest history bucket of every fixture series
pub fn anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 17, 9, 40, 0).unwrap()
}

/// Open times of 49 buckets, newest first
fn bucket_times() -> impl Iterator<Item = (i64, DateTime<Utc>)> {
    (0..49).map(|i| (i, anchor() - Duration::minutes(5 * i)))
}

pub fn exchange_config(server: &MockServer) -> ExchangeConfig {
    ExchangeConfig {
        spot_url: server.uri(),
        futures_url: server.uri(),
        margin_url: server.uri(),
        timeout_secs: 2,
        excluded_assets: vec!["USDT".to_string()],
        ..ExchangeConfig::default()
    }
}

pub fn telegram_config(server: &MockServer, error_chat_id: Option<&str>) -> TelegramConfig {
    TelegramConfig {
        token: "123:abc".to_string(),
        chat_id: "-100".to_string(),
        error_chat_id: error_chat_id.map(String::from),
        api_url: server.uri(),
    }
}

pub fn borrow_repay(coins: &[(&str, &str)]) -> Value {
    let coins: Vec<Value> = coins
        .iter()
        .map(|(asset, borrow)| {
            json!({
                "asset": asset,
                "totalBorrow": borrow,
                "totalRepay": "100",
                "totalBorrowInUsdt": "15.5",
                "totalRepayInUsdt": "1",
            })
        })
        .collect();

    json!({ "code": "000000", "success": true, "data": { "coins": coins } })
}

pub fn inventory(assets: &[(&str, &str)]) -> Value {
    let assets: serde_json::Map<String, Value> = assets
        .iter()
        .map(|(asset, amount)| (asset.to_string(), json!(amount)))
        .collect();

    json!({ "code": "000000", "success": true, "data": { "assets": assets } })
}

pub fn klines() -> Value {
    let rows: Vec<Value> = bucket_times()
        .map(|(i, open)| {
            let open_ms = open.timestamp_millis();
            let quote = 150 + i;
            let buy = 100 + i;
            json!([
                open_ms, "0.1", "0.2", "0.05", "0.15", "1000",
                open_ms + 299_999, quote.to_string(), 20, "600", buy.to_string(), "0"
            ])
        })
        .collect();
    Value::Array(rows)
}

pub fn open_interest(pair: &str) -> Value {
    let rows: Vec<Value> = bucket_times()
        .map(|(i, at)| {
            json!({
                "symbol": pair,
                "sumOpenInterest": "1000",
                "sumOpenInterestValue": (1000 + 10 * i).to_string(),
                "timestamp": at.timestamp_millis(),
            })
        })
        .collect();
    Value::Array(rows)
}

pub fn long_short_ratio(pair: &str) -> Value {
    let rows: Vec<Value> = bucket_times()
        .map(|(i, at)| {
            json!({
                "symbol": pair,
                "longAccount": "0.6",
                "shortAccount": "0.4",
                "longShortRatio": format!("2.{:02}", i),
                "timestamp": at.timestamp_millis(),
            })
        })
        .collect();
    Value::Array(rows)
}

pub fn premium_index(pair: &str) -> Value {
    json!({
        "symbol": pair,
        "markPrice": "0.00001",
        "lastFundingRate": "0.00010000",
        "nextFundingTime": (anchor() + Duration::hours(2)).timestamp_millis(),
        "time": anchor().timestamp_millis(),
    })
}

pub fn exchange_info(perpetuals: &[&str]) -> Value {
    let mut symbols: Vec<Value> = perpetuals
        .iter()
        .map(|s| json!({ "symbol": s, "contractType": "PERPETUAL", "status": "TRADING" }))
        .collect();
    symbols.push(json!({ "symbol": "BTCUSDT_251226", "contractType": "CURRENT_QUARTER", "status": "TRADING" }));
    symbols.push(json!({ "symbol": "OLDUSDT", "contractType": "PERPETUAL", "status": "SETTLING" }));

    json!({ "timezone": "UTC", "symbols": symbols })
}

/// Mount every market data endpoint for one pair
pub async fn mount_market_data(server: &MockServer, pair: &str) {
    let routes = [
        ("/api/v3/ticker/24hr", json!({
            "symbol": pair,
            "volume": "1000000",
            "quoteVolume": "25300000",
        })),
        ("/api/v3/klines", klines()),
        ("/fapi/v1/premiumIndex", premium_index(pair)),
        ("/futures/data/openInterestHist", open_interest(pair)),
        ("/futures/data/globalLongShortAccountRatio", long_short_ratio(pair)),
        ("/fapi/v1/exchangeInfo", exchange_info(&[pair])),
    ];

    for (route, body) in routes {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }
}
