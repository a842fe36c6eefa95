#![allow(dead_code)]

use std::{path::PathBuf, time::Duration};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use reqwest::Url;
use terminal_api::{app::build_app, config::StripeConfig, state::AppState, stripe::StripeClient};
use tower::ServiceExt;

pub const SECRET_KEY: &str = "sk_test_123";

pub fn stripe_config(api_base: &str) -> StripeConfig {
    let mut config = StripeConfig::new(SECRET_KEY, Url::parse(api_base).unwrap());
    config.max_network_retries = 0;
    config.initial_retry_delay = Duration::from_millis(1);
    config
}

pub fn test_app(api_base: &str) -> Router {
    test_app_with_static(api_base, PathBuf::from("client"))
}

pub fn test_app_with_static(api_base: &str, static_dir: PathBuf) -> Router {
    let stripe = StripeClient::new(stripe_config(api_base)).unwrap();
    build_app(AppState { stripe, static_dir })
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let res = app
        .oneshot(Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read_json(res).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    post_raw(app, uri, body.to_string(), &[]).await
}

pub async fn post_raw(
    app: Router,
    uri: &str,
    body: String,
    headers: &[(&str, &str)],
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let res = app
        .oneshot(builder.body(Body::from(body)).unwrap())
        .await
        .unwrap();
    read_json(res).await
}

async fn read_json(res: axum::response::Response) -> (StatusCode, serde_json::Value) {
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

pub fn reader_json(id: &str, action: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "object": "terminal.reader",
        "device_type": "simulated_wisepos_e",
        "label": "Simulated WisePOS E",
        "status": "online",
        "serial_number": "259cd19c-b902-4730-96a1-09183be0b5cd",
        "action": action,
    })
}

pub fn payment_intent_json(id: &str, amount: i64, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "object": "payment_intent",
        "amount": amount,
        "currency": "usd",
        "status": status,
        "capture_method": "manual",
        "payment_method_types": ["card_present"],
    })
}
