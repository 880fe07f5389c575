//! End-to-end tests against a listening server.

use std::time::Duration;

use serde_json::{json, Value};

mod common;

use common::{FakeChain, AGW, EMBEDDED};

async fn open_session(client: &reqwest::Client, base: &str) -> String {
    let body: Value = client
        .post(format!("{base}/sessions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = body["session_id"].as_str().unwrap().to_string();

    client
        .put(format!("{base}/sessions/{id}/provider"))
        .json(&json!({"status": "ready"}))
        .send()
        .await
        .unwrap()
        .error_for_status()
        .unwrap();
    client
        .put(format!("{base}/sessions/{id}/identity"))
        .json(&common::identity())
        .send()
        .await
        .unwrap()
        .error_for_status()
        .unwrap();
    id
}

#[tokio::test]
async fn test_summary_over_http() {
    let chain = FakeChain::default()
        .with_signers(AGW, &["0x1111111111111111111111111111111111111111"])
        .with_balance(AGW, "7");
    let addr = common::spawn_server(common::server(common::configured(), chain)).await;
    let base = format!("http://{addr}");
    let client = reqwest::Client::builder()
        .user_agent("integration-suite/1.0")
        .build()
        .unwrap();

    let id = open_session(&client, &base).await;
    client
        .put(format!("{base}/sessions/{id}/contract"))
        .json(&json!({"address": AGW}))
        .send()
        .await
        .unwrap()
        .error_for_status()
        .unwrap();
    let state: Value = client
        .post(format!("{base}/sessions/{id}/contract/lookup"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(state["signer_match"], "mismatch");

    let response = client
        .get(format!("{base}/sessions/{id}/summary"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let content_type = response.headers()[reqwest::header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/plain"));

    let text = response.text().await.unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[2], format!("Embedded Wallet: {EMBEDDED}"));
    assert_eq!(
        lines[4],
        "AGW Signer (k1Owner): 0x1111111111111111111111111111111111111111"
    );
    assert_eq!(lines[5], "Signer Matches Embedded Wallet: NO");
    assert_eq!(lines[6], "USDC at AGW on Polygon: 7");
    assert_eq!(lines.last(), Some(&"Client: integration-suite/1.0"));
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let chain = FakeChain::default()
        .with_signers(AGW, &[EMBEDDED])
        .with_delay(Duration::from_millis(50));
    let addr = common::spawn_server(common::server(common::configured(), chain)).await;
    let base = format!("http://{addr}");
    let client = reqwest::Client::new();

    let first = open_session(&client, &base).await;
    let second = open_session(&client, &base).await;

    client
        .put(format!("{base}/sessions/{first}/contract"))
        .json(&json!({"address": AGW}))
        .send()
        .await
        .unwrap();
    let (looked_up, other) = tokio::join!(
        client
            .post(format!("{base}/sessions/{first}/contract/lookup"))
            .send(),
        client.get(format!("{base}/sessions/{second}")).send(),
    );
    let looked_up: Value = looked_up.unwrap().json().await.unwrap();
    let other: Value = other.unwrap().json().await.unwrap();

    assert_eq!(looked_up["signer_match"], "matches");
    assert_eq!(other["phase"], "awaiting_contract_address");
    assert!(other["signers"].is_null());
}

#[tokio::test]
async fn test_unconfigured_server_answers_503() {
    let addr = common::spawn_server(common::server(
        agw_recovery::RecoveryConfig::default(),
        FakeChain::default(),
    ))
    .await;

    let response = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Configuration error: app_id is not set");
}

#[tokio::test]
async fn test_idle_sessions_are_swept() {
    let mut config = common::configured();
    config.server.session_idle_secs = 1;
    let addr = common::spawn_server(common::server(config, FakeChain::default())).await;
    let base = format!("http://{addr}");
    let client = reqwest::Client::new();

    let id = open_session(&client, &base).await;
    let health: Value = client
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["sessions"], 1);

    tokio::time::sleep(Duration::from_millis(1700)).await;

    // `/health` does not touch sessions, so only the sweeper can have dropped it.
    let health: Value = client
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["sessions"], 0);

    let response = client
        .get(format!("{base}/sessions/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}
