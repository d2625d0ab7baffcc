//! Transport-level tests of the JSON-RPC server: envelope handling, batch
//! shapes, error codes and CORS.

use alloy_primitives::B256;
use tokio::runtime;
use warden_provider::{Provider, ProviderConfig};
use warden_server::server;

/// Serves a provider whose config-backed methods need no upstream.
async fn serve() -> anyhow::Result<String> {
    let config = ProviderConfig::new("http://127.0.0.1:9".to_string(), 1, B256::ZERO);
    let provider = Provider::new(runtime::Handle::current(), config)?;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("http://{}", listener.local_addr()?);
    tokio::spawn(async move {
        axum::serve(listener, server::router(provider)).await.unwrap();
    });
    Ok(url)
}

async fn post(url: &str, body: &str) -> anyhow::Result<serde_json::Value> {
    let response = reqwest::Client::new()
        .post(url)
        .header("content-type", "application/json")
        .body(body.to_string())
        .send()
        .await?;
    Ok(response.json().await?)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn single_envelope() -> anyhow::Result<()> {
    let url = serve().await?;

    let response = post(
        &url,
        r#"{"jsonrpc":"2.0","id":1,"method":"eth_chainId","params":[]}"#,
    )
    .await?;
    assert_eq!(
        response,
        serde_json::json!({ "jsonrpc": "2.0", "id": 1, "result": "0x1" })
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn batch_envelope_preserves_ids() -> anyhow::Result<()> {
    let url = serve().await?;

    let response = post(
        &url,
        r#"[
            {"jsonrpc":"2.0","id":7,"method":"eth_chainId","params":[]},
            {"jsonrpc":"2.0","id":"b","method":"net_version","params":[]},
            {"jsonrpc":"2.0","id":9,"method":"eth_blockNumber","params":[]}
        ]"#,
    )
    .await?;

    assert_eq!(
        response,
        serde_json::json!([
            { "jsonrpc": "2.0", "id": 7, "result": "0x1" },
            { "jsonrpc": "2.0", "id": "b", "result": "1" },
            { "jsonrpc": "2.0", "id": 9, "result": "0x1" }
        ])
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn envelope_error_codes() -> anyhow::Result<()> {
    let url = serve().await?;

    let parse_error = post(&url, "{not json").await?;
    assert_eq!(parse_error["error"]["code"], serde_json::json!(-32700));

    let invalid_request =
        post(&url, r#"{"id":1,"method":"eth_chainId","params":[]}"#).await?;
    assert_eq!(invalid_request["error"]["code"], serde_json::json!(-32600));

    let method_not_found = post(
        &url,
        r#"{"jsonrpc":"2.0","id":1,"method":"eth_coinbase","params":[]}"#,
    )
    .await?;
    assert_eq!(method_not_found["error"]["code"], serde_json::json!(-32601));

    let invalid_params = post(
        &url,
        r#"{"jsonrpc":"2.0","id":1,"method":"eth_getBalance","params":["not-an-address"]}"#,
    )
    .await?;
    assert_eq!(invalid_params["error"]["code"], serde_json::json!(-32602));

    let unsupported_tag = post(
        &url,
        r#"{"jsonrpc":"2.0","id":1,"method":"eth_getBalance","params":["0x1a0dfd0252700c79fc54269577bbeed16773f17a","pending"]}"#,
    )
    .await?;
    assert_eq!(unsupported_tag["error"]["code"], serde_json::json!(-32602));

    let empty_batch = post(&url, "[]").await?;
    assert_eq!(empty_batch["error"]["code"], serde_json::json!(-32600));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cors_allows_any_origin() -> anyhow::Result<()> {
    let url = serve().await?;

    let response = reqwest::Client::new()
        .post(&url)
        .header("content-type", "application/json")
        .header("origin", "https://dapp.example")
        .body(r#"{"jsonrpc":"2.0","id":1,"method":"eth_chainId","params":[]}"#)
        .send()
        .await?;

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );
    Ok(())
}
