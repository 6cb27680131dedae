mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

use common::TestServer;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory");
    Ok(())
}

#[tokio::test]
async fn root_lists_the_service() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server.client.get(server.url("/")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["name"], "SoundShelf API");
    assert!(body["endpoints"]["tracks"].is_string());
    Ok(())
}
