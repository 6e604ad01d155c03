use crate::api::GitHubClient;
use crate::error::{AppError, Result};
use mockito::Matcher;
use serde_json::json;

fn rate_limit_body(remaining: u64) -> String {
    json!({
        "resources": {
            "core": {"limit": 5000, "remaining": remaining, "reset": 1_700_000_000, "used": 5000 - remaining},
            "search": {"limit": 30, "remaining": 30, "reset": 1_700_000_000, "used": 0}
        },
        "rate": {"limit": 5000, "remaining": remaining, "reset": 1_700_000_000, "used": 5000 - remaining}
    })
    .to_string()
}

#[tokio::test]
async fn test_rate_limit_anonymous() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/rate_limit")
        .match_header("user-agent", Matcher::Regex("^tracker-cli/".into()))
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(rate_limit_body(4321))
        .create_async()
        .await;

    let client = GitHubClient::new(&server.url(), None);
    let limit = client.rate_limit().await?;

    assert_eq!(limit.limit, 5000);
    assert_eq!(limit.remaining, 4321);
    assert_eq!(limit.used, 679);
    assert_eq!(limit.reset, 1_700_000_000);
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_rate_limit_sends_token() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/rate_limit")
        .match_header("authorization", "Bearer s3cret")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(rate_limit_body(0))
        .create_async()
        .await;

    // Trailing slash on the base URL must not produce `//rate_limit`.
    let client = GitHubClient::new(&format!("{}/", server.url()), Some("s3cret".to_string()));
    let limit = client.rate_limit().await?;

    assert!(limit.is_exhausted());
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_rate_limit_error_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/rate_limit")
        .with_status(401)
        .with_body(r#"{"message":"Bad credentials"}"#)
        .create_async()
        .await;

    let client = GitHubClient::new(&server.url(), Some("wrong".to_string()));
    let result = client.rate_limit().await;

    assert!(matches!(result, Err(AppError::Api(_))));
}

#[tokio::test]
async fn test_rate_limit_malformed_body() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/rate_limit")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"rate": "nope"}"#)
        .create_async()
        .await;

    let client = GitHubClient::new(&server.url(), None);
    assert!(matches!(client.rate_limit().await, Err(AppError::Api(_))));
}
