//! Provides a client for interacting with the GitHub REST API.
//!
//! Commands only need the rate limit of the authenticated user (or of the calling IP when no
//! token is configured), so that is all this client exposes.

use crate::error::{AppError, Result};
use crate::models::{RateLimit, RateLimitResponse};
use reqwest::Client;
use tracing::{debug, error, info};

const USER_AGENT: &str = concat!("tracker-cli/", env!("CARGO_PKG_VERSION"));

/// An asynchronous client for the GitHub REST API.
pub struct GitHubClient {
    client: Client,
    token: Option<String>,
    base_url: String,
}

impl GitHubClient {
    /// Creates a new `GitHubClient` against `base_url` (normally `https://api.github.com`).
    ///
    /// Requests are anonymous unless a token is given.
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetches the core API quota via `GET /rate_limit`.
    ///
    /// Querying this endpoint does not count against the quota.
    pub async fn rate_limit(&self) -> Result<RateLimit> {
        let url = format!("{}/rate_limit", self.base_url);
        info!("Fetching GitHub rate limit from {}", url);

        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            error!("Error requesting GitHub rate limit: {}", e);
            AppError::Api(e.into())
        })?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                let status = e.status();
                error!(
                    "GitHub rate limit request failed with status {}: {}",
                    status.unwrap_or_default(),
                    e
                );
                if status == Some(reqwest::StatusCode::UNAUTHORIZED) {
                    error!("Received 401. Check that GITHUB_TOKEN is valid.");
                }
                return Err(AppError::Api(e.into()));
            },
        };

        let body: RateLimitResponse = response.json().await.map_err(|e| {
            error!("Error parsing GitHub rate limit JSON: {}", e);
            AppError::Api(e.into())
        })?;

        debug!(
            "GitHub core quota: {}/{} remaining",
            body.resources.core.remaining, body.resources.core.limit
        );
        Ok(body.resources.core)
    }
}
