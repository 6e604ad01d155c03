//! Data structures for deserializing GitHub API responses.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

/// Response of `GET /rate_limit`.
#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitResponse {
    pub resources: RateLimitResources,
}

/// Only the `core` resource is read; other resources in the payload are ignored.
#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitResources {
    pub core: RateLimit,
}

/// Quota for one GitHub API resource.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    #[serde(default)]
    pub used: u64,
    /// Unix epoch seconds at which the quota resets.
    pub reset: i64,
}

impl RateLimit {
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.reset, 0).single()
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_rate_limit_payload() {
        let body = r#"{
            "resources": {
                "core": {"limit": 5000, "remaining": 4999, "reset": 1372700873, "used": 1},
                "search": {"limit": 30, "remaining": 18, "reset": 1372697452, "used": 12}
            },
            "rate": {"limit": 5000, "remaining": 4999, "reset": 1372700873, "used": 1}
        }"#;
        let parsed: RateLimitResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.resources.core.limit, 5000);
        assert_eq!(parsed.resources.core.remaining, 4999);
        assert!(!parsed.resources.core.is_exhausted());
        assert_eq!(
            parsed.resources.core.reset_at().unwrap().to_rfc3339(),
            "2013-07-01T17:47:53+00:00"
        );
    }
}
