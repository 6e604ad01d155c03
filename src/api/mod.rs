//! Provides clients and utilities for interacting with external APIs.
//!
//! Includes:
//! - `github`: Client for the GitHub REST API (rate limit reporting).

mod github;
#[cfg(test)]
mod github_test;

pub use github::*;
