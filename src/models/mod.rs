//! Defines the data structures and models used throughout the application.
//!
//! This includes the tracked `Project` projection read from the database and the
//! payloads returned by the GitHub API.

mod github;
mod project;

pub use github::*;
pub use project::*;
