//! GitDash Data Collector
//!
//! Fetches a GitHub account's profile, repositories, events and organizations
//! and reduces them into a single dashboard aggregate.

pub mod aggregator;
pub mod github;
pub mod models;

pub use aggregator::{merge_languages, AggregateError, ProfileAggregator};
pub use github::{GithubClient, GithubGateway};
pub use models::*;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("GitHub API returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Invalid request URL: {0}")]
    Url(String),

    #[error("Invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),
}

pub type Result<T> = std::result::Result<T, CollectorError>;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Configuration for the GitHub client
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub api_url: String,
    pub github_token: Option<String>,
    pub user_agent: String,
    /// Per-request timeout; `None` waits indefinitely.
    pub timeout_seconds: Option<u64>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            api_url: std::env::var("GITDASH_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            github_token: std::env::var("GITHUB_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            user_agent: format!("GitDash/{}", env!("CARGO_PKG_VERSION")),
            timeout_seconds: Some(30),
        }
    }
}
