//! GitHub REST API gateway

use crate::models::{Event, LanguageBytes, Organization, Profile, Repository};
use crate::{CollectorConfig, CollectorError, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// GitHub page size used for repository and event listings
pub const PAGE_SIZE: u32 = 100;

/// Read-only access to the GitHub endpoints the dashboard needs
#[async_trait]
pub trait GithubGateway: Send + Sync {
    async fn user(&self, username: &str) -> Result<Profile>;

    async fn repos(&self, username: &str) -> Result<Vec<Repository>>;

    async fn events(&self, username: &str) -> Result<Vec<Event>>;

    async fn orgs(&self, username: &str) -> Result<Vec<Organization>>;

    async fn languages(&self, repo: &Repository) -> Result<LanguageBytes>;
}

/// GitHub API client
pub struct GithubClient {
    client: Client,
    base: Url,
}

impl GithubClient {
    /// Create a new GitHub client
    pub fn new(config: CollectorConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)?,
        );

        if let Some(ref token) = config.github_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = Client::builder().default_headers(headers);
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        let base = Url::parse(&config.api_url)
            .map_err(|e| CollectorError::Url(format!("{}: {}", config.api_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(CollectorError::Url(config.api_url));
        }

        Ok(Self { client, base })
    }

    /// Build an API URL from escaped path segments
    fn endpoint(&self, segments: &[&str], per_page: Option<u32>) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| CollectorError::Url(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);

        if let Some(n) = per_page {
            url.query_pairs_mut().append_pair("per_page", &n.to_string());
        }

        Ok(url)
    }

    fn languages_endpoint(&self, repo: &Repository) -> Result<Url> {
        if !repo.languages_url.is_empty() {
            return Url::parse(&repo.languages_url)
                .map_err(|e| CollectorError::Url(format!("{}: {}", repo.languages_url, e)));
        }

        let (owner, name) = repo
            .full_name
            .split_once('/')
            .ok_or_else(|| CollectorError::Url(format!("no owner for repo {}", repo.name)))?;
        self.endpoint(&["repos", owner, name, "languages"], None)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(url = %url, "GET");

        let response = self.client.get(url.clone()).send().await?;
        check_rate_limit(&response)?;

        if !response.status().is_success() {
            return Err(CollectorError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl GithubGateway for GithubClient {
    async fn user(&self, username: &str) -> Result<Profile> {
        self.get_json(self.endpoint(&["users", username], None)?).await
    }

    async fn repos(&self, username: &str) -> Result<Vec<Repository>> {
        self.get_json(self.endpoint(&["users", username, "repos"], Some(PAGE_SIZE))?)
            .await
    }

    async fn events(&self, username: &str) -> Result<Vec<Event>> {
        self.get_json(self.endpoint(&["users", username, "events"], Some(PAGE_SIZE))?)
            .await
    }

    async fn orgs(&self, username: &str) -> Result<Vec<Organization>> {
        self.get_json(self.endpoint(&["users", username, "orgs"], None)?)
            .await
    }

    async fn languages(&self, repo: &Repository) -> Result<LanguageBytes> {
        self.get_json(self.languages_endpoint(repo)?).await
    }
}

fn check_rate_limit(response: &reqwest::Response) -> Result<()> {
    let status = response.status();
    let headers = response.headers();

    let exhausted = status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN
            && headers
                .get("x-ratelimit-remaining")
                .is_some_and(|remaining| remaining == "0"));

    if !exhausted {
        return Ok(());
    }

    let reset = headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    let wait = match reset {
        Some(reset) => reset.saturating_sub(Utc::now().timestamp().max(0) as u64),
        None => 60,
    };

    Err(CollectorError::RateLimited(wait))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_url: &str) -> GithubClient {
        GithubClient::new(CollectorConfig {
            api_url: api_url.to_string(),
            github_token: None,
            user_agent: "gitdash-test".to_string(),
            timeout_seconds: None,
        })
        .unwrap()
    }

    fn repo(full_name: &str, languages_url: &str) -> Repository {
        Repository {
            id: 1,
            name: full_name.rsplit('/').next().unwrap().to_string(),
            full_name: full_name.to_string(),
            html_url: String::new(),
            description: None,
            stargazers_count: 0,
            forks_count: 0,
            watchers_count: 0,
            language: None,
            topics: Vec::new(),
            private: false,
            fork: false,
            languages_url: languages_url.to_string(),
        }
    }

    #[test]
    fn test_listing_endpoints_carry_page_size() {
        let gh = client("https://api.github.com");
        let url = gh.endpoint(&["users", "octocat", "repos"], Some(PAGE_SIZE)).unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/users/octocat/repos?per_page=100");

        let url = gh.endpoint(&["users", "octocat", "orgs"], None).unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/users/octocat/orgs");
    }

    #[test]
    fn test_username_is_escaped() {
        let gh = client("https://api.github.com/");
        let url = gh.endpoint(&["users", "octo/cat?x"], None).unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/users/octo%2Fcat%3Fx");
    }

    #[test]
    fn test_base_url_with_prefix() {
        let gh = client("https://ghe.example.com/api/v3");
        let url = gh.endpoint(&["users", "octocat"], None).unwrap();
        assert_eq!(url.as_str(), "https://ghe.example.com/api/v3/users/octocat");
    }

    #[test]
    fn test_languages_endpoint_prefers_payload_url() {
        let gh = client("https://api.github.com");
        let r = repo(
            "octocat/Hello-World",
            "https://api.github.com/repos/octocat/Hello-World/languages",
        );
        assert_eq!(
            gh.languages_endpoint(&r).unwrap().as_str(),
            "https://api.github.com/repos/octocat/Hello-World/languages"
        );

        let r = repo("octocat/Spoon-Knife", "");
        assert_eq!(
            gh.languages_endpoint(&r).unwrap().as_str(),
            "https://api.github.com/repos/octocat/Spoon-Knife/languages"
        );
    }

    fn response(status: u16, headers: &[(&str, &str)]) -> reqwest::Response {
        let mut builder = http::Response::builder().status(status);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        reqwest::Response::from(builder.body("").unwrap())
    }

    #[test]
    fn test_too_many_requests_is_rate_limited() {
        let result = check_rate_limit(&response(429, &[]));
        assert!(matches!(result, Err(CollectorError::RateLimited(60))));
    }

    #[test]
    fn test_forbidden_with_exhausted_quota_is_rate_limited() {
        let reset = (Utc::now().timestamp() + 120).to_string();
        let result = check_rate_limit(&response(
            403,
            &[("x-ratelimit-remaining", "0"), ("x-ratelimit-reset", &reset)],
        ));
        match result {
            Err(CollectorError::RateLimited(wait)) => assert!((110..=120).contains(&wait)),
            other => panic!("expected rate limit, got {:?}", other),
        }
    }

    #[test]
    fn test_reset_in_the_past_waits_zero() {
        let result = check_rate_limit(&response(
            403,
            &[("x-ratelimit-remaining", "0"), ("x-ratelimit-reset", "1")],
        ));
        assert!(matches!(result, Err(CollectorError::RateLimited(0))));
    }

    #[test]
    fn test_plain_forbidden_is_not_rate_limited() {
        assert!(check_rate_limit(&response(403, &[])).is_ok());
        assert!(check_rate_limit(&response(403, &[("x-ratelimit-remaining", "12")])).is_ok());
        assert!(check_rate_limit(&response(200, &[("x-ratelimit-remaining", "0")])).is_ok());
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = GithubClient::new(CollectorConfig {
            api_url: "not a url".to_string(),
            ..CollectorConfig::default()
        });
        assert!(matches!(result, Err(CollectorError::Url(_))));
    }
}
