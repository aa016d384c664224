//! Profile aggregation
//!
//! Turns the raw GitHub responses for one username into an [`Aggregate`].
//! The four primary requests run concurrently, then one languages request
//! per repository. A failing languages request contributes nothing instead
//! of failing the whole query.

use crate::github::GithubGateway;
use crate::models::{Aggregate, LanguageBytes, LanguageUsage, Repository};
use crate::CollectorError;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Number of languages kept after sorting
pub const TOP_LANGUAGES: usize = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("Please enter a GitHub username")]
    EmptyInput,

    #[error("User \"{0}\" not found")]
    ProfileNotFound(String),

    #[error("Failed to fetch GitHub data: {0}")]
    FetchFailed(String),
}

impl From<CollectorError> for AggregateError {
    fn from(err: CollectorError) -> Self {
        AggregateError::FetchFailed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AggregateError>;

/// Builds dashboard aggregates from a [`GithubGateway`]
#[derive(Clone)]
pub struct ProfileAggregator {
    gateway: Arc<dyn GithubGateway>,
}

impl ProfileAggregator {
    pub fn new(gateway: Arc<dyn GithubGateway>) -> Self {
        Self { gateway }
    }

    /// Fetch and reduce everything the dashboard shows for `username`
    pub async fn aggregate(&self, username: &str) -> Result<Aggregate> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AggregateError::EmptyInput);
        }

        info!(username = username, "Aggregating GitHub profile");

        let gateway = self.gateway.as_ref();
        let profile = async {
            gateway.user(username).await.map_err(|e| match e {
                CollectorError::Status { .. } => {
                    AggregateError::ProfileNotFound(username.to_string())
                }
                other => other.into(),
            })
        };
        let repos = async { gateway.repos(username).await.map_err(AggregateError::from) };
        let events = async { gateway.events(username).await.map_err(AggregateError::from) };
        let orgs = async { gateway.orgs(username).await.map_err(AggregateError::from) };

        // A missing account 404s on every endpoint; only the profile may decide that.
        let secondary = async { Ok::<_, AggregateError>(tokio::try_join!(repos, events, orgs)) };
        let (user, rest) = tokio::try_join!(profile, secondary)?;
        let (repos, events, orgs) = rest?;

        let total_stars = repos.iter().map(|r| r.stargazers_count).sum();
        let total_forks = repos.iter().map(|r| r.forks_count).sum();

        let language_maps = self.fetch_languages(&repos).await;
        let languages = merge_languages(language_maps);

        info!(
            username = username,
            repos = repos.len(),
            events = events.len(),
            orgs = orgs.len(),
            languages = languages.len(),
            "Aggregated GitHub profile"
        );

        Ok(Aggregate {
            user,
            repos,
            events,
            orgs,
            languages,
            total_stars,
            total_forks,
        })
    }

    async fn fetch_languages(&self, repos: &[Repository]) -> Vec<LanguageBytes> {
        let requests = repos.iter().map(|repo| async move {
            match self.gateway.languages(repo).await {
                Ok(map) => {
                    debug!(repo = repo.name, count = map.len(), "Fetched languages");
                    map
                }
                Err(e) => {
                    warn!(repo = repo.name, error = %e, "Failed to fetch languages");
                    LanguageBytes::new()
                }
            }
        });

        join_all(requests).await
    }
}

/// Sum per-repository language maps and keep the largest [`TOP_LANGUAGES`]
///
/// Names are matched exactly. Ties keep the order in which a language was
/// first seen.
pub fn merge_languages<I>(maps: I) -> Vec<LanguageUsage>
where
    I: IntoIterator<Item = LanguageBytes>,
{
    let mut merged: Vec<LanguageUsage> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for map in maps {
        for (name, bytes) in map {
            match index.get(&name) {
                Some(&i) => merged[i].bytes = merged[i].bytes.saturating_add(bytes),
                None => {
                    index.insert(name.clone(), merged.len());
                    merged.push(LanguageUsage { name, bytes });
                }
            }
        }
    }

    merged.sort_by(|a, b| b.bytes.cmp(&a.bytes));
    merged.truncate(TOP_LANGUAGES);
    merged
}
