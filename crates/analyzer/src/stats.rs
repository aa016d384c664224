//! Headline numbers and rankings derived from an aggregate

use chrono::{DateTime, Utc};
use gitdash_collector::{Aggregate, LanguageUsage, Repository};
use serde::Serialize;

/// Repositories shown in the popular list
pub const POPULAR_REPOS: usize = 6;

/// Topics shown per popular repository
pub const TOPICS_PER_REPO: usize = 4;

/// Statistics cards shown above the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileStats {
    pub followers: u64,
    pub public_repos: u64,
    pub total_stars: u64,
    pub total_forks: u64,
    pub avg_stars_per_repo: f64,
    pub push_events: usize,
    pub years_on_github: i64,
}

impl ProfileStats {
    pub fn from_aggregate(aggregate: &Aggregate, now: DateTime<Utc>) -> Self {
        let avg_stars_per_repo = if aggregate.repos.is_empty() {
            0.0
        } else {
            let avg = aggregate.total_stars as f64 / aggregate.repos.len() as f64;
            (avg * 10.0).round() / 10.0
        };

        let push_events = aggregate
            .events
            .iter()
            .filter(|e| e.event_type == "PushEvent")
            .count();

        let years_on_github = ((now - aggregate.user.created_at).num_days() / 365).max(0);

        Self {
            followers: aggregate.user.followers,
            public_repos: aggregate.user.public_repos,
            total_stars: aggregate.total_stars,
            total_forks: aggregate.total_forks,
            avg_stars_per_repo,
            push_events,
            years_on_github,
        }
    }
}

/// Repository entry in the popular list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopularRepo {
    pub rank: usize,
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub language: Option<String>,
    pub topics: Vec<String>,
    pub private: bool,
}

/// Top `limit` repositories by stars; equal counts keep source order
pub fn popular_repos(repos: &[Repository], limit: usize) -> Vec<PopularRepo> {
    let mut sorted: Vec<&Repository> = repos.iter().collect();
    sorted.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count));

    sorted
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(idx, repo)| PopularRepo {
            rank: idx + 1,
            name: repo.name.clone(),
            url: repo.html_url.clone(),
            description: repo.description.clone(),
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            watchers: repo.watchers_count,
            language: repo.language.clone(),
            topics: repo.topics.iter().take(TOPICS_PER_REPO).cloned().collect(),
            private: repo.private,
        })
        .collect()
}

/// Language entry with its share of the displayed bytes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageShare {
    pub name: String,
    pub bytes: u64,
    pub percent: f64,
}

pub fn language_shares(languages: &[LanguageUsage]) -> Vec<LanguageShare> {
    let total: u64 = languages.iter().map(|l| l.bytes).sum();

    languages
        .iter()
        .map(|l| LanguageShare {
            name: l.name.clone(),
            bytes: l.bytes,
            percent: if total == 0 {
                0.0
            } else {
                l.bytes as f64 * 100.0 / total as f64
            },
        })
        .collect()
}
