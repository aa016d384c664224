//! GitDash Dashboard Analyzer
//!
//! Pure projections from an aggregate to the pieces the dashboard renders,
//! plus the generated profile analysis.

pub mod activity;
pub mod insight;
pub mod stats;

pub use activity::{recent_activity, ActivityItem, EventKind};
pub use insight::{
    build_prompt, generate_insight, InsightConfig, InsightError, OllamaGenerator, TextGenerator,
};
pub use stats::{language_shares, popular_repos, LanguageShare, PopularRepo, ProfileStats};

use chrono::{DateTime, Utc};
use gitdash_collector::{Aggregate, Organization, Profile};
use serde::Serialize;

/// Organization badge with its profile link
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrgBadge {
    pub login: String,
    pub avatar_url: String,
    pub url: String,
}

impl From<&Organization> for OrgBadge {
    fn from(org: &Organization) -> Self {
        Self {
            login: org.login.clone(),
            avatar_url: org.avatar_url.clone(),
            url: org.html_url(),
        }
    }
}

/// Everything one dashboard view shows, derived from a single aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub profile: Profile,
    pub stats: ProfileStats,
    pub languages: Vec<LanguageShare>,
    pub activity: Vec<ActivityItem>,
    pub organizations: Vec<OrgBadge>,
    pub popular_repos: Vec<PopularRepo>,
}

impl DashboardSummary {
    pub fn build(aggregate: &Aggregate, now: DateTime<Utc>) -> Self {
        Self {
            profile: aggregate.user.clone(),
            stats: ProfileStats::from_aggregate(aggregate, now),
            languages: language_shares(&aggregate.languages),
            activity: recent_activity(&aggregate.events),
            organizations: aggregate.orgs.iter().map(OrgBadge::from).collect(),
            popular_repos: popular_repos(&aggregate.repos, stats::POPULAR_REPOS),
        }
    }
}
