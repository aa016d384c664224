//! GitHub REST payloads and the dashboard aggregate

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Account-level metadata for a queried username
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub login: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    #[serde(default)]
    pub public_repos: u64,
    pub created_at: DateTime<Utc>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub twitter_username: Option<String>,
    pub blog: Option<String>,
}

impl Profile {
    /// Display name, falling back to the login
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.login)
    }
}

/// A public repository owned by the account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub html_url: String,
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub languages_url: String,
}

/// Repository reference carried by an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRepo {
    pub name: String,
}

/// Public activity record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub repo: EventRepo,
    pub created_at: DateTime<Utc>,
}

/// Organization membership
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: u64,
    pub login: String,
    pub avatar_url: String,
    pub description: Option<String>,
}

impl Organization {
    pub fn html_url(&self) -> String {
        format!("https://github.com/{}", self.login)
    }
}

/// Per-repository language name to byte count, in the order GitHub sent them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageBytes(Vec<(String, u64)>);

impl LanguageBytes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(name, bytes)| (name.as_str(), *bytes))
    }
}

impl FromIterator<(String, u64)> for LanguageBytes {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[(String, u64); N]> for LanguageBytes {
    fn from(entries: [(String, u64); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl IntoIterator for LanguageBytes {
    type Item = (String, u64);
    type IntoIter = std::vec::IntoIter<(String, u64)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Serialize for LanguageBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, bytes) in &self.0 {
            map.serialize_entry(name, bytes)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LanguageBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LanguageBytesVisitor;

        impl<'de> Visitor<'de> for LanguageBytesVisitor {
            type Value = LanguageBytes;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of language names to byte counts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, u64>()? {
                    entries.push(entry);
                }
                Ok(LanguageBytes(entries))
            }
        }

        deserializer.deserialize_map(LanguageBytesVisitor)
    }
}

/// Bytes of source attributed to one language across all repositories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageUsage {
    pub name: String,
    pub bytes: u64,
}

/// View model produced by one profile query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub user: Profile,
    pub repos: Vec<Repository>,
    pub events: Vec<Event>,
    pub orgs: Vec<Organization>,
    pub languages: Vec<LanguageUsage>,
    pub total_stars: u64,
    pub total_forks: u64,
}
