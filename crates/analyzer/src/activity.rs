//! Recent activity feed

use chrono::{DateTime, Utc};
use gitdash_collector::Event;
use serde::Serialize;

/// Maximum number of entries in the activity feed
pub const FEED_LENGTH: usize = 8;

/// Event types the dashboard knows how to display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Push,
    Create,
    Watch,
    Fork,
    Issues,
    PullRequest,
    Other,
}

impl EventKind {
    pub fn from_type(event_type: &str) -> Self {
        match event_type {
            "PushEvent" => EventKind::Push,
            "CreateEvent" => EventKind::Create,
            "WatchEvent" => EventKind::Watch,
            "ForkEvent" => EventKind::Fork,
            "IssuesEvent" => EventKind::Issues,
            "PullRequestEvent" => EventKind::PullRequest,
            _ => EventKind::Other,
        }
    }

    /// Verb and accent colour, or `None` for kinds the feed ignores
    pub fn display(self) -> Option<(&'static str, &'static str)> {
        match self {
            EventKind::Push => Some(("Pushed to", "green")),
            EventKind::Create => Some(("Created", "purple")),
            EventKind::Watch => Some(("Starred", "yellow")),
            EventKind::Fork => Some(("Forked", "blue")),
            EventKind::Issues => Some(("Opened an issue in", "red")),
            EventKind::PullRequest => Some(("Opened a pull request in", "cyan")),
            EventKind::Other => None,
        }
    }
}

/// One rendered line of the activity feed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityItem {
    pub kind: EventKind,
    pub verb: &'static str,
    pub color: &'static str,
    pub repo: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl ActivityItem {
    fn from_event(event: &Event) -> Option<Self> {
        let kind = EventKind::from_type(&event.event_type);
        let (verb, color) = kind.display()?;

        Some(Self {
            kind,
            verb,
            color,
            repo: event.repo.name.clone(),
            url: format!("https://github.com/{}", event.repo.name),
            created_at: event.created_at,
        })
    }
}

/// First [`FEED_LENGTH`] events of a recognized kind, in source order
pub fn recent_activity(events: &[Event]) -> Vec<ActivityItem> {
    events
        .iter()
        .filter_map(ActivityItem::from_event)
        .take(FEED_LENGTH)
        .collect()
}
