//! Dashboard controller
//!
//! Owns the single-session state behind the HTTP surface: the current query,
//! the loading flag, the last error and the last aggregate. Every submitted
//! query gets a new generation; a response that comes back for an older
//! generation is dropped, so the last submitted query wins.

use gitdash_collector::{Aggregate, AggregateError, ProfileAggregator};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardState {
    pub query: String,
    pub loading: bool,
    pub error: Option<String>,
    pub aggregate: Option<Aggregate>,
    pub generation: u64,
}

/// Handle for one in-flight query
#[derive(Debug)]
pub struct Ticket {
    generation: u64,
    query: String,
}

impl Ticket {
    pub fn query(&self) -> &str {
        &self.query
    }
}

#[derive(Debug, Default)]
pub struct Dashboard {
    state: RwLock<DashboardState>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new query. Blank input records an error and returns `None`.
    pub async fn begin(&self, query: &str) -> Option<Ticket> {
        let query = query.trim();
        let mut state = self.state.write().await;

        if query.is_empty() {
            state.error = Some(AggregateError::EmptyInput.to_string());
            return None;
        }

        state.generation += 1;
        state.query = query.to_string();
        state.loading = true;
        state.error = None;

        debug!(query = query, generation = state.generation, "Query started");
        Some(Ticket {
            generation: state.generation,
            query: query.to_string(),
        })
    }

    /// Apply the outcome of a query. Returns `false` if a newer query was
    /// started in the meantime and the outcome was discarded.
    pub async fn complete(
        &self,
        ticket: Ticket,
        result: Result<Aggregate, AggregateError>,
    ) -> bool {
        let mut state = self.state.write().await;

        if ticket.generation != state.generation {
            debug!(
                query = ticket.query,
                generation = ticket.generation,
                current = state.generation,
                "Discarding stale result"
            );
            return false;
        }

        state.loading = false;
        match result {
            Ok(aggregate) => {
                info!(query = ticket.query, "Dashboard updated");
                state.error = None;
                state.aggregate = Some(aggregate);
            }
            Err(e) => {
                warn!(query = ticket.query, error = %e, "Query failed");
                state.error = Some(e.to_string());
                state.aggregate = None;
            }
        }

        true
    }

    /// Run one query end to end and return the resulting state along with
    /// the query's own failure, if it had one
    pub async fn search(
        &self,
        aggregator: &ProfileAggregator,
        query: &str,
    ) -> (DashboardState, Option<AggregateError>) {
        let failure = match self.begin(query).await {
            Some(ticket) => {
                let result = aggregator.aggregate(ticket.query()).await;
                let failure = result.as_ref().err().cloned();
                self.complete(ticket, result).await;
                failure
            }
            None => Some(AggregateError::EmptyInput),
        };
        (self.snapshot().await, failure)
    }

    pub async fn snapshot(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    /// Last successful aggregate, if any
    pub async fn current(&self) -> Option<Aggregate> {
        self.state.read().await.aggregate.clone()
    }
}
