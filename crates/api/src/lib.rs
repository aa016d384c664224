//! GitDash Web API
//!
//! Axum-based JSON API over the profile aggregator, with the dashboard's
//! session state and an optional static front end.

pub mod dashboard;
mod handlers;
mod routes;

pub use dashboard::{Dashboard, DashboardState};
pub use routes::create_router;

use gitdash_analyzer::TextGenerator;
use gitdash_collector::ProfileAggregator;
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    pub aggregator: ProfileAggregator,
    pub dashboard: Dashboard,
    pub generator: Option<Arc<dyn TextGenerator>>,
}

impl AppState {
    pub fn new(aggregator: ProfileAggregator) -> Self {
        Self {
            aggregator,
            dashboard: Dashboard::new(),
            generator: None,
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }
}

pub type SharedState = Arc<AppState>;
