//! API request handlers

use crate::dashboard::DashboardState;
use crate::SharedState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use gitdash_analyzer::{generate_insight, DashboardSummary, InsightError};
use gitdash_collector::{Aggregate, AggregateError};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }

    pub fn err(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Self>) {
        (
            status,
            Json(Self {
                success: false,
                data: None,
                error: Some(message.into()),
            }),
        )
    }
}

/// Aggregate plus everything derived from it
#[derive(Serialize)]
pub struct DashboardView {
    pub aggregate: Aggregate,
    pub summary: DashboardSummary,
}

impl DashboardView {
    fn new(aggregate: Aggregate) -> Self {
        let summary = DashboardSummary::build(&aggregate, Utc::now());
        Self { aggregate, summary }
    }
}

/// Controller state as exposed to clients
#[derive(Serialize)]
pub struct StateView {
    pub query: String,
    pub loading: bool,
    pub error: Option<String>,
    pub generation: u64,
    pub dashboard: Option<DashboardView>,
}

impl From<DashboardState> for StateView {
    fn from(state: DashboardState) -> Self {
        Self {
            query: state.query,
            loading: state.loading,
            error: state.error,
            generation: state.generation,
            dashboard: state.aggregate.map(DashboardView::new),
        }
    }
}

fn aggregate_status(err: &AggregateError) -> StatusCode {
    match err {
        AggregateError::EmptyInput => StatusCode::BAD_REQUEST,
        AggregateError::ProfileNotFound(_) => StatusCode::NOT_FOUND,
        AggregateError::FetchFailed(_) => StatusCode::BAD_GATEWAY,
    }
}

fn insight_status(err: &InsightError) -> StatusCode {
    match err {
        InsightError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        InsightError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        _ => StatusCode::BAD_GATEWAY,
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Aggregate a profile without touching the dashboard state
pub async fn get_user(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> impl IntoResponse {
    match state.aggregator.aggregate(&username).await {
        Ok(aggregate) => ApiResponse::ok(DashboardView::new(aggregate)).into_response(),
        Err(e) => {
            warn!(username = username, error = %e, "Profile lookup failed");
            ApiResponse::<()>::err(aggregate_status(&e), e.to_string()).into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub username: String,
}

/// Submit a query to the dashboard
pub async fn search(
    State(state): State<SharedState>,
    Json(request): Json<SearchRequest>,
) -> impl IntoResponse {
    let (snapshot, failure) = state.dashboard.search(&state.aggregator, &request.username).await;
    let status = failure.as_ref().map_or(StatusCode::OK, aggregate_status);
    let error = failure.map(|e| e.to_string());

    (
        status,
        Json(ApiResponse {
            success: error.is_none(),
            data: Some(StateView::from(snapshot)),
            error,
        }),
    )
}

/// Current dashboard state
pub async fn get_state(State(state): State<SharedState>) -> impl IntoResponse {
    ApiResponse::ok(StateView::from(state.dashboard.snapshot().await))
}

#[derive(Serialize)]
struct InsightResult {
    login: String,
    text: String,
}

/// Generate a profile analysis for the dashboard's current aggregate
pub async fn generate_profile_insight(State(state): State<SharedState>) -> impl IntoResponse {
    let Some(generator) = state.generator.as_ref() else {
        return ApiResponse::<()>::err(
            StatusCode::SERVICE_UNAVAILABLE,
            "Profile analysis is not configured",
        )
        .into_response();
    };

    let Some(aggregate) = state.dashboard.current().await else {
        return ApiResponse::<()>::err(StatusCode::CONFLICT, "No profile loaded")
            .into_response();
    };

    match generate_insight(generator.as_ref(), &aggregate).await {
        Ok(text) => ApiResponse::ok(InsightResult {
            login: aggregate.user.login,
            text,
        })
        .into_response(),
        Err(e) => {
            error!(login = aggregate.user.login, error = %e, "Profile analysis failed");
            ApiResponse::<()>::err(insight_status(&e), e.to_string()).into_response()
        }
    }
}
