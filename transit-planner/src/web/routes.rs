//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::cache::PlanError;
use crate::domain::{StopId, TransitTime};
use crate::planner::QueryError;

use super::dto::*;
use super::state::AppState;

const DEFAULT_SEARCH_LIMIT: usize = 10;
const MAX_SEARCH_LIMIT: usize = 50;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stops/search", get(search_stops))
        .route("/journey/plan", get(plan_journey))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Search stops by id or name.
async fn search_stops(
    State(state): State<AppState>,
    Query(req): Query<StopSearchRequest>,
) -> Json<StopSearchResponse> {
    let limit = req.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).min(MAX_SEARCH_LIMIT);
    let stops = state
        .network()
        .search_stops(&req.q, limit)
        .into_iter()
        .map(StopSearchResult::from)
        .collect();

    Json(StopSearchResponse { stops })
}

/// Plan the earliest-arrival journey between two stops.
async fn plan_journey(
    State(state): State<AppState>,
    Query(req): Query<PlanJourneyRequest>,
) -> Result<Json<PlanJourneyResponse>, AppError> {
    let origin = parse_stop("origin", &req.from)?;
    let destination = parse_stop("destination", &req.to)?;

    let departure = TransitTime::parse_hms(&req.time).map_err(|e| AppError::BadRequest {
        message: format!("Invalid time {:?}: {e}", req.time),
    })?;

    let max_rounds = req
        .max_rounds
        .as_deref()
        .map(str::parse::<usize>)
        .transpose()
        .map_err(|_| AppError::BadRequest {
            message: format!(
                "Invalid max_rounds: {}",
                req.max_rounds.as_deref().unwrap_or("")
            ),
        })?;

    let outcome = state
        .planner
        .plan(&origin, &destination, departure, max_rounds)
        .await?;

    Ok(Json(PlanJourneyResponse::from_outcome(&outcome)))
}

fn parse_stop(role: &str, raw: &str) -> Result<StopId, AppError> {
    StopId::parse(raw).map_err(|_| AppError::BadRequest {
        message: format!("Missing {role} stop id"),
    })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::Query(QueryError::UnknownStop(_)) => AppError::NotFound {
                message: e.to_string(),
            },
            PlanError::Query(QueryError::InvalidMaxRounds) => AppError::BadRequest {
                message: e.to_string(),
            },
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "Request failed");
        } else {
            warn!(%status, %message, "Request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
