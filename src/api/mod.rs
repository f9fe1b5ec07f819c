pub mod health;
pub mod leaderboard;
pub mod motivation;
pub mod progress;
pub mod stats;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::domain::EngineError;
use crate::infrastructure::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Progress updates (the engine's primary operation)
        .route("/progress", post(progress::record_progress))
        // Read-only accessors
        .route("/users/:user_id/stats", get(stats::get_user_stats))
        .route(
            "/users/:user_id/achievements",
            get(stats::list_achievements),
        )
        .route(
            "/users/:user_id/motivation",
            get(motivation::daily_motivation),
        )
        .route(
            "/leagues/:league_id/leaderboard",
            get(leaderboard::get_leaderboard),
        )
        .with_state(state)
}

/// Map engine errors onto HTTP responses. Validation failures stay 4xx;
/// conflicts surface as transient 503 after the engine's retry.
pub(crate) fn error_response(err: EngineError) -> Response {
    let (status, code) = match &err {
        EngineError::InvalidActivityDate => (StatusCode::BAD_REQUEST, "invalid_activity_date"),
        EngineError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
        EngineError::UnknownLeague => (StatusCode::NOT_FOUND, "unknown_league"),
        EngineError::PersistenceConflict => {
            (StatusCode::SERVICE_UNAVAILABLE, "persistence_conflict")
        }
        EngineError::CorruptStats(_) => (StatusCode::INTERNAL_SERVER_ERROR, "corrupt_stats"),
        EngineError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database"),
    };

    (
        status,
        Json(json!({ "error": code, "message": err.to_string() })),
    )
        .into_response()
}
