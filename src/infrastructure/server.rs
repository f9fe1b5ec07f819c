// Server module - Provides the reusable router assembly
// Used by main.rs and by integration tests

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::api;
use crate::infrastructure::AppState;
use crate::services::OffsetClock;

/// Build the API router with database connection
pub fn build_router(db: DatabaseConnection, day_offset_hours: i32) -> Router {
    let state = AppState::new(db, Arc::new(OffsetClock::new(day_offset_hours)));
    let api_router = api::api_router(state);

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new().nest("/api", api_router).layer(cors)
}
