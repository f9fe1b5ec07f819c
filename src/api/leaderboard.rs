use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::api::error_response;
use crate::domain::EngineError;
use crate::infrastructure::AppState;
use crate::services::leaderboard;

#[utoipa::path(
    get,
    path = "/api/leagues/{league_id}/leaderboard",
    params(("league_id" = i32, Path, description = "League id")),
    responses(
        (status = 200, description = "Members ordered by progress"),
        (status = 404, description = "League not found")
    )
)]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Path(league_id): Path<i32>,
) -> impl IntoResponse {
    let league = match state.stats_repo.find_league(league_id).await {
        Ok(Some(league)) => league,
        Ok(None) => return error_response(EngineError::UnknownLeague),
        Err(e) => return error_response(e),
    };

    let standings = match state.stats_repo.league_standings(league_id).await {
        Ok(standings) => standings,
        Err(e) => return error_response(e),
    };

    let ranked = leaderboard::rank(&league, standings);

    (
        StatusCode::OK,
        Json(json!({
            "league_id": league.id,
            "name": league.name,
            "track": league.track,
            "leaderboard": ranked,
        })),
    )
        .into_response()
}
