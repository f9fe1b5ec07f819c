use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Duration;
use serde::Deserialize;
use serde_json::json;

use crate::api::error_response;
use crate::infrastructure::AppState;
use crate::services::catalog;
use crate::services::scoring::{self, ScoreInput, CONSISTENCY_WINDOW_DAYS};

#[derive(Debug, Deserialize)]
pub struct ScopeQuery {
    /// Absent = individual scope
    pub league_id: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/stats",
    params(("user_id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Stats with current score and tier"),
        (status = 404, description = "No stats recorded for this user/scope")
    )
)]
pub async fn get_user_stats(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<ScopeQuery>,
) -> impl IntoResponse {
    let stats = match state.stats_repo.load_stats(user_id, query.league_id).await {
        Ok(Some(stats)) => stats,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "not_found", "message": "No stats recorded yet" })),
            )
                .into_response();
        }
        Err(e) => return error_response(e),
    };

    let today = state.clock.today();
    let from = (today - Duration::days(CONSISTENCY_WINDOW_DAYS - 1))
        .format("%Y-%m-%d")
        .to_string();
    let to = today.format("%Y-%m-%d").to_string();

    let window_pages = match state
        .stats_repo
        .pages_in_window(user_id, query.league_id, &from, &to)
        .await
    {
        Ok(pages) => pages,
        Err(e) => return error_response(e),
    };

    let score = scoring::compute_score(&ScoreInput {
        books_completed: stats.books_completed,
        total_pages_read: stats.total_pages_read,
        total_achievements: stats.total_achievements,
        current_streak: stats.current_streak,
        window_pages,
    });

    (
        StatusCode::OK,
        Json(json!({
            "stats": stats,
            "score": score.value,
            "tier": score.tier.as_str(),
        })),
    )
        .into_response()
}

pub async fn list_achievements(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<ScopeQuery>,
) -> impl IntoResponse {
    let rows = match state
        .stats_repo
        .achievements_for(user_id, query.league_id)
        .await
    {
        Ok(rows) => rows,
        Err(e) => return error_response(e),
    };

    let achievements: Vec<_> = rows
        .into_iter()
        .map(|earned| {
            let definition = catalog::find(&earned.achievement_type);
            json!({
                "type": earned.achievement_type,
                "earned_at": earned.earned_at,
                "notified": earned.notified,
                "title": definition.map(|d| d.title.as_str()),
                "description": definition.map(|d| d.description.as_str()),
                "icon": definition.map(|d| d.icon.as_str()),
                "xp_reward": definition.map(|d| d.xp_reward),
            })
        })
        .collect();

    (
        StatusCode::OK,
        Json(json!({
            "achievements": achievements,
            "total": achievements.len(),
        })),
    )
        .into_response()
}
