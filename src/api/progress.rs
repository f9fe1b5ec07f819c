use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::api::error_response;
use crate::infrastructure::AppState;
use crate::services::motivation::{self, MessageType, MotivationEvent, RECENT_EXCLUSION};
use crate::services::progress::{self, ProgressRequest, ProgressResult};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProgressPayload {
    pub user_id: i64,
    pub pages_read: i64,
    /// 'YYYY-MM-DD'; defaults to today when absent
    pub activity_date: Option<String>,
    pub league_id: Option<i32>,
    /// The user finished a book with this update
    #[serde(default)]
    pub book_finished: bool,
    /// League-specific condition supplied by the caller
    #[serde(default)]
    pub weekly_top_reader: bool,
}

#[utoipa::path(
    post,
    path = "/api/progress",
    request_body = ProgressPayload,
    responses(
        (status = 200, description = "Progress recorded, returns updated stats and new achievements"),
        (status = 400, description = "Backdated activity date or invalid payload"),
        (status = 404, description = "Unknown league or user not a member"),
        (status = 503, description = "Concurrent update conflict, retry later")
    )
)]
pub async fn record_progress(
    State(state): State<AppState>,
    Json(payload): Json<ProgressPayload>,
) -> impl IntoResponse {
    let activity_date = match payload.activity_date.as_deref() {
        None => None,
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "validation",
                        "message": "activity_date must be formatted as YYYY-MM-DD"
                    })),
                )
                    .into_response();
            }
        },
    };

    let request = ProgressRequest {
        user_id: payload.user_id,
        pages_read: payload.pages_read,
        activity_date,
        league_id: payload.league_id,
        book_finished: payload.book_finished,
        weekly_top_reader: payload.weekly_top_reader,
    };

    let result = match progress::record_progress(
        state.stats_repo.as_ref(),
        state.clock.as_ref(),
        state.update_locks.as_ref(),
        request,
    )
    .await
    {
        Ok(result) => result,
        Err(e) => return error_response(e),
    };

    // The engine returns data only; this handler is the notifying caller
    // and renders the celebration lines
    let celebrations = render_celebrations(&state, &result).await;

    (
        StatusCode::OK,
        Json(json!({
            "stats": result.stats,
            "score": result.score,
            "tier": result.tier.as_str(),
            "new_achievements": result.new_achievements,
            "level_changed": result.level_changed,
            "leaderboard_rank": result.leaderboard_rank,
            "celebrations": celebrations,
        })),
    )
        .into_response()
}

/// Best effort: a failure to pick or log a message never fails the update
/// that was already committed
async fn render_celebrations(state: &AppState, result: &ProgressResult) -> Vec<String> {
    let repo = state.stats_repo.as_ref();
    let user_id = result.stats.user_id;
    let now = Utc::now().to_rfc3339();
    let mut rng = StdRng::from_entropy();
    let mut lines = Vec::new();
    let mut delivered = Vec::new();

    for earned in &result.new_achievements {
        let recent = match repo
            .recent_messages(user_id, MessageType::AchievementEarned.as_str(), RECENT_EXCLUSION)
            .await
        {
            Ok(recent) => recent,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "failed to load recent messages");
                Vec::new()
            }
        };

        let message = motivation::select_message(
            &MotivationEvent {
                kind: MessageType::AchievementEarned,
                streak_level: earned.streak_level,
                title: &earned.title,
            },
            &recent,
            &mut rng,
        );

        if let Err(e) = repo
            .log_message(
                user_id,
                MessageType::AchievementEarned.as_str(),
                &message,
                &now,
            )
            .await
        {
            tracing::warn!(user_id, error = %e, "failed to log celebration message");
        } else {
            delivered.push(earned.achievement_type.clone());
        }
        lines.push(message);
    }

    if result.level_changed {
        let recent = repo
            .recent_messages(user_id, MessageType::LevelUp.as_str(), RECENT_EXCLUSION)
            .await
            .unwrap_or_default();
        let message = motivation::select_message(
            &MotivationEvent {
                kind: MessageType::LevelUp,
                streak_level: None,
                title: result.tier.as_str(),
            },
            &recent,
            &mut rng,
        );
        if let Err(e) = repo
            .log_message(user_id, MessageType::LevelUp.as_str(), &message, &now)
            .await
        {
            tracing::warn!(user_id, error = %e, "failed to log level-up message");
        }
        lines.push(message);
    }

    if let Err(e) = repo
        .mark_notified(user_id, result.stats.league_id, &delivered)
        .await
    {
        tracing::warn!(user_id, error = %e, "failed to mark achievements notified");
    }

    lines
}
