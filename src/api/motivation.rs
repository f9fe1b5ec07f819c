use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

use crate::api::error_response;
use crate::infrastructure::AppState;
use crate::services::motivation::{self, MessageType, MotivationEvent, RECENT_EXCLUSION};

/// Called by the external broadcast timer; the engine owns no scheduling
pub async fn daily_motivation(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> impl IntoResponse {
    let recent = match state
        .stats_repo
        .recent_messages(user_id, MessageType::DailyMotivation.as_str(), RECENT_EXCLUSION)
        .await
    {
        Ok(recent) => recent,
        Err(e) => return error_response(e),
    };

    let message = motivation::select_message(
        &MotivationEvent {
            kind: MessageType::DailyMotivation,
            streak_level: None,
            title: "",
        },
        &recent,
        &mut StdRng::from_entropy(),
    );

    let now = Utc::now().to_rfc3339();
    if let Err(e) = state
        .stats_repo
        .log_message(user_id, MessageType::DailyMotivation.as_str(), &message, &now)
        .await
    {
        return error_response(e);
    }

    (StatusCode::OK, Json(json!({ "message": message }))).into_response()
}
