use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::progress::record_progress,
        api::stats::get_user_stats,
        api::leaderboard::get_leaderboard,
    ),
    components(
        schemas(
            api::progress::ProgressPayload,
        )
    ),
    tags(
        (name = "readquest", description = "Reading-progress gamification API")
    )
)]
pub struct ApiDoc;
