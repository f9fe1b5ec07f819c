//! End-to-end tests for the progress-update facade

use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set};

use readquest::db;
use readquest::domain::errors::EngineError;
use readquest::domain::{ProgressCommit, StatsRepository};
use readquest::infrastructure::SeaOrmStatsRepository;
use readquest::models::{achievement, league, league_member, user_stats};
use readquest::services::progress::{self, ProgressRequest, ProgressResult};
use readquest::services::{FixedClock, UpdateLocks};

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn request(user_id: i64, pages: i64, activity: NaiveDate) -> ProgressRequest {
    ProgressRequest {
        user_id,
        pages_read: pages,
        activity_date: Some(activity),
        league_id: None,
        book_finished: false,
        weekly_top_reader: false,
    }
}

async fn record(
    db: &DatabaseConnection,
    req: ProgressRequest,
) -> Result<ProgressResult, EngineError> {
    let repo = SeaOrmStatsRepository::new(db.clone());
    let locks = UpdateLocks::new();
    let clock = FixedClock::new(date(2025, 3, 1));
    progress::record_progress(&repo, &clock, &locks, req).await
}

// Helper to seed an existing stats row
async fn seed_stats(
    db: &DatabaseConnection,
    user_id: i64,
    current_streak: i32,
    longest_streak: i32,
    last_activity_date: Option<&str>,
    books_completed: i32,
    total_pages_read: i64,
    total_achievements: i32,
    xp: i64,
) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let stats = user_stats::ActiveModel {
        user_id: Set(user_id),
        league_id: Set(None),
        current_streak: Set(current_streak),
        longest_streak: Set(longest_streak),
        last_activity_date: Set(last_activity_date.map(|s| s.to_string())),
        books_completed: Set(books_completed),
        total_pages_read: Set(total_pages_read),
        xp: Set(xp),
        level: Set(1),
        total_achievements: Set(total_achievements),
        version: Set(1),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let res = user_stats::Entity::insert(stats)
        .exec(db)
        .await
        .expect("Failed to seed stats");
    res.last_insert_id
}

// Helper to seed an earned achievement so total_achievements stays
// consistent with the rows
async fn seed_achievement(db: &DatabaseConnection, user_id: i64, achievement_type: &str) {
    let earned = achievement::ActiveModel {
        user_id: Set(user_id),
        league_id: Set(None),
        achievement_type: Set(achievement_type.to_string()),
        earned_at: Set(chrono::Utc::now().to_rfc3339()),
        notified: Set(true),
        ..Default::default()
    };
    earned
        .insert(db)
        .await
        .expect("Failed to seed achievement");
}

async fn seed_league(db: &DatabaseConnection, goal_pages: i64, members: &[i64]) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let new_league = league::ActiveModel {
        name: Set("Spring Readers".to_string()),
        goal_pages: Set(goal_pages),
        goal_books: Set(0),
        track: Set("pages".to_string()),
        status: Set("active".to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    };
    let league_id = league::Entity::insert(new_league)
        .exec(db)
        .await
        .expect("Failed to create league")
        .last_insert_id;

    for user_id in members {
        let member = league_member::ActiveModel {
            league_id: Set(league_id),
            user_id: Set(*user_id),
            joined_at: Set(now.clone()),
            ..Default::default()
        };
        member.insert(db).await.expect("Failed to add member");
    }

    league_id
}

#[tokio::test]
async fn first_update_creates_stats_and_starts_streak() {
    let db = setup_test_db().await;

    let result = record(&db, request(1, 30, date(2025, 3, 1)))
        .await
        .expect("record_progress failed");

    assert_eq!(result.stats.current_streak, 1);
    assert_eq!(result.stats.longest_streak, 1);
    assert_eq!(result.stats.total_pages_read, 30);
    assert_eq!(
        result.stats.last_activity_date.as_deref(),
        Some("2025-03-01")
    );

    // The very first activity day is itself a streak milestone
    let types: Vec<&str> = result
        .new_achievements
        .iter()
        .map(|a| a.achievement_type.as_str())
        .collect();
    assert!(types.contains(&"1_day_streak"));
    assert_eq!(result.stats.xp, 10);
}

#[tokio::test]
async fn same_day_update_adds_pages_but_not_streak() {
    let db = setup_test_db().await;

    let first = record(&db, request(1, 20, date(2025, 3, 1)))
        .await
        .expect("first update failed");
    let second = record(&db, request(1, 25, date(2025, 3, 1)))
        .await
        .expect("second update failed");

    assert_eq!(second.stats.total_pages_read, 45);
    assert_eq!(second.stats.current_streak, first.stats.current_streak);

    // No achievement fires twice
    let types: Vec<&str> = second
        .new_achievements
        .iter()
        .map(|a| a.achievement_type.as_str())
        .collect();
    assert!(!types.contains(&"1_day_streak"));

    // total_achievements matches the stored rows
    let rows = achievement::Entity::find()
        .filter(achievement::Column::UserId.eq(1i64))
        .count(&db)
        .await
        .expect("count failed");
    assert_eq!(rows as i32, second.stats.total_achievements);
}

#[tokio::test]
async fn consecutive_day_extends_streak_and_fires_milestone() {
    let db = setup_test_db().await;
    seed_stats(&db, 1, 6, 6, Some("2025-03-06"), 0, 600, 1, 10).await;
    seed_achievement(&db, 1, "1_day_streak").await;

    let result = record(&db, request(1, 40, date(2025, 3, 7)))
        .await
        .expect("record_progress failed");

    assert_eq!(result.stats.current_streak, 7);
    assert_eq!(result.stats.longest_streak, 7);

    let seven: Vec<_> = result
        .new_achievements
        .iter()
        .filter(|a| a.achievement_type == "7_day_streak")
        .collect();
    assert_eq!(seven.len(), 1);
    assert_eq!(seven[0].xp_reward, 50);
    // Milestone XP lands in the same update
    assert_eq!(result.stats.xp, 60);
    assert_eq!(result.stats.total_achievements, 2);
}

#[tokio::test]
async fn gap_resets_streak_but_keeps_longest() {
    let db = setup_test_db().await;
    seed_stats(&db, 1, 12, 12, Some("2025-03-01"), 0, 900, 0, 0).await;

    let result = record(&db, request(1, 10, date(2025, 3, 10)))
        .await
        .expect("record_progress failed");

    assert_eq!(result.stats.current_streak, 1);
    assert_eq!(result.stats.longest_streak, 12);
}

#[tokio::test]
async fn backdated_update_is_rejected() {
    let db = setup_test_db().await;
    seed_stats(&db, 1, 3, 3, Some("2025-03-05"), 0, 100, 0, 0).await;

    let err = record(&db, request(1, 10, date(2025, 3, 4)))
        .await
        .expect_err("backdating must fail");
    assert!(matches!(err, EngineError::InvalidActivityDate));

    // Nothing was persisted
    let stats = user_stats::Entity::find()
        .filter(user_stats::Column::UserId.eq(1i64))
        .one(&db)
        .await
        .expect("query failed")
        .expect("stats row present");
    assert_eq!(stats.total_pages_read, 100);
    assert_eq!(stats.last_activity_date.as_deref(), Some("2025-03-05"));
}

#[tokio::test]
async fn fifth_book_fires_collector_exactly_once() {
    let db = setup_test_db().await;
    seed_stats(&db, 1, 1, 1, Some("2025-02-28"), 4, 1200, 1, 10).await;
    seed_achievement(&db, 1, "1_day_streak").await;

    let mut req = request(1, 30, date(2025, 3, 1));
    req.book_finished = true;
    let result = record(&db, req).await.expect("record_progress failed");

    assert_eq!(result.stats.books_completed, 5);
    let collector: Vec<_> = result
        .new_achievements
        .iter()
        .filter(|a| a.achievement_type == "book_collector")
        .collect();
    assert_eq!(collector.len(), 1);
    assert_eq!(collector[0].xp_reward, 300);
    // first_book crossed long ago, must not fire now
    assert!(!result
        .new_achievements
        .iter()
        .any(|a| a.achievement_type == "first_book"));

    // Counter matches stored achievement rows for the scope
    let rows = achievement::Entity::find()
        .filter(achievement::Column::UserId.eq(1i64))
        .filter(achievement::Column::LeagueId.is_null())
        .count(&db)
        .await
        .expect("count failed");
    assert_eq!(rows as i32, result.stats.total_achievements);

    // A sixth and seventh book later must not re-fire the 5-book milestone
    let mut again = request(1, 10, date(2025, 3, 2));
    again.book_finished = true;
    let result = record(&db, again).await.expect("second book failed");
    assert_eq!(result.stats.books_completed, 6);
    assert!(!result
        .new_achievements
        .iter()
        .any(|a| a.achievement_type == "book_collector"));
}

#[tokio::test]
async fn speed_reader_uses_accumulated_day_total() {
    let db = setup_test_db().await;

    let first = record(&db, request(1, 30, date(2025, 3, 1)))
        .await
        .expect("first update failed");
    assert!(!first
        .new_achievements
        .iter()
        .any(|a| a.achievement_type == "speed_reader"));

    // 30 + 25 pages on the same day crosses the 50-page style threshold
    let second = record(&db, request(1, 25, date(2025, 3, 1)))
        .await
        .expect("second update failed");
    assert!(second
        .new_achievements
        .iter()
        .any(|a| a.achievement_type == "speed_reader"));
}

#[tokio::test]
async fn tier_transition_is_reported() {
    let db = setup_test_db().await;
    // Score 18 (Beginner): books 15, pages 3
    seed_stats(&db, 1, 0, 0, None, 5, 350, 0, 0).await;

    // 50 pages: streak starts (1), speed_reader + 1_day_streak fire,
    // score crosses into Novice
    let result = record(&db, request(1, 50, date(2025, 3, 1)))
        .await
        .expect("record_progress failed");

    assert!(result.level_changed, "expected Beginner -> Novice");
    assert_eq!(result.tier.as_str(), "Novice");
    assert!(result.score >= 20);
}

#[tokio::test]
async fn unknown_league_is_rejected() {
    let db = setup_test_db().await;

    let mut req = request(1, 10, date(2025, 3, 1));
    req.league_id = Some(99);
    let err = record(&db, req).await.expect_err("must fail");
    assert!(matches!(err, EngineError::UnknownLeague));

    // Existing league, but user is not a member
    let league_id = seed_league(&db, 1000, &[2]).await;
    let mut req = request(1, 10, date(2025, 3, 1));
    req.league_id = Some(league_id);
    let err = record(&db, req).await.expect_err("must fail");
    assert!(matches!(err, EngineError::UnknownLeague));
}

#[tokio::test]
async fn league_scope_is_independent_and_ranked() {
    let db = setup_test_db().await;
    let league_id = seed_league(&db, 1000, &[1, 2]).await;

    let mut req = request(1, 120, date(2025, 3, 1));
    req.league_id = Some(league_id);
    let result = record(&db, req).await.expect("league update failed");

    let types: Vec<&str> = result
        .new_achievements
        .iter()
        .map(|a| a.achievement_type.as_str())
        .collect();
    assert!(types.contains(&"community_contributor"));
    assert!(types.contains(&"league_100_pages"));
    // Individual-only style rules must not fire in league scope
    assert!(!types.contains(&"speed_reader"));

    assert_eq!(result.leaderboard_rank, Some(1));
    assert_eq!(result.stats.league_id, Some(league_id));

    // The individual scope saw nothing
    let individual = user_stats::Entity::find()
        .filter(user_stats::Column::UserId.eq(1i64))
        .filter(user_stats::Column::LeagueId.is_null())
        .one(&db)
        .await
        .expect("query failed");
    assert!(individual.is_none());
}

#[tokio::test]
async fn weekly_top_reader_fires_on_caller_flag() {
    let db = setup_test_db().await;
    let league_id = seed_league(&db, 1000, &[1]).await;

    let mut req = request(1, 10, date(2025, 3, 1));
    req.league_id = Some(league_id);
    req.weekly_top_reader = true;
    let result = record(&db, req).await.expect("league update failed");

    assert!(result
        .new_achievements
        .iter()
        .any(|a| a.achievement_type == "weekly_top_reader"));
}

#[tokio::test]
async fn corrupt_stats_row_is_quarantined() {
    let db = setup_test_db().await;
    // longest_streak < current_streak violates the stored invariant
    seed_stats(&db, 1, 9, 3, Some("2025-02-28"), 0, 100, 0, 0).await;

    let err = record(&db, request(1, 10, date(2025, 3, 1)))
        .await
        .expect_err("corrupt record must be quarantined");
    assert!(matches!(err, EngineError::CorruptStats(_)));
}

#[tokio::test]
async fn stale_version_surfaces_as_conflict() {
    let db = setup_test_db().await;
    let stats_id = seed_stats(&db, 1, 1, 1, Some("2025-03-01"), 0, 50, 0, 0).await;

    let repo = SeaOrmStatsRepository::new(db.clone());
    let commit = ProgressCommit {
        stats_id: Some(stats_id),
        expected_version: 99, // does not match the stored version
        user_id: 1,
        league_id: None,
        current_streak: 2,
        longest_streak: 2,
        last_activity_date: "2025-03-02".to_string(),
        books_completed: 0,
        total_pages_read: 70,
        xp: 0,
        level: 1,
        total_achievements: 0,
        session_date: "2025-03-02".to_string(),
        session_pages: 20,
        new_achievements: vec![],
        earned_at: chrono::Utc::now().to_rfc3339(),
    };

    let err = repo
        .commit_update(commit)
        .await
        .expect_err("stale version must conflict");
    assert!(matches!(err, EngineError::PersistenceConflict));

    // The row is untouched
    let stats = user_stats::Entity::find_by_id(stats_id)
        .one(&db)
        .await
        .expect("query failed")
        .expect("row present");
    assert_eq!(stats.total_pages_read, 50);
}

#[tokio::test]
async fn replayed_update_does_not_duplicate_achievements() {
    let db = setup_test_db().await;

    record(&db, request(1, 60, date(2025, 3, 1)))
        .await
        .expect("first update failed");
    // Same-day replay, as after an at-least-once retry
    let replay = record(&db, request(1, 0, date(2025, 3, 1)))
        .await
        .expect("replay failed");

    assert!(replay.new_achievements.is_empty());

    let rows = achievement::Entity::find()
        .filter(achievement::Column::UserId.eq(1i64))
        .count(&db)
        .await
        .expect("count failed");
    assert_eq!(rows as i32, replay.stats.total_achievements);
}
