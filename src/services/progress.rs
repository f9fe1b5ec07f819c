//! Engine facade
//!
//! Processes one progress-update event as a single logical transaction:
//! load stats, advance the streak, update counters, detect achievements,
//! recompute score and level, persist everything atomically and return the
//! result bundle for the caller to render. The engine itself never sends
//! messages.

use chrono::{Duration, NaiveDate, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{EngineError, ProgressCommit, StatsRepository};
use crate::models::{league, user_stats};

use super::catalog::{self, Category, StreakLevel};
use super::clock::Clock;
use super::detector::{self, CommunityContext, DetectionInput, StatsSnapshot};
use super::leaderboard;
use super::scoring::{self, ScoreInput, Tier, CONSISTENCY_WINDOW_DAYS};
use super::streak;

const DATE_FMT: &str = "%Y-%m-%d";

/// One async lock per (user_id, scope). Updates for different keys proceed
/// fully in parallel; individual and league scopes of the same user are
/// independent keys.
pub type UpdateLocks = DashMap<(i64, Option<i32>), Arc<Mutex<()>>>;

#[derive(Debug, Clone)]
pub struct ProgressRequest {
    pub user_id: i64,
    pub pages_read: i64,
    /// Defaults to the clock's "today" when absent
    pub activity_date: Option<NaiveDate>,
    pub league_id: Option<i32>,
    /// The caller finished a book in this update
    pub book_finished: bool,
    /// Caller-supplied community condition, league scope only
    pub weekly_top_reader: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct EarnedAchievement {
    pub achievement_type: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub xp_reward: i64,
    pub streak_level: Option<StreakLevel>,
}

#[derive(Debug)]
pub struct ProgressResult {
    pub stats: user_stats::Model,
    pub score: i64,
    pub tier: Tier,
    pub new_achievements: Vec<EarnedAchievement>,
    pub level_changed: bool,
    pub leaderboard_rank: Option<u32>,
}

pub async fn record_progress(
    repo: &dyn StatsRepository,
    clock: &dyn Clock,
    locks: &UpdateLocks,
    req: ProgressRequest,
) -> Result<ProgressResult, EngineError> {
    if req.pages_read < 0 {
        return Err(EngineError::Validation(
            "pages_read must be non-negative".to_string(),
        ));
    }

    // Membership is checked before any state is touched
    let league = match req.league_id {
        Some(league_id) => {
            let league = repo
                .find_league(league_id)
                .await?
                .ok_or(EngineError::UnknownLeague)?;
            if !repo.is_member(league_id, req.user_id).await? {
                return Err(EngineError::UnknownLeague);
            }
            Some(league)
        }
        None => None,
    };

    let activity_date = req.activity_date.unwrap_or_else(|| clock.today());

    let key = (req.user_id, req.league_id);
    let lock = locks
        .entry(key)
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone();
    let _guard = lock.lock().await;

    // One retry with fresh state on a concurrent-write conflict
    let mut attempt = 0;
    loop {
        match apply_update(repo, &req, league.as_ref(), activity_date).await {
            Err(EngineError::PersistenceConflict) if attempt == 0 => {
                tracing::warn!(
                    user_id = req.user_id,
                    league_id = ?req.league_id,
                    "persistence conflict, retrying with fresh state"
                );
                attempt += 1;
            }
            result => return result,
        }
    }
}

async fn apply_update(
    repo: &dyn StatsRepository,
    req: &ProgressRequest,
    league: Option<&league::Model>,
    activity_date: NaiveDate,
) -> Result<ProgressResult, EngineError> {
    let existing = repo.load_stats(req.user_id, req.league_id).await?;

    let (stats_id, expected_version, stored) = match existing {
        Some(model) => {
            check_invariants(&model)?;
            (Some(model.id), model.version, model)
        }
        None => (None, 0, blank_stats(req.user_id, req.league_id)),
    };

    let last_activity = match stored.last_activity_date.as_deref() {
        Some(raw) => Some(parse_stored_date(&stored, raw)?),
        None => None,
    };

    let advance = streak::advance(
        stored.current_streak,
        stored.longest_streak,
        last_activity,
        activity_date,
    )?;

    tracing::debug!(
        user_id = req.user_id,
        league_id = ?req.league_id,
        streak = advance.current,
        gap_days = advance.gap_days,
        "streak advanced"
    );

    let date_str = activity_date.format(DATE_FMT).to_string();
    let pages_today = repo
        .session_pages_on(req.user_id, req.league_id, &date_str)
        .await?
        + req.pages_read;

    let window_from = (activity_date - Duration::days(CONSISTENCY_WINDOW_DAYS - 1))
        .format(DATE_FMT)
        .to_string();
    let window_before = repo
        .pages_in_window(req.user_id, req.league_id, &window_from, &date_str)
        .await?;

    let before_score = scoring::compute_score(&ScoreInput {
        books_completed: stored.books_completed,
        total_pages_read: stored.total_pages_read,
        total_achievements: stored.total_achievements,
        current_streak: stored.current_streak,
        window_pages: window_before,
    });

    let books_after = stored.books_completed + i32::from(req.book_finished);
    let pages_after = stored.total_pages_read + req.pages_read;

    let earned = repo.earned_types(req.user_id, req.league_id).await?;
    let new_defs = detector::detect(&DetectionInput {
        before: StatsSnapshot {
            current_streak: stored.current_streak,
            books_completed: stored.books_completed,
            total_pages_read: stored.total_pages_read,
        },
        after: StatsSnapshot {
            current_streak: advance.current,
            books_completed: books_after,
            total_pages_read: pages_after,
        },
        league_scope: req.league_id.is_some(),
        earned: &earned,
        pages_today,
        community: Some(CommunityContext {
            weekly_top_reader: req.weekly_top_reader,
        }),
    });

    // Achievement XP lands before scoring so it affects this update's level
    let xp_after = stored.xp + new_defs.iter().map(|d| d.xp_reward).sum::<i64>();
    let level_after = scoring::level_for_xp(xp_after);
    let achievements_after = stored.total_achievements + new_defs.len() as i32;

    let after_score = scoring::compute_score(&ScoreInput {
        books_completed: books_after,
        total_pages_read: pages_after,
        total_achievements: achievements_after,
        current_streak: advance.current,
        window_pages: window_before + req.pages_read,
    });

    let level_changed = after_score.tier != before_score.tier;
    if level_changed {
        tracing::info!(
            user_id = req.user_id,
            league_id = ?req.league_id,
            from = before_score.tier.as_str(),
            to = after_score.tier.as_str(),
            score = after_score.value,
            "reading tier changed"
        );
    }

    let now = Utc::now().to_rfc3339();
    let stats = repo
        .commit_update(ProgressCommit {
            stats_id,
            expected_version,
            user_id: req.user_id,
            league_id: req.league_id,
            current_streak: advance.current,
            longest_streak: advance.longest,
            last_activity_date: date_str.clone(),
            books_completed: books_after,
            total_pages_read: pages_after,
            xp: xp_after,
            level: level_after,
            total_achievements: achievements_after,
            session_date: date_str,
            session_pages: pages_today,
            new_achievements: new_defs.iter().map(|d| d.key.clone()).collect(),
            earned_at: now,
        })
        .await?;

    let leaderboard_rank = match league {
        Some(league) => {
            let standings = repo.league_standings(league.id).await?;
            leaderboard::rank(league, standings)
                .iter()
                .find(|m| m.user_id == req.user_id)
                .map(|m| m.rank)
        }
        None => None,
    };

    Ok(ProgressResult {
        stats,
        score: after_score.value,
        tier: after_score.tier,
        new_achievements: new_defs
            .iter()
            .map(|def| EarnedAchievement {
                achievement_type: def.key.clone(),
                title: def.title.clone(),
                description: def.description.clone(),
                icon: def.icon.clone(),
                xp_reward: def.xp_reward,
                streak_level: (def.category == Category::Streak)
                    .then(|| catalog::streak_level(def.threshold)),
            })
            .collect(),
        level_changed,
        leaderboard_rank,
    })
}

/// Stored invariant violations quarantine the record instead of being
/// silently repaired
fn check_invariants(model: &user_stats::Model) -> Result<(), EngineError> {
    let violation = if model.longest_streak < model.current_streak {
        Some("longest_streak < current_streak")
    } else if model.current_streak < 0
        || model.books_completed < 0
        || model.total_pages_read < 0
        || model.xp < 0
    {
        Some("negative counter")
    } else if model.level < 1 {
        Some("level below 1")
    } else {
        None
    };

    match violation {
        Some(reason) => {
            tracing::error!(
                user_id = model.user_id,
                league_id = ?model.league_id,
                stats_id = model.id,
                reason,
                "quarantining corrupt stats record"
            );
            Err(EngineError::CorruptStats(format!(
                "stats record {} violates invariant: {}",
                model.id, reason
            )))
        }
        None => Ok(()),
    }
}

fn parse_stored_date(model: &user_stats::Model, raw: &str) -> Result<NaiveDate, EngineError> {
    NaiveDate::parse_from_str(raw, DATE_FMT).map_err(|_| {
        tracing::error!(
            user_id = model.user_id,
            stats_id = model.id,
            raw,
            "quarantining stats record with unparseable activity date"
        );
        EngineError::CorruptStats(format!(
            "stats record {} has unparseable last_activity_date '{}'",
            model.id, raw
        ))
    })
}

/// In-memory default for a (user, scope) pair seeing its first event; the
/// row is only persisted by the commit
fn blank_stats(user_id: i64, league_id: Option<i32>) -> user_stats::Model {
    user_stats::Model {
        id: 0,
        user_id,
        league_id,
        current_streak: 0,
        longest_streak: 0,
        last_activity_date: None,
        books_completed: 0,
        total_pages_read: 0,
        xp: 0,
        level: 1,
        total_achievements: 0,
        version: 0,
        created_at: String::new(),
        updated_at: String::new(),
    }
}
