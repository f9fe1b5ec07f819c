//! Leaderboard Ranker
//!
//! Orders league members by progress toward the league goal. Recomputed on
//! demand from the full member snapshot, so it always reflects the latest
//! committed stats.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::domain::MemberStanding;
use crate::models::league;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedMember {
    pub user_id: i64,
    pub rank: u32,
    pub progress_percentage: f64,
    pub pages_read: i64,
}

fn progress_percentage(league: &league::Model, member: &MemberStanding) -> f64 {
    let fraction = if league.track == "books" && league.goal_books > 0 {
        f64::from(member.books_completed) / f64::from(league.goal_books)
    } else if league.goal_pages > 0 {
        member.pages_read as f64 / league.goal_pages as f64
    } else {
        0.0
    };
    (fraction * 100.0).clamp(0.0, 100.0)
}

/// Primary key: progress percentage, descending. Ties broken by pages read
/// (descending), then by earliest join date.
pub fn rank(league: &league::Model, members: Vec<MemberStanding>) -> Vec<RankedMember> {
    let mut scored: Vec<(f64, MemberStanding)> = members
        .into_iter()
        .map(|m| (progress_percentage(league, &m), m))
        .collect();

    scored.sort_by(|(pa, a), (pb, b)| {
        pb.partial_cmp(pa)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.pages_read.cmp(&a.pages_read))
            .then_with(|| a.joined_at.cmp(&b.joined_at))
    });

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (progress, m))| RankedMember {
            user_id: m.user_id,
            rank: (i + 1) as u32,
            progress_percentage: progress,
            pages_read: m.pages_read,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages_league(goal_pages: i64) -> league::Model {
        league::Model {
            id: 1,
            name: "Spring Readers".to_string(),
            goal_pages,
            goal_books: 0,
            track: "pages".to_string(),
            status: "active".to_string(),
            created_at: "2025-03-01T00:00:00Z".to_string(),
            updated_at: "2025-03-01T00:00:00Z".to_string(),
        }
    }

    fn member(user_id: i64, pages: i64, joined_at: &str) -> MemberStanding {
        MemberStanding {
            user_id,
            pages_read: pages,
            books_completed: 0,
            joined_at: joined_at.to_string(),
        }
    }

    #[test]
    fn orders_by_progress_descending() {
        let ranked = rank(
            &pages_league(1000),
            vec![
                member(1, 100, "2025-03-01T00:00:00Z"),
                member(2, 400, "2025-03-01T00:00:00Z"),
                member(3, 250, "2025-03-01T00:00:00Z"),
            ],
        );
        let order: Vec<i64> = ranked.iter().map(|m| m.user_id).collect();
        assert_eq!(order, vec![2, 3, 1]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn full_tie_resolved_by_earliest_join_date() {
        let ranked = rank(
            &pages_league(1000),
            vec![
                member(1, 300, "2025-03-05T10:00:00Z"),
                member(2, 300, "2025-03-02T10:00:00Z"),
            ],
        );
        assert_eq!(ranked[0].user_id, 2);
        assert_eq!(ranked[1].user_id, 1);
    }

    #[test]
    fn progress_tie_resolved_by_pages() {
        // Books-tracked league: equal book fractions, different raw pages
        let league = league::Model {
            track: "books".to_string(),
            goal_books: 4,
            ..pages_league(0)
        };
        let mut a = member(1, 120, "2025-03-01T00:00:00Z");
        a.books_completed = 2;
        let mut b = member(2, 300, "2025-03-01T00:00:00Z");
        b.books_completed = 2;
        let ranked = rank(&league, vec![a, b]);
        assert_eq!(ranked[0].user_id, 2);
    }

    #[test]
    fn progress_is_clamped_to_100() {
        let ranked = rank(&pages_league(100), vec![member(1, 250, "2025-03-01T00:00:00Z")]);
        assert_eq!(ranked[0].progress_percentage, 100.0);
    }

    #[test]
    fn zero_goal_yields_zero_progress() {
        let ranked = rank(&pages_league(0), vec![member(1, 250, "2025-03-01T00:00:00Z")]);
        assert_eq!(ranked[0].progress_percentage, 0.0);
    }
}
