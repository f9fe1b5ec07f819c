//! Application state containing the repository and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::StatsRepository;
use crate::infrastructure::SeaOrmStatsRepository;
use crate::services::{Clock, UpdateLocks};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    /// Stats store
    pub stats_repo: Arc<dyn StatsRepository>,
    /// Day-boundary source for streak math
    pub clock: Arc<dyn Clock>,
    /// Per-(user, scope) update locks
    pub update_locks: Arc<UpdateLocks>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, clock: Arc<dyn Clock>) -> Self {
        let stats_repo = Arc::new(SeaOrmStatsRepository::new(db.clone()));

        Self {
            db,
            stats_repo,
            clock,
            update_locks: Arc::new(UpdateLocks::new()),
        }
    }

    /// Get the database connection
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}
