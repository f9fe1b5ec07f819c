//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.

use std::fmt;

#[derive(Debug)]
pub enum EngineError {
    /// Activity date precedes the stored last activity date
    InvalidActivityDate,
    /// League does not exist or the user is not a member
    UnknownLeague,
    /// Request failed validation with message
    Validation(String),
    /// Concurrent write detected despite per-key locking; retried once
    /// with fresh state before being surfaced
    PersistenceConflict,
    /// Stored stats violate an invariant; the record is quarantined,
    /// never silently repaired
    CorruptStats(String),
    /// Database/persistence error
    Database(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidActivityDate => {
                write!(f, "Activity date precedes last recorded activity")
            }
            EngineError::UnknownLeague => write!(f, "League not found or user is not a member"),
            EngineError::Validation(msg) => write!(f, "Validation error: {}", msg),
            EngineError::PersistenceConflict => write!(f, "Concurrent update conflict"),
            EngineError::CorruptStats(msg) => write!(f, "Corrupt stats record: {}", msg),
            EngineError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

// Conversion from SeaORM errors (used in infrastructure layer)
impl From<sea_orm::DbErr> for EngineError {
    fn from(e: sea_orm::DbErr) -> Self {
        EngineError::Database(e.to_string())
    }
}
