pub mod achievement;
pub mod league;
pub mod league_member;
pub mod motivation_log;
pub mod reading_session;
pub mod user_stats;
