//! Repository implementations using SeaORM

pub mod stats_repository;

pub use stats_repository::SeaOrmStatsRepository;
