//! Domain layer - Pure business abstractions
//!
//! Trait definitions and domain error types; no Axum dependencies.

pub mod errors;
pub mod repositories;

pub use errors::EngineError;
pub use repositories::*;
