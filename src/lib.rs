//! Delay Risk Scoring Service
//!
//! Estimates a delivery/traffic delay risk score from live signals (hour of
//! day, rain, optional weekend flag) and returns a risk tier with a suggested
//! action. Scores come from a delegate classifier when one is configured and
//! from fixed heuristic thresholds otherwise. The library surface exists so
//! the HTTP API can be exercised in-process by the integration tests.

pub mod api;
pub mod config;
pub mod model;
pub mod scorer;

pub use api::{build_router, AppState, HealthSnapshot, SharedState};
pub use config::{ModelSource, ServerConfig, Variant};
pub use model::{DelegateModel, ModelError, ModelOutput};
pub use scorer::{
    classify_three_tier, classify_two_tier, heuristic_probability, RiskLevel, RiskQuery,
    RiskResult, RiskScorer,
};
