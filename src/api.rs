//! HTTP API for the delay risk scorer.
//!
//! Query parameters are read as raw key/value pairs and parsed by hand so
//! malformed input (bad values, repeated keys) can never fail at the
//! extractor: the standard variant silently
//! defaults, the reduced variant converts every failure into one fixed
//! degraded reply. The dashboard client always gets a well-formed body.

use crate::config::Variant;
use crate::scorer::{RiskQuery, RiskScorer};
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Local, Timelike, Utc};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Hour assumed when the standard variant receives no usable `hour`.
pub const DEFAULT_HOUR: i64 = 12;

// ============================================================================
// Application State
// ============================================================================

pub struct AppState {
    pub scorer: RiskScorer,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(scorer: RiskScorer) -> Self {
        Self {
            scorer,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<AppState>;

// ============================================================================
// Wire Types
// ============================================================================

/// Raw query parameters. Everything is optional text; the raw key/value
/// pairs are scanned by hand (first occurrence wins, duplicates ignored) so
/// neither a bad value nor a repeated key can produce an extractor-level 400.
#[derive(Debug)]
pub struct PredictRiskParams {
    hour: Option<String>,
    rain: Option<String>,
    weekend: Option<String>,
}

impl PredictRiskParams {
    fn from_pairs(pairs: &[(String, String)]) -> Self {
        let first = |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        };
        Self {
            hour: first("hour"),
            rain: first("rain"),
            weekend: first("weekend"),
        }
    }
}

/// Reduced-variant reply envelope.
#[derive(Debug, Serialize)]
struct ReducedReply {
    status: &'static str,
    risk_level: &'static str,
    delay_probability: u8,
    suggested_action: &'static str,
}

impl ReducedReply {
    /// The fixed reply every reduced-variant failure collapses into.
    fn degraded() -> Self {
        Self {
            status: "error",
            risk_level: "Normal",
            delay_probability: 0,
            suggested_action: "Continue",
        }
    }
}

/// Health snapshot served at `/health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub version: &'static str,
    pub variant: &'static str,
    /// "delegate" when a classifier is loaded, "heuristic" otherwise.
    pub scoring_mode: &'static str,
    pub uptime_secs: i64,
    pub checked_at: DateTime<Utc>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn predict_risk(
    State(state): State<SharedState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> axum::response::Response {
    let params = PredictRiskParams::from_pairs(&pairs);
    match state.scorer.variant() {
        Variant::Standard => predict_standard(&state, &params).into_response(),
        Variant::Reduced => predict_reduced(&state, &params).into_response(),
    }
}

/// Standard variant: missing or malformed values default silently, there is
/// no failure path.
fn predict_standard(state: &AppState, params: &PredictRiskParams) -> impl IntoResponse {
    let query = RiskQuery {
        hour: parse_or(params.hour.as_deref(), DEFAULT_HOUR),
        rain: parse_or(params.rain.as_deref(), 0),
        weekend: params.weekend.as_deref().and_then(|s| s.trim().parse().ok()),
    };

    Json(state.scorer.score_or_fallback(&query))
}

/// Reduced variant: `hour` comes from the server clock, only `rain` is read
/// from the query, and any failure collapses into the fixed degraded reply.
fn predict_reduced(state: &AppState, params: &PredictRiskParams) -> Json<ReducedReply> {
    let rain = match params.rain.as_deref().map(str::trim) {
        Some(raw) => match raw.parse::<i64>() {
            Ok(rain) => rain,
            Err(_) => {
                tracing::warn!("unparsable rain parameter {raw:?}, returning degraded reply");
                return Json(ReducedReply::degraded());
            }
        },
        None => {
            tracing::warn!("missing rain parameter, returning degraded reply");
            return Json(ReducedReply::degraded());
        }
    };

    let query = RiskQuery {
        hour: Local::now().hour() as i64,
        rain,
        weekend: None,
    };

    match state.scorer.score(&query) {
        Ok(result) => Json(ReducedReply {
            status: "ok",
            risk_level: result.risk_level.as_str(),
            delay_probability: result.delay_probability,
            suggested_action: result.suggested_action,
        }),
        Err(err) => {
            tracing::warn!("scoring failed, returning degraded reply: {err}");
            Json(ReducedReply::degraded())
        }
    }
}

/// Plain-text liveness string (standard variant only).
async fn liveness() -> &'static str {
    "Delay Risk Scoring Service is running."
}

async fn health(State(state): State<SharedState>) -> Json<HealthSnapshot> {
    Json(HealthSnapshot {
        version: env!("CARGO_PKG_VERSION"),
        variant: state.scorer.variant().as_str(),
        scoring_mode: if state.scorer.has_delegate() {
            "delegate"
        } else {
            "heuristic"
        },
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
        checked_at: Utc::now(),
    })
}

fn parse_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}

// ============================================================================
// Router
// ============================================================================

/// Build the full application router. Also the entry point for in-process
/// tests.
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/predict_risk", get(predict_risk))
        .route("/health", get(health));

    if state.scorer.variant() == Variant::Standard {
        router = router.route("/", get(liveness));
    }

    router.layer(cors).with_state(state)
}
