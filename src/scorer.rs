//! Delay risk scoring: heuristic probabilities and tier mapping.
//!
//! The scorer is a pure function of its inputs and the frozen delegate
//! classifier. Probabilities are expressed as integers 0-100; the heuristic
//! path is additionally capped at 95. Tier mapping is monotone: a higher
//! probability never yields a lower tier.

use crate::config::Variant;
use crate::model::{DelegateModel, ModelError};
use serde::Serialize;

/// Hours treated as rush hour (7-9 AM, 5-7 PM).
pub const RUSH_HOURS: [i64; 6] = [7, 8, 9, 17, 18, 19];

/// Base traffic delay probability.
pub const BASE_PROBABILITY: u8 = 15;
/// Added when the queried hour falls in a rush-hour slot.
pub const RUSH_HOUR_PENALTY: u8 = 45;
/// Added when the rain flag is set.
pub const RAIN_PENALTY: u8 = 30;
/// Upper bound for heuristic probabilities.
pub const HEURISTIC_CAP: u8 = 95;

/// Probability at or above which risk is High.
pub const HIGH_THRESHOLD: u8 = 70;
/// Probability at or above which risk is at least Medium (standard variant).
pub const MEDIUM_THRESHOLD: u8 = 40;

// ============================================================================
// Query and Result Types
// ============================================================================

/// One scoring request. Constructed per HTTP request, immediately consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskQuery {
    /// Hour of day, 0-23.
    pub hour: i64,
    /// Rain flag (0/1) or intensity integer.
    pub rain: i64,
    /// Optional weekend flag, only consumed by delegate models that ask for it.
    pub weekend: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskResult {
    pub delay_probability: u8,
    pub risk_level: RiskLevel,
    pub suggested_action: &'static str,
}

// ============================================================================
// Heuristic and Tier Mapping
// ============================================================================

/// Fixed-rule probability used when no delegate classifier is configured.
pub fn heuristic_probability(query: &RiskQuery) -> u8 {
    let mut probability = BASE_PROBABILITY;

    if RUSH_HOURS.contains(&query.hour) {
        probability += RUSH_HOUR_PENALTY;
    }

    if query.rain >= 1 {
        probability += RAIN_PENALTY;
    }

    probability.min(HEURISTIC_CAP)
}

/// Standard three-tier mapping: >=70 High, 40-69 Medium, <40 Low.
pub fn classify_three_tier(probability: u8) -> (RiskLevel, &'static str) {
    if probability >= HIGH_THRESHOLD {
        (RiskLevel::High, "Reroute")
    } else if probability >= MEDIUM_THRESHOLD {
        (RiskLevel::Medium, "Monitor")
    } else {
        (RiskLevel::Low, "Safe to Proceed")
    }
}

/// Reduced two-tier mapping: >=70 High/Reroute, otherwise Low/Continue.
pub fn classify_two_tier(probability: u8) -> (RiskLevel, &'static str) {
    if probability >= HIGH_THRESHOLD {
        (RiskLevel::High, "Reroute")
    } else {
        (RiskLevel::Low, "Continue")
    }
}

// ============================================================================
// Risk Scorer
// ============================================================================

/// Maps a query to a probability and a risk tier, deferring to the delegate
/// classifier when one is configured. The delegate is loaded once at startup
/// and never mutated, so the scorer is safe to share across requests.
pub struct RiskScorer {
    delegate: Option<DelegateModel>,
    variant: Variant,
}

impl RiskScorer {
    pub fn new(delegate: Option<DelegateModel>, variant: Variant) -> Self {
        Self { delegate, variant }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn has_delegate(&self) -> bool {
        self.delegate.is_some()
    }

    /// Score a query. The only failure path is delegate evaluation; the
    /// heuristic cannot fail.
    pub fn score(&self, query: &RiskQuery) -> Result<RiskResult, ModelError> {
        let probability = match &self.delegate {
            Some(model) => model.predict(query)?,
            None => heuristic_probability(query),
        };
        Ok(self.result_for(probability))
    }

    /// Standard-variant entry point: a delegate failure degrades to the
    /// heuristic so the reply is always well-formed.
    pub fn score_or_fallback(&self, query: &RiskQuery) -> RiskResult {
        match self.score(query) {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!("delegate evaluation failed, using heuristic: {err}");
                self.result_for(heuristic_probability(query))
            }
        }
    }

    fn result_for(&self, delay_probability: u8) -> RiskResult {
        let (risk_level, suggested_action) = match self.variant {
            Variant::Standard => classify_three_tier(delay_probability),
            Variant::Reduced => classify_two_tier(delay_probability),
        };
        RiskResult {
            delay_probability,
            risk_level,
            suggested_action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(hour: i64, rain: i64) -> RiskQuery {
        RiskQuery {
            hour,
            rain,
            weekend: None,
        }
    }

    #[test]
    fn test_rush_hour_dry_is_medium() {
        for hour in RUSH_HOURS {
            let probability = heuristic_probability(&query(hour, 0));
            assert_eq!(probability, 60, "hour {hour}");
            assert_eq!(
                classify_three_tier(probability),
                (RiskLevel::Medium, "Monitor")
            );
        }
    }

    #[test]
    fn test_rush_hour_with_rain_is_high() {
        let probability = heuristic_probability(&query(8, 1));
        assert_eq!(probability, 90);
        assert_eq!(classify_three_tier(probability), (RiskLevel::High, "Reroute"));
    }

    #[test]
    fn test_small_hours_dry_is_low() {
        let probability = heuristic_probability(&query(3, 0));
        assert_eq!(probability, 15);
        assert_eq!(
            classify_three_tier(probability),
            (RiskLevel::Low, "Safe to Proceed")
        );
    }

    #[test]
    fn test_rain_intensity_counts_as_rain() {
        assert_eq!(heuristic_probability(&query(3, 4)), 45);
    }

    #[test]
    fn test_heuristic_bounds_over_all_inputs() {
        for hour in 0..24 {
            for rain in 0..3 {
                let probability = heuristic_probability(&query(hour, rain));
                assert!((BASE_PROBABILITY..=HEURISTIC_CAP).contains(&probability));
            }
        }
    }

    #[test]
    fn test_three_tier_boundaries() {
        assert_eq!(classify_three_tier(39).0, RiskLevel::Low);
        assert_eq!(classify_three_tier(40).0, RiskLevel::Medium);
        assert_eq!(classify_three_tier(69).0, RiskLevel::Medium);
        assert_eq!(classify_three_tier(70).0, RiskLevel::High);
        assert_eq!(classify_three_tier(100).0, RiskLevel::High);
    }

    #[test]
    fn test_two_tier_boundaries() {
        assert_eq!(classify_two_tier(69), (RiskLevel::Low, "Continue"));
        assert_eq!(classify_two_tier(70), (RiskLevel::High, "Reroute"));
    }

    #[test]
    fn test_tier_is_monotone_in_probability() {
        let mut previous = RiskLevel::Low;
        for probability in 0..=100u8 {
            let (level, _) = classify_three_tier(probability);
            assert!(level >= previous, "tier dropped at probability {probability}");
            previous = level;
        }
    }

    #[test]
    fn test_scorer_without_delegate_uses_heuristic() {
        let scorer = RiskScorer::new(None, Variant::Standard);
        let result = scorer.score(&query(8, 1)).unwrap();
        assert_eq!(result.delay_probability, 90);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.suggested_action, "Reroute");
    }

    #[test]
    fn test_reduced_variant_collapses_to_two_tiers() {
        let scorer = RiskScorer::new(None, Variant::Reduced);
        let result = scorer.score(&query(8, 0)).unwrap();
        // 60 is Medium in the standard variant but Low/Continue here
        assert_eq!(result.delay_probability, 60);
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert_eq!(result.suggested_action, "Continue");
    }

    #[test]
    fn test_result_serializes_with_wire_field_names() {
        let scorer = RiskScorer::new(None, Variant::Standard);
        let result = scorer.score(&query(8, 1)).unwrap();
        let json = serde_json::to_value(result).unwrap();
        assert_eq!(json["delay_probability"], 90);
        assert_eq!(json["risk_level"], "High");
        assert_eq!(json["suggested_action"], "Reroute");
    }
}
