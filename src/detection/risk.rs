use serde::{Deserialize, Serialize};

use crate::config::DetectionConfig;
use crate::models::SessionStats;

/// Coarse risk classification shown on the dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        }
    }
}

/// Tier cutoffs: High above `high_risk_after`, Medium above
/// `medium_risk_after`, Low otherwise. Pure function, recomputed per read.
pub fn risk_tier(stats: &SessionStats, config: &DetectionConfig) -> RiskTier {
    if stats.total_violations > config.high_risk_after {
        RiskTier::High
    } else if stats.total_violations > config.medium_risk_after {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}

/// Linear decay from 100, losing `attention_penalty` points per violation,
/// floored at 0.
pub fn attention_score(stats: &SessionStats, config: &DetectionConfig) -> u32 {
    100u32.saturating_sub(stats.total_violations.saturating_mul(config.attention_penalty))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(total: u32) -> SessionStats {
        SessionStats {
            total_violations: total,
            ..SessionStats::default()
        }
    }

    #[test]
    fn nine_violations_is_high_risk_with_score_28() {
        let config = DetectionConfig::default();
        let s = stats(9);
        assert_eq!(risk_tier(&s, &config), RiskTier::High);
        assert_eq!(attention_score(&s, &config), 28);
    }

    #[test]
    fn tier_boundaries() {
        let config = DetectionConfig::default();
        assert_eq!(risk_tier(&stats(0), &config), RiskTier::Low);
        assert_eq!(risk_tier(&stats(3), &config), RiskTier::Low);
        assert_eq!(risk_tier(&stats(4), &config), RiskTier::Medium);
        assert_eq!(risk_tier(&stats(8), &config), RiskTier::Medium);
        assert_eq!(risk_tier(&stats(9), &config), RiskTier::High);
    }

    #[test]
    fn tier_is_monotonic_in_total_violations() {
        let config = DetectionConfig::default();
        let mut previous = RiskTier::Low;
        for total in 0..50 {
            let tier = risk_tier(&stats(total), &config);
            assert!(tier >= previous);
            previous = tier;
        }
    }

    #[test]
    fn attention_score_decays_and_floors_at_zero() {
        let config = DetectionConfig::default();
        let mut previous = attention_score(&stats(0), &config);
        assert_eq!(previous, 100);
        for total in 1..50 {
            let score = attention_score(&stats(total), &config);
            assert!(score <= previous);
            previous = score;
        }
        assert_eq!(attention_score(&stats(13), &config), 0);
        assert_eq!(attention_score(&stats(1000), &config), 0);
    }
}
