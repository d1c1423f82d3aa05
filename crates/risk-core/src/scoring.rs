//! Composite rug-pull score.
//!
//! Each sub-score is clamped into [0, 100] and weighted 50% on-chain, 30% social,
//! 20% code. Weights are kept as integer percentages so a total such as 49.5 is
//! exact before rounding; rounding is half-up.

use crate::{RiskTier, SubAnalysis};

pub const ON_CHAIN_WEIGHT: u32 = 50;
pub const SOCIAL_WEIGHT: u32 = 30;
pub const CODE_WEIGHT: u32 = 20;

/// Clamp a raw sub-score into [0, 100]. NaN maps to 0.
pub fn normalize(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 100.0)
}

/// Weighted composite of three raw scores, rounded half-up.
pub fn composite_score(on_chain: f64, social: f64, code: f64) -> u8 {
    let weighted = normalize(on_chain) * ON_CHAIN_WEIGHT as f64
        + normalize(social) * SOCIAL_WEIGHT as f64
        + normalize(code) * CODE_WEIGHT as f64;
    let total = weighted / 100.0;
    // total is non-negative, so round() (half away from zero) is half-up here
    total.round().min(100.0) as u8
}

pub fn aggregate(on_chain: &SubAnalysis, social: &SubAnalysis, code: &SubAnalysis) -> u8 {
    composite_score(on_chain.risk_score, social.risk_score, code.risk_score)
}

pub fn classify(score: u8) -> RiskTier {
    RiskTier::from_score(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(score: f64) -> SubAnalysis {
        SubAnalysis::new(score, Vec::new())
    }

    #[test]
    fn test_weights_sum_to_one_hundred() {
        assert_eq!(ON_CHAIN_WEIGHT + SOCIAL_WEIGHT + CODE_WEIGHT, 100);
    }

    #[test]
    fn test_normalize_bounds() {
        assert_eq!(normalize(-5.0), 0.0);
        assert_eq!(normalize(150.0), 100.0);
        assert_eq!(normalize(0.0), 0.0);
        assert_eq!(normalize(100.0), 100.0);
        assert_eq!(normalize(42.5), 42.5);
        assert_eq!(normalize(f64::INFINITY), 100.0);
        assert_eq!(normalize(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_normalize_nan_is_zero() {
        assert_eq!(normalize(f64::NAN), 0.0);
    }

    #[test]
    fn test_normalize_always_in_range() {
        for raw in [-1e9, -0.001, 0.5, 33.3, 99.999, 100.001, 1e9] {
            let n = normalize(raw);
            assert!((0.0..=100.0).contains(&n), "{} normalized to {}", raw, n);
        }
    }

    #[test]
    fn test_aggregate_weighted_examples() {
        assert_eq!(aggregate(&sub(100.0), &sub(50.0), &sub(25.0)), 70);
        assert_eq!(aggregate(&sub(80.0), &sub(60.0), &sub(40.0)), 66);
        assert_eq!(classify(66), RiskTier::High);
    }

    #[test]
    fn test_aggregate_rounds_half_up() {
        // 30 + 13.5 + 6 = 49.5; half-to-even would give 50 too, so also check 48.5
        let score = aggregate(&sub(60.0), &sub(45.0), &sub(30.0));
        assert_eq!(score, 50);
        assert_eq!(classify(score), RiskTier::Medium);

        // 0.5*57 + 0.3*0 + 0.2*100 = 28.5 + 20 = 48.5 -> 49 (half-to-even would give 48)
        assert_eq!(aggregate(&sub(57.0), &sub(0.0), &sub(100.0)), 49);
    }

    #[test]
    fn test_aggregate_clamps_out_of_range_scores() {
        assert_eq!(aggregate(&sub(-40.0), &sub(-1.0), &sub(-100.0)), 0);
        assert_eq!(aggregate(&sub(500.0), &sub(101.0), &sub(1e6)), 100);
        // -20 clamps to 0, 150 clamps to 100: 0 + 30 + 20
        assert_eq!(aggregate(&sub(-20.0), &sub(150.0), &sub(150.0)), 50);
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(100), RiskTier::Critical);
        assert_eq!(classify(80), RiskTier::Critical);
        assert_eq!(classify(79), RiskTier::High);
        assert_eq!(classify(60), RiskTier::High);
        assert_eq!(classify(59), RiskTier::Medium);
        assert_eq!(classify(40), RiskTier::Medium);
        assert_eq!(classify(39), RiskTier::Low);
        assert_eq!(classify(20), RiskTier::Low);
        assert_eq!(classify(19), RiskTier::Safe);
        assert_eq!(classify(0), RiskTier::Safe);
    }

    #[test]
    fn test_tiers_are_ordered() {
        assert!(RiskTier::Safe < RiskTier::Low);
        assert!(RiskTier::Low < RiskTier::Medium);
        assert!(RiskTier::Medium < RiskTier::High);
        assert!(RiskTier::High < RiskTier::Critical);
    }
}
