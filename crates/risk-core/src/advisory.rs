//! Human-readable output derived from a composite score and the sub-analysis red flags.

use crate::{RiskTier, SubAnalysis};

const MAX_SUMMARY_FLAGS: usize = 5;

pub const MINT_AUTHORITY_WARNING: &str =
    "Mint authority is still active - the supply can be inflated at any time";
pub const LIQUIDITY_WARNING: &str =
    "Check the liquidity lock status - unlocked LP tokens can be pulled without notice";
pub const CONCENTRATION_WARNING: &str =
    "Supply is concentrated in a few wallets - watch for large holder dumps";
pub const SOCIAL_WARNING: &str =
    "Social signals look suspicious - verify the community is organic before trusting hype";
pub const CODE_WARNING: &str =
    "Token program configuration has risky features - review them before interacting";

/// Advice bands share the classifier thresholds but fold SAFE and LOW together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
    Critical,
    High,
    Moderate,
    Lower,
}

impl Band {
    fn from_score(score: u8) -> Self {
        match score {
            s if s >= 80 => Band::Critical,
            s if s >= 60 => Band::High,
            s if s >= 40 => Band::Moderate,
            _ => Band::Lower,
        }
    }

    fn headlines(&self) -> [&'static str; 2] {
        match self {
            Band::Critical => [
                "DO NOT BUY - HIGH RUG PULL RISK",
                "Avoid this token entirely; several independent risk signals point to a rug pull",
            ],
            Band::High => [
                "HIGH RISK - only invest what you can afford to lose",
                "Wait for more trading history and locked liquidity before taking a position",
            ],
            Band::Moderate => [
                "MODERATE RISK - proceed with caution",
                "Verify the team, the liquidity lock and the holder distribution before investing",
            ],
            Band::Lower => [
                "LOWER RISK - still do your own research",
                "Keep monitoring holder distribution and liquidity for sudden changes",
            ],
        }
    }

    fn verdict(&self) -> &'static str {
        match self {
            Band::Critical => "DO NOT BUY",
            Band::High => "EXTREME CAUTION",
            Band::Moderate => "MODERATE CAUTION",
            Band::Lower => "APPEARS SAFE",
        }
    }
}

/// Build the ordered recommendation list.
///
/// Headlines for the score band come first, then one warning per matching
/// on-chain flag (repeats are kept, so two mint-authority flags give two
/// warnings), then at most one social and one code warning.
pub fn recommend(
    score: u8,
    on_chain: &SubAnalysis,
    social: &SubAnalysis,
    code: &SubAnalysis,
) -> Vec<String> {
    let mut recommendations: Vec<String> = Band::from_score(score)
        .headlines()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for flag in &on_chain.red_flags {
        if flag.contains("mint authority") {
            recommendations.push(MINT_AUTHORITY_WARNING.to_string());
        }
        if flag.contains("liquidity") || flag.contains("LP") {
            recommendations.push(LIQUIDITY_WARNING.to_string());
        }
        if flag.contains("concentration") || flag.contains("distribution") {
            recommendations.push(CONCENTRATION_WARNING.to_string());
        }
    }

    if !social.red_flags.is_empty() {
        recommendations.push(SOCIAL_WARNING.to_string());
    }
    if !code.red_flags.is_empty() {
        recommendations.push(CODE_WARNING.to_string());
    }

    recommendations
}

/// Render the short narrative report shown to users.
pub fn summarize(
    score: u8,
    on_chain: &SubAnalysis,
    social: &SubAnalysis,
    code: &SubAnalysis,
) -> String {
    let tier = RiskTier::from_score(score);
    let mut lines = vec![format!("Rug Pull Risk: {} ({}/100)", tier, score)];

    let flags: Vec<&String> = on_chain
        .red_flags
        .iter()
        .chain(&social.red_flags)
        .chain(&code.red_flags)
        .collect();

    if !flags.is_empty() {
        lines.push(String::new());
        lines.push("KEY RED FLAGS:".to_string());
        for flag in flags.iter().take(MAX_SUMMARY_FLAGS) {
            lines.push(format!("- {}", flag));
        }
        if flags.len() > MAX_SUMMARY_FLAGS {
            lines.push(format!("...and {} more issues", flags.len() - MAX_SUMMARY_FLAGS));
        }
    }

    lines.push(String::new());
    lines.push(format!("Recommendation: {}", Band::from_score(score).verdict()));

    lines.join("\n")
}
