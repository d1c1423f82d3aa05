use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the three sub-analyses a result or failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AnalyzerKind {
    OnChain,
    Social,
    Code,
}

impl AnalyzerKind {
    pub fn label(&self) -> &'static str {
        match self {
            AnalyzerKind::OnChain => "on-chain",
            AnalyzerKind::Social => "social",
            AnalyzerKind::Code => "code",
        }
    }
}

impl fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Output of a single sub-analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SubAnalysis {
    /// Nominally 0-100, not guaranteed by the producer
    pub risk_score: f64,
    pub red_flags: Vec<String>,
    /// Analyzer-specific extras, opaque to scoring
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub details: serde_json::Value,
}

impl SubAnalysis {
    pub fn new(risk_score: f64, red_flags: Vec<String>) -> Self {
        Self {
            risk_score,
            red_flags,
            details: serde_json::Value::Null,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}

/// Ordered risk tiers, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    Safe,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    /// Lower bounds are inclusive: 80 is CRITICAL, 60 HIGH, 40 MEDIUM, 20 LOW.
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s >= 80 => RiskTier::Critical,
            s if s >= 60 => RiskTier::High,
            s if s >= 40 => RiskTier::Medium,
            s if s >= 20 => RiskTier::Low,
            _ => RiskTier::Safe,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Safe => "SAFE",
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
            RiskTier::Critical => "CRITICAL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SAFE" => Some(RiskTier::Safe),
            "LOW" => Some(RiskTier::Low),
            "MEDIUM" => Some(RiskTier::Medium),
            "HIGH" => Some(RiskTier::High),
            "CRITICAL" => Some(RiskTier::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Basic token metadata from the metadata source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TokenInfo {
    pub address: String,
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// The three sub-analyses a report was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SubAnalyses {
    pub on_chain: SubAnalysis,
    pub social: SubAnalysis,
    pub code: SubAnalysis,
}

/// Final result of one analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AnalysisReport {
    pub token: String,
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    /// Composite score, 0-100
    pub risk_score: u8,
    pub risk_level: RiskTier,
    pub analyses: SubAnalyses,
    pub recommendations: Vec<String>,
    pub summary: String,
}
