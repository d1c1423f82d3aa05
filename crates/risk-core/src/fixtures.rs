//! Fixed-outcome collaborators for tests and offline demos.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{AnalysisError, AnalyzerKind, SubAnalysis, SubAnalyzer, TokenInfo, TokenMetadataSource};

/// Sub-analyzer that always returns the same outcome and counts its calls.
pub struct FixtureAnalyzer {
    kind: AnalyzerKind,
    outcome: Result<SubAnalysis, AnalysisError>,
    calls: AtomicUsize,
}

impl FixtureAnalyzer {
    pub fn new(kind: AnalyzerKind, outcome: Result<SubAnalysis, AnalysisError>) -> Self {
        Self {
            kind,
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn scored(kind: AnalyzerKind, risk_score: f64, red_flags: &[&str]) -> Self {
        let flags = red_flags.iter().map(|f| f.to_string()).collect();
        Self::new(kind, Ok(SubAnalysis::new(risk_score, flags)))
    }

    pub fn failing(kind: AnalyzerKind, message: &str) -> Self {
        Self::new(kind, Err(AnalysisError::sub_analyzer(kind, message)))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubAnalyzer for FixtureAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        self.kind
    }

    async fn analyze(&self, _token: &str) -> Result<SubAnalysis, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// Metadata source that knows a fixed set of tokens.
pub struct FixtureMetadata {
    tokens: Vec<TokenInfo>,
    calls: AtomicUsize,
}

impl FixtureMetadata {
    pub fn new(tokens: Vec<TokenInfo>) -> Self {
        Self {
            tokens,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn single(address: &str, symbol: &str) -> Self {
        Self::new(vec![TokenInfo {
            address: address.to_string(),
            symbol: symbol.to_string(),
            name: None,
        }])
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenMetadataSource for FixtureMetadata {
    async fn get_token_info(&self, token: &str) -> Result<Option<TokenInfo>, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.tokens.iter().find(|t| t.address == token).cloned())
    }
}
