//! Deterministic offline collaborators for demo mode.
//!
//! Scores and flags are derived from SHA-256 of the analyzer kind and token,
//! so the same token always produces the same report.

use async_trait::async_trait;
use risk_core::{AnalysisError, AnalyzerKind, SubAnalysis, SubAnalyzer, TokenInfo, TokenMetadataSource};
use serde_json::json;
use sha2::{Digest, Sha256};
use solana_client::is_valid_address;

const ON_CHAIN_FLAGS: &[&str] = &[
    "Token has an active mint authority (supply can still be inflated)",
    "Very low liquidity in the main pool",
    "High holder concentration in the top wallets",
    "Freeze authority is enabled - holder accounts can be frozen",
];

const SOCIAL_FLAGS: &[&str] = &[
    "Coordinated hype from newly created accounts",
    "Bot-like activity: many duplicate posts",
    "Community reports of scam or rug behaviour",
];

const CODE_FLAGS: &[&str] = &[
    "Permanent delegate can transfer or burn any holder's tokens",
    "High transfer fee taken on every transfer",
    "Transfer hook runs an unverified program",
];

fn digest(kind: AnalyzerKind, token: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(kind.label().as_bytes());
    hasher.update(b":");
    hasher.update(token.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hasher.finalize());
    bytes
}

/// Deterministic score in [0, 100] and the flags that fire for it.
pub fn simulate(kind: AnalyzerKind, token: &str) -> SubAnalysis {
    let bytes = digest(kind, token);
    let score = (u16::from_be_bytes([bytes[0], bytes[1]]) % 101) as f64;

    let pool = match kind {
        AnalyzerKind::OnChain => ON_CHAIN_FLAGS,
        AnalyzerKind::Social => SOCIAL_FLAGS,
        AnalyzerKind::Code => CODE_FLAGS,
    };

    // A flag fires when its byte falls under the score, so riskier tokens carry more flags
    let red_flags = pool
        .iter()
        .zip(&bytes[2..])
        .filter(|(_, b)| (**b as f64 / 255.0 * 100.0) < score)
        .map(|(flag, _)| flag.to_string())
        .collect();

    SubAnalysis::new(score, red_flags).with_details(json!({ "simulated": true }))
}

pub struct SimulatedAnalyzer {
    kind: AnalyzerKind,
}

impl SimulatedAnalyzer {
    pub fn new(kind: AnalyzerKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl SubAnalyzer for SimulatedAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        self.kind
    }

    async fn analyze(&self, token: &str) -> Result<SubAnalysis, AnalysisError> {
        Ok(simulate(self.kind, token))
    }
}

/// Accepts any well-formed address; the symbol is derived from its first characters.
pub struct SimulatedMetadata;

#[async_trait]
impl TokenMetadataSource for SimulatedMetadata {
    async fn get_token_info(&self, token: &str) -> Result<Option<TokenInfo>, AnalysisError> {
        if !is_valid_address(token) {
            return Ok(None);
        }
        Ok(Some(TokenInfo {
            address: token.to_string(),
            symbol: token.chars().take(4).collect::<String>().to_uppercase(),
            name: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINT: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

    #[test]
    fn test_simulation_is_deterministic() {
        for kind in [AnalyzerKind::OnChain, AnalyzerKind::Social, AnalyzerKind::Code] {
            assert_eq!(simulate(kind, MINT), simulate(kind, MINT));
        }
    }

    #[test]
    fn test_simulated_scores_in_range() {
        for i in 0..50 {
            let token = format!("Token{}", i);
            let result = simulate(AnalyzerKind::OnChain, &token);
            assert!((0.0..=100.0).contains(&result.risk_score));
            assert!(result.red_flags.len() <= ON_CHAIN_FLAGS.len());
        }
    }

    #[test]
    fn test_kinds_differ() {
        let social = simulate(AnalyzerKind::Social, MINT);
        let code = simulate(AnalyzerKind::Code, MINT);
        assert!(social.red_flags.iter().all(|f| SOCIAL_FLAGS.contains(&f.as_str())));
        assert!(code.red_flags.iter().all(|f| CODE_FLAGS.contains(&f.as_str())));
    }

    #[tokio::test]
    async fn test_simulated_metadata() {
        let info = SimulatedMetadata.get_token_info(MINT).await.unwrap().unwrap();
        assert_eq!(info.symbol, "7XKX");
        assert!(SimulatedMetadata.get_token_info("not an address").await.unwrap().is_none());
    }
}
