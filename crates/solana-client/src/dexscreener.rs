use risk_core::AnalysisError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::http::{error_for_status, RateLimiter, Transport};

pub const DEFAULT_DEXSCREENER_URL: &str = "https://api.dexscreener.com";
const SOLANA_CHAIN_ID: &str = "solana";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairToken {
    pub address: String,
    #[serde(default)]
    pub name: Option<String>,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DexPair {
    pub chain_id: String,
    #[serde(default)]
    pub dex_id: Option<String>,
    pub pair_address: String,
    pub base_token: PairToken,
    pub quote_token: PairToken,
    #[serde(default)]
    pub liquidity: Option<PairLiquidity>,
    #[serde(default)]
    pub pair_created_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairLiquidity {
    #[serde(default)]
    pub usd: Option<f64>,
}

impl DexPair {
    pub fn liquidity_usd(&self) -> f64 {
        self.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0)
    }
}

#[derive(Debug, Deserialize)]
struct PairsResponse {
    #[serde(default)]
    pairs: Option<Vec<DexPair>>,
}

/// DexScreener public API client, Solana pairs only.
#[derive(Clone)]
pub struct DexScreenerClient {
    base_url: String,
    transport: Transport,
}

impl DexScreenerClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        // DexScreener allows 300 req/min on the pair endpoints
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport: Transport::new(timeout, RateLimiter::new(300, Duration::from_secs(60))),
        }
    }

    pub fn with_retry_wait(mut self, wait: Duration) -> Self {
        self.transport = self.transport.with_retry_wait(wait);
        self
    }

    async fn get_pairs(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<DexPair>, AnalysisError> {
        let response = self
            .transport
            .send(self.transport.client().get(url).query(query))
            .await?;
        let response = error_for_status(response).await?;

        let body: PairsResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::InvalidData(format!("dexscreener: {}", e)))?;

        Ok(body
            .pairs
            .unwrap_or_default()
            .into_iter()
            .filter(|p| p.chain_id == SOLANA_CHAIN_ID)
            .collect())
    }

    /// All Solana pools trading the given mint.
    pub async fn token_pairs(&self, mint: &str) -> Result<Vec<DexPair>, AnalysisError> {
        let url = format!("{}/latest/dex/tokens/{}", self.base_url, mint);
        self.get_pairs(&url, &[]).await
    }

    /// Free-text pair search (symbol, name or address).
    pub async fn search_pairs(&self, query: &str) -> Result<Vec<DexPair>, AnalysisError> {
        let url = format!("{}/latest/dex/search", self.base_url);
        self.get_pairs(&url, &[("q", query)]).await
    }
}
