//! Ticker symbol to mint address resolution.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use risk_core::AnalysisError;
use solana_client::{is_valid_address, DexScreenerClient};
use std::time::Duration;

struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

/// Resolves `$SYMBOL`/`symbol` inputs to a mint address. Addresses pass through untouched.
pub struct TokenResolver {
    dex: DexScreenerClient,
    cache: DashMap<String, CacheEntry<String>>,
    ttl_secs: i64,
}

impl TokenResolver {
    pub fn new(dex: DexScreenerClient, ttl: Duration) -> Self {
        Self {
            dex,
            cache: DashMap::new(),
            ttl_secs: ttl.as_secs() as i64,
        }
    }

    /// Symbol lookups always go to DexScreener, even in simulated mode.
    pub fn from_config(config: &crate::OrchestratorConfig) -> Self {
        let dex = DexScreenerClient::new(config.dexscreener_url.clone(), config.request_timeout);
        Self::new(dex, config.resolver_cache_ttl)
    }

    pub async fn resolve(&self, input: &str) -> Result<String, AnalysisError> {
        let input = input.trim();
        if is_valid_address(input) {
            return Ok(input.to_string());
        }

        let symbol = input.trim_start_matches('$').to_uppercase();
        if symbol.is_empty() {
            return Err(AnalysisError::NotFound(input.to_string()));
        }

        if let Some(entry) = self.cache.get(&symbol) {
            let age = (Utc::now() - entry.cached_at).num_seconds();
            if age < self.ttl_secs {
                return Ok(entry.data.clone());
            }
        }

        // Several pools can share a ticker; the deepest one is the canonical token
        let pairs = self.dex.search_pairs(&symbol).await?;
        let best = pairs
            .into_iter()
            .filter(|p| p.base_token.symbol.eq_ignore_ascii_case(&symbol))
            .max_by(|a, b| {
                a.liquidity_usd()
                    .partial_cmp(&b.liquidity_usd())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .ok_or_else(|| AnalysisError::NotFound(input.to_string()))?;

        let address = best.base_token.address;
        tracing::info!("Resolved {} to {}", symbol, address);

        self.cache.insert(symbol, CacheEntry {
            data: address.clone(),
            cached_at: Utc::now(),
        });

        Ok(address)
    }

    pub fn cached_symbols(&self) -> usize {
        self.cache.len()
    }
}
