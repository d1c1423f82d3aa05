//! Live on-chain economics analysis for SPL tokens.
//!
//! Reads the mint account, the largest holder accounts and the DEX pools for a
//! token and turns them into a 0-100 risk score plus red flags.

use async_trait::async_trait;
use risk_core::{AnalysisError, AnalyzerKind, SubAnalysis, SubAnalyzer, TokenInfo, TokenMetadataSource};
use serde::Serialize;
use serde_json::json;
use solana_client::{is_valid_address, DexPair, DexScreenerClient, MintAccount, SolanaRpcClient, TokenHolder};

const TOP_HOLDERS_COUNTED: usize = 10;

/// Snapshot of the token facts the economics score is computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenEconomics {
    pub supply: u64,
    pub decimals: u8,
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
    /// Share of supply in the largest account, percent
    pub top_holder_pct: Option<f64>,
    /// Share of supply in the ten largest accounts, percent
    pub top10_pct: Option<f64>,
    pub pool_count: usize,
    pub liquidity_usd: f64,
}

impl TokenEconomics {
    pub fn from_parts(mint: &MintAccount, holders: &[TokenHolder], pairs: &[DexPair]) -> Self {
        let (top_holder_pct, top10_pct) = if mint.supply == 0 {
            (None, None)
        } else {
            let supply = mint.supply as f64;
            let top = holders.first().map(|h| h.amount as f64 / supply * 100.0);
            // Amounts come straight from RPC; sum wide so bogus values cannot overflow
            let top10: u128 = holders
                .iter()
                .take(TOP_HOLDERS_COUNTED)
                .map(|h| u128::from(h.amount))
                .sum();
            (top, Some(top10 as f64 / supply * 100.0))
        };

        Self {
            supply: mint.supply,
            decimals: mint.decimals,
            mint_authority: mint.mint_authority.clone(),
            freeze_authority: mint.freeze_authority.clone(),
            top_holder_pct,
            top10_pct,
            pool_count: pairs.len(),
            liquidity_usd: pairs.iter().map(|p| p.liquidity_usd()).sum(),
        }
    }
}

/// Score token economics. Each finding adds a fixed penalty; the sum is capped at 100.
pub fn score_economics(economics: &TokenEconomics) -> SubAnalysis {
    let mut score = 0.0;
    let mut red_flags = Vec::new();

    if economics.mint_authority.is_some() {
        score += 30.0;
        red_flags.push("Token has an active mint authority (supply can still be inflated)".to_string());
    }

    if economics.freeze_authority.is_some() {
        score += 15.0;
        red_flags.push("Freeze authority is enabled - holder accounts can be frozen".to_string());
    }

    match economics.top_holder_pct {
        Some(pct) if pct > 50.0 => {
            score += 25.0;
            red_flags.push(format!("Extreme holder concentration: largest wallet holds {:.1}%", pct));
        }
        Some(pct) if pct > 20.0 => {
            score += 15.0;
            red_flags.push(format!("High holder concentration: largest wallet holds {:.1}%", pct));
        }
        _ => {}
    }

    if let Some(pct) = economics.top10_pct {
        if pct > 80.0 {
            score += 15.0;
            red_flags.push(format!("Poor token distribution: top 10 wallets hold {:.1}%", pct));
        }
    }

    if economics.pool_count == 0 {
        score += 25.0;
        red_flags.push("No liquidity pool found for this token".to_string());
    } else if economics.liquidity_usd < 5_000.0 {
        score += 20.0;
        red_flags.push(format!(
            "Very low liquidity: ${:.0} across {} pool(s)",
            economics.liquidity_usd, economics.pool_count
        ));
    } else if economics.liquidity_usd < 50_000.0 {
        score += 10.0;
        red_flags.push(format!(
            "Thin liquidity: ${:.0} across {} pool(s)",
            economics.liquidity_usd, economics.pool_count
        ));
    }

    SubAnalysis::new(f64::min(score, 100.0), red_flags).with_details(json!({
        "supply": economics.supply,
        "decimals": economics.decimals,
        "mint_authority": economics.mint_authority,
        "freeze_authority": economics.freeze_authority,
        "top_holder_pct": economics.top_holder_pct,
        "top10_pct": economics.top10_pct,
        "pool_count": economics.pool_count,
        "liquidity_usd": economics.liquidity_usd,
    }))
}

/// On-chain collaborator: token metadata plus the economics sub-analysis.
pub struct OnChainAnalyzer {
    rpc: SolanaRpcClient,
    dex: DexScreenerClient,
}

impl OnChainAnalyzer {
    pub fn new(rpc: SolanaRpcClient, dex: DexScreenerClient) -> Self {
        Self { rpc, dex }
    }

    fn fail(e: impl std::fmt::Display) -> AnalysisError {
        AnalysisError::sub_analyzer(AnalyzerKind::OnChain, e)
    }
}

#[async_trait]
impl TokenMetadataSource for OnChainAnalyzer {
    async fn get_token_info(&self, token: &str) -> Result<Option<TokenInfo>, AnalysisError> {
        if !is_valid_address(token) {
            return Ok(None);
        }
        if self.rpc.get_mint(token).await?.is_none() {
            return Ok(None);
        }

        // Symbol is cosmetic; a DexScreener outage should not hide an existing mint
        let pair = match self.dex.token_pairs(token).await {
            Ok(pairs) => pairs.into_iter().find(|p| p.base_token.address == token),
            Err(e) => {
                tracing::warn!("Symbol lookup for {} failed: {}", token, e);
                None
            }
        };

        Ok(Some(match pair {
            Some(p) => TokenInfo {
                address: token.to_string(),
                symbol: p.base_token.symbol,
                name: p.base_token.name,
            },
            None => TokenInfo {
                address: token.to_string(),
                symbol: "UNKNOWN".to_string(),
                name: None,
            },
        }))
    }
}

#[async_trait]
impl SubAnalyzer for OnChainAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::OnChain
    }

    async fn analyze(&self, token: &str) -> Result<SubAnalysis, AnalysisError> {
        let (mint, holders, pairs) = tokio::join!(
            self.rpc.get_mint(token),
            self.rpc.get_largest_holders(token),
            self.dex.token_pairs(token),
        );

        let mint = mint
            .map_err(Self::fail)?
            .ok_or_else(|| Self::fail(format!("{} is not a token mint", token)))?;
        let holders = holders.map_err(Self::fail)?;
        let pairs = pairs.map_err(Self::fail)?;

        let economics = TokenEconomics::from_parts(&mint, &holders, &pairs);
        tracing::debug!("Token economics for {}: {:?}", token, economics);
        Ok(score_economics(&economics))
    }
}
