use risk_core::AnalysisError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use crate::http::{error_for_status, RateLimiter, Transport};

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Parsed SPL mint account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MintAccount {
    pub address: String,
    /// Program that owns the account (SPL Token, Token-2022, or something else)
    pub owner: String,
    pub decimals: u8,
    /// Raw supply in base units
    pub supply: u64,
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
    /// Token-2022 extensions, empty for classic SPL mints
    pub extensions: Vec<MintExtension>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MintExtension {
    pub extension: String,
    #[serde(default)]
    pub state: Value,
}

/// One entry of `getTokenLargestAccounts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenHolder {
    pub address: String,
    pub amount: u64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountValue {
    owner: String,
    data: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParsedMintInfo {
    decimals: u8,
    supply: String,
    mint_authority: Option<String>,
    freeze_authority: Option<String>,
    #[serde(default)]
    extensions: Vec<MintExtension>,
}

#[derive(Debug, Deserialize)]
struct LargestAccount {
    address: String,
    amount: String,
}

/// Minimal Solana JSON-RPC client.
#[derive(Clone)]
pub struct SolanaRpcClient {
    url: String,
    transport: Transport,
}

impl SolanaRpcClient {
    /// `rate_limit` is the number of requests allowed per 10-second window,
    /// the unit public RPC providers quote.
    pub fn new(url: impl Into<String>, rate_limit: usize, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            transport: Transport::new(timeout, RateLimiter::new(rate_limit, Duration::from_secs(10))),
        }
    }

    pub fn with_retry_wait(mut self, wait: Duration) -> Self {
        self.transport = self.transport.with_retry_wait(wait);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, AnalysisError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        tracing::debug!("RPC {} -> {}", method, self.url);
        let response = self
            .transport
            .send(self.transport.client().post(&self.url).json(&body))
            .await?;
        let response = error_for_status(response).await?;

        let rpc: RpcResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::InvalidData(format!("{}: {}", method, e)))?;

        if let Some(err) = rpc.error {
            return Err(AnalysisError::Api(format!(
                "{} failed ({}): {}",
                method, err.code, err.message
            )));
        }

        rpc.result
            .ok_or_else(|| AnalysisError::InvalidData(format!("{}: missing result", method)))
    }

    /// Fetch and parse a mint account. Returns `None` when the account does
    /// not exist or is not a token mint.
    pub async fn get_mint(&self, address: &str) -> Result<Option<MintAccount>, AnalysisError> {
        let result = self
            .call(
                "getAccountInfo",
                json!([address, { "encoding": "jsonParsed", "commitment": "confirmed" }]),
            )
            .await?;

        let value = match result.get("value") {
            Some(v) if !v.is_null() => v.clone(),
            _ => return Ok(None),
        };

        let account: AccountValue = serde_json::from_value(value)
            .map_err(|e| AnalysisError::InvalidData(format!("account {}: {}", address, e)))?;

        let parsed = account.data.get("parsed");
        let is_mint = parsed
            .and_then(|p| p.get("type"))
            .and_then(|t| t.as_str())
            == Some("mint");
        if !is_mint {
            return Ok(None);
        }

        let info = parsed
            .and_then(|p| p.get("info"))
            .cloned()
            .ok_or_else(|| AnalysisError::InvalidData(format!("mint {} has no parsed info", address)))?;
        let info: ParsedMintInfo = serde_json::from_value(info)
            .map_err(|e| AnalysisError::InvalidData(format!("mint {}: {}", address, e)))?;

        let supply = info
            .supply
            .parse::<u64>()
            .map_err(|e| AnalysisError::InvalidData(format!("mint {} supply: {}", address, e)))?;

        Ok(Some(MintAccount {
            address: address.to_string(),
            owner: account.owner,
            decimals: info.decimals,
            supply,
            mint_authority: info.mint_authority,
            freeze_authority: info.freeze_authority,
            extensions: info.extensions,
        }))
    }

    /// Up to 20 largest token accounts for a mint, largest first.
    pub async fn get_largest_holders(&self, mint: &str) -> Result<Vec<TokenHolder>, AnalysisError> {
        let result = self
            .call(
                "getTokenLargestAccounts",
                json!([mint, { "commitment": "confirmed" }]),
            )
            .await?;

        let value = result.get("value").cloned().unwrap_or(Value::Array(Vec::new()));
        let accounts: Vec<LargestAccount> = serde_json::from_value(value)
            .map_err(|e| AnalysisError::InvalidData(format!("largest accounts {}: {}", mint, e)))?;

        accounts
            .into_iter()
            .map(|a| {
                let amount = a.amount.parse::<u64>().map_err(|e| {
                    AnalysisError::InvalidData(format!("holder {} amount: {}", a.address, e))
                })?;
                Ok(TokenHolder {
                    address: a.address,
                    amount,
                })
            })
            .collect()
    }
}
