//! Token program configuration checks.
//!
//! A mint's behaviour is defined by the program that owns it. Classic SPL Token
//! mints behave identically; Token-2022 mints can opt into extensions that let
//! an authority seize, tax, freeze or block transfers. Those capabilities are
//! what this analyzer flags.

use async_trait::async_trait;
use risk_core::{AnalysisError, AnalyzerKind, SubAnalysis, SubAnalyzer};
use serde_json::{json, Value};
use solana_client::{MintAccount, MintExtension, SolanaRpcClient, TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID};

fn program_label(owner: &str) -> &str {
    match owner {
        TOKEN_PROGRAM_ID => "spl-token",
        TOKEN_2022_PROGRAM_ID => "spl-token-2022",
        other => other,
    }
}

fn state_str<'a>(ext: &'a MintExtension, key: &str) -> Option<&'a str> {
    ext.state.get(key).and_then(Value::as_str)
}

fn transfer_fee_bps(ext: &MintExtension) -> u64 {
    ["newerTransferFee", "olderTransferFee"]
        .iter()
        .filter_map(|k| ext.state.get(*k))
        .filter_map(|fee| fee.get("transferFeeBasisPoints").and_then(Value::as_u64))
        .max()
        .unwrap_or(0)
}

/// Penalty and flag for one extension, if it is risky.
fn assess_extension(ext: &MintExtension) -> Option<(f64, String)> {
    match ext.extension.as_str() {
        "permanentDelegate" => state_str(ext, "delegate").map(|d| {
            (35.0, format!("Permanent delegate {} can transfer or burn any holder's tokens", d))
        }),
        "transferHook" => state_str(ext, "programId").map(|p| {
            (25.0, format!("Transfer hook runs program {} on every transfer", p))
        }),
        "transferFeeConfig" => {
            let bps = transfer_fee_bps(ext);
            let pct = bps as f64 / 100.0;
            if bps >= 500 {
                Some((25.0, format!("High transfer fee: {:.2}% taken on every transfer", pct)))
            } else if bps > 0 {
                Some((10.0, format!("Transfer fee of {:.2}% on every transfer", pct)))
            } else {
                None
            }
        }
        "nonTransferable" => Some((40.0, "Token is non-transferable - holders cannot sell".to_string())),
        "defaultAccountState" => match state_str(ext, "accountState") {
            Some("frozen") => Some((25.0, "New token accounts start frozen by default".to_string())),
            _ => None,
        },
        "mintCloseAuthority" => state_str(ext, "closeAuthority")
            .map(|a| (10.0, format!("Mint account can be closed by {}", a))),
        "pausableConfig" => state_str(ext, "authority")
            .map(|a| (20.0, format!("Transfers can be paused by {}", a))),
        _ => None,
    }
}

/// Score the mint's owning program and extensions, capped at 100.
pub fn score_mint_program(mint: &MintAccount) -> SubAnalysis {
    let mut score = 0.0;
    let mut red_flags = Vec::new();

    match mint.owner.as_str() {
        TOKEN_PROGRAM_ID => {}
        TOKEN_2022_PROGRAM_ID => {
            for ext in &mint.extensions {
                if let Some((penalty, flag)) = assess_extension(ext) {
                    score += penalty;
                    red_flags.push(flag);
                }
            }
        }
        other => {
            score += 50.0;
            red_flags.push(format!("Mint is owned by an unrecognized program {}", other));
        }
    }

    let extensions: Vec<&str> = mint.extensions.iter().map(|e| e.extension.as_str()).collect();
    SubAnalysis::new(f64::min(score, 100.0), red_flags).with_details(json!({
        "program": program_label(&mint.owner),
        "extensions": extensions,
    }))
}

/// Code collaborator: inspects the token program configuration of a mint.
pub struct ContractAnalyzer {
    rpc: SolanaRpcClient,
}

impl ContractAnalyzer {
    pub fn new(rpc: SolanaRpcClient) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl SubAnalyzer for ContractAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Code
    }

    async fn analyze(&self, token: &str) -> Result<SubAnalysis, AnalysisError> {
        let mint = self
            .rpc
            .get_mint(token)
            .await
            .map_err(|e| AnalysisError::sub_analyzer(AnalyzerKind::Code, e))?
            .ok_or_else(|| {
                AnalysisError::sub_analyzer(AnalyzerKind::Code, format!("{} is not a token mint", token))
            })?;

        tracing::debug!(
            "Mint {} owned by {} with {} extension(s)",
            token,
            program_label(&mint.owner),
            mint.extensions.len()
        );
        Ok(score_mint_program(&mint))
    }
}
