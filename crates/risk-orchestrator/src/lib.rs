use chain_analysis::OnChainAnalyzer;
use chrono::Utc;
use code_analysis::ContractAnalyzer;
use risk_core::{
    advisory, scoring, AnalysisError, AnalysisReport, AnalyzerKind, SubAnalyses, SubAnalysis,
    SubAnalyzer, TokenMetadataSource,
};
use social_analysis::{HttpSocialFeed, SocialSignalAnalyzer};
use solana_client::{DexScreenerClient, SolanaRpcClient};
use std::sync::Arc;

pub mod config;
pub mod resolver;
pub mod simulated;

pub use config::{AnalyzerMode, OrchestratorConfig};
pub use resolver::TokenResolver;
pub use simulated::{SimulatedAnalyzer, SimulatedMetadata};

/// Runs the three sub-analyses for a token and folds them into one report.
pub struct RiskOrchestrator {
    metadata: Arc<dyn TokenMetadataSource>,
    on_chain: Arc<dyn SubAnalyzer>,
    social: Arc<dyn SubAnalyzer>,
    code: Arc<dyn SubAnalyzer>,
}

impl RiskOrchestrator {
    /// Each analyzer must report the kind of the slot it is passed in.
    pub fn new(
        metadata: Arc<dyn TokenMetadataSource>,
        on_chain: Arc<dyn SubAnalyzer>,
        social: Arc<dyn SubAnalyzer>,
        code: Arc<dyn SubAnalyzer>,
    ) -> Result<Self, AnalysisError> {
        for (expected, analyzer) in [
            (AnalyzerKind::OnChain, &on_chain),
            (AnalyzerKind::Social, &social),
            (AnalyzerKind::Code, &code),
        ] {
            if analyzer.kind() != expected {
                return Err(AnalysisError::Config(format!(
                    "{} analyzer passed where {} analyzer expected",
                    analyzer.kind(),
                    expected
                )));
            }
        }

        Ok(Self {
            metadata,
            on_chain,
            social,
            code,
        })
    }

    /// Wire the collaborators selected by `config.mode`.
    pub fn from_config(config: &OrchestratorConfig) -> Result<Self, AnalysisError> {
        config.validate()?;

        match config.mode {
            AnalyzerMode::Simulated => {
                tracing::info!("Using simulated analyzers");
                Self::new(
                    Arc::new(SimulatedMetadata),
                    Arc::new(SimulatedAnalyzer::new(AnalyzerKind::OnChain)),
                    Arc::new(SimulatedAnalyzer::new(AnalyzerKind::Social)),
                    Arc::new(SimulatedAnalyzer::new(AnalyzerKind::Code)),
                )
            }
            AnalyzerMode::Live => {
                let feed_url = config.social_feed_url.clone().ok_or_else(|| {
                    AnalysisError::Config("SOCIAL_FEED_URL is required in live mode".to_string())
                })?;
                tracing::info!("Using live analyzers (rpc: {})", config.rpc_url);

                let rpc = SolanaRpcClient::new(
                    config.rpc_url.clone(),
                    config.rpc_rate_limit,
                    config.request_timeout,
                );
                let dex = DexScreenerClient::new(config.dexscreener_url.clone(), config.request_timeout);
                let on_chain = Arc::new(OnChainAnalyzer::new(rpc.clone(), dex));
                let feed = HttpSocialFeed::new(feed_url, config.request_timeout);

                Self::new(
                    on_chain.clone(),
                    on_chain,
                    Arc::new(SocialSignalAnalyzer::new(Arc::new(feed))),
                    Arc::new(ContractAnalyzer::new(rpc)),
                )
            }
        }
    }

    /// Analyze a token.
    ///
    /// Fails with `NotFound` before any sub-analysis runs when the token has no
    /// metadata. The sub-analyses run concurrently; the first failure is returned
    /// as-is and no partial report is produced.
    pub async fn analyze(&self, token: &str) -> Result<AnalysisReport, AnalysisError> {
        let info = self
            .metadata
            .get_token_info(token)
            .await?
            .ok_or_else(|| AnalysisError::NotFound(token.to_string()))?;

        tracing::debug!("Starting rug-pull analysis for {} ({})", info.symbol, token);

        let (on_chain, social, code) = tokio::try_join!(
            self.on_chain.analyze(token),
            self.social.analyze(token),
            self.code.analyze(token),
        )?;

        let report = build_report(token, &info.symbol, on_chain, social, code)?;
        tracing::debug!(
            "Analysis for {} complete: {} ({}/100)",
            token,
            report.risk_level,
            report.risk_score
        );
        Ok(report)
    }
}

fn check_score(analyzer: AnalyzerKind, analysis: &SubAnalysis) -> Result<(), AnalysisError> {
    if analysis.risk_score.is_finite() {
        Ok(())
    } else {
        Err(AnalysisError::InvalidScore {
            analyzer,
            value: analysis.risk_score,
        })
    }
}

/// Fold three sub-analyses into a report. Non-finite sub-scores are rejected;
/// finite out-of-range ones are clamped by the scoring step.
pub fn build_report(
    token: &str,
    symbol: &str,
    on_chain: SubAnalysis,
    social: SubAnalysis,
    code: SubAnalysis,
) -> Result<AnalysisReport, AnalysisError> {
    check_score(AnalyzerKind::OnChain, &on_chain)?;
    check_score(AnalyzerKind::Social, &social)?;
    check_score(AnalyzerKind::Code, &code)?;

    let risk_score = scoring::aggregate(&on_chain, &social, &code);
    let risk_level = scoring::classify(risk_score);
    let recommendations = advisory::recommend(risk_score, &on_chain, &social, &code);
    let summary = advisory::summarize(risk_score, &on_chain, &social, &code);

    Ok(AnalysisReport {
        token: token.to_string(),
        symbol: symbol.to_string(),
        timestamp: Utc::now(),
        risk_score,
        risk_level,
        analyses: SubAnalyses {
            on_chain,
            social,
            code,
        },
        recommendations,
        summary,
    })
}
