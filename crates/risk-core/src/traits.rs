use async_trait::async_trait;

use crate::{AnalysisError, AnalyzerKind, SubAnalysis, TokenInfo};

/// One of the three independent risk analyses run for a token.
#[async_trait]
pub trait SubAnalyzer: Send + Sync {
    fn kind(&self) -> AnalyzerKind;

    async fn analyze(&self, token: &str) -> Result<SubAnalysis, AnalysisError>;
}

/// Resolves basic metadata for a token identifier.
///
/// `Ok(None)` means the token does not exist; `Err` means the lookup itself failed.
#[async_trait]
pub trait TokenMetadataSource: Send + Sync {
    async fn get_token_info(&self, token: &str) -> Result<Option<TokenInfo>, AnalysisError>;
}
