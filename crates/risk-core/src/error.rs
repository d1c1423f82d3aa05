use thiserror::Error;

use crate::AnalyzerKind;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Token not found: {0}")]
    NotFound(String),

    #[error("{analyzer} analysis failed: {message}")]
    SubAnalyzer {
        analyzer: AnalyzerKind,
        message: String,
    },

    #[error("Invalid risk score from {analyzer} analysis: {value}")]
    InvalidScore { analyzer: AnalyzerKind, value: f64 },

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AnalysisError {
    /// Wrap any displayable failure as a sub-analyzer error of the given kind.
    pub fn sub_analyzer(analyzer: AnalyzerKind, message: impl std::fmt::Display) -> Self {
        AnalysisError::SubAnalyzer {
            analyzer,
            message: message.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AnalysisError::NotFound(_))
    }
}
