use risk_core::AnalysisError;
use solana_client::dexscreener::DEFAULT_DEXSCREENER_URL;
use solana_client::rpc::DEFAULT_RPC_URL;
use std::str::FromStr;
use std::time::Duration;

/// Which collaborators back the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerMode {
    /// Solana RPC, DexScreener and a social feed
    Live,
    /// Deterministic offline stand-ins, for demos
    Simulated,
}

impl FromStr for AnalyzerMode {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(AnalyzerMode::Live),
            "simulated" | "demo" => Ok(AnalyzerMode::Simulated),
            other => Err(AnalysisError::Config(format!(
                "unknown analyzer mode '{}' (expected 'live' or 'simulated')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    pub mode: AnalyzerMode,
    pub rpc_url: String,
    /// Requests per 10-second window
    pub rpc_rate_limit: usize,
    pub dexscreener_url: String,
    pub social_feed_url: Option<String>,
    /// Per-HTTP-request timeout inside the live collaborators
    pub request_timeout: Duration,
    /// Caller-level timeout around a whole analysis
    pub analysis_timeout: Duration,
    pub resolver_cache_ttl: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            mode: AnalyzerMode::Simulated,
            rpc_url: DEFAULT_RPC_URL.to_string(),
            rpc_rate_limit: 100,
            dexscreener_url: DEFAULT_DEXSCREENER_URL.to_string(),
            social_feed_url: None,
            request_timeout: Duration::from_secs(15),
            analysis_timeout: Duration::from_secs(30),
            resolver_cache_ttl: Duration::from_secs(600),
        }
    }
}

fn parse_num<T: FromStr>(key: &str, value: &str) -> Result<T, AnalysisError> {
    value
        .trim()
        .parse()
        .map_err(|_| AnalysisError::Config(format!("{} must be a number, got '{}'", key, value)))
}

impl OrchestratorConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, AnalysisError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AnalysisError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let mode = match lookup("RUGSCORE_MODE") {
            Some(v) => v.parse()?,
            None => defaults.mode,
        };
        let rpc_rate_limit = match lookup("SOLANA_RPC_RATE_LIMIT") {
            Some(v) => parse_num("SOLANA_RPC_RATE_LIMIT", &v)?,
            None => defaults.rpc_rate_limit,
        };
        let analysis_timeout = match lookup("ANALYSIS_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_num("ANALYSIS_TIMEOUT_SECS", &v)?),
            None => defaults.analysis_timeout,
        };
        let resolver_cache_ttl = match lookup("RESOLVER_CACHE_TTL_SECS") {
            Some(v) => Duration::from_secs(parse_num("RESOLVER_CACHE_TTL_SECS", &v)?),
            None => defaults.resolver_cache_ttl,
        };

        let config = Self {
            mode,
            rpc_url: lookup("SOLANA_RPC_URL").unwrap_or(defaults.rpc_url),
            rpc_rate_limit,
            dexscreener_url: lookup("DEXSCREENER_URL").unwrap_or(defaults.dexscreener_url),
            social_feed_url: lookup("SOCIAL_FEED_URL").filter(|s| !s.trim().is_empty()),
            request_timeout: defaults.request_timeout,
            analysis_timeout,
            resolver_cache_ttl,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.mode == AnalyzerMode::Live && self.social_feed_url.is_none() {
            return Err(AnalysisError::Config(
                "SOCIAL_FEED_URL is required in live mode".to_string(),
            ));
        }
        if self.rpc_rate_limit == 0 {
            return Err(AnalysisError::Config(
                "SOLANA_RPC_RATE_LIMIT must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
