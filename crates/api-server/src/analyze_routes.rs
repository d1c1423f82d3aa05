//! Risk analysis routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use risk_core::AnalysisReport;
use serde::Serialize;

use crate::{analysis_err, ApiResponse, AppError, AppState};

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ResolvedToken {
    pub input: String,
    pub address: String,
}

pub fn analyze_routes() -> axum::Router<AppState> {
    Router::new()
        .route("/api/analyze/:token", get(analyze_token))
        .route("/api/resolve/:symbol", get(resolve_symbol))
}

#[utoipa::path(
    get,
    path = "/api/analyze/{token}",
    params(("token" = String, Path, description = "Mint address or ticker such as $BONK")),
    responses(
        (status = 200, description = "Composite rug-pull risk report", body = AnalysisReport),
        (status = 404, description = "Token could not be resolved"),
        (status = 502, description = "A sub-analysis or upstream source failed"),
        (status = 504, description = "Analysis timed out"),
    ),
    tag = "Risk"
)]
pub async fn analyze_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<ApiResponse<AnalysisReport>>, AppError> {
    let address = state.resolver.resolve(&token).await.map_err(analysis_err)?;

    // The orchestrator has no deadline of its own; callers bound it here
    let report = tokio::time::timeout(state.analysis_timeout, state.orchestrator.analyze(&address))
        .await
        .map_err(|_| {
            AppError::with_status(
                StatusCode::GATEWAY_TIMEOUT,
                anyhow::anyhow!(
                    "Analysis of {} timed out after {}s",
                    token,
                    state.analysis_timeout.as_secs()
                ),
            )
        })?
        .map_err(analysis_err)?;

    tracing::info!(
        "Analysis for {} ({}) complete: {} ({}/100)",
        report.symbol,
        report.token,
        report.risk_level,
        report.risk_score
    );
    Ok(Json(ApiResponse::success(report)))
}

#[utoipa::path(
    get,
    path = "/api/resolve/{symbol}",
    params(("symbol" = String, Path, description = "Ticker such as $BONK, or a mint address")),
    responses(
        (status = 200, description = "Mint address for the symbol", body = ResolvedToken),
        (status = 404, description = "No Solana pair matches the symbol"),
    ),
    tag = "Risk"
)]
pub async fn resolve_symbol(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<ResolvedToken>>, AppError> {
    let address = state.resolver.resolve(&symbol).await.map_err(analysis_err)?;

    Ok(Json(ApiResponse::success(ResolvedToken {
        input: symbol,
        address,
    })))
}
