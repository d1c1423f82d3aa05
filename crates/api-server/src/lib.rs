use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use risk_core::AnalysisError;
use risk_orchestrator::{OrchestratorConfig, RiskOrchestrator, TokenResolver};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

mod analyze_routes;
mod dashboard;
mod request_id;

pub use analyze_routes::ResolvedToken;
pub use request_id::REQUEST_ID_HEADER;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<RiskOrchestrator>,
    pub resolver: Arc<TokenResolver>,
    pub analysis_timeout: Duration,
}

impl AppState {
    pub fn from_config(config: &OrchestratorConfig) -> Result<Self, AnalysisError> {
        Ok(Self {
            orchestrator: Arc::new(RiskOrchestrator::from_config(config)?),
            resolver: Arc::new(TokenResolver::from_config(config)),
            analysis_timeout: config.analysis_timeout,
        })
    }
}

/// JSON envelope shared by every API response.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    pub fn with_status(status: StatusCode, error: anyhow::Error) -> Self {
        Self { status, error }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("Request failed ({}): {:#}", self.status, self.error);
        } else {
            tracing::debug!("Request rejected ({}): {}", self.status, self.error);
        }
        (
            self.status,
            Json(ApiResponse::<()>::error(self.error.to_string())),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, err.into())
    }
}

/// Map an analysis failure to the status code clients see.
pub fn analysis_err(e: AnalysisError) -> AppError {
    let status = match &e {
        AnalysisError::NotFound(_) => StatusCode::NOT_FOUND,
        AnalysisError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        AnalysisError::SubAnalyzer { .. }
        | AnalysisError::InvalidScore { .. }
        | AnalysisError::Api(_)
        | AnalysisError::InvalidData(_) => StatusCode::BAD_GATEWAY,
    };
    AppError::with_status(status, anyhow::Error::new(e))
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthStatus)),
    tag = "System"
)]
pub async fn health() -> Json<ApiResponse<HealthStatus>> {
    Json(ApiResponse::success(HealthStatus {
        status: "healthy".to_string(),
        service: "rugscore".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

#[derive(OpenApi)]
#[openapi(
    info(title = "RugScore API", description = "Rug-pull risk scoring for Solana tokens"),
    paths(
        health,
        analyze_routes::analyze_token,
        analyze_routes::resolve_symbol,
    ),
    components(schemas(
        HealthStatus,
        ResolvedToken,
        risk_core::AnalysisReport,
        risk_core::SubAnalyses,
        risk_core::SubAnalysis,
        risk_core::RiskTier,
    )),
    tags(
        (name = "System", description = "Liveness"),
        (name = "Risk", description = "Token risk analysis"),
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn cors_layer(origins: Option<&str>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    let origins: Vec<HeaderValue> = origins
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();

    if origins.is_empty() {
        base.allow_origin(Any)
    } else {
        base.allow_origin(origins)
    }
}

/// Router with every route and middleware except CORS.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(analyze_routes::analyze_routes())
        .with_state(state)
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(request_id::make_request_span))
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = OrchestratorConfig::from_env()?;
    tracing::info!(
        "Starting RugScore API (mode: {:?}, analysis timeout: {}s)",
        config.mode,
        config.analysis_timeout.as_secs()
    );

    let state = AppState::from_config(&config)?;
    let cors_origins = std::env::var("CORS_ORIGINS").ok();
    let app = build_router(state).layer(cors_layer(cors_origins.as_deref()));

    let port: u16 = match std::env::var("PORT") {
        Ok(p) => p
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a number, got '{}'", p))?,
        Err(_) => 3000,
    };
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Listening on http://0.0.0.0:{}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("api_server=info,risk_orchestrator=info,tower_http=info"));
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
