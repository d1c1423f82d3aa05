use api_server::{build_router, AppState, REQUEST_ID_HEADER};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use risk_core::fixtures::{FixtureAnalyzer, FixtureMetadata};
use risk_core::{AnalysisError, AnalyzerKind, SubAnalysis, SubAnalyzer};
use risk_orchestrator::{RiskOrchestrator, TokenResolver};
use serde_json::{json, Value};
use solana_client::DexScreenerClient;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

const TOKEN: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";

struct Stalled;

#[async_trait::async_trait]
impl SubAnalyzer for Stalled {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Code
    }

    async fn analyze(&self, _token: &str) -> Result<SubAnalysis, AnalysisError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(SubAnalysis::new(0.0, Vec::new()))
    }
}

fn app_with(
    server: &MockServer,
    metadata: FixtureMetadata,
    social: FixtureAnalyzer,
    code: Arc<dyn SubAnalyzer>,
    timeout: Duration,
) -> Router {
    let orchestrator = RiskOrchestrator::new(
        Arc::new(metadata),
        Arc::new(FixtureAnalyzer::scored(
            AnalyzerKind::OnChain,
            80.0,
            &["Token has an active mint authority (supply can still be inflated)"],
        )),
        Arc::new(social),
        code,
    )
    .unwrap();

    build_router(AppState {
        orchestrator: Arc::new(orchestrator),
        resolver: Arc::new(TokenResolver::new(
            DexScreenerClient::new(server.uri(), Duration::from_secs(5)),
            Duration::from_secs(600),
        )),
        analysis_timeout: timeout,
    })
}

fn app(server: &MockServer) -> Router {
    app_with(
        server,
        FixtureMetadata::single(TOKEN, "BONK"),
        FixtureAnalyzer::scored(AnalyzerKind::Social, 60.0, &[]),
        Arc::new(FixtureAnalyzer::scored(AnalyzerKind::Code, 40.0, &[])),
        Duration::from_secs(30),
    )
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let server = MockServer::start().await;
    let (status, body) = get(app(&server), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
}

#[tokio::test]
async fn test_analyze_by_address() {
    let server = MockServer::start().await;
    let (status, body) = get(app(&server), &format!("/api/analyze/{}", TOKEN)).await;

    assert_eq!(status, StatusCode::OK);
    let report = &body["data"];
    assert_eq!(report["token"], TOKEN);
    assert_eq!(report["symbol"], "BONK");
    assert_eq!(report["risk_score"], 66);
    assert_eq!(report["risk_level"], "HIGH");
    assert_eq!(report["analyses"]["on_chain"]["risk_score"], 80.0);
    assert!(report["summary"]
        .as_str()
        .unwrap()
        .contains("KEY RED FLAGS:"));
}

#[tokio::test]
async fn test_analyze_by_symbol() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest/dex/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pairs": [{
                "chainId": "solana",
                "pairAddress": "PairBonk",
                "baseToken": { "address": TOKEN, "symbol": "Bonk" },
                "quoteToken": { "address": "So11111111111111111111111111111111111111112", "symbol": "SOL" },
                "liquidity": { "usd": 1_000_000.0 }
            }]
        })))
        .mount(&server)
        .await;

    let (status, body) = get(app(&server), "/api/analyze/$BONK").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["token"], TOKEN);

    let (status, body) = get(app(&server), "/api/resolve/bonk").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["address"], TOKEN);
}

#[tokio::test]
async fn test_unknown_token_is_404() {
    let server = MockServer::start().await;
    let app = app_with(
        &server,
        FixtureMetadata::empty(),
        FixtureAnalyzer::scored(AnalyzerKind::Social, 60.0, &[]),
        Arc::new(FixtureAnalyzer::scored(AnalyzerKind::Code, 40.0, &[])),
        Duration::from_secs(30),
    );

    let (status, body) = get(app, &format!("/api/analyze/{}", TOKEN)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains(TOKEN));
}

#[tokio::test]
async fn test_unresolvable_symbol_is_404() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest/dex/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "pairs": [] })))
        .mount(&server)
        .await;

    let (status, _) = get(app(&server), "/api/resolve/NOPE").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sub_analyzer_failure_is_502() {
    let server = MockServer::start().await;
    let app = app_with(
        &server,
        FixtureMetadata::single(TOKEN, "BONK"),
        FixtureAnalyzer::failing(AnalyzerKind::Social, "feed unavailable"),
        Arc::new(FixtureAnalyzer::scored(AnalyzerKind::Code, 40.0, &[])),
        Duration::from_secs(30),
    );

    let (status, body) = get(app, &format!("/api/analyze/{}", TOKEN)).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "social analysis failed: feed unavailable");
}

#[tokio::test]
async fn test_slow_analysis_is_504() {
    let server = MockServer::start().await;
    let app = app_with(
        &server,
        FixtureMetadata::single(TOKEN, "BONK"),
        FixtureAnalyzer::scored(AnalyzerKind::Social, 60.0, &[]),
        Arc::new(Stalled),
        Duration::from_millis(50),
    );

    let (status, body) = get(app, &format!("/api/analyze/{}", TOKEN)).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert!(body["error"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_request_id_echoed() {
    let server = MockServer::start().await;
    let response = app(&server)
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(REQUEST_ID_HEADER, "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()[REQUEST_ID_HEADER], "abc-123");

    let response = app(&server)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
}

#[tokio::test]
async fn test_openapi_document() {
    let server = MockServer::start().await;
    let (status, body) = get(app(&server), "/api-docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/analyze/{token}"].is_object());
}

#[tokio::test]
async fn test_dashboard_renders_report_fields_as_text() {
    let server = MockServer::start().await;
    let response = app(&server)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(page.contains("textContent"));
    assert!(!page.contains("innerHTML"));
    assert!(!page.contains("insertAdjacentHTML"));
}

#[tokio::test]
async fn test_markup_in_symbol_returned_as_plain_json() {
    let server = MockServer::start().await;
    let symbol = "<img src=x onerror=alert(1)>";
    let app = app_with(
        &server,
        FixtureMetadata::single(TOKEN, symbol),
        FixtureAnalyzer::scored(AnalyzerKind::Social, 60.0, &[]),
        Arc::new(FixtureAnalyzer::scored(AnalyzerKind::Code, 40.0, &[])),
        Duration::from_secs(30),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/analyze/{}", TOKEN))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/json"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"]["symbol"], symbol);
}
