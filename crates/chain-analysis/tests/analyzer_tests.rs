use chain_analysis::OnChainAnalyzer;
use risk_core::{AnalysisError, AnalyzerKind, SubAnalyzer, TokenMetadataSource};
use serde_json::json;
use solana_client::{DexScreenerClient, SolanaRpcClient, TOKEN_PROGRAM_ID};
use std::time::Duration;
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

const MINT: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

fn analyzer(server: &MockServer) -> OnChainAnalyzer {
    OnChainAnalyzer::new(
        SolanaRpcClient::new(server.uri(), 100, Duration::from_secs(5)),
        DexScreenerClient::new(server.uri(), Duration::from_secs(5)),
    )
}

async fn mount_mint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "getAccountInfo" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "context": { "slot": 1 },
                "value": {
                    "data": {
                        "parsed": {
                            "info": {
                                "decimals": 6,
                                "freezeAuthority": null,
                                "isInitialized": true,
                                "mintAuthority": "Auth111111111111111111111111111111111111111",
                                "supply": "1000000"
                            },
                            "type": "mint"
                        },
                        "program": "spl-token",
                        "space": 82
                    },
                    "executable": false,
                    "lamports": 1461600,
                    "owner": TOKEN_PROGRAM_ID,
                    "rentEpoch": 0
                }
            }
        })))
        .mount(server)
        .await;
}

async fn mount_holders(server: &MockServer) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "getTokenLargestAccounts" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "context": { "slot": 1 },
                "value": [
                    { "address": "Hold1111111111111111111111111111111111111111", "amount": "600000", "decimals": 6 }
                ]
            }
        })))
        .mount(server)
        .await;
}

async fn mount_pairs(server: &MockServer, liquidity_usd: f64) {
    Mock::given(method("GET"))
        .and(path(format!("/latest/dex/tokens/{}", MINT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pairs": [{
                "chainId": "solana",
                "pairAddress": "Pair1111111111111111111111111111111111111111",
                "baseToken": { "address": MINT, "name": "Rug Token", "symbol": "RUG" },
                "quoteToken": { "address": "So11111111111111111111111111111111111111112", "symbol": "SOL" },
                "liquidity": { "usd": liquidity_usd }
            }]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_token_info_uses_pair_symbol() {
    let server = MockServer::start().await;
    mount_mint(&server).await;
    mount_pairs(&server, 1_000.0).await;

    let info = analyzer(&server).get_token_info(MINT).await.unwrap().unwrap();
    assert_eq!(info.symbol, "RUG");
    assert_eq!(info.name.as_deref(), Some("Rug Token"));
}

#[tokio::test]
async fn test_token_info_rejects_non_address() {
    let server = MockServer::start().await;
    assert!(analyzer(&server).get_token_info("RUG").await.unwrap().is_none());
}

#[tokio::test]
async fn test_token_info_missing_mint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": { "context": { "slot": 1 }, "value": null }
        })))
        .mount(&server)
        .await;

    assert!(analyzer(&server).get_token_info(MINT).await.unwrap().is_none());
}

#[tokio::test]
async fn test_analyze_scores_economics() {
    let server = MockServer::start().await;
    mount_mint(&server).await;
    mount_holders(&server).await;
    mount_pairs(&server, 1_000.0).await;

    let analysis = analyzer(&server).analyze(MINT).await.unwrap();
    // mint authority 30 + extreme concentration 25 + top-10 distribution 0 (60%) + very low liquidity 20
    assert_eq!(analysis.risk_score, 75.0);
    assert_eq!(analysis.red_flags.len(), 3);
    assert!(analysis.red_flags[0].contains("mint authority"));
    assert_eq!(analysis.details["top_holder_pct"], 60.0);
}

#[tokio::test]
async fn test_analyze_wraps_upstream_failure() {
    let server = MockServer::start().await;
    mount_mint(&server).await;
    mount_pairs(&server, 1_000.0).await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "getTokenLargestAccounts" })))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = analyzer(&server).analyze(MINT).await.unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::SubAnalyzer { analyzer: AnalyzerKind::OnChain, .. }
    ));
}
