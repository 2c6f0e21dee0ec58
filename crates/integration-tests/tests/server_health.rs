//! Integration tests for the health endpoints.
//!
//! These tests require the server running (cargo run -p shoptill-server).
//!
//! Run with: cargo test -p shoptill-integration-tests -- --ignored

use reqwest::StatusCode;
use shoptill_integration_tests::TestContext;

#[tokio::test]
#[ignore = "requires running server"]
async fn test_health_returns_ok() {
    let ctx = TestContext::new();

    let resp = ctx
        .client
        .get(ctx.url("/health"))
        .send()
        .await
        .expect("Health request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("Body read failed"), "ok");
}

#[tokio::test]
#[ignore = "requires running server"]
async fn test_readiness_returns_ok() {
    let ctx = TestContext::new();

    let resp = ctx
        .client
        .get(ctx.url("/health/ready"))
        .send()
        .await
        .expect("Readiness request failed");

    assert_eq!(resp.status(), StatusCode::OK);
}
