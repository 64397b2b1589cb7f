//! Integration tests for catalog reads and purchase status.
//!
//! These tests require a running `ddm-market` service pointed at a chain
//! with the marketplace contract deployed.
//!
//! Run with: cargo test -p ddm-integration-tests -- --ignored

use ddm_integration_tests::{client, market_base_url};
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
#[ignore = "Requires running market service and chain RPC"]
async fn test_health() {
    let base_url = market_base_url();
    let resp = client()
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to reach service");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("body"), "ok");
}

#[tokio::test]
#[ignore = "Requires running market service and chain RPC"]
async fn test_catalog_page_shape() {
    let base_url = market_base_url();
    let resp = client()
        .get(format!("{base_url}/api/catalog?page=1"))
        .send()
        .await
        .expect("Failed to get catalog");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("JSON body");

    assert!(body["page"].is_u64());
    assert!(body["total_pages"].is_u64());
    assert!(body["listings"].is_array());

    // A page never holds more than ten listings, and every listing on it
    // is active
    let listings = body["listings"].as_array().expect("listings array");
    assert!(listings.len() <= 10);
    for listing in listings {
        assert_eq!(listing["active"], Value::Bool(true));
        assert!(listing["price"].is_string());
    }
}

#[tokio::test]
#[ignore = "Requires running market service and chain RPC"]
async fn test_catalog_page_zero_rejected() {
    let base_url = market_base_url();
    let resp = client()
        .get(format!("{base_url}/api/catalog?page=0"))
        .send()
        .await
        .expect("Failed to get catalog");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running market service and chain RPC"]
async fn test_status_without_address_skips_chain() {
    let base_url = market_base_url();
    let resp = client()
        .get(format!("{base_url}/api/listings/1/status"))
        .send()
        .await
        .expect("Failed to get status");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("JSON body");
    assert_eq!(body["purchased"], Value::Bool(false));
    assert_eq!(body["checked"], Value::Bool(false));
}

#[tokio::test]
#[ignore = "Requires running market service and chain RPC"]
async fn test_status_rejects_malformed_address() {
    let base_url = market_base_url();
    let resp = client()
        .get(format!("{base_url}/api/listings/1/status?address=banana"))
        .send()
        .await
        .expect("Failed to get status");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running market service and chain RPC"]
async fn test_missing_listing_is_404() {
    let base_url = market_base_url();
    let resp = client()
        .get(format!("{base_url}/api/listings/18446744073709551615"))
        .send()
        .await
        .expect("Failed to get listing");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
