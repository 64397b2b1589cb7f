//! End-to-end publish and download round trip.
//!
//! These tests drive the full pipeline: pin a file, seal its CID,
//! create the listing, then decrypt and download it back. They require
//! the service under test to run with `DDM_OPERATOR_KEY` set and all
//! three upstreams reachable.
//!
//! Run with: cargo test -p ddm-integration-tests -- --ignored

use ddm_integration_tests::{client, market_base_url};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use uuid::Uuid;

fn test_form(title: &str, price: &str) -> Form {
    Form::new()
        .text("title", title.to_string())
        .text("description", "integration test dataset")
        .text("price", price.to_string())
        .part(
            "file",
            Part::bytes(b"ts,value\n0,1\n1,2\n".to_vec())
                .file_name("readings.csv")
                .mime_str("text/csv")
                .expect("valid mime"),
        )
}

#[tokio::test]
#[ignore = "Requires running market service with operator wallet"]
async fn test_publish_then_download_round_trip() {
    let base_url = market_base_url();
    // Unique title so reruns are distinguishable on the devnet contract
    let title = format!("integration-{}", Uuid::new_v4());

    let resp = client()
        .post(format!("{base_url}/api/publish"))
        .multipart(test_form(&title, "0.01"))
        .send()
        .await
        .expect("Failed to publish");

    assert_eq!(resp.status(), StatusCode::OK);
    let receipt: Value = resp.json().await.expect("JSON receipt");

    let cid = receipt["cid"].as_str().expect("cid in receipt");
    assert!(cid.starts_with("Qm") || cid.starts_with('b'));

    let listing_id = receipt["listing_id"]
        .as_u64()
        .expect("listing id from ListingCreated event");

    // The new listing must be visible in its catalog page
    let page = listing_id.div_ceil(10);
    let catalog: Value = client()
        .get(format!("{base_url}/api/catalog?page={page}"))
        .send()
        .await
        .expect("Failed to get catalog")
        .json()
        .await
        .expect("JSON catalog");
    let found = catalog["listings"]
        .as_array()
        .expect("listings")
        .iter()
        .any(|l| l["title"] == Value::String(title.clone()));
    assert!(found, "published listing not on its catalog page");

    // Round trip: decrypt the pointer and fetch the bytes back
    let download = client()
        .get(format!("{base_url}/api/listings/{listing_id}/download"))
        .send()
        .await
        .expect("Failed to download");

    assert_eq!(download.status(), StatusCode::OK);
    let bytes = download.bytes().await.expect("body bytes");
    assert_eq!(&bytes[..], b"ts,value\n0,1\n1,2\n");
}

#[tokio::test]
#[ignore = "Requires running market service"]
async fn test_publish_rejects_malformed_price() {
    let base_url = market_base_url();

    let resp = client()
        .post(format!("{base_url}/api/publish"))
        .multipart(test_form("bad price", "not-a-number"))
        .send()
        .await
        .expect("Failed to publish");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running market service"]
async fn test_publish_requires_file() {
    let base_url = market_base_url();

    let form = Form::new()
        .text("title", "no file")
        .text("description", "missing the bytes")
        .text("price", "0.01");

    let resp = client()
        .post(format!("{base_url}/api/publish"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to publish");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
