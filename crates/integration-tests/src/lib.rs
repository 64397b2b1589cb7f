//! Integration tests for DDM.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the market service against a devnet
//! cargo run -p ddm-market
//!
//! # Run integration tests
//! cargo test -p ddm-integration-tests -- --ignored
//! ```
//!
//! The ignored tests expect:
//! - A running `ddm-market` service (`MARKET_BASE_URL`, default
//!   `http://localhost:3000`)
//! - A chain RPC endpoint with the marketplace contract deployed
//! - Pinning gateway and encryption-node endpoints reachable from the
//!   service
//!
//! Operator-signed tests additionally require `DDM_OPERATOR_KEY` to be
//! set for the service under test.

/// Base URL for the market service (configurable via environment).
#[must_use]
pub fn market_base_url() -> String {
    std::env::var("MARKET_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Create an HTTP client for driving the service.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}
