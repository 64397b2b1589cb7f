//! HTTP route handlers for the market service.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Liveness check
//! GET  /health/ready                        - Readiness check (chain RPC)
//!
//! # Catalog
//! GET  /api/catalog?page=N                  - Paginated active listings
//! GET  /api/listings/{id}                   - One listing
//! GET  /api/listings/{id}/status?address=A  - Purchase status for a viewer
//!
//! # Flows
//! POST /api/publish                         - Multipart publish (operator-signed)
//! GET  /api/listings/{id}/download          - Decrypt-then-download
//! GET  /api/download?hash=CID               - Raw gateway proxy
//! POST /api/listings/{id}/purchase          - Operator-signed purchase
//! POST /api/listings/{id}/confirm-delivery  - Release escrow to the seller
//!
//! # Accounts
//! GET  /api/accounts/{address}/purchases    - Buyer view
//! GET  /api/accounts/{address}/listings     - Seller view with sales counts
//! ```

pub mod accounts;
pub mod download;
pub mod listings;
pub mod publish;

use axum::{
    Router,
    routing::{get, post},
};
use ethers::types::Address;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Parse a viewer-supplied address.
pub(crate) fn parse_address(raw: &str) -> Result<Address> {
    raw.parse::<Address>()
        .map_err(|_| AppError::BadRequest(format!("invalid address: {raw}")))
}

/// Create the listing routes router.
pub fn listing_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(listings::show))
        .route("/{id}/status", get(listings::status))
        .route("/{id}/download", get(download::listing))
        .route("/{id}/purchase", post(listings::purchase))
        .route("/{id}/confirm-delivery", post(listings::confirm_delivery))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/{address}/purchases", get(accounts::purchases))
        .route("/{address}/listings", get(accounts::listings))
}

/// Create all routes for the market service.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/catalog", get(listings::catalog))
        .route("/api/publish", post(publish::publish))
        .route("/api/download", get(download::proxy))
        .nest("/api/listings", listing_routes())
        .nest("/api/accounts", account_routes())
}
