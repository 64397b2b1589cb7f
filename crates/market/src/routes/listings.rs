//! Catalog and purchase-status route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use ddm_core::ListingId;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::chain::{Listing, TxOutcome};
use crate::error::Result;
use crate::state::AppState;

use super::parse_address;

/// Catalog query parameters.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub page: Option<u64>,
}

/// One catalog page with its pagination metadata.
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub page: u64,
    pub total_pages: u64,
    pub total_listings: u64,
    pub listings: Vec<Listing>,
}

/// Serve a catalog page of active listings.
#[instrument(skip(state))]
pub async fn catalog(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogResponse>> {
    let (page, listings) = state.market().catalog_page(query.page.unwrap_or(1)).await?;

    Ok(Json(CatalogResponse {
        page: page.page(),
        total_pages: page.total_pages(),
        total_listings: page.total_listings(),
        listings,
    }))
}

/// Serve one listing.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Listing>> {
    let listing = state.market().listing(ListingId::new(id)).await?;
    Ok(Json(listing))
}

/// Purchase-status query parameters.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub address: Option<String>,
}

/// Purchase status of a listing for a viewer.
#[derive(Debug, Serialize)]
pub struct PurchaseStatusResponse {
    pub purchased: bool,
    /// False when no viewer address was supplied and the chain was not
    /// consulted.
    pub checked: bool,
}

/// Report whether the viewer has purchased this listing.
///
/// Without an `address` query parameter, no chain call is made and the
/// status is reported as unpurchased/unchecked.
#[instrument(skip(state))]
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<PurchaseStatusResponse>> {
    let Some(raw) = query.address.as_deref().filter(|s| !s.is_empty()) else {
        return Ok(Json(PurchaseStatusResponse {
            purchased: false,
            checked: false,
        }));
    };

    let buyer = parse_address(raw)?;
    let purchased = state
        .market()
        .purchase_status(buyer, ListingId::new(id))
        .await?;

    Ok(Json(PurchaseStatusResponse {
        purchased,
        checked: true,
    }))
}

/// Purchase a listing with the operator wallet.
#[instrument(skip(state))]
pub async fn purchase(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<TxOutcome>> {
    let outcome = state.market().purchase(ListingId::new(id)).await?;
    Ok(Json(outcome))
}

/// Confirm delivery of a purchased listing.
#[instrument(skip(state))]
pub async fn confirm_delivery(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<TxOutcome>> {
    let outcome = state.market().confirm_delivery(ListingId::new(id)).await?;
    Ok(Json(outcome))
}
