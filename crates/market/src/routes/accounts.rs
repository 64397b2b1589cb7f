//! Buyer and seller account route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::chain::{ListingWithSales, PurchasedDataset};
use crate::error::Result;
use crate::state::AppState;

use super::parse_address;

/// Everything this address has purchased, joined with the listings.
#[instrument(skip(state))]
pub async fn purchases(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Vec<PurchasedDataset>>> {
    let buyer = parse_address(&address)?;
    let purchased = state.market().purchases_of(buyer).await?;
    Ok(Json(purchased))
}

/// Every listing this address owns, with its sales counter.
#[instrument(skip(state))]
pub async fn listings(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Vec<ListingWithSales>>> {
    let owner = parse_address(&address)?;
    let owned = state.market().listings_of(owner).await?;
    Ok(Json(owned))
}
