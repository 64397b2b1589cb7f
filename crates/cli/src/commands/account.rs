//! Buyer/seller account commands and operator-signed transactions.

#![allow(clippy::print_stdout)] // command output goes to stdout

use ddm_core::ListingId;

use super::{connect, parse_address};

/// Print everything an address has purchased.
pub async fn purchases(address: &str) -> Result<(), Box<dyn std::error::Error>> {
    let market = connect()?;
    let buyer = parse_address(address)?;
    let purchased = market.purchases_of(buyer).await?;
    println!("{}", serde_json::to_string_pretty(&purchased)?);
    Ok(())
}

/// Print every listing an address owns, with sales counts.
pub async fn listings(address: &str) -> Result<(), Box<dyn std::error::Error>> {
    let market = connect()?;
    let owner = parse_address(address)?;
    let owned = market.listings_of(owner).await?;
    println!("{}", serde_json::to_string_pretty(&owned)?);
    Ok(())
}

/// Purchase a listing with the operator wallet.
pub async fn purchase(id: u64) -> Result<(), Box<dyn std::error::Error>> {
    let market = connect()?;
    let outcome = market.purchase(ListingId::new(id)).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

/// Confirm delivery, releasing escrow to the seller.
pub async fn confirm_delivery(id: u64) -> Result<(), Box<dyn std::error::Error>> {
    let market = connect()?;
    let outcome = market.confirm_delivery(ListingId::new(id)).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
