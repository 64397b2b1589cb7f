//! Catalog browsing commands.

#![allow(clippy::print_stdout)] // command output goes to stdout

use ddm_core::ListingId;
use serde_json::json;

use super::{connect, parse_address};

/// Print one page of active listings.
pub async fn catalog(page: u64) -> Result<(), Box<dyn std::error::Error>> {
    let market = connect()?;
    let (page, listings) = market.catalog_page(page).await?;

    let body = json!({
        "page": page.page(),
        "totalPages": page.total_pages(),
        "totalListings": page.total_listings(),
        "listings": listings,
    });
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

/// Print one listing.
pub async fn show(id: u64) -> Result<(), Box<dyn std::error::Error>> {
    let market = connect()?;
    let listing = market.listing(ListingId::new(id)).await?;
    println!("{}", serde_json::to_string_pretty(&listing)?);
    Ok(())
}

/// Print the purchase status of a listing for an address.
pub async fn status(id: u64, address: &str) -> Result<(), Box<dyn std::error::Error>> {
    let market = connect()?;
    let buyer = parse_address(address)?;
    let purchased = market.purchase_status(buyer, ListingId::new(id)).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({ "purchased": purchased }))?
    );
    Ok(())
}
