//! Publish command.

#![allow(clippy::print_stdout)] // command output goes to stdout

use std::path::Path;

use ddm_market::services::PublishRequest;

use super::connect;

/// Pin a file, seal its CID, and create the listing.
pub async fn publish(
    title: &str,
    description: &str,
    price: &str,
    file: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = std::fs::read(file)?;
    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("dataset")
        .to_string();

    let market = connect()?;
    let receipt = market
        .publish(PublishRequest {
            title: title.to_string(),
            description: description.to_string(),
            price_eth: price.to_string(),
            file_name,
            content_type: None,
            bytes,
            conditions: None,
        })
        .await?;

    println!("{}", serde_json::to_string_pretty(&receipt)?);
    Ok(())
}
