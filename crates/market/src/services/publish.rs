//! Publish flow: pin the file, seal the CID, submit the listing.
//!
//! The pipeline is sequential and fail-fast. Input validation (including
//! the price parse) happens before any bytes leave the process, so a bad
//! request never pins an orphaned file.

use ethers::types::U256;
use tracing::{info, instrument};

use crate::chain::ListingCreated;
use crate::encryption::AccessControlCondition;
use crate::error::{AppError, Result};
use crate::storage::Cid;

use super::Marketplace;

/// Input to the publish flow.
#[derive(Debug)]
pub struct PublishRequest {
    pub title: String,
    pub description: String,
    /// Decimal ether string, e.g. "0.25".
    pub price_eth: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    /// Access policy; defaults to the any-wallet demo policy.
    pub conditions: Option<Vec<AccessControlCondition>>,
}

/// Outcome of a successful publish.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PublishReceipt {
    /// Plaintext CID of the pinned file (the seller already holds the
    /// bytes; only the on-chain pointer is sealed).
    pub cid: Cid,
    #[serde(flatten)]
    pub listing: ListingCreated,
}

impl Marketplace {
    /// Run the publish pipeline: upload, seal, `createListing`.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid input, or when any of the three
    /// upstream calls fails. Failures after the upload leave the pinned
    /// file behind; the contract is only touched last.
    #[instrument(skip(self, request), fields(title = %request.title, size = request.bytes.len()))]
    pub async fn publish(&self, request: PublishRequest) -> Result<PublishReceipt> {
        let title = request.title.trim();
        let description = request.description.trim();

        if title.is_empty() {
            return Err(AppError::BadRequest("title is required".to_string()));
        }
        if description.is_empty() {
            return Err(AppError::BadRequest("description is required".to_string()));
        }
        if request.bytes.is_empty() {
            return Err(AppError::BadRequest("file is required".to_string()));
        }

        // Parse the price up front: a malformed amount must fail before
        // the file is pinned.
        let price_wei: U256 = ethers::utils::parse_ether(&request.price_eth)
            .map_err(|e| AppError::BadRequest(format!("invalid price: {e}")))?;
        if price_wei.is_zero() {
            return Err(AppError::BadRequest("price must be positive".to_string()));
        }

        // Step 1: pin the file
        let cid = self
            .storage()
            .upload(
                &request.file_name,
                request.content_type.as_deref(),
                request.bytes,
            )
            .await?;
        info!(cid = %cid, "File pinned");

        // Step 2: seal the CID under the access policy
        let chain_name = self.chain().chain_name().to_string();
        let conditions = request
            .conditions
            .unwrap_or_else(|| vec![AccessControlCondition::any_wallet(&chain_name)]);
        let envelope = self
            .encryption()
            .encrypt(cid.as_str(), &conditions, &chain_name)
            .await?;
        let sealed_pointer = envelope.to_json()?;
        info!("CID sealed");

        // Step 3: submit the listing
        let listing = self
            .chain()
            .create_listing(title, price_wei, description, &sealed_pointer)
            .await?;
        info!(
            listing_id = ?listing.listing_id,
            tx_hash = ?listing.tx.tx_hash,
            "Listing created"
        );

        Ok(PublishReceipt { cid, listing })
    }

    /// Whether this deployment can publish at all.
    #[must_use]
    pub fn can_publish(&self) -> bool {
        self.chain().wallet().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(price: &str) -> PublishRequest {
        PublishRequest {
            title: "Weather data".to_string(),
            description: "Hourly readings".to_string(),
            price_eth: price.to_string(),
            file_name: "weather.csv".to_string(),
            content_type: Some("text/csv".to_string()),
            bytes: vec![1, 2, 3],
            conditions: None,
        }
    }

    #[test]
    fn test_price_parses_to_wei() {
        let parsed = ethers::utils::parse_ether(&request("0.25").price_eth).expect("parses");
        assert_eq!(parsed, U256::from(250_000_000_000_000_000_u128));
    }

    #[test]
    fn test_malformed_price_rejected_by_parser() {
        assert!(ethers::utils::parse_ether("not-a-number").is_err());
        assert!(ethers::utils::parse_ether("1.2.3").is_err());
    }
}
