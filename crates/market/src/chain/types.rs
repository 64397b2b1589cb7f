//! Domain types for contract records and their conversions.
//!
//! The contract returns flattened tuples (for the `listings` getter) and
//! parallel arrays (for `getUserPurchases`); everything is normalized into
//! the types below before leaving the chain module.

use ddm_core::{DeliveryStatus, ListingId};
use ethers::types::{Address, H256, U256};
use serde::Serialize;

use super::contract::{ListingInfo, PurchaseInfo};

/// Raw tuple shape of the `listings(uint256)` getter.
pub type RawListing = (Address, String, U256, String, String, bool);

/// A seller-posted dataset record.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub id: ListingId,
    pub owner: Address,
    pub title: String,
    pub description: String,
    /// Price in wei.
    pub price_wei: U256,
    /// Price as a decimal ether string, for display.
    pub price: String,
    /// Sealed storage pointer: the JSON envelope stored on-chain in place
    /// of the plain CID.
    pub sealed_pointer: String,
    pub active: bool,
}

impl Listing {
    /// Build a listing from the getter tuple.
    pub fn from_raw(id: ListingId, raw: RawListing) -> Self {
        let (owner, title, price_wei, description, sealed_pointer, active) = raw;
        Self {
            id,
            owner,
            title,
            description,
            price_wei,
            price: format_eth(price_wei),
            sealed_pointer,
            active,
        }
    }

    /// Build a listing from a `getUserPurchases` struct entry.
    pub fn from_info(id: ListingId, info: ListingInfo) -> Self {
        Self {
            id,
            owner: info.owner,
            title: info.title,
            description: info.description,
            price_wei: info.price,
            price: format_eth(info.price),
            sealed_pointer: info.data_hash,
            active: info.active,
        }
    }
}

/// One purchase record, keyed on-chain by (listing id, buyer).
#[derive(Debug, Clone, Serialize)]
pub struct Purchase {
    pub buyer: Address,
    /// Amount paid in wei.
    pub amount_wei: U256,
    /// Amount paid as a decimal ether string.
    pub amount: String,
    pub delivery: DeliveryStatus,
}

impl From<PurchaseInfo> for Purchase {
    fn from(info: PurchaseInfo) -> Self {
        Self {
            buyer: info.buyer,
            amount_wei: info.amount,
            amount: format_eth(info.amount),
            delivery: DeliveryStatus::from_confirmed(info.delivery_confirmed),
        }
    }
}

/// A buyer's purchase joined with the listing it bought.
#[derive(Debug, Clone, Serialize)]
pub struct PurchasedDataset {
    pub listing_id: ListingId,
    pub purchase: Purchase,
    pub listing: Listing,
}

/// A seller's listing joined with its sales counter.
#[derive(Debug, Clone, Serialize)]
pub struct ListingWithSales {
    #[serde(flatten)]
    pub listing: Listing,
    pub sales: u64,
}

/// Outcome of a mined state-changing call.
#[derive(Debug, Clone, Serialize)]
pub struct TxOutcome {
    pub tx_hash: H256,
    pub block_number: Option<u64>,
}

/// Outcome of `createListing`: the mined transaction plus the new id when
/// the contract emitted its `ListingCreated` event.
#[derive(Debug, Clone, Serialize)]
pub struct ListingCreated {
    pub listing_id: Option<ListingId>,
    #[serde(flatten)]
    pub tx: TxOutcome,
}

/// Format a wei amount as a decimal ether string.
///
/// `format_ether` keeps all 18 fractional digits; trailing zeros (and a
/// bare trailing dot) are trimmed so `100000000000000000` renders as
/// `"0.1"` rather than `"0.100000000000000000"`.
#[must_use]
pub fn format_eth(wei: U256) -> String {
    let full = ethers::utils::format_ether(wei);
    if !full.contains('.') {
        return full;
    }
    let trimmed = full.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_eth_trims_trailing_zeros() {
        // 0.1 ether
        let wei = U256::from(100_000_000_000_000_000_u128);
        assert_eq!(format_eth(wei), "0.1");
    }

    #[test]
    fn test_format_eth_whole_amount() {
        let wei = U256::from(2_000_000_000_000_000_000_u128);
        assert_eq!(format_eth(wei), "2");
    }

    #[test]
    fn test_format_eth_zero() {
        assert_eq!(format_eth(U256::zero()), "0");
    }

    #[test]
    fn test_format_eth_small_remainder() {
        // 1 wei
        assert_eq!(format_eth(U256::one()), "0.000000000000000001");
    }

    #[test]
    fn test_listing_from_raw() {
        let owner = Address::from_low_u64_be(0xBEEF);
        let raw: RawListing = (
            owner,
            "Weather data".to_string(),
            U256::from(500_000_000_000_000_000_u128),
            "Hourly readings".to_string(),
            "{\"ciphertext\":\"...\"}".to_string(),
            true,
        );

        let listing = Listing::from_raw(ListingId::new(4), raw);
        assert_eq!(listing.id, ListingId::new(4));
        assert_eq!(listing.owner, owner);
        assert_eq!(listing.price, "0.5");
        assert!(listing.active);
        assert_eq!(listing.sealed_pointer, "{\"ciphertext\":\"...\"}");
    }
}
