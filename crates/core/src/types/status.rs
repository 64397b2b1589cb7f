//! Status enums for marketplace entities.

use serde::{Deserialize, Serialize};

/// Escrow delivery status of a purchase.
///
/// The contract stores this as a boolean (`deliveryConfirmed`); the enum
/// keeps call sites readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Funds held in escrow; the buyer has not confirmed delivery.
    #[default]
    Pending,
    /// The buyer confirmed delivery and funds were released to the seller.
    Confirmed,
}

impl DeliveryStatus {
    /// Map the contract's `deliveryConfirmed` flag.
    #[must_use]
    pub const fn from_confirmed(confirmed: bool) -> Self {
        if confirmed { Self::Confirmed } else { Self::Pending }
    }

    /// Whether delivery has been confirmed.
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
        }
    }
}
