//! Marketplace flows over the three external clients.
//!
//! [`Marketplace`] is the library-level entry point shared by the HTTP
//! routes and the CLI: catalog reads, purchase-status reads, and the
//! publish / decrypt-and-download pipelines.

pub mod download;
pub mod publish;

pub use download::Download;
pub use publish::{PublishReceipt, PublishRequest};

use ddm_core::{CatalogPage, ListingId};
use ethers::types::Address;

use crate::chain::{ChainClient, Listing, ListingWithSales, PurchasedDataset, TxOutcome};
use crate::config::MarketConfig;
use crate::encryption::EncryptionClient;
use crate::error::Result;
use crate::storage::GatewayClient;

/// Entry point for all marketplace flows.
///
/// Cheaply cloneable: each client is an `Arc` around its connection
/// state.
#[derive(Clone)]
pub struct Marketplace {
    chain: ChainClient,
    storage: GatewayClient,
    encryption: EncryptionClient,
}

impl Marketplace {
    /// Build the marketplace from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when any client cannot be constructed (bad RPC
    /// URL, malformed operator key, malformed JWT).
    pub fn new(config: &MarketConfig) -> Result<Self> {
        Ok(Self {
            chain: ChainClient::new(&config.chain)?,
            storage: GatewayClient::new(&config.gateway)?,
            encryption: EncryptionClient::new(&config.encryption),
        })
    }

    /// The contract client.
    #[must_use]
    pub fn chain(&self) -> &ChainClient {
        &self.chain
    }

    /// The pinning gateway client.
    #[must_use]
    pub fn storage(&self) -> &GatewayClient {
        &self.storage
    }

    /// The encryption network client.
    #[must_use]
    pub fn encryption(&self) -> &EncryptionClient {
        &self.encryption
    }

    // =========================================================================
    // Catalog and purchase reads
    // =========================================================================

    /// One catalog page of active listings.
    ///
    /// # Errors
    ///
    /// Returns an error for page 0 or an unreachable contract.
    pub async fn catalog_page(&self, page: u64) -> Result<(CatalogPage, Vec<Listing>)> {
        Ok(self.chain.catalog_page(page).await?)
    }

    /// One listing by id.
    ///
    /// # Errors
    ///
    /// Returns an error when the listing does not exist.
    pub async fn listing(&self, id: ListingId) -> Result<Listing> {
        Ok(self.chain.listing(id).await?)
    }

    /// Whether `buyer` has purchased `id`.
    ///
    /// # Errors
    ///
    /// Returns an error when the read call fails.
    pub async fn purchase_status(&self, buyer: Address, id: ListingId) -> Result<bool> {
        Ok(self.chain.has_purchased(buyer, id).await?)
    }

    /// Everything `buyer` has purchased.
    ///
    /// # Errors
    ///
    /// Returns an error when the read call fails.
    pub async fn purchases_of(&self, buyer: Address) -> Result<Vec<PurchasedDataset>> {
        Ok(self.chain.purchases_of(buyer).await?)
    }

    /// Every listing owned by `owner`, with sales counters.
    ///
    /// # Errors
    ///
    /// Returns an error when any read call fails.
    pub async fn listings_of(&self, owner: Address) -> Result<Vec<ListingWithSales>> {
        Ok(self.chain.listings_of(owner).await?)
    }

    // =========================================================================
    // Operator-signed flows
    // =========================================================================

    /// Purchase a listing with the operator wallet.
    ///
    /// # Errors
    ///
    /// Returns an error without a signer or when the transaction fails.
    pub async fn purchase(&self, id: ListingId) -> Result<TxOutcome> {
        Ok(self.chain.purchase(id).await?)
    }

    /// Confirm delivery, releasing escrow to the seller.
    ///
    /// # Errors
    ///
    /// Returns an error without a signer or when the transaction fails.
    pub async fn confirm_delivery(&self, id: ListingId) -> Result<TxOutcome> {
        Ok(self.chain.confirm_delivery(id).await?)
    }

    /// Readiness probe: the chain RPC must answer.
    ///
    /// # Errors
    ///
    /// Returns an error when the RPC endpoint is unreachable.
    pub async fn ready(&self) -> Result<u64> {
        Ok(self.chain.block_number().await?)
    }
}
