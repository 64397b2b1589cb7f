//! Marketplace contract client.
//!
//! All durable marketplace state (listings, purchases, escrow, delivery
//! confirmation) lives in the external contract; this module is the only
//! place that talks to it. Reads go through a plain JSON-RPC provider and
//! are cached for a short TTL; state-changing calls go through a
//! `SignerMiddleware` around the optional operator wallet.

mod cache;
mod contract;
pub mod types;

pub use contract::{DataMarket, ListingCreatedFilter};
pub use types::{
    Listing, ListingCreated, ListingWithSales, Purchase, PurchasedDataset, TxOutcome, format_eth,
};

use std::sync::Arc;
use std::time::Duration;

use ddm_core::{CatalogPage, ListingId, PageError};
use ethers::abi::RawLog;
use ethers::contract::{ContractError, EthLogDecode};
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider, ProviderError};
use ethers::signers::{LocalWallet, Signer, WalletError};
use ethers::types::{Address, H256, U64, U256};
use ethers::utils::ConversionError;
use moka::future::Cache;
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::ChainConfig;
use cache::{CacheKey, CacheValue};

/// Provider used for read-only calls.
pub type ReadProvider = Provider<Http>;

/// Provider + operator wallet used for state-changing calls.
pub type OperatorClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Errors that can occur when talking to the marketplace contract.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The configured RPC URL could not be turned into a provider.
    #[error("invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    /// JSON-RPC transport failure.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Read call failed.
    #[error("contract read failed: {0}")]
    Read(#[from] ContractError<ReadProvider>),

    /// State-changing call failed.
    #[error("contract transaction failed: {0}")]
    Write(#[from] ContractError<OperatorClient>),

    /// Operator wallet could not be constructed.
    #[error("wallet error: {0}")]
    Wallet(#[from] WalletError),

    /// Ether amount could not be parsed.
    #[error("invalid amount: {0}")]
    Conversion(#[from] ConversionError),

    /// Requested page was invalid.
    #[error(transparent)]
    Page(#[from] PageError),

    /// Listing id points at an empty slot.
    #[error("listing {0} does not exist")]
    NotFound(ListingId),

    /// Listing exists but is no longer for sale.
    #[error("listing {0} is not active")]
    Inactive(ListingId),

    /// A state-changing call was attempted without an operator wallet.
    #[error("no operator wallet configured")]
    NoSigner,

    /// The transaction never made it into a block.
    #[error("transaction {0:?} was dropped from the mempool")]
    TxDropped(H256),

    /// The transaction was mined but reverted.
    #[error("transaction {0:?} reverted")]
    TxReverted(H256),

    /// The contract returned parallel arrays of different lengths.
    #[error("inconsistent contract response: {0}")]
    Inconsistent(String),
}

/// Client for the marketplace contract.
///
/// Cheaply cloneable; catalog reads are cached for 60 seconds and
/// invalidated when this client publishes a listing.
#[derive(Clone)]
pub struct ChainClient {
    inner: Arc<ChainClientInner>,
}

struct ChainClientInner {
    provider: ReadProvider,
    read: DataMarket<ReadProvider>,
    write: Option<DataMarket<OperatorClient>>,
    wallet: Option<LocalWallet>,
    chain_id: u64,
    chain_name: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl ChainClient {
    /// Create a new contract client.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC URL is malformed or the operator key
    /// cannot be parsed into a wallet.
    pub fn new(config: &ChainConfig) -> Result<Self, ChainError> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| ChainError::InvalidRpcUrl(e.to_string()))?;

        let read = DataMarket::new(config.contract_address, Arc::new(provider.clone()));

        let (write, wallet) = match &config.operator_key {
            Some(key) => {
                let wallet: LocalWallet = key.expose_secret().parse()?;
                let wallet = wallet.with_chain_id(config.chain_id);
                let signer = SignerMiddleware::new(provider.clone(), wallet.clone());
                let write = DataMarket::new(config.contract_address, Arc::new(signer));
                (Some(write), Some(wallet))
            }
            None => (None, None),
        };

        let cache = Cache::builder()
            .max_capacity(256)
            .time_to_live(Duration::from_secs(60))
            .build();

        Ok(Self {
            inner: Arc::new(ChainClientInner {
                provider,
                read,
                write,
                wallet,
                chain_id: config.chain_id,
                chain_name: config.chain_name.clone(),
                cache,
            }),
        })
    }

    /// The operator wallet, if one is configured.
    #[must_use]
    pub fn wallet(&self) -> Option<&LocalWallet> {
        self.inner.wallet.as_ref()
    }

    /// Chain name used in access-control conditions.
    #[must_use]
    pub fn chain_name(&self) -> &str {
        &self.inner.chain_name
    }

    /// Chain id used for transaction signing.
    #[must_use]
    pub fn chain_id(&self) -> u64 {
        self.inner.chain_id
    }

    /// Current block number; used by the readiness probe.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC endpoint is unreachable.
    pub async fn block_number(&self) -> Result<u64, ChainError> {
        let block = self.inner.provider.get_block_number().await?;
        Ok(block.as_u64())
    }

    // =========================================================================
    // Catalog reads
    // =========================================================================

    /// Total number of listings ever created.
    ///
    /// # Errors
    ///
    /// Returns an error if the read call fails.
    #[instrument(skip(self))]
    pub async fn listing_count(&self) -> Result<u64, ChainError> {
        if let Some(CacheValue::Count(count)) = self.inner.cache.get(&CacheKey::Count).await {
            debug!("Cache hit for listing count");
            return Ok(count);
        }

        let count = self.inner.read.listing_count().call().await?.as_u64();
        self.inner
            .cache
            .insert(CacheKey::Count, CacheValue::Count(count))
            .await;
        Ok(count)
    }

    /// Fetch one listing by id.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::NotFound`] for an empty slot (zero owner).
    #[instrument(skip(self), fields(id = %id))]
    pub async fn listing(&self, id: ListingId) -> Result<Listing, ChainError> {
        let key = CacheKey::Listing(id);
        if let Some(CacheValue::Listing(listing)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for listing");
            return Ok(*listing);
        }

        // Range-check against the counter so an out-of-range id is a 404
        // regardless of whether the contract reverts or returns zeroes
        let count = self.listing_count().await?;
        if id.as_u64() == 0 || id.as_u64() > count {
            return Err(ChainError::NotFound(id));
        }

        let listing = self.fetch_listing(id).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Listing(Box::new(listing.clone())))
            .await;
        Ok(listing)
    }

    /// Uncached single-listing read.
    async fn fetch_listing(&self, id: ListingId) -> Result<Listing, ChainError> {
        let raw = self.inner.read.listings(U256::from(id.as_u64())).call().await?;
        if raw.0 == Address::zero() {
            return Err(ChainError::NotFound(id));
        }
        Ok(Listing::from_raw(id, raw))
    }

    /// Fetch one catalog page of active listings.
    ///
    /// The page's per-id reads are issued concurrently and id order is
    /// preserved; inactive listings are dropped without re-flowing ids, so
    /// a page may hold fewer than ten entries.
    ///
    /// # Errors
    ///
    /// Returns an error for page 0 or when any read call fails.
    #[instrument(skip(self))]
    pub async fn catalog_page(
        &self,
        page_number: u64,
    ) -> Result<(CatalogPage, Vec<Listing>), ChainError> {
        let count = self.listing_count().await?;
        let page = CatalogPage::new(page_number, count)?;

        let key = CacheKey::Page(page.page());
        if let Some(CacheValue::Page(listings)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for catalog page");
            return Ok((page, listings));
        }

        let Some(bounds) = page.bounds() else {
            return Ok((page, Vec::new()));
        };

        let fetched =
            futures::future::try_join_all(bounds.ids().map(|id| self.fetch_listing(id))).await?;
        let listings: Vec<Listing> = fetched.into_iter().filter(|l| l.active).collect();

        self.inner
            .cache
            .insert(key, CacheValue::Page(listings.clone()))
            .await;

        Ok((page, listings))
    }

    // =========================================================================
    // Purchase reads
    // =========================================================================

    /// Whether `buyer` has purchased `listing_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the read call fails.
    #[instrument(skip(self), fields(listing_id = %listing_id))]
    pub async fn has_purchased(
        &self,
        buyer: Address,
        listing_id: ListingId,
    ) -> Result<bool, ChainError> {
        Ok(self
            .inner
            .read
            .has_purchased(buyer, U256::from(listing_id.as_u64()))
            .call()
            .await?)
    }

    /// Number of purchases recorded against a listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the read call fails.
    pub async fn purchase_count(&self, listing_id: ListingId) -> Result<u64, ChainError> {
        let count = self
            .inner
            .read
            .purchase_counts(U256::from(listing_id.as_u64()))
            .call()
            .await?;
        Ok(count.as_u64())
    }

    /// Everything `buyer` has purchased, joined with the listings bought.
    ///
    /// The contract helper returns three parallel arrays; they are zipped
    /// here and a length mismatch is an error, not a truncation.
    ///
    /// # Errors
    ///
    /// Returns an error if the read call fails or the arrays disagree.
    #[instrument(skip(self))]
    pub async fn purchases_of(&self, buyer: Address) -> Result<Vec<PurchasedDataset>, ChainError> {
        let (ids, purchases, listings) =
            self.inner.read.get_user_purchases(buyer).call().await?;

        if ids.len() != purchases.len() || ids.len() != listings.len() {
            return Err(ChainError::Inconsistent(format!(
                "getUserPurchases arrays disagree: {} ids, {} purchases, {} listings",
                ids.len(),
                purchases.len(),
                listings.len()
            )));
        }

        Ok(ids
            .into_iter()
            .zip(purchases)
            .zip(listings)
            .map(|((id, purchase), listing)| {
                let listing_id = ListingId::new(id.as_u64());
                PurchasedDataset {
                    listing_id,
                    purchase: purchase.into(),
                    listing: Listing::from_info(listing_id, listing),
                }
            })
            .collect())
    }

    /// Every listing owned by `owner`, joined with its sales counter.
    ///
    /// # Errors
    ///
    /// Returns an error if any read call fails.
    #[instrument(skip(self))]
    pub async fn listings_of(&self, owner: Address) -> Result<Vec<ListingWithSales>, ChainError> {
        let count = self.listing_count().await?;
        let ids = (1..=count).map(ListingId::new);

        let all = futures::future::try_join_all(ids.map(|id| self.fetch_listing(id))).await?;
        let mine: Vec<Listing> = all.into_iter().filter(|l| l.owner == owner).collect();

        let sales =
            futures::future::try_join_all(mine.iter().map(|l| self.purchase_count(l.id))).await?;

        Ok(mine
            .into_iter()
            .zip(sales)
            .map(|(listing, sales)| ListingWithSales { listing, sales })
            .collect())
    }

    // =========================================================================
    // State-changing calls (require the operator wallet)
    // =========================================================================

    fn write_contract(&self) -> Result<&DataMarket<OperatorClient>, ChainError> {
        self.inner.write.as_ref().ok_or(ChainError::NoSigner)
    }

    /// Submit `createListing` and wait for the receipt.
    ///
    /// The new listing id is recovered from the `ListingCreated` event when
    /// the node returns logs with the receipt.
    ///
    /// # Errors
    ///
    /// Returns an error without a signer, or when the transaction is
    /// dropped or reverts.
    #[instrument(skip(self, sealed_pointer), fields(title = %title))]
    pub async fn create_listing(
        &self,
        title: &str,
        price_wei: U256,
        description: &str,
        sealed_pointer: &str,
    ) -> Result<ListingCreated, ChainError> {
        let contract = self.write_contract()?;

        let call = contract.create_listing(
            title.to_string(),
            price_wei,
            description.to_string(),
            sealed_pointer.to_string(),
        );
        let pending = call.send().await?;
        let tx_hash = *pending;

        let receipt = pending.await?.ok_or(ChainError::TxDropped(tx_hash))?;
        if receipt.status != Some(U64::from(1)) {
            return Err(ChainError::TxReverted(tx_hash));
        }

        let listing_id = receipt.logs.iter().find_map(|log| {
            ListingCreatedFilter::decode_log(&RawLog::from(log.clone()))
                .ok()
                .map(|event| ListingId::new(event.listing_id.as_u64()))
        });

        // New listing changes the catalog
        self.invalidate_catalog().await;

        Ok(ListingCreated {
            listing_id,
            tx: TxOutcome {
                tx_hash,
                block_number: receipt.block_number.map(|b| b.as_u64()),
            },
        })
    }

    /// Purchase a listing, paying its current price from the operator
    /// wallet.
    ///
    /// # Errors
    ///
    /// Returns an error without a signer, for an inactive listing, or when
    /// the transaction is dropped or reverts.
    #[instrument(skip(self), fields(listing_id = %listing_id))]
    pub async fn purchase(&self, listing_id: ListingId) -> Result<TxOutcome, ChainError> {
        let contract = self.write_contract()?;

        let listing = self.fetch_listing(listing_id).await?;
        if !listing.active {
            return Err(ChainError::Inactive(listing_id));
        }

        let call = contract
            .purchase_data(U256::from(listing_id.as_u64()))
            .value(listing.price_wei);
        let pending = call.send().await?;
        let tx_hash = *pending;

        let receipt = pending.await?.ok_or(ChainError::TxDropped(tx_hash))?;
        if receipt.status != Some(U64::from(1)) {
            return Err(ChainError::TxReverted(tx_hash));
        }

        Ok(TxOutcome {
            tx_hash,
            block_number: receipt.block_number.map(|b| b.as_u64()),
        })
    }

    /// Confirm delivery of a purchased listing, releasing escrow to the
    /// seller.
    ///
    /// # Errors
    ///
    /// Returns an error without a signer, or when the transaction is
    /// dropped or reverts.
    #[instrument(skip(self), fields(listing_id = %listing_id))]
    pub async fn confirm_delivery(&self, listing_id: ListingId) -> Result<TxOutcome, ChainError> {
        let contract = self.write_contract()?;

        let call = contract.confirm_delivery(U256::from(listing_id.as_u64()));
        let pending = call.send().await?;
        let tx_hash = *pending;

        let receipt = pending.await?.ok_or(ChainError::TxDropped(tx_hash))?;
        if receipt.status != Some(U64::from(1)) {
            return Err(ChainError::TxReverted(tx_hash));
        }

        Ok(TxOutcome {
            tx_hash,
            block_number: receipt.block_number.map(|b| b.as_u64()),
        })
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Drop all cached catalog reads.
    pub async fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}
