//! Decrypt-and-download flow.
//!
//! Reads the sealed pointer from the chain, has the encryption network
//! release the CID, verifies it against the envelope's hash anchor, then
//! fetches the bytes through the gateway with the original filename.

use ddm_core::ListingId;
use tracing::{info, instrument, warn};

use crate::chain::ChainError;
use crate::encryption::{SealedEnvelope, generate_auth_sig};
use crate::error::Result;
use crate::storage::{Cid, DEFAULT_FILE_NAME};

use super::Marketplace;

/// A downloadable object: bytes plus the headers a client needs.
#[derive(Debug, Clone)]
pub struct Download {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Marketplace {
    /// Full flow for a listing: decrypt its pointer, then fetch.
    ///
    /// # Errors
    ///
    /// Returns an error when the listing does not exist, its envelope is
    /// malformed, the network refuses to release the CID, or the gateway
    /// fetch fails. Requires the operator wallet for the auth signature.
    #[instrument(skip(self), fields(listing_id = %id))]
    pub async fn download(&self, id: ListingId) -> Result<Download> {
        let listing = self.chain().listing(id).await?;
        let envelope = SealedEnvelope::parse(&listing.sealed_pointer)?;

        let wallet = self.chain().wallet().ok_or(ChainError::NoSigner)?;
        let auth_sig = generate_auth_sig(wallet, self.chain().chain_id()).await?;

        let released = self
            .encryption()
            .decrypt(&envelope, &auth_sig, self.chain().chain_name())
            .await?;
        info!("Pointer released by encryption network");

        let cid = Cid::parse(&released)?;
        self.fetch_object(&cid).await
    }

    /// Raw gateway proxy: fetch an already-released CID.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid CID or a failed gateway fetch.
    #[instrument(skip(self))]
    pub async fn download_by_cid(&self, raw_cid: &str) -> Result<Download> {
        let cid = Cid::parse(raw_cid)?;
        self.fetch_object(&cid).await
    }

    async fn fetch_object(&self, cid: &Cid) -> Result<Download> {
        let object = self.storage().fetch(cid).await?;

        // Pin metadata is best-effort; a missing name falls back rather
        // than failing a download we already have bytes for.
        let file_name = match self.storage().file_name(cid).await {
            Ok(Some(name)) if !name.is_empty() => name,
            Ok(_) => DEFAULT_FILE_NAME.to_string(),
            Err(e) => {
                warn!(cid = %cid, error = %e, "Pin metadata lookup failed");
                DEFAULT_FILE_NAME.to_string()
            }
        };

        Ok(Download {
            file_name,
            content_type: object.content_type,
            bytes: object.bytes,
        })
    }
}
