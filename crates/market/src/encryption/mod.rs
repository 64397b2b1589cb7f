//! Threshold-encryption network client.
//!
//! The node network owns all encryption and access-control evaluation;
//! this client only sequences requests. Encrypting asks one healthy node
//! to seal a plaintext under a condition set; decrypting asks the network
//! to release it and requires a quorum of nodes to agree on the result
//! before it is trusted (and the released plaintext must match the
//! envelope's sha-256 anchor).

mod auth;
mod envelope;

pub use auth::generate_auth_sig;
pub use envelope::{
    AccessControlCondition, AuthSig, ReturnValueTest, SealedEnvelope, build_auth_message,
    sha256_hex,
};

use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::EncryptionConfig;

/// Errors that can occur when interacting with the encryption network.
#[derive(Debug, Error)]
pub enum EncryptionError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A node returned an error response.
    #[error("node error: {status} - {message}")]
    Node { status: u16, message: String },

    /// Too few nodes answered the handshake.
    #[error("encryption network unavailable: {healthy} of {required} required nodes reachable")]
    Unavailable { healthy: usize, required: usize },

    /// Too few nodes agreed on a released plaintext.
    #[error("decryption quorum not reached: {agreed} nodes agreed, {required} required")]
    QuorumNotReached { agreed: usize, required: usize },

    /// Released plaintext did not match the envelope's integrity hash.
    #[error("released plaintext does not match the envelope hash")]
    HashMismatch,

    /// The on-chain slot did not hold a valid envelope.
    #[error("malformed encrypted data payload: {0}")]
    MalformedEnvelope(String),

    /// Auth signature could not be produced.
    #[error("auth signature error: {0}")]
    Signer(String),

    /// Failed to parse a node response.
    #[error("parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EncryptRequest<'a> {
    data_to_encrypt: String,
    data_to_encrypt_hash: &'a str,
    access_control_conditions: &'a [AccessControlCondition],
    chain: &'a str,
}

#[derive(Debug, Deserialize)]
struct EncryptResponse {
    ciphertext: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveRequest<'a> {
    ciphertext: &'a str,
    data_to_encrypt_hash: &'a str,
    access_control_conditions: &'a [AccessControlCondition],
    chain: &'a str,
    auth_sig: &'a AuthSig,
}

#[derive(Debug, Deserialize)]
struct RetrieveResponse {
    /// Base64 of the released plaintext.
    plaintext: String,
}

/// Client for the threshold-encryption node network.
#[derive(Clone)]
pub struct EncryptionClient {
    inner: Arc<EncryptionClientInner>,
}

struct EncryptionClientInner {
    client: reqwest::Client,
    network: String,
    nodes: Vec<String>,
    threshold: usize,
}

impl EncryptionClient {
    /// Create a new encryption network client.
    #[must_use]
    pub fn new(config: &EncryptionConfig) -> Self {
        Self {
            inner: Arc::new(EncryptionClientInner {
                client: reqwest::Client::new(),
                network: config.network.clone(),
                nodes: config
                    .nodes
                    .iter()
                    .map(|n| n.trim_end_matches('/').to_string())
                    .collect(),
                threshold: config.threshold,
            }),
        }
    }

    /// Decryption quorum size.
    #[must_use]
    pub fn threshold(&self) -> usize {
        self.inner.threshold
    }

    /// Handshake with every node and return the reachable ones.
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::Unavailable`] when fewer than the quorum
    /// answer.
    #[instrument(skip(self))]
    async fn healthy_nodes(&self) -> Result<Vec<&str>, EncryptionError> {
        let checks = self.inner.nodes.iter().map(|node| async move {
            let url = format!("{node}/web/handshake?network={}", self.inner.network);
            match self.inner.client.get(&url).send().await {
                Ok(response) if response.status().is_success() => Some(node.as_str()),
                Ok(response) => {
                    warn!(node = %node, status = %response.status(), "Node handshake rejected");
                    None
                }
                Err(e) => {
                    warn!(node = %node, error = %e, "Node handshake failed");
                    None
                }
            }
        });

        let healthy: Vec<&str> = futures::future::join_all(checks)
            .await
            .into_iter()
            .flatten()
            .collect();

        if healthy.len() < self.inner.threshold {
            return Err(EncryptionError::Unavailable {
                healthy: healthy.len(),
                required: self.inner.threshold,
            });
        }
        debug!(healthy = healthy.len(), "Encryption network connected");
        Ok(healthy)
    }

    /// Seal a plaintext under a condition set.
    ///
    /// # Errors
    ///
    /// Returns an error when no healthy node accepts the request.
    #[instrument(skip(self, plaintext, conditions))]
    pub async fn encrypt(
        &self,
        plaintext: &str,
        conditions: &[AccessControlCondition],
        chain: &str,
    ) -> Result<SealedEnvelope, EncryptionError> {
        let nodes = self.healthy_nodes().await?;
        let data_to_encrypt_hash = sha256_hex(plaintext.as_bytes());

        let request = EncryptRequest {
            data_to_encrypt: BASE64.encode(plaintext),
            data_to_encrypt_hash: &data_to_encrypt_hash,
            access_control_conditions: conditions,
            chain,
        };

        // Any single node can seal; try them in order
        let mut last_error = None;
        for node in nodes {
            match self.encrypt_on(node, &request).await {
                Ok(ciphertext) => {
                    return Ok(SealedEnvelope {
                        ciphertext,
                        data_to_encrypt_hash,
                        access_control_conditions: conditions.to_vec(),
                    });
                }
                Err(e) => {
                    warn!(node = %node, error = %e, "Encrypt request failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(EncryptionError::Unavailable {
            healthy: 0,
            required: self.inner.threshold,
        }))
    }

    async fn encrypt_on(
        &self,
        node: &str,
        request: &EncryptRequest<'_>,
    ) -> Result<String, EncryptionError> {
        let url = format!("{node}/web/encryption/encrypt");
        let response = self.inner.client.post(&url).json(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EncryptionError::Node {
                status: status.as_u16(),
                message,
            });
        }

        let body: EncryptResponse = response
            .json()
            .await
            .map_err(|e| EncryptionError::Parse(e.to_string()))?;
        Ok(body.ciphertext)
    }

    /// Ask the network to release an envelope's plaintext.
    ///
    /// Every healthy node is queried; the release succeeds only when at
    /// least the quorum agree on one plaintext and that plaintext matches
    /// the envelope's sha-256 anchor.
    ///
    /// # Errors
    ///
    /// Returns an error on quorum failure or a hash mismatch.
    #[instrument(skip(self, envelope, auth_sig))]
    pub async fn decrypt(
        &self,
        envelope: &SealedEnvelope,
        auth_sig: &AuthSig,
        chain: &str,
    ) -> Result<String, EncryptionError> {
        let nodes = self.healthy_nodes().await?;

        let request = RetrieveRequest {
            ciphertext: &envelope.ciphertext,
            data_to_encrypt_hash: &envelope.data_to_encrypt_hash,
            access_control_conditions: &envelope.access_control_conditions,
            chain,
            auth_sig,
        };

        let releases = futures::future::join_all(
            nodes.iter().map(|node| self.retrieve_from(node, &request)),
        )
        .await;

        let plaintexts = releases.into_iter().filter_map(|result| match result {
            Ok(plaintext) => Some(plaintext),
            Err(e) => {
                warn!(error = %e, "Node refused release");
                None
            }
        });

        let Some((plaintext, agreed)) = tally(plaintexts) else {
            return Err(EncryptionError::QuorumNotReached {
                agreed: 0,
                required: self.inner.threshold,
            });
        };

        if agreed < self.inner.threshold {
            return Err(EncryptionError::QuorumNotReached {
                agreed,
                required: self.inner.threshold,
            });
        }

        if sha256_hex(plaintext.as_bytes()) != envelope.data_to_encrypt_hash {
            return Err(EncryptionError::HashMismatch);
        }

        Ok(plaintext)
    }

    async fn retrieve_from(
        &self,
        node: &str,
        request: &RetrieveRequest<'_>,
    ) -> Result<String, EncryptionError> {
        let url = format!("{node}/web/encryption/retrieve");
        let response = self.inner.client.post(&url).json(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EncryptionError::Node {
                status: status.as_u16(),
                message,
            });
        }

        let body: RetrieveResponse = response
            .json()
            .await
            .map_err(|e| EncryptionError::Parse(e.to_string()))?;

        let bytes = BASE64
            .decode(body.plaintext)
            .map_err(|e| EncryptionError::Parse(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| EncryptionError::Parse(e.to_string()))
    }
}

/// Pick the most-agreed-upon plaintext and how many nodes released it.
fn tally(plaintexts: impl Iterator<Item = String>) -> Option<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for plaintext in plaintexts {
        *counts.entry(plaintext).or_insert(0) += 1;
    }
    counts.into_iter().max_by_key(|(_, count)| *count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_empty() {
        assert!(tally(std::iter::empty()).is_none());
    }

    #[test]
    fn test_tally_majority_wins() {
        let released = vec![
            "QmA".to_string(),
            "QmA".to_string(),
            "QmB".to_string(),
            "QmA".to_string(),
        ];
        let (plaintext, agreed) = tally(released.into_iter()).expect("tallies");
        assert_eq!(plaintext, "QmA");
        assert_eq!(agreed, 3);
    }

    #[test]
    fn test_tally_single_response() {
        let (plaintext, agreed) = tally(std::iter::once("QmA".to_string())).expect("tallies");
        assert_eq!(plaintext, "QmA");
        assert_eq!(agreed, 1);
    }
}
