//! Pinning gateway client.
//!
//! File bytes never live in this repository: they are pinned to IPFS
//! through a Pinata-style REST API and read back through a dedicated
//! gateway. This client covers the three calls the marketplace needs:
//! upload, content fetch, and pin metadata (for the original filename).

use std::sync::{Arc, LazyLock};

use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::config::GatewayConfig;

/// Fallback download filename when the gateway has no pin metadata.
pub const DEFAULT_FILE_NAME: &str = "dataset";

/// CID shapes accepted by the download proxy: base58 v0 (`Qm…`) or
/// base32 v1 (`b…`).
static CID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Qm[1-9A-HJ-NP-Za-km-z]{44}|b[A-Za-z2-7]{58})$").expect("valid pattern")
});

/// Errors that can occur when interacting with the pinning gateway.
#[derive(Debug, Error)]
pub enum StorageError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("gateway error: {status} - {message}")]
    Api { status: u16, message: String },

    /// String is not a CID the gateway would serve.
    #[error("invalid data hash format: {0}")]
    InvalidCid(String),

    /// Upload was attempted with no bytes.
    #[error("file is empty")]
    EmptyFile,

    /// Failed to parse a response or build a request.
    #[error("parse error: {0}")]
    Parse(String),
}

/// A validated content identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Cid(String);

impl Cid {
    /// Validate a string against the accepted CID shapes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidCid`] for anything else.
    pub fn parse(s: &str) -> Result<Self, StorageError> {
        if CID_PATTERN.is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(StorageError::InvalidCid(s.to_string()))
        }
    }

    /// The CID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Cid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bytes fetched from the gateway, with the content type it reported.
#[derive(Debug, Clone)]
pub struct FetchedObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Successful pin response from the upload endpoint.
#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// One row of the pin list endpoint.
#[derive(Debug, Deserialize)]
struct PinRow {
    metadata: Option<PinRowMetadata>,
}

#[derive(Debug, Deserialize)]
struct PinRowMetadata {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PinListResponse {
    rows: Vec<PinRow>,
}

/// Client for the pinning gateway REST API.
#[derive(Clone)]
pub struct GatewayClient {
    inner: Arc<GatewayClientInner>,
}

struct GatewayClientInner {
    client: reqwest::Client,
    api_base: String,
    gateway_base: String,
}

impl GatewayClient {
    /// Create a new gateway client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &GatewayConfig) -> Result<Self, StorageError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.jwt.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth_value)
                .map_err(|e| StorageError::Parse(format!("Invalid JWT format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(GatewayClientInner {
                client,
                api_base: config.api_base.trim_end_matches('/').to_string(),
                gateway_base: config.gateway_base.trim_end_matches('/').to_string(),
            }),
        })
    }

    /// Pin a file and return its CID.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty file, a failed upload, or a response
    /// whose hash is not a valid CID.
    #[instrument(skip(self, bytes), fields(file_name = %file_name, size = bytes.len()))]
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<Cid, StorageError> {
        if bytes.is_empty() {
            return Err(StorageError::EmptyFile);
        }

        let mut part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        if let Some(mime) = content_type {
            part = part
                .mime_str(mime)
                .map_err(|e| StorageError::Parse(format!("Invalid content type: {e}")))?;
        }
        let form = reqwest::multipart::Form::new().part("file", part);

        let url = format!("{}/pinning/pinFileToIPFS", self.inner.api_base);
        let response = self.inner.client.post(&url).multipart(form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StorageError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let pin: PinResponse = response
            .json()
            .await
            .map_err(|e| StorageError::Parse(e.to_string()))?;

        Cid::parse(&pin.ipfs_hash)
    }

    /// Fetch the bytes behind a CID through the dedicated gateway.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway request fails.
    #[instrument(skip(self), fields(cid = %cid))]
    pub async fn fetch(&self, cid: &Cid) -> Result<FetchedObject, StorageError> {
        let url = format!("{}/ipfs/{}", self.inner.gateway_base, cid);
        let response = self.inner.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StorageError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        let bytes = response.bytes().await?.to_vec();

        Ok(FetchedObject {
            bytes,
            content_type,
        })
    }

    /// The filename recorded when the CID was pinned, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the pin list request fails.
    #[instrument(skip(self), fields(cid = %cid))]
    pub async fn file_name(&self, cid: &Cid) -> Result<Option<String>, StorageError> {
        let url = format!(
            "{}/data/pinList?hashContains={}&status=pinned",
            self.inner.api_base,
            urlencoding::encode(cid.as_str())
        );

        let response = self.inner.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StorageError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let list: PinListResponse = response
            .json()
            .await
            .map_err(|e| StorageError::Parse(e.to_string()))?;

        Ok(list
            .rows
            .into_iter()
            .next()
            .and_then(|row| row.metadata)
            .and_then(|metadata| metadata.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cid_v0_accepted() {
        let cid = Cid::parse("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG").expect("v0 CID");
        assert_eq!(
            cid.as_str(),
            "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG"
        );
    }

    #[test]
    fn test_cid_v1_accepted() {
        assert!(
            Cid::parse("bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi").is_ok()
        );
    }

    #[test]
    fn test_cid_rejects_garbage() {
        assert!(Cid::parse("").is_err());
        assert!(Cid::parse("not-a-cid").is_err());
        // Path traversal through the gateway URL must not validate
        assert!(Cid::parse("../../../etc/passwd").is_err());
        // v0 prefix but wrong length
        assert!(Cid::parse("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79").is_err());
        // v0 alphabet excludes 0, O, I, l
        assert!(Cid::parse("Qm0wAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG").is_err());
    }

    #[test]
    fn test_cid_serializes_as_plain_string() {
        let cid = Cid::parse("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG").expect("v0 CID");
        let json = serde_json::to_string(&cid).expect("serializes");
        assert_eq!(json, "\"QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG\"");
    }
}
