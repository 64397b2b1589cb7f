//! The sealed-pointer envelope stored on-chain.
//!
//! Instead of a plain CID, a listing's `dataHash` slot holds a JSON
//! envelope produced at publish time: the encrypted CID, the sha-256 of
//! the plaintext CID, and the access-control conditions under which the
//! node network will release it. The field names here are part of the
//! stored format and must not change.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::EncryptionError;

/// Comparison applied to the result of a condition's RPC method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnValueTest {
    pub comparator: String,
    pub value: String,
}

/// One access-control condition evaluated by the encryption network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlCondition {
    pub contract_address: String,
    pub standard_contract_type: String,
    pub chain: String,
    pub method: String,
    pub parameters: Vec<String>,
    pub return_value_test: ReturnValueTest,
}

impl AccessControlCondition {
    /// The demo-wide default policy: any wallet with a balance (including
    /// zero) on `chain` may decrypt.
    #[must_use]
    pub fn any_wallet(chain: &str) -> Self {
        Self {
            contract_address: String::new(),
            standard_contract_type: String::new(),
            chain: chain.to_string(),
            method: "eth_getBalance".to_string(),
            parameters: vec![":userAddress".to_string(), "latest".to_string()],
            return_value_test: ReturnValueTest {
                comparator: ">=".to_string(),
                value: "0".to_string(),
            },
        }
    }
}

/// The JSON envelope stored in a listing's `dataHash` slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedEnvelope {
    pub ciphertext: String,
    pub data_to_encrypt_hash: String,
    pub access_control_conditions: Vec<AccessControlCondition>,
}

impl SealedEnvelope {
    /// Parse an envelope out of the on-chain string.
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::MalformedEnvelope`] when the slot holds
    /// anything but a valid envelope.
    pub fn parse(raw: &str) -> Result<Self, EncryptionError> {
        if raw.is_empty() {
            return Err(EncryptionError::MalformedEnvelope(
                "data hash cannot be empty".to_string(),
            ));
        }
        serde_json::from_str(raw)
            .map_err(|e| EncryptionError::MalformedEnvelope(e.to_string()))
    }

    /// Serialize the envelope to the exact string stored on-chain.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, EncryptionError> {
        serde_json::to_string(self).map_err(|e| EncryptionError::MalformedEnvelope(e.to_string()))
    }
}

/// Wallet signature authorizing a decryption request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSig {
    pub sig: String,
    pub derived_via: String,
    pub signed_message: String,
    pub address: String,
}

/// Hex sha-256 of a plaintext; the envelope's integrity anchor.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    ethers::utils::hex::encode(digest)
}

/// Build the personal-sign auth message for a decryption request.
#[must_use]
pub fn build_auth_message(address: &str, chain_id: u64, nonce: &str, issued_at: &str) -> String {
    format!(
        "ddm-market wants you to sign in with your Ethereum account:\n\
         {address}\n\
         \n\
         URI: ddm:market\n\
         Version: 1\n\
         Chain ID: {chain_id}\n\
         Nonce: {nonce}\n\
         Issued At: {issued_at}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_round_trip_preserves_stored_keys() {
        let envelope = SealedEnvelope {
            ciphertext: "c2VhbGVk".to_string(),
            data_to_encrypt_hash: "ab".repeat(32),
            access_control_conditions: vec![AccessControlCondition::any_wallet("sepolia")],
        };

        let json = envelope.to_json().expect("serializes");
        // Stored format: camelCase keys, exactly as written by the browser client
        assert!(json.contains("\"ciphertext\""));
        assert!(json.contains("\"dataToEncryptHash\""));
        assert!(json.contains("\"accessControlConditions\""));
        assert!(json.contains("\"returnValueTest\""));
        assert!(json.contains("\"standardContractType\""));

        let back = SealedEnvelope::parse(&json).expect("parses");
        assert_eq!(back, envelope);
    }

    #[test]
    fn test_envelope_parse_rejects_empty_and_garbage() {
        assert!(matches!(
            SealedEnvelope::parse(""),
            Err(EncryptionError::MalformedEnvelope(_))
        ));
        assert!(matches!(
            SealedEnvelope::parse("QmNotAnEnvelope"),
            Err(EncryptionError::MalformedEnvelope(_))
        ));
        assert!(matches!(
            SealedEnvelope::parse("{\"ciphertext\":\"x\"}"),
            Err(EncryptionError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn test_any_wallet_condition_shape() {
        let condition = AccessControlCondition::any_wallet("sepolia");
        assert_eq!(condition.method, "eth_getBalance");
        assert_eq!(condition.parameters, vec![":userAddress", "latest"]);
        assert_eq!(condition.return_value_test.comparator, ">=");
        assert_eq!(condition.return_value_test.value, "0");
        assert!(condition.contract_address.is_empty());
    }

    #[test]
    fn test_sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_auth_message_layout() {
        let message = build_auth_message("0xAbC", 11_155_111, "deadbeef", "2026-01-01T00:00:00Z");
        assert!(message.starts_with(
            "ddm-market wants you to sign in with your Ethereum account:\n0xAbC\n"
        ));
        assert!(message.contains("Chain ID: 11155111"));
        assert!(message.contains("Nonce: deadbeef"));
        assert!(message.ends_with("Issued At: 2026-01-01T00:00:00Z"));
    }
}
