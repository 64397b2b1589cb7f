//! Wallet-derived auth signatures for decryption requests.
//!
//! The node network checks access-control conditions against the address
//! recovered from an EIP-191 personal signature over a dated auth
//! message.

use chrono::{SecondsFormat, Utc};
use ethers::signers::{LocalWallet, Signer};
use ethers::utils::{hex, to_checksum};

use super::EncryptionError;
use super::envelope::{AuthSig, build_auth_message};

/// Sign a fresh auth message with the operator wallet.
///
/// # Errors
///
/// Returns an error if signing fails.
pub async fn generate_auth_sig(
    wallet: &LocalWallet,
    chain_id: u64,
) -> Result<AuthSig, EncryptionError> {
    let address = to_checksum(&wallet.address(), None);
    let nonce = hex::encode(rand::random::<[u8; 16]>());
    let issued_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let message = build_auth_message(&address, chain_id, &nonce, &issued_at);

    let signature = wallet
        .sign_message(message.as_bytes())
        .await
        .map_err(|e| EncryptionError::Signer(e.to_string()))?;

    Ok(AuthSig {
        sig: format!("0x{}", hex::encode(signature.to_vec())),
        derived_via: "web3.eth.personal.sign".to_string(),
        signed_message: message,
        address,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::Signature;

    fn test_wallet() -> LocalWallet {
        // Well-known throwaway key (hardhat account #0)
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
            .parse()
            .expect("valid key")
    }

    #[tokio::test]
    async fn test_auth_sig_shape() {
        let wallet = test_wallet();
        let auth = generate_auth_sig(&wallet, 11_155_111)
            .await
            .expect("signs");

        assert_eq!(auth.derived_via, "web3.eth.personal.sign");
        // 0x + 65 bytes of hex
        assert!(auth.sig.starts_with("0x"));
        assert_eq!(auth.sig.len(), 132);
        assert!(auth.signed_message.contains(&auth.address));
        assert!(auth.signed_message.contains("Chain ID: 11155111"));
    }

    #[tokio::test]
    async fn test_auth_sig_recovers_wallet_address() {
        let wallet = test_wallet();
        let auth = generate_auth_sig(&wallet, 1).await.expect("signs");

        let raw = hex::decode(auth.sig.trim_start_matches("0x")).expect("hex");
        let signature = Signature::try_from(raw.as_slice()).expect("signature");
        let recovered = signature
            .recover(auth.signed_message.clone())
            .expect("recovers");
        assert_eq!(recovered, wallet.address());
    }
}
