//! Market service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DDM_RPC_URL` - JSON-RPC endpoint of the chain the contract lives on
//! - `DDM_CONTRACT_ADDRESS` - Address of the marketplace contract
//! - `PINATA_JWT` - Pinning gateway API token (JWT)
//! - `PINATA_GATEWAY_URL` - Dedicated gateway base URL (e.g., https://gw.example.com)
//! - `LIT_NODES` - Comma-separated base URLs of threshold-encryption nodes
//!
//! ## Optional
//! - `DDM_HOST` - Bind address (default: 127.0.0.1)
//! - `DDM_PORT` - Listen port (default: 3000)
//! - `DDM_CHAIN_ID` - Chain id for transaction signing (default: 11155111)
//! - `DDM_CHAIN` - Chain name used in access-control conditions (default: sepolia)
//! - `DDM_OPERATOR_KEY` - Hex private key of the operator wallet; read-only
//!   deployments omit it
//! - `PINATA_API_URL` - Pinning API base (default: https://api.pinata.cloud)
//! - `LIT_THRESHOLD` - Decryption quorum size (default: 2)
//! - `LIT_NETWORK` - Encryption network name (default: datil-dev)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use ethers::types::Address;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Market service configuration.
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Chain and contract configuration
    pub chain: ChainConfig,
    /// Pinning gateway configuration
    pub gateway: GatewayConfig,
    /// Threshold-encryption network configuration
    pub encryption: EncryptionConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Chain RPC, contract and operator-wallet configuration.
///
/// Implements `Debug` manually to redact the operator key.
#[derive(Clone)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL
    pub rpc_url: String,
    /// Marketplace contract address
    pub contract_address: Address,
    /// Chain id used when signing transactions
    pub chain_id: u64,
    /// Chain name used inside access-control conditions (e.g., "sepolia")
    pub chain_name: String,
    /// Operator wallet private key; absent on read-only deployments
    pub operator_key: Option<SecretString>,
}

impl std::fmt::Debug for ChainConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainConfig")
            .field("rpc_url", &self.rpc_url)
            .field("contract_address", &self.contract_address)
            .field("chain_id", &self.chain_id)
            .field("chain_name", &self.chain_name)
            .field(
                "operator_key",
                &self.operator_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Pinning gateway configuration.
///
/// Implements `Debug` manually to redact the JWT.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Pinning API base URL
    pub api_base: String,
    /// Dedicated gateway base URL used for content reads
    pub gateway_base: String,
    /// API token (JWT)
    pub jwt: SecretString,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_base", &self.api_base)
            .field("gateway_base", &self.gateway_base)
            .field("jwt", &"[REDACTED]")
            .finish()
    }
}

/// Threshold-encryption network configuration.
#[derive(Debug, Clone)]
pub struct EncryptionConfig {
    /// Network name (e.g., "datil-dev")
    pub network: String,
    /// Base URLs of the nodes this client talks to
    pub nodes: Vec<String>,
    /// Number of agreeing node responses required to release a plaintext
    pub threshold: usize,
}

impl MarketConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("DDM_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("DDM_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("DDM_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("DDM_PORT".to_string(), e.to_string()))?;

        let chain = ChainConfig::from_env()?;
        let gateway = GatewayConfig::from_env()?;
        let encryption = EncryptionConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            host,
            port,
            chain,
            gateway,
            encryption,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ChainConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let contract_address = get_required_env("DDM_CONTRACT_ADDRESS")?
            .parse::<Address>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("DDM_CONTRACT_ADDRESS".to_string(), e.to_string())
            })?;
        let chain_id = get_env_or_default("DDM_CHAIN_ID", "11155111")
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar("DDM_CHAIN_ID".to_string(), e.to_string()))?;

        let operator_key = match get_optional_env("DDM_OPERATOR_KEY") {
            Some(key) => {
                validate_private_key(&key, "DDM_OPERATOR_KEY")?;
                Some(SecretString::from(key))
            }
            None => None,
        };

        Ok(Self {
            rpc_url: get_required_env("DDM_RPC_URL")?,
            contract_address,
            chain_id,
            chain_name: get_env_or_default("DDM_CHAIN", "sepolia"),
            operator_key,
        })
    }

    /// Whether an operator wallet is configured for state-changing calls.
    #[must_use]
    pub const fn has_signer(&self) -> bool {
        self.operator_key.is_some()
    }
}

impl GatewayConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_base: get_env_or_default("PINATA_API_URL", "https://api.pinata.cloud"),
            gateway_base: get_required_env("PINATA_GATEWAY_URL")?,
            jwt: get_validated_secret("PINATA_JWT")?,
        })
    }
}

impl EncryptionConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw_nodes = get_required_env("LIT_NODES")?;
        let nodes: Vec<String> = raw_nodes
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect();
        if nodes.is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "LIT_NODES".to_string(),
                "expected at least one node URL".to_string(),
            ));
        }
        for node in &nodes {
            url::Url::parse(node).map_err(|e| {
                ConfigError::InvalidEnvVar("LIT_NODES".to_string(), format!("{node}: {e}"))
            })?;
        }

        let threshold = get_env_or_default("LIT_THRESHOLD", "2")
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar("LIT_THRESHOLD".to_string(), e.to_string()))?;
        if threshold == 0 || threshold > nodes.len() {
            return Err(ConfigError::InvalidEnvVar(
                "LIT_THRESHOLD".to_string(),
                format!("must be between 1 and the node count ({})", nodes.len()),
            ));
        }

        Ok(Self {
            network: get_env_or_default("LIT_NETWORK", "datil-dev"),
            nodes,
            threshold,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real API tokens have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a real token."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

/// Validate that a private key is 32 bytes of hex (optional 0x prefix).
fn validate_private_key(key: &str, var_name: &str) -> Result<(), ConfigError> {
    let hex = key.strip_prefix("0x").unwrap_or(key);
    if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "expected a 32-byte hex private key".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_high() {
        // Random-looking string should have high entropy
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_private_key() {
        let key = "0x".to_string() + &"ab".repeat(32);
        assert!(validate_private_key(&key, "TEST_KEY").is_ok());
        assert!(validate_private_key(&"ab".repeat(32), "TEST_KEY").is_ok());

        assert!(validate_private_key("0xabc", "TEST_KEY").is_err());
        assert!(validate_private_key(&"zz".repeat(32), "TEST_KEY").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = MarketConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            chain: ChainConfig {
                rpc_url: "http://localhost:8545".to_string(),
                contract_address: Address::zero(),
                chain_id: 11_155_111,
                chain_name: "sepolia".to_string(),
                operator_key: None,
            },
            gateway: GatewayConfig {
                api_base: "https://api.pinata.cloud".to_string(),
                gateway_base: "https://gw.test".to_string(),
                jwt: SecretString::from("jwt"),
            },
            encryption: EncryptionConfig {
                network: "datil-dev".to_string(),
                nodes: vec!["http://localhost:7470".to_string()],
                threshold: 1,
            },
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(!config.chain.has_signer());
    }

    #[test]
    fn test_chain_config_debug_redacts_key() {
        let config = ChainConfig {
            rpc_url: "http://localhost:8545".to_string(),
            contract_address: Address::zero(),
            chain_id: 11_155_111,
            chain_name: "sepolia".to_string(),
            operator_key: Some(SecretString::from("super_secret_key_material")),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("http://localhost:8545"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_key_material"));
    }

    #[test]
    fn test_gateway_config_debug_redacts_jwt() {
        let config = GatewayConfig {
            api_base: "https://api.pinata.cloud".to_string(),
            gateway_base: "https://gw.test".to_string(),
            jwt: SecretString::from("super_secret_jwt"),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("https://gw.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_jwt"));
    }
}
