//! CLI command implementations.
//!
//! Every command is a thin wrapper over the `ddm-market` library flows,
//! configured from the same environment variables as the service.

pub mod account;
pub mod catalog;
pub mod download;
pub mod publish;

use ddm_market::config::MarketConfig;
use ddm_market::services::Marketplace;
use ethers::types::Address;

/// Build the marketplace from the environment.
pub fn connect() -> Result<Marketplace, Box<dyn std::error::Error>> {
    let config = MarketConfig::from_env()?;
    Ok(Marketplace::new(&config)?)
}

/// Parse a user-supplied address argument.
pub fn parse_address(raw: &str) -> Result<Address, Box<dyn std::error::Error>> {
    Ok(raw.parse::<Address>()?)
}
