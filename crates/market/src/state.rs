//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::MarketConfig;
use crate::error::Result;
use crate::services::Marketplace;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// marketplace flows and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: MarketConfig,
    market: Marketplace,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error when any external client cannot be constructed.
    pub fn new(config: MarketConfig) -> Result<Self> {
        let market = Marketplace::new(&config)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, market }),
        })
    }

    /// Get a reference to the service configuration.
    #[must_use]
    pub fn config(&self) -> &MarketConfig {
        &self.inner.config
    }

    /// Get a reference to the marketplace flows.
    #[must_use]
    pub fn market(&self) -> &Marketplace {
        &self.inner.market
    }
}
