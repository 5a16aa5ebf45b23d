//! Per-market cap configuration store.

use crate::error::GuardError;
use launch_storage::StorageService;
use launch_types::{CapConfig, MarketId, StorageKey};
use std::sync::Arc;

pub struct CapConfigStore {
	storage: Arc<StorageService>,
}

impl CapConfigStore {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Decodes `blob` and stores it for the market, overwriting any
	/// previous configuration.
	pub async fn set(&self, market: &MarketId, blob: &[u8]) -> Result<CapConfig, GuardError> {
		let config = CapConfig::decode(blob);
		self.storage
			.store(StorageKey::CapConfigs, &market.to_string(), &config)
			.await?;
		Ok(config)
	}

	/// Configuration of the market; unknown markets are disabled.
	pub async fn get(&self, market: &MarketId) -> Result<CapConfig, GuardError> {
		Ok(self
			.storage
			.retrieve_optional(StorageKey::CapConfigs, &market.to_string())
			.await?
			.unwrap_or_default())
	}
}
