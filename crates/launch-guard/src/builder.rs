//! Construction of an [`AuthorizationVerifier`] from configuration.
//!
//! Storage backends are created through factory functions keyed by
//! implementation name. External collaborators are attached explicitly;
//! any left out are [`Detached`].

use crate::collaborators::{AssetRegistry, BootstrapSource, Detached, OriginProbe};
use crate::event_bus::EventBus;
use crate::origin::OriginResolver;
use crate::verifier::{AuthorizationVerifier, GuardSettings};
use launch_config::Config;
use launch_storage::{StorageError, StorageInterface, StorageService};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Capacity of the change-notification channel.
const EVENT_CAPACITY: usize = 1000;

#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Failed to seed trusted signers: {0}")]
	Seed(String),
}

/// Factory functions needed to build a verifier.
pub struct GuardFactories<SF> {
	pub storage_factories: HashMap<String, SF>,
}

/// Builder for an [`AuthorizationVerifier`] with pluggable storage and
/// collaborators.
pub struct GuardBuilder {
	config: Config,
	source: Arc<dyn BootstrapSource>,
	assets: Arc<dyn AssetRegistry>,
	probe: Option<Arc<dyn OriginProbe>>,
}

impl GuardBuilder {
	pub fn new(config: Config) -> Self {
		Self {
			config,
			source: Arc::new(Detached),
			assets: Arc::new(Detached),
			probe: None,
		}
	}

	pub fn with_bootstrap_source(mut self, source: Arc<dyn BootstrapSource>) -> Self {
		self.source = source;
		self
	}

	pub fn with_asset_registry(mut self, assets: Arc<dyn AssetRegistry>) -> Self {
		self.assets = assets;
		self
	}

	pub fn with_origin_probe(mut self, probe: Arc<dyn OriginProbe>) -> Self {
		self.probe = Some(probe);
		self
	}

	/// Creates the primary storage backend, wires the verifier and seeds the
	/// configured trusted signers. Seeding skips signers already present.
	pub async fn build<SF>(
		self,
		factories: GuardFactories<SF>,
	) -> Result<AuthorizationVerifier, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
	{
		let primary = &self.config.storage.primary;
		let storage_config = self.config.storage.implementations.get(primary).ok_or_else(|| {
			BuilderError::Config(format!("Primary storage '{}' is not configured", primary))
		})?;
		let factory = factories.storage_factories.get(primary).ok_or_else(|| {
			BuilderError::Config(format!("Unknown storage implementation '{}'", primary))
		})?;
		let backend = match factory(storage_config) {
			Ok(backend) => {
				tracing::info!(component = "storage", implementation = %primary, "Loaded");
				backend
			},
			Err(e) => {
				tracing::error!(
					component = "storage",
					implementation = %primary,
					error = %e,
					"Failed to create storage implementation"
				);
				return Err(BuilderError::Config(format!(
					"Failed to create storage implementation '{}': {}",
					primary, e
				)));
			},
		};
		let storage = Arc::new(StorageService::new(backend));

		let settings = GuardSettings::from(&self.config.guard);
		let verifier = AuthorizationVerifier::new(
			settings,
			storage,
			self.source,
			self.assets,
			OriginResolver::new(self.probe, settings.probe_timeout),
			EventBus::new(EVENT_CAPACITY),
		);

		for signer in &self.config.guard.trusted_signers {
			let trusted = verifier
				.is_trusted_signer(*signer)
				.await
				.map_err(|e| BuilderError::Seed(e.to_string()))?;
			if trusted {
				continue;
			}
			verifier
				.add_trusted_signer(settings.admin, *signer)
				.await
				.map_err(|e| BuilderError::Seed(e.to_string()))?;
		}

		tracing::info!(
			guard_id = %self.config.guard.id,
			address = %settings.address,
			seeded_signers = self.config.guard.trusted_signers.len(),
			"Guard ready"
		);
		Ok(verifier)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use launch_storage::StorageFactory;
	use launch_types::{Address, ImplementationRegistry};

	fn config() -> Config {
		r#"
[guard]
id = "test-guard"
address = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
engine = "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee"
admin = "0xadadadadadadadadadadadadadadadadadadadad"
trusted_signers = [
	"0x1111111111111111111111111111111111111111",
	"0x2222222222222222222222222222222222222222",
]

[storage]
primary = "memory"
[storage.implementations.memory]
"#
		.parse()
		.unwrap()
	}

	fn factories() -> GuardFactories<StorageFactory> {
		GuardFactories {
			storage_factories: HashMap::from([(
				launch_storage::implementations::memory::Registry::NAME.to_string(),
				launch_storage::implementations::memory::Registry::factory(),
			)]),
		}
	}

	#[tokio::test]
	async fn test_build_seeds_signers() {
		let verifier = GuardBuilder::new(config()).build(factories()).await.unwrap();
		assert!(verifier
			.is_trusted_signer(Address::repeat_byte(0x11))
			.await
			.unwrap());
		assert!(verifier
			.is_trusted_signer(Address::repeat_byte(0x22))
			.await
			.unwrap());
		assert_eq!(verifier.settings().admin, Address::repeat_byte(0xad));
	}

	#[tokio::test]
	async fn test_unknown_primary_storage() {
		let mut config = config();
		config.storage.primary = "file".into();
		assert!(matches!(
			GuardBuilder::new(config).build(factories()).await,
			Err(BuilderError::Config(_))
		));
	}
}
