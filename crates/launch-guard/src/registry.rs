//! Global trusted signers and per-market signer overrides.

use crate::error::GuardError;
use alloy_primitives::Address;
use launch_storage::StorageService;
use launch_types::{MarketId, SignerOverride, SignerPolicy, StorageKey};
use std::sync::Arc;

/// Persistent signer registry.
///
/// Access control is enforced by the verifier; this type only keeps the
/// registry consistent.
pub struct SignerRegistry {
	storage: Arc<StorageService>,
}

impl SignerRegistry {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	pub async fn is_trusted(&self, signer: Address) -> Result<bool, GuardError> {
		Ok(self
			.storage
			.exists(StorageKey::TrustedSigners, &signer.to_string())
			.await?)
	}

	pub async fn add(&self, signer: Address) -> Result<(), GuardError> {
		if signer.is_zero() {
			return Err(GuardError::InvalidSigner);
		}
		if self.is_trusted(signer).await? {
			return Err(GuardError::AlreadyTrusted);
		}
		self.storage
			.store(StorageKey::TrustedSigners, &signer.to_string(), &true)
			.await?;
		Ok(())
	}

	pub async fn remove(&self, signer: Address) -> Result<(), GuardError> {
		if !self.is_trusted(signer).await? {
			return Err(GuardError::NotTrusted);
		}
		self.storage
			.remove(StorageKey::TrustedSigners, &signer.to_string())
			.await?;
		Ok(())
	}

	pub async fn market_override(
		&self,
		market: &MarketId,
	) -> Result<Option<SignerOverride>, GuardError> {
		Ok(self
			.storage
			.retrieve_optional(StorageKey::MarketSigners, &market.to_string())
			.await?)
	}

	/// Records `{signer, enabled: true}` for the market, replacing any
	/// previous override.
	pub async fn set_market_override(
		&self,
		market: &MarketId,
		signer: Option<Address>,
	) -> Result<SignerOverride, GuardError> {
		let record = SignerOverride::pinned(signer);
		self.storage
			.store(StorageKey::MarketSigners, &market.to_string(), &record)
			.await?;
		Ok(record)
	}

	pub async fn resolve_policy(&self, market: &MarketId) -> Result<SignerPolicy, GuardError> {
		let record = self.market_override(market).await?;
		Ok(SignerPolicy::resolve(record.as_ref()))
	}

	/// Checks a recovered signer against a resolved policy.
	pub async fn authorize(&self, policy: SignerPolicy, signer: Address) -> Result<(), GuardError> {
		let accepted = match policy {
			SignerPolicy::NoCheck => true,
			SignerPolicy::RequireSigner(required) => signer == required,
			SignerPolicy::RequireGlobalTrust => self.is_trusted(signer).await?,
		};
		if accepted {
			Ok(())
		} else {
			Err(GuardError::InvalidSigner)
		}
	}
}
