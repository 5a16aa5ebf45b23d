//! Which side of a market is the launched asset.

use crate::collaborators::AssetRegistry;
use crate::error::GuardError;
use alloy_primitives::Address;
use launch_types::MarketKey;

/// Roles of a market's two currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketLayout {
	/// The scarce asset being bootstrapped.
	pub launched: Address,
	/// Creator of the launched asset, per the asset registry.
	pub creator: Address,
	/// Whether the pairing asset is `currency0`.
	pub native_is_first: bool,
}

impl MarketLayout {
	/// Resolves the layout by asking the registry about both currencies.
	///
	/// Exactly one currency must be a registered launch.
	pub async fn resolve(
		key: &MarketKey,
		registry: &dyn AssetRegistry,
	) -> Result<Self, GuardError> {
		let first = registry.creator_of(key.currency0).await?;
		let second = registry.creator_of(key.currency1).await?;

		match (first, second) {
			(Some(creator), None) => Ok(Self {
				launched: key.currency0,
				creator,
				native_is_first: false,
			}),
			(None, Some(creator)) => Ok(Self {
				launched: key.currency1,
				creator,
				native_is_first: true,
			}),
			(Some(_), Some(_)) => Err(GuardError::InvalidMarket(
				"both currencies are registered launches".into(),
			)),
			(None, None) => Err(GuardError::InvalidMarket(
				"no launched asset in market".into(),
			)),
		}
	}
}
