//! Storage namespaces for persisted guard state.

use std::str::FromStr;

/// Namespaces of the guard's key/value state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Global trusted signer set, keyed by signer address.
	TrustedSigners,
	/// Per-market signer overrides, keyed by market id.
	MarketSigners,
	/// Per-market cap configurations, keyed by market id.
	CapConfigs,
	/// Cumulative purchases, keyed by `market:account`.
	Purchases,
	/// Consumed authorization fingerprints.
	ConsumedTokens,
}

impl StorageKey {
	/// Returns the string representation of the storage key.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::TrustedSigners => "trusted_signers",
			StorageKey::MarketSigners => "market_signers",
			StorageKey::CapConfigs => "cap_configs",
			StorageKey::Purchases => "purchases",
			StorageKey::ConsumedTokens => "consumed_tokens",
		}
	}
}

impl FromStr for StorageKey {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"trusted_signers" => Ok(Self::TrustedSigners),
			"market_signers" => Ok(Self::MarketSigners),
			"cap_configs" => Ok(Self::CapConfigs),
			"purchases" => Ok(Self::Purchases),
			"consumed_tokens" => Ok(Self::ConsumedTokens),
			_ => Err(()),
		}
	}
}

impl From<StorageKey> for &'static str {
	fn from(key: StorageKey) -> Self {
		key.as_str()
	}
}
