//! Per-market bootstrap cap configuration.
//!
//! The execution engine hands the guard an opaque configuration blob when a
//! market is created. The blob is `abi.encode(bool enabled, uint256
//! perAccountCap, uint256 perTradeCap)`; anything else decodes to the
//! disabled configuration instead of failing.

use alloy_primitives::U256;
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};

/// Cap settings for one market.
///
/// A cap value of zero means "unset", not "nothing allowed".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapConfig {
	/// Whether authorization and caps are enforced at all.
	pub enabled: bool,
	/// Cumulative ceiling per account, zero when unset.
	pub per_account_cap: U256,
	/// Ceiling per individual trade, zero when unset.
	pub per_trade_cap: U256,
}

impl CapConfig {
	pub fn new(enabled: bool, per_account_cap: U256, per_trade_cap: U256) -> Self {
		Self {
			enabled,
			per_account_cap,
			per_trade_cap,
		}
	}

	/// Decodes a configuration blob.
	///
	/// Empty or malformed blobs yield the all-zero disabled config. Values are
	/// stored verbatim with no bounds checking.
	pub fn decode(blob: &[u8]) -> Self {
		if blob.is_empty() || !is_clean_bool_word(blob) {
			return Self::default();
		}
		match <(bool, U256, U256)>::abi_decode_params(blob, true) {
			Ok((enabled, per_account_cap, per_trade_cap)) => {
				Self::new(enabled, per_account_cap, per_trade_cap)
			},
			Err(_) => Self::default(),
		}
	}

	/// Encodes the config in the blob layout accepted by [`CapConfig::decode`].
	pub fn encode(&self) -> Vec<u8> {
		(self.enabled, self.per_account_cap, self.per_trade_cap).abi_encode_params()
	}

	/// True when neither cap is set.
	pub fn is_uncapped(&self) -> bool {
		self.per_account_cap.is_zero() && self.per_trade_cap.is_zero()
	}
}

/// The decoder accepts any non-zero word as `true`; only 0 and 1 are valid.
fn is_clean_bool_word(blob: &[u8]) -> bool {
	match blob.get(..32) {
		Some(word) => word[..31].iter().all(|b| *b == 0) && word[31] <= 1,
		None => false,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_empty_blob_is_disabled() {
		assert_eq!(CapConfig::decode(&[]), CapConfig::default());
		assert!(!CapConfig::decode(&[]).enabled);
	}

	#[test]
	fn test_malformed_blob_is_disabled() {
		assert_eq!(CapConfig::decode(&[1, 2, 3]), CapConfig::default());
	}

	#[test]
	fn test_dirty_bool_word_is_disabled() {
		let mut blob = CapConfig::new(false, U256::from(10u64), U256::from(5u64)).encode();
		blob[31] = 2;
		assert_eq!(CapConfig::decode(&blob), CapConfig::default());

		let mut blob = CapConfig::new(true, U256::from(10u64), U256::from(5u64)).encode();
		blob[0] = 0x80;
		assert_eq!(CapConfig::decode(&blob), CapConfig::default());

		blob[0] = 0;
		assert!(CapConfig::decode(&blob).enabled);
	}

	#[test]
	fn test_decode_stores_values_verbatim() {
		let config = CapConfig::new(true, U256::MAX, U256::from(5u64));
		let decoded = CapConfig::decode(&config.encode());
		assert_eq!(decoded, config);
		assert!(!decoded.is_uncapped());
	}

	#[test]
	fn test_uncapped() {
		assert!(CapConfig::new(true, U256::ZERO, U256::ZERO).is_uncapped());
		assert!(!CapConfig::new(true, U256::ZERO, U256::from(1u64)).is_uncapped());
	}
}
