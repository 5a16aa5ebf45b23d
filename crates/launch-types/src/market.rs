//! Market keys and identifiers.
//!
//! A market is uniquely identified by its configuration tuple: the two
//! currencies in canonical order, the fee tier, the tick spacing and the
//! policy contract attached to it. The identifier is the keccak256 hash of
//! the ABI-encoded tuple.

use crate::utils::AbiWordEncoder;
use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest fee value representable in the 24-bit fee field.
pub const MAX_FEE: u32 = (1 << 24) - 1;

/// Reasons a market key is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarketKeyError {
	#[error("currencies are not in canonical order: {0} >= {1}")]
	Unordered(Address, Address),
	#[error("fee {0} does not fit in 24 bits")]
	FeeOutOfRange(u32),
	#[error("market is attached to policy {actual}, expected {expected}")]
	ForeignPolicy { expected: Address, actual: Address },
}

/// Configuration tuple describing a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarketKey {
	/// Lower-sorted currency.
	pub currency0: Address,
	/// Higher-sorted currency.
	pub currency1: Address,
	/// Fee tier in hundredths of a basis point.
	pub fee: u32,
	/// Price granularity.
	pub tick_spacing: i32,
	/// Policy contract attached to the market.
	pub hooks: Address,
}

impl MarketKey {
	/// Derives the market identifier.
	pub fn id(&self) -> MarketId {
		let mut enc = AbiWordEncoder::new();
		enc.push_address(&self.currency0)
			.push_address(&self.currency1)
			.push_u32(self.fee)
			.push_i32(self.tick_spacing)
			.push_address(&self.hooks);
		MarketId(enc.hash())
	}

	/// Checks that the key is well formed and attached to `policy`.
	pub fn validate(&self, policy: Address) -> Result<(), MarketKeyError> {
		if self.currency0 >= self.currency1 {
			return Err(MarketKeyError::Unordered(self.currency0, self.currency1));
		}
		if self.fee > MAX_FEE {
			return Err(MarketKeyError::FeeOutOfRange(self.fee));
		}
		if self.hooks != policy {
			return Err(MarketKeyError::ForeignPolicy {
				expected: policy,
				actual: self.hooks,
			});
		}
		Ok(())
	}
}

/// Identifier of a market, derived from its [`MarketKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketId(pub B256);

impl MarketId {
	pub fn as_b256(&self) -> &B256 {
		&self.0
	}
}

impl fmt::Display for MarketId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for MarketId {
	type Err = alloy_primitives::hex::FromHexError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		B256::from_str(s).map(MarketId)
	}
}

impl From<B256> for MarketId {
	fn from(value: B256) -> Self {
		Self(value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::keccak256;

	fn key() -> MarketKey {
		MarketKey {
			currency0: Address::ZERO,
			currency1: Address::repeat_byte(0x22),
			fee: 3000,
			tick_spacing: 60,
			hooks: Address::repeat_byte(0xaa),
		}
	}

	#[test]
	fn test_id_matches_manual_encoding() {
		let key = key();
		let mut buf = Vec::new();
		buf.extend_from_slice(&[0u8; 32]);
		let mut word = [0u8; 32];
		word[12..].copy_from_slice(key.currency1.as_slice());
		buf.extend_from_slice(&word);
		let mut word = [0u8; 32];
		word[28..].copy_from_slice(&3000u32.to_be_bytes());
		buf.extend_from_slice(&word);
		let mut word = [0u8; 32];
		word[28..].copy_from_slice(&60i32.to_be_bytes());
		buf.extend_from_slice(&word);
		let mut word = [0u8; 32];
		word[12..].copy_from_slice(key.hooks.as_slice());
		buf.extend_from_slice(&word);

		assert_eq!(key.id(), MarketId(keccak256(buf)));
	}

	#[test]
	fn test_tick_spacing_changes_id() {
		let a = key();
		let mut b = key();
		b.tick_spacing = -60;
		assert_ne!(a.id(), b.id());
	}

	#[test]
	fn test_validate() {
		let policy = Address::repeat_byte(0xaa);
		assert!(key().validate(policy).is_ok());

		let mut swapped = key();
		std::mem::swap(&mut swapped.currency0, &mut swapped.currency1);
		assert!(matches!(
			swapped.validate(policy),
			Err(MarketKeyError::Unordered(..))
		));

		let mut fee = key();
		fee.fee = MAX_FEE + 1;
		assert_eq!(
			fee.validate(policy),
			Err(MarketKeyError::FeeOutOfRange(MAX_FEE + 1))
		);

		assert!(matches!(
			key().validate(Address::repeat_byte(0xbb)),
			Err(MarketKeyError::ForeignPolicy { .. })
		));
	}

	#[test]
	fn test_market_id_round_trips_through_string() {
		let id = key().id();
		let parsed: MarketId = id.to_string().parse().unwrap();
		assert_eq!(parsed, id);
	}
}
