//! Authorization tokens and signed-message hashing.
//!
//! An authorizer approves a trade by signing `(origin, deadline)` with the
//! EIP-191 personal-message scheme. The resulting digest doubles as the
//! token's replay fingerprint. Tokens travel in the trade's side-channel
//! data, optionally preceded by a referrer address that the guard ignores.

use crate::utils::AbiWordEncoder;
use alloy_primitives::{eip191_hash_message, Address, Bytes, B256, U256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Offset word of the dynamic `bytes` field when a referrer leads the data.
const REFERRER_LAYOUT_OFFSET: u64 = 0x60;

/// Errors raised while extracting a token from side-channel data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HookDataError {
	#[error("side-channel data is empty")]
	Empty,
	#[error("malformed side-channel data: {0}")]
	Malformed(String),
}

/// Caller-supplied proof that an authorizer approved a trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationToken {
	/// Unix timestamp after which the token is rejected.
	pub deadline: U256,
	/// 65-byte `r || s || v` signature.
	pub signature: Bytes,
}

impl AuthorizationToken {
	pub fn new(deadline: U256, signature: Bytes) -> Self {
		Self {
			deadline,
			signature,
		}
	}

	/// Extracts a token from side-channel data.
	///
	/// Accepts `abi.encode(deadline, signature)` and
	/// `abi.encode(referrer, deadline, signature)`.
	pub fn from_hook_data(data: &[u8]) -> Result<Self, HookDataError> {
		if data.is_empty() {
			return Err(HookDataError::Empty);
		}

		if has_referrer_layout(data) {
			if let Ok((_referrer, deadline, signature)) =
				<(Address, U256, Bytes)>::abi_decode_params(data, true)
			{
				return Ok(Self::new(deadline, signature));
			}
		}

		<(U256, Bytes)>::abi_decode_params(data, true)
			.map(|(deadline, signature)| Self::new(deadline, signature))
			.map_err(|e| HookDataError::Malformed(e.to_string()))
	}

	/// Encodes the token as side-channel data, with an optional referrer.
	pub fn to_hook_data(&self, referrer: Option<Address>) -> Bytes {
		let encoded = match referrer {
			Some(referrer) => {
				(referrer, self.deadline, self.signature.clone()).abi_encode_params()
			},
			None => (self.deadline, self.signature.clone()).abi_encode_params(),
		};
		Bytes::from(encoded)
	}
}

fn has_referrer_layout(data: &[u8]) -> bool {
	data.len() >= 96 && U256::from_be_slice(&data[64..96]) == U256::from(REFERRER_LAYOUT_OFFSET)
}

/// `keccak256(abi.encode(origin, deadline))`.
pub fn authorization_message_hash(origin: Address, deadline: U256) -> B256 {
	let mut enc = AbiWordEncoder::new();
	enc.push_address(&origin).push_u256(deadline);
	enc.hash()
}

/// EIP-191 digest a token's signature is recovered against.
///
/// This is also the token's replay fingerprint.
pub fn authorization_digest(origin: Address, deadline: U256) -> B256 {
	eip191_hash_message(authorization_message_hash(origin, deadline))
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::keccak256;

	fn token() -> AuthorizationToken {
		AuthorizationToken::new(U256::from(1_700_000_000u64), Bytes::from(vec![0xab; 65]))
	}

	#[test]
	fn test_plain_layout_round_trip() {
		let token = token();
		let data = token.to_hook_data(None);
		assert_eq!(AuthorizationToken::from_hook_data(&data).unwrap(), token);
	}

	#[test]
	fn test_referrer_is_skipped() {
		let token = token();
		let data = token.to_hook_data(Some(Address::repeat_byte(0x77)));
		assert_eq!(AuthorizationToken::from_hook_data(&data).unwrap(), token);
	}

	#[test]
	fn test_empty_and_garbage() {
		assert_eq!(
			AuthorizationToken::from_hook_data(&[]),
			Err(HookDataError::Empty)
		);
		assert!(matches!(
			AuthorizationToken::from_hook_data(&[0x01; 20]),
			Err(HookDataError::Malformed(_))
		));
	}

	#[test]
	fn test_digest_uses_personal_message_prefix() {
		let origin = Address::repeat_byte(0x42);
		let deadline = U256::from(99u64);
		let message = authorization_message_hash(origin, deadline);

		let mut prefixed = b"\x19Ethereum Signed Message:\n32".to_vec();
		prefixed.extend_from_slice(message.as_slice());
		assert_eq!(authorization_digest(origin, deadline), keccak256(prefixed));
	}

	#[test]
	fn test_digest_binds_origin_and_deadline() {
		let a = authorization_digest(Address::repeat_byte(1), U256::from(10u64));
		let b = authorization_digest(Address::repeat_byte(2), U256::from(10u64));
		let c = authorization_digest(Address::repeat_byte(1), U256::from(11u64));
		assert_ne!(a, b);
		assert_ne!(a, c);
	}
}
