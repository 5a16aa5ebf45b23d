//! Signer overrides and the resolved per-market signer policy.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Per-market override record, written by the market's asset creator.
///
/// `enabled` with no signer means no signature is required for the market.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerOverride {
	pub signer: Option<Address>,
	pub enabled: bool,
}

impl SignerOverride {
	/// Override as stored by `set_market_signer`.
	pub fn pinned(signer: Option<Address>) -> Self {
		Self {
			signer,
			enabled: true,
		}
	}
}

/// Which signer, if any, must have produced a trade's authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignerPolicy {
	/// Recovered signer must be in the global trusted set.
	RequireGlobalTrust,
	/// Recovered signer must be exactly this account.
	RequireSigner(Address),
	/// Signature verification is skipped; caps still apply.
	NoCheck,
}

impl SignerPolicy {
	/// Resolves the policy for a market from its (optional) override record.
	pub fn resolve(market_override: Option<&SignerOverride>) -> Self {
		match market_override {
			Some(SignerOverride {
				enabled: true,
				signer: Some(signer),
			}) => SignerPolicy::RequireSigner(*signer),
			Some(SignerOverride {
				enabled: true,
				signer: None,
			}) => SignerPolicy::NoCheck,
			_ => SignerPolicy::RequireGlobalTrust,
		}
	}

	pub fn requires_signature(&self) -> bool {
		!matches!(self, SignerPolicy::NoCheck)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_resolve_policy() {
		let signer = Address::repeat_byte(0x01);

		assert_eq!(SignerPolicy::resolve(None), SignerPolicy::RequireGlobalTrust);
		assert_eq!(
			SignerPolicy::resolve(Some(&SignerOverride::pinned(Some(signer)))),
			SignerPolicy::RequireSigner(signer)
		);
		assert_eq!(
			SignerPolicy::resolve(Some(&SignerOverride::pinned(None))),
			SignerPolicy::NoCheck
		);
		// a disabled record falls back to global trust
		let disabled = SignerOverride {
			signer: Some(signer),
			enabled: false,
		};
		assert_eq!(
			SignerPolicy::resolve(Some(&disabled)),
			SignerPolicy::RequireGlobalTrust
		);
	}

	#[test]
	fn test_requires_signature() {
		assert!(SignerPolicy::RequireGlobalTrust.requires_signature());
		assert!(!SignerPolicy::NoCheck.requires_signature());
	}
}
