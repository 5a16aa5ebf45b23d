//! Change notifications emitted by the guard.
//!
//! Every state mutation publishes one of these on the event bus so that
//! off-chain observers can mirror registry, configuration and ledger state.

use crate::{CapConfig, MarketId};
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// Events published by the guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardEvent {
	/// A signer joined the global trusted set.
	TrustedSignerAdded { signer: Address },
	/// A signer left the global trusted set.
	TrustedSignerRemoved { signer: Address },
	/// A market's creator pinned (or disabled) its signer.
	MarketSignerSet {
		market: MarketId,
		signer: Option<Address>,
	},
	/// The execution engine set a market's cap configuration.
	CapConfigSet { market: MarketId, config: CapConfig },
	/// An authorized trade was added to an account's cumulative total.
	PurchaseRecorded {
		market: MarketId,
		account: Address,
		amount: U256,
		total: U256,
	},
	/// An authorization token was consumed.
	AuthorizationConsumed { fingerprint: B256, origin: Address },
}
