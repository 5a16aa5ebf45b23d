//! Trade descriptions passed from the execution engine to the guard.

use alloy_primitives::{Address, I256, U256};
use serde::{Deserialize, Serialize};

/// Parameters of a single trade against a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeParams {
	/// True when currency0 is sold for currency1.
	pub zero_for_one: bool,
	/// Negative for an exact input amount, positive for an exact output amount.
	pub amount_specified: I256,
	/// Price limit as a Q64.96 square-root price.
	pub sqrt_price_limit: U256,
}

impl TradeParams {
	/// Whether the trade moves the pairing asset in and the launched asset out.
	pub fn is_purchase(&self, native_is_first: bool) -> bool {
		self.zero_for_one == native_is_first
	}
}

/// Platform context of a trade notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeContext {
	/// Account invoking the notification; must be the execution engine.
	pub caller: Address,
	/// Account that invoked the engine, usually a router.
	pub sender: Address,
	/// Transaction origin, used when the sender cannot report the real trader.
	pub tx_origin: Address,
	/// Platform clock in Unix seconds.
	pub timestamp: u64,
}

/// Bootstrap-window state owned by the execution engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapSnapshot {
	/// Starting price tick of the bootstrap window.
	pub start_tick: i32,
	/// Launched-asset units still held in the bootstrap reserve.
	pub remaining_supply: U256,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_purchase_direction() {
		let buy_with_token0 = TradeParams {
			zero_for_one: true,
			amount_specified: I256::ZERO,
			sqrt_price_limit: U256::ZERO,
		};
		assert!(buy_with_token0.is_purchase(true));
		assert!(!buy_with_token0.is_purchase(false));

		let one_for_zero = TradeParams {
			zero_for_one: false,
			..buy_with_token0
		};
		assert!(one_for_zero.is_purchase(false));
		assert!(!one_for_zero.is_purchase(true));
	}
}
