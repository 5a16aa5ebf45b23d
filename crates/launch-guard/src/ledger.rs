//! Cumulative purchases per market and account, and cap enforcement.

use crate::error::GuardError;
use alloy_primitives::{Address, U256};
use launch_storage::{StorageService, WriteBatch};
use launch_types::{CapConfig, MarketId, StorageKey};
use std::sync::Arc;

/// Remaining room for a single trade, or `None` when the market is uncapped.
///
/// A zero cap means "unset". With only the account cap set, the ceiling is
/// the account's remaining allowance; if purchases already exceed the cap
/// this is a hard [`GuardError::AllowanceUnderflow`], not zero.
pub fn effective_ceiling(config: &CapConfig, consumed: U256) -> Result<Option<U256>, GuardError> {
	let per_trade = (!config.per_trade_cap.is_zero()).then_some(config.per_trade_cap);
	let remaining = if config.per_account_cap.is_zero() {
		None
	} else {
		Some(
			config
				.per_account_cap
				.checked_sub(consumed)
				.ok_or(GuardError::AllowanceUnderflow)?,
		)
	};

	Ok(match (per_trade, remaining) {
		(None, None) => None,
		(Some(trade), None) => Some(trade),
		(None, Some(account)) => Some(account),
		(Some(trade), Some(account)) => Some(trade.min(account)),
	})
}

fn ledger_id(market: &MarketId, account: Address) -> String {
	format!("{}:{}", market, account)
}

pub struct PurchaseLedger {
	storage: Arc<StorageService>,
}

impl PurchaseLedger {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	pub async fn purchased(&self, market: &MarketId, account: Address) -> Result<U256, GuardError> {
		Ok(self
			.storage
			.retrieve_optional(StorageKey::Purchases, &ledger_id(market, account))
			.await?
			.unwrap_or(U256::ZERO))
	}

	/// Checks `amount` against the market's caps and stages the new total.
	///
	/// Returns the account's cumulative total after the trade.
	pub async fn record_and_check(
		&self,
		batch: &mut WriteBatch,
		market: &MarketId,
		account: Address,
		config: &CapConfig,
		amount: U256,
	) -> Result<U256, GuardError> {
		let consumed = self.purchased(market, account).await?;
		if let Some(ceiling) = effective_ceiling(config, consumed)? {
			if amount > ceiling {
				return Err(GuardError::CapExceeded { amount, ceiling });
			}
		}
		let total = consumed.saturating_add(amount);
		batch.put(StorageKey::Purchases, &ledger_id(market, account), &total)?;
		Ok(total)
	}
}
