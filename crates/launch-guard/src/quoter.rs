//! Estimation of launched-asset units received by a purchase.
//!
//! Mirrors the engine's own fill estimate at the bootstrap start price so
//! that cap accounting matches what the engine will let settle.

use crate::collaborators::BootstrapSource;
use crate::error::{GuardError, MathError};
use crate::math::{mul_div, sqrt_ratio_at_tick};
use alloy_primitives::{I256, U256};
use launch_types::MarketId;
use std::sync::Arc;

/// Amount of the quote asset worth `amount` of the base asset at `tick`.
///
/// `base_is_first` selects the direction the price ratio is applied in.
/// Uses the squared price directly while it fits, otherwise a Q128 ratio.
pub fn quote_at_tick(tick: i32, amount: U256, base_is_first: bool) -> Result<U256, MathError> {
	let sqrt_ratio = sqrt_ratio_at_tick(tick)?;

	let (ratio, scale) = if sqrt_ratio <= U256::from(u128::MAX) {
		(sqrt_ratio * sqrt_ratio, U256::from(1) << 192)
	} else {
		(
			mul_div(sqrt_ratio, sqrt_ratio, U256::from(1) << 64)?,
			U256::from(1) << 128,
		)
	};

	if base_is_first {
		mul_div(ratio, amount, scale)
	} else {
		mul_div(scale, amount, ratio)
	}
}

pub struct PriceQuoter {
	source: Arc<dyn BootstrapSource>,
}

impl PriceQuoter {
	pub fn new(source: Arc<dyn BootstrapSource>) -> Self {
		Self { source }
	}

	/// Estimated launched-asset units for a purchase, clamped to the market's
	/// remaining bootstrap supply.
	///
	/// A negative amount is an exact spend of the pairing asset and is priced
	/// at the bootstrap start tick; a positive amount is an exact output.
	pub async fn estimate_received(
		&self,
		market: &MarketId,
		amount_specified: I256,
		native_is_first: bool,
	) -> Result<U256, GuardError> {
		if amount_specified.is_zero() {
			return Ok(U256::ZERO);
		}

		let snapshot = self.source.snapshot(market).await?;

		let estimate = if amount_specified.is_negative() {
			match quote_at_tick(
				snapshot.start_tick,
				amount_specified.unsigned_abs(),
				native_is_first,
			) {
				Ok(quote) => quote,
				Err(MathError::Overflow) => U256::MAX,
				Err(e) => return Err(e.into()),
			}
		} else {
			amount_specified.unsigned_abs()
		};

		Ok(estimate.min(snapshot.remaining_supply))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::collaborators::CollaboratorError;
	use crate::math::MAX_TICK;
	use alloy_primitives::B256;
	use async_trait::async_trait;
	use launch_types::BootstrapSnapshot;

	struct FixedSource(BootstrapSnapshot);

	#[async_trait]
	impl BootstrapSource for FixedSource {
		async fn snapshot(&self, _market: &MarketId) -> Result<BootstrapSnapshot, CollaboratorError> {
			Ok(self.0)
		}
	}

	fn quoter(start_tick: i32, remaining_supply: u64) -> PriceQuoter {
		PriceQuoter::new(Arc::new(FixedSource(BootstrapSnapshot {
			start_tick,
			remaining_supply: U256::from(remaining_supply),
		})))
	}

	fn spend(amount: i64) -> I256 {
		I256::try_from(-amount).unwrap()
	}

	#[test]
	fn test_unit_price() {
		assert_eq!(quote_at_tick(0, U256::from(1_000), true).unwrap(), U256::from(1_000));
		assert_eq!(quote_at_tick(0, U256::from(1_000), false).unwrap(), U256::from(1_000));
	}

	#[test]
	fn test_direction() {
		// 1.0001^6932 is just under 2.
		let forward = quote_at_tick(6932, U256::from(1_000_000), true).unwrap();
		let inverse = quote_at_tick(6932, U256::from(1_000_000), false).unwrap();
		assert!(forward > U256::from(1_999_000) && forward < U256::from(2_001_000));
		assert!(inverse > U256::from(499_000) && inverse < U256::from(501_000));
	}

	#[test]
	fn test_wide_sqrt_price_branch() {
		// sqrt price exceeds 128 bits at high ticks.
		let tick = 500_000;
		assert!(sqrt_ratio_at_tick(tick).unwrap() > U256::from(u128::MAX));
		let small = quote_at_tick(tick, U256::from(1), false).unwrap();
		assert_eq!(small, U256::ZERO);
		let large = quote_at_tick(tick, U256::from(1), true).unwrap();
		assert!(large > U256::from(1u64) << 64);
	}

	#[tokio::test]
	async fn test_zero_amount_skips_snapshot() {
		let quoter = PriceQuoter::new(Arc::new(crate::collaborators::Detached));
		let market = MarketId(B256::ZERO);
		assert_eq!(
			quoter.estimate_received(&market, I256::ZERO, true).await.unwrap(),
			U256::ZERO
		);
	}

	#[tokio::test]
	async fn test_exact_output_used_directly() {
		let market = MarketId(B256::ZERO);
		let amount = I256::try_from(250i64).unwrap();
		assert_eq!(
			quoter(6932, 1_000).estimate_received(&market, amount, true).await.unwrap(),
			U256::from(250)
		);
	}

	#[tokio::test]
	async fn test_clamped_to_remaining_supply() {
		let market = MarketId(B256::ZERO);
		assert_eq!(
			quoter(0, 50).estimate_received(&market, spend(80), true).await.unwrap(),
			U256::from(50)
		);
	}

	#[tokio::test]
	async fn test_overflow_saturates_before_clamp() {
		let market = MarketId(B256::ZERO);
		assert_eq!(
			quoter(MAX_TICK, 7)
				.estimate_received(&market, I256::MIN + I256::ONE, true)
				.await
				.unwrap(),
			U256::from(7)
		);
	}
}
