//! Resolution of the account that really initiated a trade.
//!
//! Trades usually arrive through a router. Routers that know the trader
//! expose a `msgSender()` view; the resolver probes for it and falls back to
//! the transaction origin when the probe is missing, fails, times out or
//! returns something that is not a single non-zero address.

use crate::collaborators::OriginProbe;
use alloy_primitives::{Address, Bytes};
use launch_types::TradeContext;
use std::sync::Arc;
use std::time::Duration;

/// Two-step origin resolution: probe, then fall back.
pub struct OriginResolver {
	probe: Option<Arc<dyn OriginProbe>>,
	timeout: Duration,
}

impl OriginResolver {
	pub fn new(probe: Option<Arc<dyn OriginProbe>>, timeout: Duration) -> Self {
		Self { probe, timeout }
	}

	/// Returns the trade's initiating account. Never fails.
	pub async fn resolve(&self, ctx: &TradeContext) -> Address {
		let Some(probe) = &self.probe else {
			return ctx.tx_origin;
		};

		match tokio::time::timeout(self.timeout, probe.msg_sender(ctx.sender)).await {
			Ok(Ok(data)) => match decode_address(&data) {
				Some(origin) => origin,
				None => {
					tracing::debug!(sender = %ctx.sender, "Malformed origin probe response");
					ctx.tx_origin
				},
			},
			Ok(Err(e)) => {
				tracing::debug!(sender = %ctx.sender, error = %e, "Origin probe failed");
				ctx.tx_origin
			},
			Err(_) => {
				tracing::debug!(sender = %ctx.sender, "Origin probe timed out");
				ctx.tx_origin
			},
		}
	}
}

/// Strictly decodes a single ABI-encoded non-zero address.
fn decode_address(data: &Bytes) -> Option<Address> {
	if data.len() != 32 || data[..12].iter().any(|b| *b != 0) {
		return None;
	}
	let address = Address::from_slice(&data[12..]);
	(!address.is_zero()).then_some(address)
}
