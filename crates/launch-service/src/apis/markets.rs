//! Per-market configuration and allowance queries.

use crate::apis::{guard_error, parse_param};
use crate::server::AppState;
use alloy_primitives::Address;
use axum::{
	extract::{Path, State},
	Json,
};
use launch_types::{APIError, CapConfigResponse, MarketId, RemainingCapResponse};

/// Handles GET /api/markets/{id}/config.
///
/// Unknown markets report the disabled default configuration.
pub async fn get_config(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<CapConfigResponse>, APIError> {
	let market: MarketId = parse_param(&id, "INVALID_MARKET_ID")?;
	let config = state.guard.cap_config(&market).await.map_err(guard_error)?;
	let market_signer = state
		.guard
		.market_signer(&market)
		.await
		.map_err(guard_error)?
		.and_then(|record| record.signer);
	let policy = state
		.guard
		.signer_policy(&market)
		.await
		.map_err(guard_error)?;

	Ok(Json(CapConfigResponse::new(
		market,
		config,
		market_signer,
		policy.requires_signature(),
	)))
}

/// Handles GET /api/markets/{id}/remaining/{account}.
pub async fn get_remaining(
	Path((id, account)): Path<(String, String)>,
	State(state): State<AppState>,
) -> Result<Json<RemainingCapResponse>, APIError> {
	let market: MarketId = parse_param(&id, "INVALID_MARKET_ID")?;
	let account: Address = parse_param(&account, "INVALID_ADDRESS")?;
	let (has_cap, remaining) = state
		.guard
		.remaining_cap(&market, account)
		.await
		.map_err(guard_error)?;

	Ok(Json(RemainingCapResponse {
		market,
		account,
		has_cap,
		remaining,
	}))
}
