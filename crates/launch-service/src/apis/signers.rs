//! Global trusted-signer queries.

use crate::apis::{guard_error, parse_param};
use crate::server::AppState;
use alloy_primitives::Address;
use axum::{
	extract::{Path, State},
	Json,
};
use launch_types::{APIError, TrustedSignerResponse};

/// Handles GET /api/signers/{address}.
pub async fn get_signer(
	Path(address): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<TrustedSignerResponse>, APIError> {
	let address: Address = parse_param(&address, "INVALID_ADDRESS")?;
	let trusted = state
		.guard
		.is_trusted_signer(address)
		.await
		.map_err(guard_error)?;
	Ok(Json(TrustedSignerResponse { address, trusted }))
}
