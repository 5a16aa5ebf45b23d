//! API types for the guard's HTTP endpoints.

use crate::{CapConfig, MarketId};
use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Response for `GET /api/signers/{address}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustedSignerResponse {
	pub address: Address,
	pub trusted: bool,
}

/// Response for `GET /api/markets/{id}/config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapConfigResponse {
	pub market: MarketId,
	pub enabled: bool,
	#[serde(rename = "perAccountCap", with = "u256_serde")]
	pub per_account_cap: U256,
	#[serde(rename = "perTradeCap", with = "u256_serde")]
	pub per_trade_cap: U256,
	/// Pinned signer, if the market carries an override.
	#[serde(rename = "marketSigner")]
	pub market_signer: Option<Address>,
	/// Whether the market's override disables signature checks.
	#[serde(rename = "signatureRequired")]
	pub signature_required: bool,
}

impl CapConfigResponse {
	pub fn new(
		market: MarketId,
		config: CapConfig,
		market_signer: Option<Address>,
		signature_required: bool,
	) -> Self {
		Self {
			market,
			enabled: config.enabled,
			per_account_cap: config.per_account_cap,
			per_trade_cap: config.per_trade_cap,
			market_signer,
			signature_required,
		}
	}
}

/// Response for `GET /api/markets/{id}/remaining/{account}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemainingCapResponse {
	pub market: MarketId,
	pub account: Address,
	#[serde(rename = "hasCap")]
	pub has_cap: bool,
	#[serde(with = "u256_serde")]
	pub remaining: U256,
}

/// Request for `POST /api/authorizations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueAuthorizationRequest {
	/// Account the token is issued for.
	pub origin: Address,
	/// Absolute deadline in Unix seconds; defaults to now plus the configured validity.
	pub deadline: Option<u64>,
	/// Referrer to prepend to the encoded side-channel data.
	pub referrer: Option<Address>,
}

/// Response for `POST /api/authorizations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueAuthorizationResponse {
	pub origin: Address,
	#[serde(with = "u256_serde")]
	pub deadline: U256,
	pub signature: Bytes,
	pub fingerprint: B256,
	/// Side-channel bytes ready to attach to a trade.
	#[serde(rename = "hookData")]
	pub hook_data: Bytes,
}

/// API error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code
	pub error: String,
	/// Human-readable description
	pub message: String,
}

/// Structured API error type with HTTP status mapping.
#[derive(Debug)]
pub enum APIError {
	/// Bad request with validation errors (400)
	BadRequest { error_type: String, message: String },
	/// Resource not found (404)
	NotFound { error_type: String, message: String },
	/// Feature not configured on this node (503)
	ServiceUnavailable { error_type: String, message: String },
	/// Internal server error (500)
	InternalServerError { error_type: String, message: String },
}

impl APIError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			APIError::BadRequest { .. } => 400,
			APIError::NotFound { .. } => 404,
			APIError::ServiceUnavailable { .. } => 503,
			APIError::InternalServerError { .. } => 500,
		}
	}

	pub fn bad_request(error_type: &str, message: impl Into<String>) -> Self {
		APIError::BadRequest {
			error_type: error_type.to_string(),
			message: message.into(),
		}
	}

	pub fn internal(message: impl Into<String>) -> Self {
		APIError::InternalServerError {
			error_type: "INTERNAL_ERROR".to_string(),
			message: message.into(),
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		let (error_type, message) = match self {
			APIError::BadRequest { error_type, message }
			| APIError::NotFound { error_type, message }
			| APIError::ServiceUnavailable { error_type, message }
			| APIError::InternalServerError { error_type, message } => (error_type, message),
		};
		ErrorResponse {
			error: error_type.clone(),
			message: message.clone(),
		}
	}
}

impl fmt::Display for APIError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			APIError::BadRequest { message, .. } => write!(f, "Bad Request: {}", message),
			APIError::NotFound { message, .. } => write!(f, "Not Found: {}", message),
			APIError::ServiceUnavailable { message, .. } => {
				write!(f, "Service Unavailable: {}", message)
			},
			APIError::InternalServerError { message, .. } => {
				write!(f, "Internal Server Error: {}", message)
			},
		}
	}
}

impl std::error::Error for APIError {}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for APIError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = StatusCode::from_u16(self.status_code())
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		(status, Json(self.to_error_response())).into_response()
	}
}

/// Serde module for decimal U256 serialization.
pub mod u256_serde {
	use alloy_primitives::U256;
	use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

	pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		value.to_string().serialize(serializer)
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		U256::from_str_radix(&s, 10).map_err(D::Error::custom)
	}
}
