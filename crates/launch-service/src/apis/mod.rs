//! Request handlers for the guard API.

pub mod authorizations;
pub mod markets;
pub mod signers;

use launch_guard::GuardError;
use launch_types::APIError;
use std::str::FromStr;

/// Maps a guard failure to an API error, logging internal ones.
pub(crate) fn guard_error(e: GuardError) -> APIError {
	tracing::warn!(error = %e, "Guard query failed");
	APIError::internal(e.to_string())
}

/// Parses a path segment, answering 400 with `error_type` on failure.
pub(crate) fn parse_param<T>(raw: &str, error_type: &str) -> Result<T, APIError>
where
	T: FromStr,
	T::Err: std::fmt::Display,
{
	raw.parse::<T>()
		.map_err(|e| APIError::bad_request(error_type, format!("'{}': {}", raw, e)))
}
