//! Off-chain authorizer for the launch guard.
//!
//! The guard only accepts trades whose side-channel data carries a token
//! signed by a trusted authorizer. This crate is the issuing side: it holds
//! an authorizer key behind [`AuthorizerInterface`] and turns
//! `(origin, deadline)` pairs into signed [`AuthorizationToken`]s.

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use launch_types::{
	authorization_digest, AuthorizationToken, ConfigSchema, ImplementationRegistry,
};
use std::time::Duration;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

/// Errors that can occur during authorizer operations.
#[derive(Debug, Error)]
pub enum AuthorizerError {
	/// Error that occurs when signing operations fail.
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	/// Error that occurs when a cryptographic key is invalid or malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	/// Error that occurs when the requested deadline is not in the future.
	#[error("Deadline {deadline} is not after current time {now}")]
	DeadlineInPast { deadline: u64, now: u64 },
}

/// Interface for authorizer key holders.
#[async_trait]
pub trait AuthorizerInterface: Send + Sync {
	/// Returns the configuration schema for this implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Address the guard recovers from this authorizer's signatures.
	async fn address(&self) -> Result<Address, AuthorizerError>;

	/// Signs a 32-byte digest, returning a 65-byte `r || s || v` signature.
	async fn sign_digest(&self, digest: &B256) -> Result<Bytes, AuthorizerError>;
}

/// Type alias for authorizer factory functions.
pub type AuthorizerFactory =
	fn(&toml::Value) -> Result<Box<dyn AuthorizerInterface>, AuthorizerError>;

/// Registry trait for authorizer implementations.
pub trait AuthorizerRegistry: ImplementationRegistry<Factory = AuthorizerFactory> {}

/// Get all registered authorizer implementations as (name, factory) pairs.
pub fn get_all_implementations() -> Vec<(&'static str, AuthorizerFactory)> {
	use implementations::local;

	vec![(local::Registry::NAME, local::Registry::factory())]
}

/// Encodes a token as trade side-channel data, with or without a referrer word.
pub fn encode_hook_data(token: &AuthorizationToken, referrer: Option<Address>) -> Bytes {
	token.to_hook_data(referrer)
}

/// A token together with the data needed to use and track it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedAuthorization {
	/// Account the token was issued for.
	pub origin: Address,
	pub token: AuthorizationToken,
	/// Replay fingerprint the guard will record once the token is used.
	pub fingerprint: B256,
}

impl IssuedAuthorization {
	/// Side-channel bytes to attach to the trade.
	pub fn hook_data(&self, referrer: Option<Address>) -> Bytes {
		encode_hook_data(&self.token, referrer)
	}
}

/// Service issuing authorization tokens.
pub struct AuthorizerService {
	/// The underlying key holder.
	implementation: Box<dyn AuthorizerInterface>,
	/// Lifetime of tokens issued without an explicit deadline.
	default_validity: Duration,
}

impl AuthorizerService {
	pub fn new(implementation: Box<dyn AuthorizerInterface>, default_validity: Duration) -> Self {
		Self {
			implementation,
			default_validity,
		}
	}

	/// Address of the managed authorizer key.
	pub async fn address(&self) -> Result<Address, AuthorizerError> {
		self.implementation.address().await
	}

	/// Issues a token for `origin` that expires at `deadline`.
	pub async fn issue(
		&self,
		origin: Address,
		deadline: U256,
	) -> Result<IssuedAuthorization, AuthorizerError> {
		let digest = authorization_digest(origin, deadline);
		let signature = self.implementation.sign_digest(&digest).await?;
		tracing::debug!(%origin, %deadline, "Issued authorization");
		Ok(IssuedAuthorization {
			origin,
			token: AuthorizationToken::new(deadline, signature),
			fingerprint: digest,
		})
	}

	/// Issues a token for `origin`, choosing the deadline relative to `now`.
	///
	/// An explicit `deadline` must lie after `now`; without one the
	/// configured default validity applies.
	pub async fn issue_at(
		&self,
		origin: Address,
		now: u64,
		deadline: Option<u64>,
	) -> Result<IssuedAuthorization, AuthorizerError> {
		let deadline = match deadline {
			Some(deadline) if deadline <= now => {
				return Err(AuthorizerError::DeadlineInPast { deadline, now })
			},
			Some(deadline) => deadline,
			None => now.saturating_add(self.default_validity.as_secs()),
		};
		self.issue(origin, U256::from(deadline)).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::PrimitiveSignature;
	use implementations::local::LocalAuthorizer;

	const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	fn service() -> AuthorizerService {
		let local = LocalAuthorizer::from_private_key(KEY).unwrap();
		AuthorizerService::new(Box::new(local), Duration::from_secs(300))
	}

	#[tokio::test]
	async fn test_issued_token_recovers_to_authorizer() {
		let service = service();
		let origin = Address::repeat_byte(0x42);
		let issued = service.issue(origin, U256::from(1_000u64)).await.unwrap();

		assert_eq!(issued.fingerprint, authorization_digest(origin, U256::from(1_000u64)));
		let signature = PrimitiveSignature::try_from(issued.token.signature.as_ref()).unwrap();
		let recovered = signature
			.recover_address_from_prehash(&issued.fingerprint)
			.unwrap();
		assert_eq!(recovered, service.address().await.unwrap());
	}

	#[tokio::test]
	async fn test_default_validity() {
		let issued = service()
			.issue_at(Address::repeat_byte(1), 1_000, None)
			.await
			.unwrap();
		assert_eq!(issued.token.deadline, U256::from(1_300u64));
	}

	#[tokio::test]
	async fn test_past_deadline_rejected() {
		let result = service()
			.issue_at(Address::repeat_byte(1), 1_000, Some(1_000))
			.await;
		assert!(matches!(
			result,
			Err(AuthorizerError::DeadlineInPast {
				deadline: 1_000,
				now: 1_000
			})
		));
	}

	#[tokio::test]
	async fn test_hook_data_carries_token() {
		let issued = service()
			.issue_at(Address::repeat_byte(1), 1_000, Some(2_000))
			.await
			.unwrap();
		let data = issued.hook_data(Some(Address::repeat_byte(9)));
		assert_eq!(
			AuthorizationToken::from_hook_data(&data).unwrap(),
			issued.token
		);
	}
}
