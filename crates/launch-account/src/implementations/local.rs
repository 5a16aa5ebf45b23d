//! Local-key authorizer.
//!
//! Holds a secp256k1 private key in process memory. The key is read from
//! configuration, normally through an environment variable reference.

use crate::{AuthorizerError, AuthorizerInterface};
use alloy_primitives::{Address, Bytes, B256};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use launch_types::{without_0x_prefix, ConfigSchema, Field, Schema, SecretString, ValidationError};

/// Authorizer backed by an in-memory private key.
pub struct LocalAuthorizer {
	signer: PrivateKeySigner,
}

impl LocalAuthorizer {
	/// Creates an authorizer from a hex-encoded private key.
	pub fn from_private_key(private_key: &str) -> Result<Self, AuthorizerError> {
		let signer = private_key
			.parse::<PrivateKeySigner>()
			.map_err(|e| AuthorizerError::InvalidKey(e.to_string()))?;
		Ok(Self { signer })
	}
}

#[async_trait]
impl AuthorizerInterface for LocalAuthorizer {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(LocalAuthorizerSchema)
	}

	async fn address(&self) -> Result<Address, AuthorizerError> {
		Ok(self.signer.address())
	}

	async fn sign_digest(&self, digest: &B256) -> Result<Bytes, AuthorizerError> {
		let signature = self
			.signer
			.sign_hash(digest)
			.await
			.map_err(|e| AuthorizerError::SigningFailed(e.to_string()))?;
		Ok(Bytes::from(signature.as_bytes().to_vec()))
	}
}

/// Configuration schema for the local authorizer.
pub struct LocalAuthorizerSchema;

impl ConfigSchema for LocalAuthorizerSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![
				Field::new("private_key").with_validator(|key| {
					let hex = without_0x_prefix(key);
					if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
						return Err("private key must be 32 bytes of hex".to_string());
					}
					Ok(())
				}),
			],
			vec![],
		);
		schema.validate(config)
	}
}

/// Factory function to create a local authorizer from configuration.
///
/// Configuration parameters:
/// - `private_key`: hex-encoded secp256k1 key, with or without 0x prefix
pub fn create_authorizer(
	config: &toml::Value,
) -> Result<Box<dyn AuthorizerInterface>, AuthorizerError> {
	LocalAuthorizerSchema
		.validate(config)
		.map_err(|e| AuthorizerError::InvalidKey(e.to_string()))?;

	let private_key = config
		.get("private_key")
		.and_then(|v| v.as_str())
		.map(SecretString::from)
		.ok_or_else(|| AuthorizerError::InvalidKey("private_key is required".to_string()))?;

	let authorizer = private_key.with_exposed(LocalAuthorizer::from_private_key)?;
	Ok(Box::new(authorizer))
}

/// Registry for the local authorizer implementation.
pub struct Registry;

impl launch_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "local";
	type Factory = crate::AuthorizerFactory;

	fn factory() -> Self::Factory {
		create_authorizer
	}
}

impl crate::AuthorizerRegistry for Registry {}
