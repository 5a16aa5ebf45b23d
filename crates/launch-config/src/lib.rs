//! Configuration module for the launch guard.
//!
//! Configuration is a single TOML file. String values may reference
//! environment variables as `${VAR}` or `${VAR:-default}`, which is the
//! expected way to supply the authorizer's private key.

use alloy_primitives::Address;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the launch guard.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Identity and trust anchors of this guard instance.
	pub guard: GuardConfig,
	/// Configuration for the storage backend.
	pub storage: StorageConfig,
	/// Off-chain authorizer used to issue tokens, if this node issues them.
	pub authorizer: Option<AuthorizerConfig>,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
}

/// Identity and trust anchors of the guard.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GuardConfig {
	/// Unique identifier for this guard instance.
	pub id: String,
	/// Policy address markets must be attached to.
	pub address: Address,
	/// Execution engine, the only caller of trade notifications and cap setup.
	pub engine: Address,
	/// Administrator of the global trusted signer set.
	pub admin: Address,
	/// Bound on the caller-identity probe, in milliseconds.
	#[serde(default = "default_probe_timeout_ms")]
	pub probe_timeout_ms: u64,
	/// Signers seeded into the global trusted set at start-up.
	#[serde(default)]
	pub trusted_signers: Vec<Address>,
}

fn default_probe_timeout_ms() -> u64 {
	250
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the off-chain authorizer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthorizerConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Lifetime of issued tokens when the caller does not pick a deadline.
	#[serde(default = "default_validity_seconds")]
	pub validity_seconds: u64,
	/// Map of authorizer implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

fn default_validity_seconds() -> u64 {
	300
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default)]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let var_name = var_name.as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)))
				},
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, resolving environment variables.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = tokio::fs::read_to_string(path.as_ref()).await?;
		content.parse()
	}

	/// Validates cross-field constraints that serde cannot express.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.guard.id.is_empty() {
			return Err(ConfigError::Validation(
				"Guard ID cannot be empty".to_string(),
			));
		}

		for (name, address) in [
			("guard.address", self.guard.address),
			("guard.engine", self.guard.engine),
			("guard.admin", self.guard.admin),
		] {
			if address == Address::ZERO {
				return Err(ConfigError::Validation(format!(
					"{} cannot be the zero address",
					name
				)));
			}
		}

		if self.guard.probe_timeout_ms == 0 {
			return Err(ConfigError::Validation(
				"guard.probe_timeout_ms must be greater than 0".to_string(),
			));
		}

		if self.guard.trusted_signers.contains(&Address::ZERO) {
			return Err(ConfigError::Validation(
				"guard.trusted_signers cannot contain the zero address".to_string(),
			));
		}

		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in storage implementations",
				self.storage.primary
			)));
		}

		if let Some(authorizer) = &self.authorizer {
			if !authorizer.implementations.contains_key(&authorizer.primary) {
				return Err(ConfigError::Validation(format!(
					"Primary authorizer '{}' not found in authorizer implementations",
					authorizer.primary
				)));
			}
			if authorizer.validity_seconds == 0 {
				return Err(ConfigError::Validation(
					"authorizer.validity_seconds must be greater than 0".to_string(),
				));
			}
		}

		if let Some(api) = &self.api {
			if api.enabled && api.port == 0 {
				return Err(ConfigError::Validation(
					"API port must be greater than 0".to_string(),
				));
			}
		}

		Ok(())
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const BASE: &str = r#"
[guard]
id = "guard-test"
address = "0x00000000000000000000000000000000000000aa"
engine = "0x00000000000000000000000000000000000000bb"
admin = "0x00000000000000000000000000000000000000cc"
trusted_signers = ["0x1234567890123456789012345678901234567890"]

[storage]
primary = "memory"
[storage.implementations.memory]
"#;

	#[test]
	fn test_minimal_config() {
		let config: Config = BASE.parse().unwrap();
		assert_eq!(config.guard.id, "guard-test");
		assert_eq!(config.guard.probe_timeout_ms, 250);
		assert_eq!(config.guard.trusted_signers.len(), 1);
		assert!(config.authorizer.is_none());
		assert!(config.api.is_none());
	}

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("LAUNCH_TEST_HOST", "localhost");
		std::env::set_var("LAUNCH_TEST_PORT", "5432");

		let input = "host = \"${LAUNCH_TEST_HOST}:${LAUNCH_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "host = \"localhost:5432\"");

		std::env::remove_var("LAUNCH_TEST_HOST");
		std::env::remove_var("LAUNCH_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${LAUNCH_MISSING_VAR:-default_value}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"default_value\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let result = resolve_env_vars("value = \"${LAUNCH_MISSING_VAR}\"");
		assert!(result.unwrap_err().to_string().contains("LAUNCH_MISSING_VAR"));
	}

	#[test]
	fn test_authorizer_key_from_env_default() {
		let config_str = format!(
			r#"{}
[authorizer]
primary = "local"
[authorizer.implementations.local]
private_key = "${{LAUNCH_TEST_AUTHORIZER_KEY:-0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80}}"

[api]
enabled = true
port = 8080
"#,
			BASE
		);
		let config: Config = config_str.parse().unwrap();
		let authorizer = config.authorizer.unwrap();
		assert_eq!(authorizer.validity_seconds, 300);
		let local = &authorizer.implementations["local"];
		assert!(local
			.get("private_key")
			.and_then(|v| v.as_str())
			.unwrap()
			.starts_with("0xac09"));
		let api = config.api.unwrap();
		assert!(api.enabled);
		assert_eq!(api.host, "127.0.0.1");
		assert_eq!(api.port, 8080);
	}

	#[test]
	fn test_unknown_primary_storage_rejected() {
		let config_str = BASE.replace("primary = \"memory\"", "primary = \"file\"");
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("Primary storage 'file' not found"));
	}

	#[test]
	fn test_zero_engine_rejected() {
		let config_str = BASE.replace(
			"0x00000000000000000000000000000000000000bb",
			"0x0000000000000000000000000000000000000000",
		);
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("guard.engine"));
	}

	#[test]
	fn test_malformed_address_is_parse_error() {
		let config_str = BASE.replace("0x00000000000000000000000000000000000000cc", "0xcc");
		assert!(matches!(
			Config::from_str(&config_str),
			Err(ConfigError::Parse(_))
		));
	}

	#[tokio::test]
	async fn test_from_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("guard.toml");
		std::fs::write(&path, BASE).unwrap();
		let config = Config::from_file(&path).await.unwrap();
		assert_eq!(config.storage.primary, "memory");
	}
}
