//! Storage module for the launch guard.
//!
//! Guard state lives in a key/value store addressed by `namespace:id` keys.
//! Backends implement the byte-level [`StorageInterface`]; the typed
//! [`StorageService`] layers JSON serialization and namespacing on top and
//! commits multi-key updates through a [`WriteBatch`] so that a trade's
//! ledger increment and replay mark land together or not at all.

use async_trait::async_trait;
use launch_types::{ConfigSchema, ImplementationRegistry, StorageKey};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs when a requested item is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// A single write inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
	Put { key: String, value: Vec<u8> },
	Delete { key: String },
}

/// Low-level interface for storage backends.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes under the given key.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Deletes the value associated with the given key.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Checks if a key exists in storage.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;

	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Applies a group of writes.
	///
	/// Backends that can apply the group atomically should override this;
	/// the default applies the writes in order.
	async fn apply_batch(&self, ops: Vec<BatchOp>) -> Result<(), StorageError> {
		for op in ops {
			match op {
				BatchOp::Put { key, value } => self.set_bytes(&key, value).await?,
				BatchOp::Delete { key } => self.delete(&key).await?,
			}
		}
		Ok(())
	}
}

/// Type alias for storage factory functions.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>;

/// Registry trait for storage implementations.
pub trait StorageRegistry: ImplementationRegistry<Factory = StorageFactory> {}

/// Get all registered storage implementations as (name, factory) pairs.
pub fn get_all_implementations() -> Vec<(&'static str, StorageFactory)> {
	use implementations::{file, memory};

	vec![
		(file::Registry::NAME, file::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

fn make_key(namespace: StorageKey, id: &str) -> String {
	format!("{}:{}", namespace.as_str(), id)
}

/// Writes collected for a single atomic commit.
#[derive(Debug, Default)]
pub struct WriteBatch {
	ops: Vec<BatchOp>,
}

impl WriteBatch {
	pub fn new() -> Self {
		Self::default()
	}

	/// Queues a serialized value for `namespace:id`.
	pub fn put<T: Serialize>(
		&mut self,
		namespace: StorageKey,
		id: &str,
		data: &T,
	) -> Result<&mut Self, StorageError> {
		let value =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.ops.push(BatchOp::Put {
			key: make_key(namespace, id),
			value,
		});
		Ok(self)
	}

	/// Queues the removal of `namespace:id`.
	pub fn delete(&mut self, namespace: StorageKey, id: &str) -> &mut Self {
		self.ops.push(BatchOp::Delete {
			key: make_key(namespace, id),
		});
		self
	}

	pub fn len(&self) -> usize {
		self.ops.len()
	}

	pub fn is_empty(&self) -> bool {
		self.ops.is_empty()
	}
}

/// High-level storage service providing typed, namespaced operations.
pub struct StorageService {
	/// The underlying storage backend implementation.
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	/// Creates a new StorageService with the specified backend.
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	/// Stores a serializable value, overwriting any existing one.
	pub async fn store<T: Serialize>(
		&self,
		namespace: StorageKey,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.set_bytes(&make_key(namespace, id), bytes).await
	}

	/// Retrieves and deserializes a value.
	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		namespace: StorageKey,
		id: &str,
	) -> Result<T, StorageError> {
		let bytes = self.backend.get_bytes(&make_key(namespace, id)).await?;
		serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Retrieves a value, mapping a missing key to `None`.
	pub async fn retrieve_optional<T: DeserializeOwned>(
		&self,
		namespace: StorageKey,
		id: &str,
	) -> Result<Option<T>, StorageError> {
		match self.retrieve(namespace, id).await {
			Ok(value) => Ok(Some(value)),
			Err(StorageError::NotFound) => Ok(None),
			Err(e) => Err(e),
		}
	}

	/// Removes a value from storage. Removing a missing key is not an error.
	pub async fn remove(&self, namespace: StorageKey, id: &str) -> Result<(), StorageError> {
		self.backend.delete(&make_key(namespace, id)).await
	}

	/// Checks if a value exists in storage.
	pub async fn exists(&self, namespace: StorageKey, id: &str) -> Result<bool, StorageError> {
		self.backend.exists(&make_key(namespace, id)).await
	}

	/// Commits every queued write of `batch`.
	pub async fn commit(&self, batch: WriteBatch) -> Result<(), StorageError> {
		if batch.is_empty() {
			return Ok(());
		}
		tracing::trace!(writes = batch.len(), "Committing write batch");
		self.backend.apply_batch(batch.ops).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use implementations::memory::MemoryStorage;

	#[tokio::test]
	async fn test_typed_round_trip() {
		let storage = StorageService::new(Box::new(MemoryStorage::new()));

		storage
			.store(StorageKey::CapConfigs, "m1", &42u64)
			.await
			.unwrap();
		let value: u64 = storage.retrieve(StorageKey::CapConfigs, "m1").await.unwrap();
		assert_eq!(value, 42);

		// namespaces do not collide
		assert!(!storage.exists(StorageKey::Purchases, "m1").await.unwrap());
		let missing: Option<u64> = storage
			.retrieve_optional(StorageKey::Purchases, "m1")
			.await
			.unwrap();
		assert!(missing.is_none());
	}

	#[tokio::test]
	async fn test_commit_applies_all_writes() {
		let storage = StorageService::new(Box::new(MemoryStorage::new()));
		storage
			.store(StorageKey::TrustedSigners, "old", &true)
			.await
			.unwrap();

		let mut batch = WriteBatch::new();
		batch
			.put(StorageKey::Purchases, "m:a", &7u64)
			.unwrap()
			.put(StorageKey::ConsumedTokens, "fp", &true)
			.unwrap();
		batch.delete(StorageKey::TrustedSigners, "old");
		assert_eq!(batch.len(), 3);

		storage.commit(batch).await.unwrap();

		let total: u64 = storage.retrieve(StorageKey::Purchases, "m:a").await.unwrap();
		assert_eq!(total, 7);
		assert!(storage.exists(StorageKey::ConsumedTokens, "fp").await.unwrap());
		assert!(!storage.exists(StorageKey::TrustedSigners, "old").await.unwrap());
	}

	#[tokio::test]
	async fn test_corrupt_value_is_serialization_error() {
		let backend = MemoryStorage::new();
		backend
			.set_bytes("cap_configs:m1", b"not json".to_vec())
			.await
			.unwrap();
		let storage = StorageService::new(Box::new(backend));
		let result: Result<u64, _> = storage.retrieve(StorageKey::CapConfigs, "m1").await;
		assert!(matches!(result, Err(StorageError::Serialization(_))));
	}
}
