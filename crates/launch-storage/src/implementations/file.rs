//! File-based storage backend.
//!
//! Each key is stored as one file under a base directory. Files start with a
//! small header (magic bytes and format version) so that foreign or newer
//! files are rejected instead of being misread. Writes go to a temporary file
//! that is renamed into place.

use crate::{BatchOp, StorageError, StorageInterface};
use async_trait::async_trait;
use launch_types::{ConfigSchema, Field, Schema, ValidationError};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Fixed-size file header.
///
/// Binary layout (8 bytes total):
/// - [0-3]: Magic bytes "LGRD"
/// - [4-5]: Version (u16, little-endian)
/// - [6-7]: Reserved
#[derive(Debug, Clone, PartialEq, Eq)]
struct FileHeader {
	version: u16,
}

impl FileHeader {
	const MAGIC: &'static [u8; 4] = b"LGRD";
	const VERSION: u16 = 1;
	const SIZE: usize = 8;

	fn current() -> Self {
		Self {
			version: Self::VERSION,
		}
	}

	fn serialize(&self) -> [u8; Self::SIZE] {
		let mut bytes = [0u8; Self::SIZE];
		bytes[0..4].copy_from_slice(Self::MAGIC);
		bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
		bytes
	}

	fn deserialize(bytes: &[u8]) -> Result<Self, StorageError> {
		if bytes.len() < Self::SIZE {
			return Err(StorageError::Backend("File too small for header".into()));
		}
		if &bytes[0..4] != Self::MAGIC {
			return Err(StorageError::Backend("Unrecognised file format".into()));
		}
		let version = u16::from_le_bytes([bytes[4], bytes[5]]);
		if version > Self::VERSION {
			return Err(StorageError::Backend(format!(
				"Unsupported file version: {}",
				version
			)));
		}
		Ok(Self { version })
	}
}

/// File-based storage implementation.
pub struct FileStorage {
	/// Base directory path for storing files.
	base_path: PathBuf,
}

impl FileStorage {
	pub fn new(base_path: PathBuf) -> Self {
		Self { base_path }
	}

	/// Converts a storage key to a filesystem-safe file path.
	fn get_file_path(&self, key: &str) -> PathBuf {
		let safe_key = key.replace(['/', ':', '\\'], "_");
		self.base_path.join(format!("{}.bin", safe_key))
	}

	async fn write_temp(&self, path: &Path, value: &[u8]) -> Result<PathBuf, StorageError> {
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| StorageError::Backend(e.to_string()))?;
		}

		let mut file_data = Vec::with_capacity(FileHeader::SIZE + value.len());
		file_data.extend_from_slice(&FileHeader::current().serialize());
		file_data.extend_from_slice(value);

		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, file_data)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		Ok(temp_path)
	}

	async fn remove_path(path: &Path) -> Result<(), StorageError> {
		match fs::remove_file(path).await {
			Ok(_) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.get_file_path(key);

		let data = match fs::read(&path).await {
			Ok(data) => data,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				return Err(StorageError::NotFound)
			},
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		FileHeader::deserialize(&data)?;
		Ok(data[FileHeader::SIZE..].to_vec())
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let path = self.get_file_path(key);
		let temp_path = self.write_temp(&path, &value).await?;
		fs::rename(&temp_path, &path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		Self::remove_path(&self.get_file_path(key)).await
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		fs::try_exists(self.get_file_path(key))
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileStorageSchema)
	}

	/// Stages every put as a temporary file before renaming any of them, so an
	/// I/O failure while staging leaves the stored state untouched.
	async fn apply_batch(&self, ops: Vec<BatchOp>) -> Result<(), StorageError> {
		let mut staged = Vec::new();
		let mut deletes = Vec::new();

		for op in &ops {
			match op {
				BatchOp::Put { key, value } => {
					let path = self.get_file_path(key);
					match self.write_temp(&path, value).await {
						Ok(temp_path) => staged.push((temp_path, path)),
						Err(e) => {
							for (temp_path, _) in &staged {
								let _ = Self::remove_path(temp_path).await;
							}
							return Err(e);
						},
					}
				},
				BatchOp::Delete { key } => deletes.push(self.get_file_path(key)),
			}
		}

		for (temp_path, path) in staged {
			fs::rename(&temp_path, &path)
				.await
				.map_err(|e| StorageError::Backend(e.to_string()))?;
		}
		for path in deletes {
			Self::remove_path(&path).await?;
		}
		Ok(())
	}
}

/// Configuration schema for FileStorage.
pub struct FileStorageSchema;

impl ConfigSchema for FileStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(vec![], vec![Field::new("storage_path")]);
		schema.validate(config)
	}
}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Base directory for file storage (default: "./data/guard")
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	FileStorageSchema
		.validate(config)
		.map_err(|e| StorageError::Configuration(e.to_string()))?;

	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or("./data/guard")
		.to_string();

	tracing::debug!(path = %storage_path, "Using file storage");
	Ok(Box::new(FileStorage::new(PathBuf::from(storage_path))))
}

/// Registry for the file storage implementation.
pub struct Registry;

impl launch_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = crate::StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl crate::StorageRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[tokio::test]
	async fn test_round_trip_and_delete() {
		let dir = TempDir::new().unwrap();
		let storage = FileStorage::new(dir.path().to_path_buf());

		storage
			.set_bytes("purchases:0xabc:0xdef", b"12".to_vec())
			.await
			.unwrap();
		assert_eq!(
			storage.get_bytes("purchases:0xabc:0xdef").await.unwrap(),
			b"12".to_vec()
		);
		assert!(storage.exists("purchases:0xabc:0xdef").await.unwrap());

		storage.delete("purchases:0xabc:0xdef").await.unwrap();
		assert!(matches!(
			storage.get_bytes("purchases:0xabc:0xdef").await,
			Err(StorageError::NotFound)
		));
		// deleting twice is fine
		storage.delete("purchases:0xabc:0xdef").await.unwrap();
	}

	#[tokio::test]
	async fn test_foreign_file_is_rejected() {
		let dir = TempDir::new().unwrap();
		let storage = FileStorage::new(dir.path().to_path_buf());
		std::fs::write(dir.path().join("cap_configs_m.bin"), b"plain old bytes").unwrap();

		assert!(matches!(
			storage.get_bytes("cap_configs:m").await,
			Err(StorageError::Backend(_))
		));
	}

	#[tokio::test]
	async fn test_batch_leaves_no_temp_files() {
		let dir = TempDir::new().unwrap();
		let storage = FileStorage::new(dir.path().to_path_buf());
		storage.set_bytes("old", vec![0]).await.unwrap();

		storage
			.apply_batch(vec![
				BatchOp::Put {
					key: "a".into(),
					value: vec![1],
				},
				BatchOp::Put {
					key: "b".into(),
					value: vec![2],
				},
				BatchOp::Delete { key: "old".into() },
			])
			.await
			.unwrap();

		assert_eq!(storage.get_bytes("a").await.unwrap(), vec![1]);
		assert_eq!(storage.get_bytes("b").await.unwrap(), vec![2]);
		assert!(!storage.exists("old").await.unwrap());

		let leftovers = std::fs::read_dir(dir.path())
			.unwrap()
			.filter_map(|e| e.ok())
			.filter(|e| e.path().extension() == Some(std::ffi::OsStr::new("tmp")))
			.count();
		assert_eq!(leftovers, 0);
	}

	#[test]
	fn test_factory_rejects_non_string_path() {
		let config: toml::Value = toml::from_str("storage_path = 5").unwrap();
		assert!(matches!(
			create_storage(&config),
			Err(StorageError::Configuration(_))
		));
	}
}
