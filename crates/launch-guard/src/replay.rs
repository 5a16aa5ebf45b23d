//! Consumed authorization fingerprints.

use crate::error::GuardError;
use alloy_primitives::{Address, B256};
use launch_storage::{StorageService, WriteBatch};
use launch_types::StorageKey;
use std::sync::Arc;

/// At-most-once tracking of authorization tokens.
///
/// Marks are staged into the caller's [`WriteBatch`] so that they commit
/// together with the ledger update, or not at all.
pub struct ReplayGuard {
	storage: Arc<StorageService>,
}

impl ReplayGuard {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	pub async fn has_been_consumed(&self, fingerprint: &B256) -> Result<bool, GuardError> {
		Ok(self
			.storage
			.exists(StorageKey::ConsumedTokens, &fingerprint.to_string())
			.await?)
	}

	/// Stages the consumed mark. The origin is kept for auditing.
	pub fn consume(
		&self,
		batch: &mut WriteBatch,
		fingerprint: &B256,
		origin: Address,
	) -> Result<(), GuardError> {
		batch.put(StorageKey::ConsumedTokens, &fingerprint.to_string(), &origin)?;
		Ok(())
	}
}
