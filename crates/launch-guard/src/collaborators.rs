//! Interfaces to the systems the guard consults but does not own.
//!
//! The execution engine owns bootstrap-window state and the asset registry
//! knows who created each launched asset. Both are reached through these
//! traits so they can be backed by an RPC client, an in-process engine or a
//! test double.

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use launch_types::{BootstrapSnapshot, MarketId};
use thiserror::Error;

/// Failure reported by an external collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
	#[error("collaborator unavailable: {0}")]
	Unavailable(String),
	#[error("collaborator call failed: {0}")]
	Call(String),
}

/// Source of bootstrap-window state for a market.
#[async_trait]
pub trait BootstrapSource: Send + Sync {
	async fn snapshot(&self, market: &MarketId) -> Result<BootstrapSnapshot, CollaboratorError>;
}

/// Lookup of launched-asset creators.
#[async_trait]
pub trait AssetRegistry: Send + Sync {
	/// Returns the creator of `asset`, or `None` if the asset was not launched
	/// through the registry.
	async fn creator_of(&self, asset: Address) -> Result<Option<Address>, CollaboratorError>;
}

/// Capability probe asking an intermediary for the account it acts for.
#[async_trait]
pub trait OriginProbe: Send + Sync {
	/// Invokes the intermediary's `msgSender()` and returns the raw response.
	async fn msg_sender(&self, target: Address) -> Result<Bytes, CollaboratorError>;
}

/// Placeholder for processes that only serve read views.
///
/// Any trade path that needs market state fails with
/// [`CollaboratorError::Unavailable`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Detached;

#[async_trait]
impl BootstrapSource for Detached {
	async fn snapshot(&self, market: &MarketId) -> Result<BootstrapSnapshot, CollaboratorError> {
		Err(CollaboratorError::Unavailable(format!(
			"no bootstrap source attached for market {}",
			market
		)))
	}
}

#[async_trait]
impl AssetRegistry for Detached {
	async fn creator_of(&self, asset: Address) -> Result<Option<Address>, CollaboratorError> {
		Err(CollaboratorError::Unavailable(format!(
			"no asset registry attached to resolve {}",
			asset
		)))
	}
}
