//! Error types for the launch guard.

use alloy_primitives::U256;
use launch_storage::StorageError;
use launch_types::MarketKeyError;
use thiserror::Error;

use crate::collaborators::CollaboratorError;

/// Fixed-point arithmetic failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MathError {
	#[error("tick {0} is outside the supported range")]
	TickOutOfRange(i32),
	#[error("result does not fit in 256 bits")]
	Overflow,
	#[error("division by zero")]
	DivisionByZero,
}

/// Reasons a guard operation is rejected.
///
/// Every rejection aborts the whole operation; nothing is partially applied.
#[derive(Debug, Error)]
pub enum GuardError {
	/// The caller is not allowed to invoke this operation.
	#[error("Unauthorized caller")]
	Unauthorized,
	/// The market key is malformed or not attached to this guard.
	#[error("Invalid market: {0}")]
	InvalidMarket(String),
	#[error("Authorization expired at {deadline} (now {now})")]
	DeadlineExpired { deadline: U256, now: u64 },
	#[error("Authorization token already used")]
	TokenAlreadyUsed,
	#[error("Invalid signer")]
	InvalidSigner,
	#[error("Cap exceeded: {amount} above ceiling {ceiling}")]
	CapExceeded { amount: U256, ceiling: U256 },
	#[error("Signer already trusted")]
	AlreadyTrusted,
	#[error("Signer not trusted")]
	NotTrusted,
	/// A signature is required but the side-channel data carries no token.
	#[error("Missing authorization")]
	MissingAuthorization,
	/// Cumulative purchases already exceed the account cap.
	#[error("Account allowance underflow")]
	AllowanceUnderflow,
	#[error("Reentrant call")]
	Reentrancy,
	#[error("Math error: {0}")]
	Math(#[from] MathError),
	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),
	#[error("Collaborator error: {0}")]
	Collaborator(String),
}

impl From<MarketKeyError> for GuardError {
	fn from(err: MarketKeyError) -> Self {
		GuardError::InvalidMarket(err.to_string())
	}
}

impl From<CollaboratorError> for GuardError {
	fn from(err: CollaboratorError) -> Self {
		GuardError::Collaborator(err.to_string())
	}
}
