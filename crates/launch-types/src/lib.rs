//! Common types for the bootstrap launch guard.
//!
//! This crate defines the data types shared by every guard component: market
//! identities, cap configurations, signer policies, authorization tokens,
//! trade descriptions and change notifications. Keeping them in one place
//! lets the storage, engine and service crates agree on a single encoding.

/// API types for the HTTP query and issuance endpoints.
pub mod api;
/// Authorization tokens, side-channel data and signed-message hashing.
pub mod authorization;
/// Per-market bootstrap cap configuration.
pub mod caps;
/// Change notifications emitted on every state mutation.
pub mod events;
/// Market keys and their derived identifiers.
pub mod market;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Secure string wrapper for key material.
pub mod secret_string;
/// Signer overrides and the resolved signer policy.
pub mod signer;
/// Storage namespaces for persisted guard state.
pub mod storage;
/// Trade parameters, call context and bootstrap snapshots.
pub mod trade;
/// Utility functions for encoding and display.
pub mod utils;
/// Configuration validation types for ensuring type-safe configurations.
pub mod validation;

pub use alloy_primitives::{Address, Bytes, B256, I256, U256};

pub use api::*;
pub use authorization::*;
pub use caps::*;
pub use events::*;
pub use market::*;
pub use registry::*;
pub use secret_string::SecretString;
pub use signer::*;
pub use storage::*;
pub use trade::*;
pub use utils::{truncate_id, without_0x_prefix, AbiWordEncoder};
pub use validation::*;
