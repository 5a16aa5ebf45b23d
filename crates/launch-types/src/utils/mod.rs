//! Utility functions shared across the guard crates.

pub mod abi;
pub mod formatting;

pub use abi::AbiWordEncoder;
pub use formatting::{truncate_id, without_0x_prefix};
