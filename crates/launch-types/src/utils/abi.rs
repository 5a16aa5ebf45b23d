//! Minimal ABI word encoder for static Solidity types.
//!
//! Market identifiers and authorization messages are hashed over the
//! standard 32-byte-word `abi.encode` layout. Only static types are needed,
//! so a flat word buffer is enough.

use alloy_primitives::{keccak256, Address, B256, U256};

/// Builds a buffer of left-padded 32-byte ABI words.
pub struct AbiWordEncoder {
	buf: Vec<u8>,
}

impl Default for AbiWordEncoder {
	fn default() -> Self {
		Self::new()
	}
}

impl AbiWordEncoder {
	pub fn new() -> Self {
		Self { buf: Vec::new() }
	}

	pub fn push_address(&mut self, addr: &Address) -> &mut Self {
		let mut word = [0u8; 32];
		word[12..].copy_from_slice(addr.as_slice());
		self.buf.extend_from_slice(&word);
		self
	}

	pub fn push_u256(&mut self, v: U256) -> &mut Self {
		let word: [u8; 32] = v.to_be_bytes::<32>();
		self.buf.extend_from_slice(&word);
		self
	}

	pub fn push_u32(&mut self, v: u32) -> &mut Self {
		let mut word = [0u8; 32];
		word[28..].copy_from_slice(&v.to_be_bytes());
		self.buf.extend_from_slice(&word);
		self
	}

	/// Pushes a signed integer, sign-extended to a full word.
	pub fn push_i32(&mut self, v: i32) -> &mut Self {
		let mut word = if v < 0 { [0xffu8; 32] } else { [0u8; 32] };
		word[28..].copy_from_slice(&v.to_be_bytes());
		self.buf.extend_from_slice(&word);
		self
	}

	/// Hashes the encoded words with keccak256.
	pub fn hash(&self) -> B256 {
		keccak256(&self.buf)
	}

	pub fn finish(self) -> Vec<u8> {
		self.buf
	}
}
