//! Full-precision multiply-then-divide.

use crate::error::MathError;
use alloy_primitives::{U256, U512};

fn widen(value: U256) -> U512 {
	let limbs = value.into_limbs();
	let mut wide = [0u64; 8];
	wide[..4].copy_from_slice(&limbs);
	U512::from_limbs(wide)
}

fn narrow(value: U512) -> Option<U256> {
	let limbs = value.as_limbs();
	if limbs[4..].iter().any(|limb| *limb != 0) {
		return None;
	}
	let mut narrow = [0u64; 4];
	narrow.copy_from_slice(&limbs[..4]);
	Some(U256::from_limbs(narrow))
}

/// Computes `floor(a * b / denominator)` with a 512-bit intermediate product.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
	if denominator.is_zero() {
		return Err(MathError::DivisionByZero);
	}
	let product = widen(a) * widen(b);
	narrow(product / widen(denominator)).ok_or(MathError::Overflow)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_exceeds_native_width() {
		let q128 = U256::from(1) << 128;
		// (2^128 * 2^128) / 2^64 overflows the product but not the result.
		assert_eq!(mul_div(q128, q128, U256::from(1) << 64).unwrap(), U256::from(1) << 192);
	}

	#[test]
	fn test_floor_rounding() {
		assert_eq!(
			mul_div(U256::from(7), U256::from(3), U256::from(2)).unwrap(),
			U256::from(10)
		);
	}

	#[test]
	fn test_result_overflow() {
		assert_eq!(
			mul_div(U256::MAX, U256::from(2), U256::from(1)),
			Err(MathError::Overflow)
		);
		assert_eq!(
			mul_div(U256::MAX, U256::MAX, U256::MAX).unwrap(),
			U256::MAX
		);
	}

	#[test]
	fn test_zero_denominator() {
		assert_eq!(
			mul_div(U256::from(1), U256::from(1), U256::ZERO),
			Err(MathError::DivisionByZero)
		);
	}
}
