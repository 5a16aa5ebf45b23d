//! Fixed-point price math.

pub mod full_math;
pub mod tick_math;

pub use full_math::mul_div;
pub use tick_math::{sqrt_ratio_at_tick, MAX_TICK, MIN_TICK};
