//! Difficulty -> target derivation, shared by every [`crate::subscription::Subscription`].

use primitive_types::U256;

/// `0xffff0000 * 2^192`, the conventional pool "difficulty 1" target.
fn truediffone() -> U256 {
    U256::from(0xffff0000u64) << 192
}

fn shl_saturating(value: U256, shift: u32) -> U256 {
    if shift == 0 {
        return value;
    }
    if value > (U256::MAX >> shift) {
        U256::MAX
    } else {
        value << shift
    }
}

/// `target = min(floor((0xffff0000*2^192 + 1)/difficulty - 1 + 0.5), 2^256 - 1)`, with
/// `target = 2^256 - 1` when `difficulty == 0`. `shift` applies the algorithm-specific
/// display shift (16 for scrypt, 0 for SHA-256d) after the base target is derived.
pub fn target_for_difficulty(difficulty: f64, shift: u32) -> U256 {
    if !(difficulty > 0.0) {
        return U256::MAX;
    }

    let base = truediffone();

    // Integer difficulties divide exactly; fractional ones are scaled into an integer
    // domain first so the floor/round-half-down arithmetic below stays exact.
    let scale: u128 = if difficulty.fract() == 0.0 { 1 } else { 1 << 16 };
    let scaled_difficulty = (difficulty * scale as f64).round() as u128;

    if scaled_difficulty == 0 {
        return U256::MAX;
    }

    let d = U256::from(scaled_difficulty);
    let numerator = (base + U256::from(1u8)) * U256::from(2u8) * U256::from(scale) - d;
    let denominator = d * U256::from(2u8);
    let target = (numerator / denominator).min(U256::MAX);

    shl_saturating(target, shift)
}
