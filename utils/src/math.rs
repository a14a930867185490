//! Wide-integer helpers.
//!
//! Stake amounts are `u128`, and both time weighting (`amount * remaining /
//! duration`) and mapping weights onto the `[0, 2^128)` point space need
//! intermediate products wider than 128 bits.

use num_bigint::BigUint;

const POINT_SPACE_BITS: u32 = 128;

/// `floor(a * b / denom)`, or `None` if `denom` is zero or the quotient does
/// not fit in a `u128`.
pub fn mul_div(a: u128, b: u128, denom: u128) -> Option<u128> {
    if denom == 0 {
        return None;
    }
    if let Some(product) = a.checked_mul(b) {
        return Some(product / denom);
    }
    let quotient = BigUint::from(a) * BigUint::from(b) / BigUint::from(denom);
    u128::try_from(&quotient).ok()
}

/// Map a point of the `[0, 2^128)` space onto `[0, total)`:
/// `floor(point * total / 2^128)`.
///
/// Always strictly less than `total` when `total > 0`.
pub fn point_to_weight(point: u128, total: u128) -> u128 {
    let scaled = (BigUint::from(point) * BigUint::from(total)) >> POINT_SPACE_BITS;
    // point < 2^128, so the shifted product is below `total`
    u128::try_from(&scaled).unwrap_or(u128::MAX)
}

/// First point of the `[0, 2^128)` space whose weight image reaches
/// `cumulative`: `ceil(cumulative * 2^128 / total)`.
///
/// Returns `None` when `total` is zero or `cumulative >= total` (the boundary
/// would lie at or beyond `2^128`).
pub fn weight_to_point(cumulative: u128, total: u128) -> Option<u128> {
    if total == 0 || cumulative >= total {
        return None;
    }
    let numerator = BigUint::from(cumulative) << POINT_SPACE_BITS;
    let total = BigUint::from(total);
    let ceil = (numerator + &total - 1u32) / total;
    u128::try_from(&ceil).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_div_small_values() {
        assert_eq!(mul_div(100, 500, 1_000), Some(50));
        assert_eq!(mul_div(7, 3, 2), Some(10));
        assert_eq!(mul_div(1, 1, 0), None);
    }

    #[test]
    fn mul_div_wide_intermediate() {
        assert_eq!(mul_div(u128::MAX, 1_000, 1_000), Some(u128::MAX));
        assert_eq!(mul_div(u128::MAX, u128::MAX, u128::MAX), Some(u128::MAX));
        assert_eq!(mul_div(u128::MAX, 2, 1), None);
    }

    #[test]
    fn point_zero_maps_to_weight_zero() {
        assert_eq!(point_to_weight(0, 500), 0);
    }

    #[test]
    fn max_point_maps_below_total() {
        assert_eq!(point_to_weight(u128::MAX, 500), 499);
        assert_eq!(point_to_weight(u128::MAX, u128::MAX), u128::MAX - 1);
    }

    #[test]
    fn half_point_maps_to_half_weight() {
        let half = 1u128 << 127;
        assert_eq!(point_to_weight(half, 1_000), 500);
        assert_eq!(point_to_weight(half - 1, 1_000), 499);
    }

    #[test]
    fn weight_boundaries_for_fifths() {
        // 2^128 = 1 (mod 5), so (2^128 - 1) / 5 is exact and the boundary
        // is one above it.
        let fifth = u128::MAX / 5;
        assert_eq!(weight_to_point(0, 500), Some(0));
        assert_eq!(weight_to_point(100, 500), Some(fifth + 1));
        assert_eq!(weight_to_point(200, 500), Some(fifth * 2 + 1));
        assert_eq!(weight_to_point(500, 500), None);
    }

    #[test]
    fn boundary_point_maps_into_upper_range() {
        let start = weight_to_point(100, 500).unwrap();
        assert_eq!(point_to_weight(start, 500), 100);
        assert_eq!(point_to_weight(start - 1, 500), 99);
    }
}
