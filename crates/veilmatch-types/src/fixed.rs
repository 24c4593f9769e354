//! Fixed-point price and amount arithmetic.
//!
//! [`Fp`] is a 128-bit unsigned fixed point with exactly 18 decimals, the
//! canonical on-chain precision. Every operation is **total**: arithmetic
//! saturates at [`Fp::MAX`] instead of wrapping or panicking, and division
//! by zero returns zero with a logged warning. An unexpected panic inside
//! the allocator would leave a batch unsettleable, so the arithmetic layer
//! never faults.
//!
//! Intermediate products widen through `U256` so that `mul`/`div` are exact
//! up to the final clamp.

use std::fmt;

use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Decimal scale factor: 10^18.
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// 128-bit unsigned fixed point, scale 10^18.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fp(u128);

/// Clamp a widened intermediate back into the 128-bit range.
fn clamp(value: U256) -> u128 {
    if value > U256::from(u128::MAX) {
        u128::MAX
    } else {
        value.as_u128()
    }
}

impl Fp {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(SCALE);
    pub const MAX: Self = Self(u128::MAX);

    /// Smallest representable step (one unit of least precision).
    pub const EPSILON: Self = Self(1);

    /// Construct from a raw scaled integer (`value` is in 10^-18 units).
    #[must_use]
    pub const fn from_raw(value: u128) -> Self {
        Self(value)
    }

    /// Construct from whole units, saturating.
    #[must_use]
    pub const fn from_units(units: u128) -> Self {
        Self(units.saturating_mul(SCALE))
    }

    /// The rational `numerator / denominator` as a fixed point.
    /// A zero denominator yields zero with a logged warning.
    #[must_use]
    pub fn from_ratio(numerator: u128, denominator: u128) -> Self {
        if denominator == 0 {
            tracing::warn!("fixed-point ratio with zero denominator");
            return Self::ZERO;
        }
        Self(clamp(
            U256::from(numerator) * U256::from(SCALE) / U256::from(denominator),
        ))
    }

    /// Raw scaled integer value (10^-18 units).
    #[must_use]
    pub const fn raw(self) -> u128 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    #[must_use]
    pub fn saturating_mul(self, other: Self) -> Self {
        Self(clamp(U256::from(self.0) * U256::from(other.0) / U256::from(SCALE)))
    }

    /// Fixed-point division. Division by zero is never correct to reach;
    /// it returns zero and logs a warning so settlement can continue.
    #[must_use]
    pub fn saturating_div(self, other: Self) -> Self {
        if other.0 == 0 {
            tracing::warn!("fixed-point division by zero");
            return Self::ZERO;
        }
        Self(clamp(
            U256::from(self.0) * U256::from(SCALE) / U256::from(other.0),
        ))
    }

    /// Midpoint of two values, overflow-safe.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self(((U256::from(self.0) + U256::from(other.0)) >> 1).as_u128())
    }

    /// Absolute difference.
    #[must_use]
    pub fn abs_diff(self, other: Self) -> Self {
        Self(self.0.abs_diff(other.0))
    }

    #[must_use]
    pub fn min(self, other: Self) -> Self {
        if self.0 <= other.0 { self } else { other }
    }

    #[must_use]
    pub fn max(self, other: Self) -> Self {
        if self.0 >= other.0 { self } else { other }
    }

    /// Big-endian wire encoding (16 bytes).
    #[must_use]
    pub const fn to_be_bytes(self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    #[must_use]
    pub const fn from_be_bytes(bytes: [u8; 16]) -> Self {
        Self(u128::from_be_bytes(bytes))
    }

    /// Forgiving decimal-string conversion: empty or non-numeric input
    /// yields zero, more than 18 fractional digits are truncated, and
    /// out-of-range magnitudes saturate.
    #[must_use]
    pub fn from_decimal_str(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return Self::ZERO;
        }
        let mut split_dot = input.splitn(2, '.');
        let units = split_dot.next().unwrap_or("");
        let decimals = split_dot.next().unwrap_or("");

        let units_value = if units.is_empty() {
            0
        } else {
            match units.parse::<u128>() {
                Ok(value) => value,
                Err(_) => {
                    tracing::warn!(len = input.len(), "non-numeric fixed-point input");
                    return Self::ZERO;
                }
            }
        };

        let frac_digits: String = decimals.chars().take(18).collect();
        let frac_value = if frac_digits.is_empty() {
            0
        } else if frac_digits.chars().all(|c| c.is_ascii_digit()) {
            let padded = format!("{frac_digits:0<18}");
            padded.parse::<u128>().unwrap_or(0)
        } else {
            tracing::warn!(len = input.len(), "non-numeric fixed-point input");
            return Self::ZERO;
        };

        Self(
            units_value
                .saturating_mul(SCALE)
                .saturating_add(frac_value),
        )
    }
}

impl fmt::Display for Fp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:018}", self.0 / SCALE, self.0 % SCALE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(units: u128) -> Fp {
        Fp::from_units(units)
    }

    #[test]
    fn add_saturates() {
        assert_eq!(fp(40).saturating_add(fp(2)), fp(42));
        assert_eq!(Fp::MAX.saturating_add(Fp::EPSILON), Fp::MAX);
    }

    #[test]
    fn sub_saturates_at_zero() {
        assert_eq!(fp(50).saturating_sub(fp(8)), fp(42));
        assert_eq!(fp(1).saturating_sub(fp(2)), Fp::ZERO);
    }

    #[test]
    fn mul_is_exact_through_widening() {
        assert_eq!(fp(6).saturating_mul(fp(7)), fp(42));
        // 2^96 units squared overflows u128 raw but the product still
        // widens correctly before clamping.
        let big = Fp::from_raw(u128::MAX / 2);
        assert_eq!(big.saturating_mul(Fp::ONE), big);
    }

    #[test]
    fn mul_saturates() {
        assert_eq!(Fp::MAX.saturating_mul(fp(2)), Fp::MAX);
    }

    #[test]
    fn div_rounds_down() {
        assert_eq!(fp(42).saturating_div(fp(7)), fp(6));
        assert_eq!(
            fp(1).saturating_div(fp(3)),
            Fp::from_raw(333_333_333_333_333_333)
        );
    }

    #[test]
    fn div_by_zero_is_zero() {
        assert_eq!(fp(1).saturating_div(Fp::ZERO), Fp::ZERO);
    }

    #[test]
    fn ratio() {
        assert_eq!(Fp::from_ratio(1, 2), Fp::from_raw(SCALE / 2));
        assert_eq!(Fp::from_ratio(2, 17).saturating_mul(fp(17)), fp(2));
        assert_eq!(Fp::from_ratio(1, 0), Fp::ZERO);
    }

    #[test]
    fn midpoint_never_overflows() {
        assert_eq!(fp(900).midpoint(fp(1000)), fp(950));
        assert_eq!(Fp::MAX.midpoint(Fp::MAX), Fp::MAX);
    }

    #[test]
    fn decimal_parsing_is_forgiving() {
        assert_eq!(Fp::from_decimal_str("1"), Fp::ONE);
        assert_eq!(Fp::from_decimal_str("0.5"), Fp::from_raw(SCALE / 2));
        assert_eq!(Fp::from_decimal_str(".5"), Fp::from_raw(SCALE / 2));
        assert_eq!(Fp::from_decimal_str("1050"), fp(1050));
        assert_eq!(Fp::from_decimal_str(""), Fp::ZERO);
        assert_eq!(Fp::from_decimal_str("not a number"), Fp::ZERO);
        assert_eq!(Fp::from_decimal_str("1.2.3"), Fp::ZERO);
        // 19th fractional digit is truncated, not rounded.
        assert_eq!(
            Fp::from_decimal_str("0.0000000000000000015"),
            Fp::EPSILON
        );
    }

    #[test]
    fn wire_roundtrip() {
        let value = Fp::from_raw(0x0123_4567_89ab_cdef_fedc_ba98_7654_3210);
        assert_eq!(Fp::from_be_bytes(value.to_be_bytes()), value);
        // Big-endian: most significant byte first.
        assert_eq!(value.to_be_bytes()[0], 0x01);
    }

    #[test]
    fn display_renders_units_and_fraction() {
        assert_eq!(format!("{}", fp(1050)), "1050.000000000000000000");
        assert_eq!(
            format!("{}", Fp::from_raw(SCALE / 2)),
            "0.500000000000000000"
        );
    }

    #[test]
    fn serde_roundtrip() {
        let value = Fp::from_units(1050);
        let json = serde_json::to_string(&value).unwrap();
        let back: Fp = serde_json::from_str(&json).unwrap();
        assert_eq!(value, back);
    }
}
