//! Fixed-width big integer arithmetic for reserve math
//!
//! Reserves are quoted in the smallest on-chain unit (wei for ETH, 1e-18 for
//! tokens), so `k = eth * token` easily exceeds `u128`. Everything here works
//! on [`U256`] with checked operations and an explicit rounding direction.

use crate::error::CurveError;
use uint::construct_uint;

construct_uint! {
    /// 256-bit unsigned integer used for every reserve and amount on the curve.
    pub struct U256(4);
}

/// Direction of an integer division.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Truncate toward zero
    Down,
    /// Round away from zero whenever there is a remainder
    Up,
}

pub fn checked_add(a: U256, b: U256) -> Result<U256, CurveError> {
    a.checked_add(b).ok_or(CurveError::Overflow)
}

pub fn checked_sub(a: U256, b: U256) -> Result<U256, CurveError> {
    a.checked_sub(b).ok_or(CurveError::Overflow)
}

pub fn checked_mul(a: U256, b: U256) -> Result<U256, CurveError> {
    a.checked_mul(b).ok_or(CurveError::Overflow)
}

/// `numerator / denominator` with the requested rounding.
pub fn div_rounding(
    numerator: U256,
    denominator: U256,
    rounding: Rounding,
) -> Result<U256, CurveError> {
    if denominator.is_zero() {
        return Err(CurveError::DivisionByZero);
    }
    let (quotient, remainder) = numerator.div_mod(denominator);
    match rounding {
        Rounding::Down => Ok(quotient),
        Rounding::Up if remainder.is_zero() => Ok(quotient),
        Rounding::Up => checked_add(quotient, U256::one()),
    }
}

/// `a * b / denominator` without losing precision in the intermediate product.
pub fn mul_div(
    a: U256,
    b: U256,
    denominator: U256,
    rounding: Rounding,
) -> Result<U256, CurveError> {
    div_rounding(checked_mul(a, b)?, denominator, rounding)
}

/// Fee owed on `amount` at `fee_bps`, rounded up so the protocol never
/// collects less than the nominal rate.
pub fn bps_fee(amount: U256, fee_bps: u16) -> Result<U256, CurveError> {
    mul_div(
        amount,
        U256::from(fee_bps),
        U256::from(crate::constants::BPS_SCALE),
        Rounding::Up,
    )
}

/// Render a fixed-point integer as a decimal string, e.g. `1500` with 3
/// decimals becomes `"1.5"`. Trailing fractional zeros are trimmed.
pub fn format_units(value: U256, decimals: usize) -> String {
    let scale = U256::exp10(decimals);
    let (whole, fraction) = value.div_mod(scale);
    if fraction.is_zero() {
        return whole.to_string();
    }
    let fraction = format!("{:0>width$}", fraction.to_string(), width = decimals);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

/// Serialize [`U256`] as a decimal string so JSON consumers keep full precision.
pub mod serde_u256 {
    use super::U256;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        U256::from_dec_str(raw.trim())
            .map_err(|e| D::Error::custom(format!("invalid U256 '{}': {:?}", raw, e)))
    }
}
