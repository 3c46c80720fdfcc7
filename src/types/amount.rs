//! Decimal string <-> integer base unit conversion.
//!
//! ## Overview
//!
//! Order amounts are raw 256-bit base units. Tooling and logs want human
//! readable values instead: `1.5` of an 18-decimal token is
//! `1_500_000_000_000_000_000` base units.
//!
//! Parsing goes through `rust_decimal` so no floating point ever touches an
//! amount. Values are limited to what a `Decimal` can hold (28 significant
//! digits), which covers any human-entered amount.
//!
//! ## Examples
//!
//! ```
//! use alloy::primitives::U256;
//! use limit_order_protocol::types::amount::{parse_units, format_units};
//!
//! let wei = parse_units("1.5", 18).unwrap();
//! assert_eq!(wei, U256::from(1_500_000_000_000_000_000u128));
//! assert_eq!(format_units(wei, 18), "1.5");
//! ```

use std::str::FromStr;

use alloy::primitives::U256;
use rust_decimal::Decimal;

/// Largest supported token precision
pub const MAX_DECIMALS: u32 = 36;

/// `10^decimals` as a U256
pub fn unit(decimals: u32) -> U256 {
    U256::from(10u64).pow(U256::from(decimals))
}

/// Parse a decimal string into base units
///
/// # Returns
///
/// * `Some(U256)` - The base unit amount
/// * `None` - Negative, unparsable, more fractional digits than `decimals`,
///   or `decimals` above [`MAX_DECIMALS`]
///
/// # Example
///
/// ```
/// use alloy::primitives::U256;
/// use limit_order_protocol::types::amount::parse_units;
///
/// assert_eq!(parse_units("100", 6), Some(U256::from(100_000_000u64)));
/// assert_eq!(parse_units("0.000001", 6), Some(U256::from(1u64)));
/// assert_eq!(parse_units("0.0000001", 6), None);
/// ```
pub fn parse_units(s: &str, decimals: u32) -> Option<U256> {
    if decimals > MAX_DECIMALS {
        return None;
    }

    let decimal = Decimal::from_str(s.trim()).ok()?.normalize();
    if decimal.is_sign_negative() && !decimal.is_zero() {
        return None;
    }

    let scale = decimal.scale();
    if scale > decimals {
        return None;
    }

    let mantissa = decimal.mantissa().unsigned_abs();
    U256::from(mantissa).checked_mul(unit(decimals - scale))
}

/// Format base units as a decimal string with trailing zeros trimmed
///
/// # Example
///
/// ```
/// use alloy::primitives::U256;
/// use limit_order_protocol::types::amount::format_units;
///
/// assert_eq!(format_units(U256::from(1_000_000u64), 6), "1");
/// assert_eq!(format_units(U256::from(1_250_000u64), 6), "1.25");
/// assert_eq!(format_units(U256::from(5u64), 6), "0.000005");
/// ```
pub fn format_units(value: U256, decimals: u32) -> String {
    if decimals == 0 {
        return value.to_string();
    }

    let base = unit(decimals);
    let whole = value / base;
    let fraction = value % base;
    if fraction.is_zero() {
        return whole.to_string();
    }

    let digits = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

// ============================================================================
// Unit Tests
// ============================================================================
