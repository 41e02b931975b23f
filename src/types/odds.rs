//! Fixed-point odds, stake and capital utilities.
//!
//! ## Overview
//!
//! Odds, stakes and probabilities are stored as `u64` scaled by 10^8.
//! Agent capital is stored as `i64` in the same scale because the ledger
//! lets it go negative.
//!
//! ## Why Fixed-Point?
//!
//! Matching compares accumulated liabilities across both sides of a book.
//! Doing that in `f64` would make tie decisions hardware-dependent, so all
//! intermediate math goes through `rust_decimal` and stored values stay integral.
//!
//! ## Examples
//!
//! ```
//! use backlay::types::odds::{to_fixed, from_fixed, ONE};
//!
//! let odds = to_fixed("2.5").unwrap();
//! assert_eq!(odds, 250_000_000);
//! assert!(odds > ONE);
//! assert_eq!(from_fixed(odds), "2.50000000");
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Scaling factor for fixed-point arithmetic: 10^8
pub const SCALE: u64 = 100_000_000;

/// 1.0 in fixed point. Valid decimal odds are strictly greater than this.
pub const ONE: u64 = SCALE;

// ============================================================================
// Conversion Functions
// ============================================================================

/// Convert a decimal string to fixed-point u64
///
/// Returns `None` if parsing fails, the value is negative, or out of range.
///
/// ```
/// use backlay::types::odds::to_fixed;
///
/// assert_eq!(to_fixed("1.0"), Some(100_000_000));
/// assert_eq!(to_fixed("2.1"), Some(210_000_000));
/// assert_eq!(to_fixed("0.00000001"), Some(1));
/// ```
pub fn to_fixed(s: &str) -> Option<u64> {
    let decimal = Decimal::from_str(s).ok()?;
    decimal_to_fixed(decimal)
}

/// Convert a Decimal to fixed-point u64, rounding to 8 places
pub fn decimal_to_fixed(d: Decimal) -> Option<u64> {
    if d.is_sign_negative() {
        return None;
    }

    let scaled = d.checked_mul(Decimal::from(SCALE))?;
    scaled.round_dp(0).to_u64()
}

/// Convert a Decimal to signed fixed-point i64 (capital)
pub fn decimal_to_capital(d: Decimal) -> Option<i64> {
    let scaled = d.checked_mul(Decimal::from(SCALE))?;
    scaled.round_dp(0).to_i64()
}

/// Convert fixed-point u64 to a Decimal
#[inline]
pub fn fixed_to_decimal(value: u64) -> Decimal {
    Decimal::from(value) / Decimal::from(SCALE)
}

/// Convert signed fixed-point capital to a Decimal
#[inline]
pub fn capital_to_decimal(value: i64) -> Decimal {
    Decimal::from(value) / Decimal::from(SCALE)
}

/// Render fixed-point u64 with 8 decimal places
///
/// ```
/// use backlay::types::odds::from_fixed;
///
/// assert_eq!(from_fixed(100_000_000), "1.00000000");
/// assert_eq!(from_fixed(210_000_000), "2.10000000");
/// ```
pub fn from_fixed(value: u64) -> String {
    format!("{:.8}", fixed_to_decimal(value))
}

/// Render fixed-point u64 without trailing zeros
///
/// ```
/// use backlay::types::odds::from_fixed_trimmed;
///
/// assert_eq!(from_fixed_trimmed(200_000_000), "2");
/// assert_eq!(from_fixed_trimmed(210_000_000), "2.1");
/// ```
pub fn from_fixed_trimmed(value: u64) -> String {
    fixed_to_decimal(value).normalize().to_string()
}

/// Render signed capital with 2 decimal places
pub fn from_capital(value: i64) -> String {
    format!("{:.2}", capital_to_decimal(value))
}

// ============================================================================
// Ledger arithmetic
// ============================================================================

/// Debit a stake from signed capital
///
/// Capital is allowed to go negative; only i64 overflow is rejected.
///
/// ```
/// use backlay::types::odds::checked_debit;
///
/// assert_eq!(checked_debit(500_000_000, 1_000_000_000), Some(-500_000_000));
/// assert_eq!(checked_debit(i64::MIN, 1), None);
/// ```
pub fn checked_debit(capital: i64, stake: u64) -> Option<i64> {
    let stake = i64::try_from(stake).ok()?;
    capital.checked_sub(stake)
}

/// Check the decimal-odds invariant (`odds > 1.0`)
#[inline]
pub fn is_valid_odds(odds: u64) -> bool {
    odds > ONE
}

/// Check a probability lies in `[0, 1]`
#[inline]
pub fn is_valid_probability(p: u64) -> bool {
    p <= ONE
}

// ============================================================================
// Unit Tests
// ============================================================================
