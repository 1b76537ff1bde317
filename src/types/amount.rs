//! Amount arithmetic: time interpolation, fill fractions and reduction.
//!
//! ## No Rounding Leaks
//!
//! Every operation is integer-only and checked. Interpolation rounds in the
//! direction that protects the counterparty: offer amounts round down (never
//! over-promise) and consideration amounts round up (never under-collect).
//! Fraction scaling must be exact, otherwise splitting an order could leak
//! value.
//!
//! ## Example
//!
//! ```
//! use dark_settlement::types::amount::locate_current_amount;
//!
//! // Dutch auction from 100 down to 0 between t=0 and t=10
//! assert_eq!(locate_current_amount(100, 0, 0, 10, 0, false).unwrap(), 100);
//! assert_eq!(locate_current_amount(100, 0, 0, 10, 5, false).unwrap(), 50);
//! assert_eq!(locate_current_amount(100, 0, 0, 10, 10, false).unwrap(), 0);
//! ```

use crate::error::SettlementError;
use crate::types::primitives::Amount;

// ============================================================================
// Interpolation
// ============================================================================

/// Effective amount of an item at time `now`.
///
/// Linear between `start_amount` at `start_time` and `end_amount` at
/// `end_time`, exact at both boundaries and clamped outside the window.
///
/// # Errors
///
/// `ArithmeticError` if `end_time <= start_time` or an intermediate product
/// overflows.
pub fn locate_current_amount(
    start_amount: Amount,
    end_amount: Amount,
    start_time: u64,
    end_time: u64,
    now: u64,
    round_up: bool,
) -> Result<Amount, SettlementError> {
    if end_time <= start_time {
        return Err(SettlementError::ArithmeticError("end time must be after start time"));
    }
    if start_amount == end_amount {
        return Ok(start_amount);
    }

    let now = now.clamp(start_time, end_time);
    let duration = Amount::from(end_time - start_time);
    let elapsed = Amount::from(now - start_time);
    let remaining = duration - elapsed;

    let total = start_amount
        .checked_mul(remaining)
        .and_then(|weighted_start| {
            end_amount
                .checked_mul(elapsed)
                .and_then(|weighted_end| weighted_start.checked_add(weighted_end))
        })
        .ok_or(SettlementError::ArithmeticError("amount interpolation overflow"))?;

    if round_up && total != 0 {
        Ok((total - 1) / duration + 1)
    } else {
        Ok(total / duration)
    }
}

// ============================================================================
// Fraction scaling
// ============================================================================

/// Scale `amount` by `numerator / denominator`.
///
/// # Errors
///
/// - `InexactFraction` if the result is not an integer
/// - `ArithmeticError` on overflow or a zero denominator
pub fn apply_fraction(
    amount: Amount,
    numerator: u128,
    denominator: u128,
) -> Result<Amount, SettlementError> {
    if denominator == 0 {
        return Err(SettlementError::ArithmeticError("zero denominator"));
    }
    if numerator == denominator {
        return Ok(amount);
    }
    let product = amount
        .checked_mul(numerator)
        .ok_or(SettlementError::ArithmeticError("fraction scaling overflow"))?;
    if product % denominator != 0 {
        return Err(SettlementError::InexactFraction { amount, numerator, denominator });
    }
    Ok(product / denominator)
}

// ============================================================================
// Fraction
// ============================================================================

/// A non-negative fraction kept in lowest terms where it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fraction {
    pub numerator: u128,
    pub denominator: u128,
}

impl Fraction {
    pub fn new(numerator: u128, denominator: u128) -> Self {
        Self { numerator, denominator }
    }

    /// The whole order: 1/1
    pub fn whole() -> Self {
        Self::new(1, 1)
    }

    /// Whether numerator equals a non-zero denominator
    pub fn is_whole(&self) -> bool {
        self.denominator != 0 && self.numerator == self.denominator
    }

    /// Reduce to lowest terms. 0/0 stays 0/0, 0/n becomes 0/1.
    pub fn reduced(self) -> Self {
        let divisor = gcd(self.numerator, self.denominator);
        if divisor <= 1 {
            return self;
        }
        Self::new(self.numerator / divisor, self.denominator / divisor)
    }
}

/// Greatest common divisor (Euclid).
pub fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

// ============================================================================
// Unit Tests
// ============================================================================
