//! Fixed-precision monetary values
//!
//! All amounts and percentages are `rust_decimal::Decimal`. Ledger amounts
//! are kept at two decimal places; intermediate products (capital share,
//! raw pool sizes) stay unrounded until they are turned into an allocation.
//!
//! The allocation helpers guarantee that the parts always sum to the
//! whole, so a profit pool is never over- or under-distributed by rounding.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of decimal places carried by ledger amounts
pub const MONEY_PRECISION: u32 = 2;

/// Most decimal places a percentage may carry (matches the stored `NUMERIC(9, 4)`)
pub const PERCENTAGE_PRECISION: u32 = 4;

/// Rounds a value to ledger precision (banker's rounding)
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(
        MONEY_PRECISION,
        rust_decimal::RoundingStrategy::MidpointNearestEven,
    )
}

/// Errors that can occur when constructing or splitting monetary values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),

    #[error("Percentage must be between 0 and 100, got {0}")]
    PercentageOutOfRange(Decimal),

    #[error("Percentage {0} has more than 4 decimal places")]
    PercentageTooPrecise(Decimal),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid allocation: {0}")]
    InvalidAllocation(String),
}

/// A strictly positive ledger amount
///
/// The direction of money movement is carried by the entry kind, never by
/// the sign of the amount, so this type refuses zero and negatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Creates an amount, rounding to ledger precision first
    ///
    /// # Errors
    ///
    /// `MoneyError::NonPositiveAmount` if the rounded value is not above zero
    pub fn new(value: Decimal) -> Result<Self, MoneyError> {
        let rounded = round_money(value);
        if rounded <= Decimal::ZERO {
            return Err(MoneyError::NonPositiveAmount(value));
        }
        Ok(Self(rounded))
    }

    /// Returns the underlying decimal
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Decimal {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// A percentage in the closed range 0..=100 (e.g. `dec!(12.5)` for 12.5%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Percentage(Decimal);

impl Percentage {
    /// Creates a percentage
    ///
    /// # Errors
    ///
    /// - `MoneyError::PercentageOutOfRange` for values below 0 or above 100
    /// - `MoneyError::PercentageTooPrecise` beyond four decimal places, which
    ///   could not be stored without rounding
    pub fn new(value: Decimal) -> Result<Self, MoneyError> {
        if value < Decimal::ZERO || value > dec!(100) {
            return Err(MoneyError::PercentageOutOfRange(value));
        }
        let value = value.normalize();
        if value.scale() > PERCENTAGE_PRECISION {
            return Err(MoneyError::PercentageTooPrecise(value));
        }
        Ok(Self(value))
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn hundred() -> Self {
        Self(dec!(100))
    }

    /// Returns the percentage value (e.g. 12.5 for 12.5%)
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns the complement `100 - self`
    pub fn complement(&self) -> Self {
        Self(dec!(100) - self.0)
    }

    /// Applies this percentage to a base value without rounding
    pub fn apply(&self, base: Decimal) -> Decimal {
        base * self.0 / dec!(100)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl TryFrom<Decimal> for Percentage {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Percentage::new(value)
    }
}

impl From<Percentage> for Decimal {
    fn from(percentage: Percentage) -> Decimal {
        percentage.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

fn to_minor_units(value: Decimal) -> Result<i128, MoneyError> {
    (value * Decimal::from(10_i64.pow(MONEY_PRECISION)))
        .round()
        .to_i128()
        .ok_or_else(|| MoneyError::InvalidAllocation(format!("{} is out of range", value)))
}

/// Splits `total` into `parts` equal shares at ledger precision
///
/// Leftover cents go to the first shares, so the result always sums to the
/// rounded total.
pub fn allocate_even(total: Decimal, parts: usize) -> Result<Vec<Decimal>, MoneyError> {
    if parts == 0 {
        return Err(MoneyError::InvalidAllocation(
            "Cannot allocate to zero parts".to_string(),
        ));
    }

    let total_minor = to_minor_units(total)?;
    let base = total_minor / parts as i128;
    let remainder = (total_minor % parts as i128) as usize;

    Ok((0..parts)
        .map(|i| {
            let minor = if i < remainder { base + 1 } else { base };
            Decimal::from_i128_with_scale(minor, MONEY_PRECISION)
        })
        .collect())
}

/// Splits `total` in proportion to `weights` at ledger precision
///
/// Largest-remainder method: every share is `total * w_i / Σw` floored to
/// cents, then the cents still missing go one at a time to the shares with
/// the largest fractional remainder (ties to the larger weight, then to the
/// earlier position). The parts sum exactly to the rounded total, no part is
/// negative, and zero-weight entries always receive zero.
///
/// # Errors
///
/// Fails on an empty weight list, a negative weight or total, weights summing
/// to zero, or values too large to split exactly.
pub fn allocate_by_weights(total: Decimal, weights: &[Decimal]) -> Result<Vec<Decimal>, MoneyError> {
    if weights.is_empty() {
        return Err(MoneyError::InvalidAllocation("Empty weights".to_string()));
    }
    if weights.iter().any(|w| w.is_sign_negative() && !w.is_zero()) {
        return Err(MoneyError::InvalidAllocation("Negative weight".to_string()));
    }

    let total_minor = to_minor_units(total)?;
    if total_minor < 0 {
        return Err(MoneyError::InvalidAllocation(format!(
            "Cannot allocate a negative total of {}",
            total
        )));
    }

    // Weights as integers on a common scale so the split is exact
    let scale = weights.iter().map(|w| w.scale()).max().unwrap_or(0);
    let units: Vec<i128> = weights
        .iter()
        .map(|w| {
            let mut w = *w;
            w.rescale(scale);
            w.mantissa()
        })
        .collect();

    let unit_sum: i128 = units.iter().sum();
    if unit_sum == 0 {
        return Err(MoneyError::DivisionByZero);
    }

    let overflow = || MoneyError::InvalidAllocation("Allocation is out of range".to_string());
    let mut floors = Vec::with_capacity(units.len());
    let mut remainders = Vec::with_capacity(units.len());
    for unit in &units {
        let numerator = total_minor.checked_mul(*unit).ok_or_else(overflow)?;
        floors.push(numerator / unit_sum);
        remainders.push(numerator % unit_sum);
    }

    let mut order: Vec<usize> = (0..units.len()).collect();
    order.sort_by(|&a, &b| {
        remainders[b]
            .cmp(&remainders[a])
            .then(units[b].cmp(&units[a]))
            .then(a.cmp(&b))
    });

    let leftover = total_minor - floors.iter().sum::<i128>();
    for &slot in order.iter().take(leftover as usize) {
        floors[slot] += 1;
    }

    Ok(floors
        .into_iter()
        .map(|minor| Decimal::from_i128_with_scale(minor, MONEY_PRECISION))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_rejects_zero_and_negative() {
        assert_eq!(
            Amount::new(Decimal::ZERO),
            Err(MoneyError::NonPositiveAmount(Decimal::ZERO))
        );
        assert!(Amount::new(dec!(-5)).is_err());
        assert!(Amount::new(dec!(0.004)).is_err());
    }

    #[test]
    fn test_amount_rounds_to_cents() {
        let amount = Amount::new(dec!(10.005)).unwrap();
        assert_eq!(amount.value(), dec!(10.00));
        assert_eq!(amount.to_string(), "10.00");
    }

    #[test]
    fn test_percentage_bounds() {
        assert!(Percentage::new(dec!(0)).is_ok());
        assert!(Percentage::new(dec!(100)).is_ok());
        assert!(Percentage::new(dec!(100.01)).is_err());
        assert!(Percentage::new(dec!(-1)).is_err());
    }

    #[test]
    fn test_percentage_precision() {
        assert!(Percentage::new(dec!(12.3456)).is_ok());
        assert!(Percentage::new(dec!(12.345600)).is_ok());
        assert_eq!(
            Percentage::new(dec!(12.345678)),
            Err(MoneyError::PercentageTooPrecise(dec!(12.345678)))
        );
    }

    #[test]
    fn test_percentage_apply() {
        let p = Percentage::new(dec!(10)).unwrap();
        assert_eq!(p.apply(dec!(1000)), dec!(100));
        assert_eq!(p.complement().value(), dec!(90));
    }

    #[test]
    fn test_allocate_even_spreads_cents() {
        let parts = allocate_even(dec!(100), 3).unwrap();
        assert_eq!(parts, vec![dec!(33.34), dec!(33.33), dec!(33.33)]);
    }

    #[test]
    fn test_allocate_by_weights_exact() {
        let parts = allocate_by_weights(dec!(40), &[dec!(100), dec!(300)]).unwrap();
        assert_eq!(parts, vec![dec!(10), dec!(30)]);
    }

    #[test]
    fn test_allocate_by_weights_zero_weight_gets_nothing() {
        let parts = allocate_by_weights(dec!(10), &[dec!(1), dec!(1), dec!(1), dec!(0)]).unwrap();
        assert_eq!(parts[3], Decimal::ZERO);
        assert_eq!(parts.iter().sum::<Decimal>(), dec!(10));
    }

    #[test]
    fn test_allocate_by_weights_small_pool_many_equal_weights() {
        let parts = allocate_by_weights(dec!(0.06), &[dec!(1); 9]).unwrap();

        assert!(parts.iter().all(|p| *p >= Decimal::ZERO));
        assert_eq!(parts.iter().sum::<Decimal>(), dec!(0.06));
        assert_eq!(parts.iter().filter(|p| **p == dec!(0.01)).count(), 6);
        // ties go to the earlier positions
        assert_eq!(&parts[..6], &[dec!(0.01); 6]);
        assert!(parts[6..].iter().all(|p| p.is_zero()));
    }

    #[test]
    fn test_allocate_by_weights_largest_remainder_wins() {
        // exact shares 0.0333.., 0.0666..: the 0.66 remainder takes the cent
        let parts = allocate_by_weights(dec!(0.10), &[dec!(1), dec!(2)]).unwrap();
        assert_eq!(parts, vec![dec!(0.03), dec!(0.07)]);
    }

    #[test]
    fn test_allocate_by_weights_rejects_negative_total() {
        assert!(allocate_by_weights(dec!(-1), &[dec!(1)]).is_err());
    }

    #[test]
    fn test_allocate_by_weights_zero_sum() {
        assert_eq!(
            allocate_by_weights(dec!(10), &[Decimal::ZERO]),
            Err(MoneyError::DivisionByZero)
        );
    }
}
