use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign},
    str::FromStr,
};

use rust_decimal::{Decimal, RoundingStrategy, prelude::FromPrimitive};

use crate::EngineError;

/// Largest magnitude (in whole units) we accept from user input.
///
/// Keeps any realistic sum of records far below [`Decimal::MAX`].
const MAX_ABS_UNITS: i64 = 1_000_000_000_000_000;

/// Signed money amount.
///
/// The decimal value typed by the user is kept as is; rounding to two
/// decimals only happens when the amount is displayed, so totals of many
/// records match the sum of what was entered.
///
/// The value is signed: the ledger does not reject zero or negative amounts.
///
/// # Examples
///
/// ```rust
/// use engine::Amount;
///
/// let amount: Amount = "12.5".parse().unwrap();
/// assert_eq!(amount.to_string(), "12.50");
///
/// let kopi: Amount = "1.333".parse().unwrap();
/// assert_eq!(kopi.to_string(), "1.33");
/// assert_eq!((kopi + kopi + kopi).to_string(), "4.00");
///
/// assert!("dua".parse::<Amount>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Exact textual form, used for storage. Parses back to the same value.
    pub(crate) fn to_exact_string(self) -> String {
        self.0.normalize().to_string()
    }
}

impl fmt::Display for Amount {
    /// Two decimals, midpoints rounded away from zero.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        if rounded.is_zero() {
            rounded.set_sign_positive(true);
        }
        rounded.rescale(2);
        write!(f, "{rounded}")
    }
}

impl Add for Amount {
    type Output = Amount;

    /// Saturates at the bounds of [`Decimal`] instead of panicking.
    fn add(self, rhs: Amount) -> Self::Output {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        *self = *self + rhs;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl FromStr for Amount {
    type Err = EngineError;

    /// Parses a decimal number.
    ///
    /// Accepts the same notation as `f64` (`12`, `12.50`, `-3`, `.5`, `1e3`)
    /// as long as the value is finite and within range. The digits are kept
    /// exactly, no rounding happens here.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidAmount("empty amount".to_string()));
        }

        let float: f64 = trimmed
            .parse()
            .map_err(|_| EngineError::InvalidAmount(format!("invalid amount: {trimmed}")))?;
        if !float.is_finite() {
            return Err(EngineError::InvalidAmount(format!(
                "invalid amount: {trimmed}"
            )));
        }

        let value = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .ok()
            .or_else(|| Decimal::from_f64(float))
            .filter(|value| value.abs() <= Decimal::from(MAX_ABS_UNITS))
            .ok_or_else(|| EngineError::InvalidAmount(format!("amount out of range: {trimmed}")))?;

        Ok(Amount(value.normalize()))
    }
}
