use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Number of fractional digits kept when converting from `f64`.
pub const F64_PRECISION: u32 = 8;

/// Signed exact decimal amount.
///
/// Positive values are debits, negative values are credits. All arithmetic is
/// exact decimal arithmetic, so a set of lines whose amounts cancel out sums to
/// exactly [`Amount::ZERO`] (no binary floating-point drift).
///
/// Equality ignores trailing zeros: `200` and `200.00` are the same amount.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);
    pub const MAX: Self = Self(Decimal::MAX);

    /// Wrap an existing decimal.
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Build an amount from integer minor units, e.g. `from_minor(12_345, 2)` is `123.45`.
    pub fn from_minor(units: i64, scale: u32) -> Result<Self, TypeError> {
        Decimal::try_new(units, scale)
            .map(Self)
            .map_err(|e| TypeError::InvalidAmount(e.to_string()))
    }

    /// Convert from `f64`, rounding to [`F64_PRECISION`] fractional digits.
    ///
    /// NaN and infinities are rejected.
    pub fn from_f64(value: f64) -> Result<Self, TypeError> {
        Decimal::from_f64(value)
            .map(|d| Self(d.round_dp(F64_PRECISION).normalize()))
            .ok_or_else(|| TypeError::InvalidAmount(value.to_string()))
    }

    /// The underlying decimal.
    pub const fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Strictly greater than zero (a debit).
    pub fn is_debit(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Strictly less than zero (a credit).
    pub fn is_credit(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    pub fn checked_add(&self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(&self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Sum an iterator of amounts, returning `None` on overflow.
    pub fn checked_sum<I>(iter: I) -> Option<Amount>
    where
        I: IntoIterator<Item = Amount>,
    {
        iter.into_iter()
            .try_fold(Amount::ZERO, |acc, amount| acc.checked_add(amount))
    }

    /// Canonical text form: no trailing zeros, no exponent (`"200"`, `"-12.5"`).
    pub fn to_canonical_string(&self) -> String {
        self.0.normalize().to_string()
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({})", self.to_canonical_string())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Amount {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .map(Self)
            .map_err(|e| TypeError::InvalidAmount(format!("{s:?}: {e}")))
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self(Decimal::from(value))
    }
}

impl From<i32> for Amount {
    fn from(value: i32) -> Self {
        Self(Decimal::from(value))
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
