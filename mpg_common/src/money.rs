use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const USD_CURRENCY_CODE: &str = "USD";
pub const VND_CURRENCY_CODE: &str = "VND";

/// The fixed exchange rate used to convert order totals into the settlement currency.
/// Expressed as whole dong per dollar.
pub const VND_PER_USD: i64 = 25_000;

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a money amount: {0}")]
pub struct MoneyConversionError(String);

//--------------------------------------        Usd        -----------------------------------------------------------
/// An amount in the reference currency, stored as integer cents.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Usd(i64);

op!(binary Usd, Add, add);
op!(binary Usd, Sub, sub);
op!(inplace Usd, AddAssign, add_assign);
op!(inplace Usd, SubAssign, sub_assign);
op!(unary Usd, Neg, neg);

impl Usd {
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    /// Converts this amount into whole dong at the given dong-per-dollar rate, rounding up to the
    /// nearest whole unit. The provider minimum is *not* applied here; that is a gateway rule.
    pub fn to_vnd(&self, rate: i64) -> Vnd {
        // Stable-toolchain equivalent of `i64::div_ceil(100)` (the `int_roundings`
        // feature is still unstable): ceiling division by the positive divisor 100.
        let product = self.0 * rate;
        let dong = product / 100 + i64::from(product % 100 > 0);
        Vnd(dong)
    }
}

impl From<i64> for Usd {
    fn from(cents: i64) -> Self {
        Self(cents)
    }
}

impl TryFrom<u64> for Usd {
    type Error = MoneyConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(MoneyConversionError(format!("Value {value} is too large to convert to Usd")))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl PartialEq for Usd {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Usd {}

impl Mul<i64> for Usd {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Usd {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl Display for Usd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, (self.0 % 100).abs())
    }
}

//--------------------------------------        Vnd        -----------------------------------------------------------
/// An amount in the settlement currency. MoMo deals in whole dong only.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Vnd(i64);

op!(binary Vnd, Add, add);
op!(binary Vnd, Sub, sub);
op!(inplace Vnd, AddAssign, add_assign);
op!(inplace Vnd, SubAssign, sub_assign);
op!(unary Vnd, Neg, neg);

impl Vnd {
    pub const fn new(dong: i64) -> Self {
        Self(dong)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }
}

impl From<i64> for Vnd {
    fn from(dong: i64) -> Self {
        Self(dong)
    }
}

impl PartialEq for Vnd {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Vnd {}

impl Sum for Vnd {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl Display for Vnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}₫", self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn usd_display() {
        assert_eq!(Usd::from_cents(1999).to_string(), "$19.99");
        assert_eq!(Usd::from_cents(500).to_string(), "$5.00");
        assert_eq!(Usd::from_cents(7).to_string(), "$0.07");
    }

    #[test]
    fn usd_arithmetic() {
        let total: Usd = [Usd::from_cents(1000), Usd::from_cents(250)].into_iter().sum();
        assert_eq!(total, Usd::from_cents(1250));
        assert_eq!(Usd::from_cents(300) * 4, Usd::from_cents(1200));
        assert_eq!(Usd::from_cents(1000) - Usd::from_cents(1), Usd::from_cents(999));
    }

    #[test]
    fn whole_dollars_convert_exactly() {
        // $2.00 at 25,000₫/$ is exactly 50,000₫
        assert_eq!(Usd::from_cents(200).to_vnd(VND_PER_USD), Vnd::from(50_000));
    }

    #[test]
    fn fractional_cents_round_up() {
        // 1 cent at 3₫/$ is 0.03₫ and must round up to 1₫
        assert_eq!(Usd::from_cents(1).to_vnd(3), Vnd::from(1));
        // $0.99 at 25,000₫/$ = 24,750₫ exactly (no rounding needed)
        assert_eq!(Usd::from_cents(99).to_vnd(VND_PER_USD), Vnd::from(24_750));
        // 7 cents at 333₫/$ = 23.31₫, rounds up to 24₫
        assert_eq!(Usd::from_cents(7).to_vnd(333), Vnd::from(24));
    }

    #[test]
    fn vnd_display() {
        assert_eq!(Vnd::from(50_000).to_string(), "50000₫");
    }
}
