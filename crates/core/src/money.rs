use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;
use thiserror::Error;

/// A signed amount in the settlement currency.
///
/// Serializes as a plain JSON number, which is what the directory's finance
/// endpoints expect for `Value` fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(#[serde(with = "rust_decimal::serde::float")] Decimal);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid amount: '{0}'")]
pub struct MoneyParseError(pub String);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Keeps the full precision of `decimal`. Sub-cent digits survive until
    /// amounts are netted.
    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal)
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    /// Strictly greater than zero. Zero and negative nets are not payable.
    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl FromStr for Money {
    type Err = MoneyParseError;

    /// Accepts `12.5`, ` 12.50 `, `$1,234.00` and accounting-style `(5.00)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, body) = match trimmed.strip_prefix('(').and_then(|b| b.strip_suffix(')')) {
            Some(inner) => (true, inner),
            None => (false, trimmed),
        };
        let cleaned = body.replace([',', '$', ' '], "");
        if cleaned.is_empty() {
            return Err(MoneyParseError(s.to_string()));
        }
        let dec = Decimal::from_str(&cleaned).map_err(|_| MoneyParseError(s.to_string()))?;
        Ok(Money::from_decimal(if negative { -dec } else { dec }))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |a, b| a + b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain() {
        assert_eq!("123.45".parse::<Money>().unwrap(), Money::from_cents(12345));
    }

    #[test]
    fn parse_whole_number_equals_two_places() {
        assert_eq!("15".parse::<Money>().unwrap(), Money::from_cents(1500));
    }

    #[test]
    fn parse_with_dollar_sign_and_commas() {
        assert_eq!("$1,234.56".parse::<Money>().unwrap(), Money::from_cents(123456));
    }

    #[test]
    fn parse_accounting_parens_is_negative() {
        assert_eq!("(75.25)".parse::<Money>().unwrap(), Money::from_cents(-7525));
    }

    #[test]
    fn parse_keeps_sub_cent_digits() {
        let m = "10.005".parse::<Money>().unwrap();
        assert_eq!(m.as_decimal(), Decimal::new(10005, 3));
        assert_ne!(m, Money::from_cents(1000));
    }

    #[test]
    fn parse_rejects_non_numeric() {
        assert!("ten dollars".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
        assert!("  ".parse::<Money>().is_err());
    }

    #[test]
    fn sum_and_sign() {
        let total: Money = [Money::from_cents(1000), Money::from_cents(-1300)].into_iter().sum();
        assert_eq!(total, Money::from_cents(-300));
        assert!(!total.is_positive());
        assert!(!Money::zero().is_positive());
        assert!(Money::from_cents(1).is_positive());
    }

    #[test]
    fn display_two_places() {
        assert_eq!(Money::from_cents(1500).to_string(), "$15.00");
    }

    #[test]
    fn serializes_as_json_number() {
        let json = serde_json::to_value(Money::from_cents(1550)).unwrap();
        assert_eq!(json, serde_json::json!(15.5));
    }
}
