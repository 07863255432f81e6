use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Monetary value stored as **integer minor units** (cents).
///
/// Shop financials, debts and cross-shop transaction amounts are all kept as
/// `i64` minor units; `Money` is the typed wrapper used at the edges to parse
/// user input and format output.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount: Money = "12,5".parse().unwrap();
/// assert_eq!(amount.minor(), 1250);
/// assert_eq!(amount.to_string(), "12.50");
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Fails with [`EngineError::InvalidAmount`] when the value is below zero.
    pub fn non_negative(self, label: &str) -> Result<Self, EngineError> {
        if self.is_negative() {
            return Err(EngineError::InvalidAmount(format!(
                "{label} must be >= 0"
            )));
        }
        Ok(self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses `10`, `10.5`, `-3,25` into minor units.
    ///
    /// At most two fractional digits are accepted, `.` and `,` are both
    /// decimal separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| EngineError::InvalidAmount(format!("{reason}: {s:?}"));

        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        if digits.is_empty() {
            return Err(invalid("empty amount"));
        }

        let normalized = digits.replace(',', ".");
        let (units, fraction) = match normalized.split_once('.') {
            Some((units, fraction)) => (units, fraction),
            None => (normalized.as_str(), ""),
        };
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if units.is_empty() || !all_digits(units) || !all_digits(fraction) {
            return Err(invalid("invalid amount"));
        }
        if fraction.len() > 2 {
            return Err(invalid("too many decimals"));
        }

        let units: i64 = units.parse().map_err(|_| invalid("amount too large"))?;
        let cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid("invalid amount"))? * 10,
            _ => fraction.parse::<i64>().map_err(|_| invalid("invalid amount"))?,
        };
        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(|| invalid("amount too large"))?;

        Ok(Money(if negative { -total } else { total }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_pads_cents() {
        assert_eq!(Money::from_minor(0).to_string(), "0.00");
        assert_eq!(Money::from_minor(7).to_string(), "0.07");
        assert_eq!(Money::from_minor(15_000).to_string(), "150.00");
        assert_eq!(Money::from_minor(-1_050).to_string(), "-10.50");
    }

    #[test]
    fn parse_accepts_both_separators() {
        assert_eq!("100".parse::<Money>().unwrap().minor(), 10_000);
        assert_eq!("2.5".parse::<Money>().unwrap().minor(), 250);
        assert_eq!("2,05".parse::<Money>().unwrap().minor(), 205);
        assert_eq!(" +1.00 ".parse::<Money>().unwrap().minor(), 100);
        assert_eq!("-0.01".parse::<Money>().unwrap().minor(), -1);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<Money>().is_err());
        assert!("-".parse::<Money>().is_err());
        assert!("1.234".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!(".50".parse::<Money>().is_err());
    }

    #[test]
    fn non_negative_rejects_debits() {
        assert_eq!(
            Money::from_minor(-5).non_negative("debt"),
            Err(EngineError::InvalidAmount("debt must be >= 0".to_string()))
        );
        assert!(Money::ZERO.non_negative("debt").is_ok());
    }
}
