use std::{
    fmt,
    ops::{Add, AddAssign, Neg},
    str::FromStr,
};

use crate::EngineError;

/// Signed money amount represented as **integer pence**.
///
/// Every balance and record amount in the engine goes through this type so
/// arithmetic never touches floats.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(123_456);
/// assert_eq!(amount.pence(), 123456);
/// assert_eq!(amount.to_string(), "£1,234.56");
/// ```
///
/// Parsing from user input (optional `£`, `,` as thousands separator, at most
/// 2 decimals):
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("10".parse::<Money>().unwrap().pence(), 1000);
/// assert_eq!("£1,000.5".parse::<Money>().unwrap().pence(), 100050);
/// assert!("12.345".parse::<Money>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from integer pence.
    #[must_use]
    pub const fn new(pence: i64) -> Self {
        Self(pence)
    }

    /// Creates a new amount from whole pounds.
    #[must_use]
    pub const fn pounds(pounds: i64) -> Self {
        Self(pounds * 100)
    }

    /// Returns the raw value in pence.
    #[must_use]
    pub const fn pence(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let pounds = (abs / 100).to_string();
        let pence = abs % 100;

        let mut grouped = String::with_capacity(pounds.len() + pounds.len() / 3);
        for (i, digit) in pounds.chars().enumerate() {
            if i > 0 && (pounds.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }

        write!(f, "{sign}£{grouped}.{pence:02}")
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a decimal string into pence.
    ///
    /// Accepts an optional leading `+`/`-`, an optional `£`, `,` as a
    /// thousands separator and `.` as the decimal separator.
    ///
    /// Validation rules:
    /// - max 2 fractional digits (rejects `12.345`)
    /// - rejects empty/invalid strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount("invalid amount".to_string());
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, trimmed)
        };

        let rest = rest.trim_start();
        let rest = rest.strip_prefix('£').unwrap_or(rest).trim_start();
        if rest.is_empty() {
            return Err(empty());
        }

        let (pounds_str, pence_str) = match rest.split_once('.') {
            Some((pounds, pence)) => (pounds, Some(pence)),
            None => (rest, None),
        };

        let pounds_digits: String = pounds_str.chars().filter(|c| *c != ',').collect();
        if pounds_digits.is_empty() || !pounds_digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let pounds: i64 = pounds_digits.parse().map_err(|_| overflow())?;

        let pence: i64 = match pence_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                match frac.len() {
                    1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                    2 => frac.parse::<i64>().map_err(|_| invalid())?,
                    _ => return Err(EngineError::InvalidAmount("too many decimals".to_string())),
                }
            }
        };

        let total = pounds
            .checked_mul(100)
            .and_then(|v| v.checked_add(pence))
            .ok_or_else(overflow)?;

        Ok(Money(if negative { -total } else { total }))
    }
}
