//! # Money
//!
//! Prices are whole cents in an `i64`. Text goes in and out through
//! [`FromStr`] and [`Money::to_decimal_string`]; no float ever holds an
//! amount.
//!
//! ```text
//!   JSON / query string          memory            SQLite
//!   "9.99" ───────parse────────► Money(999) ──────► price_cents = 999
//!   "9.99" ◄──to_decimal_string─ Money(999) ◄────── price_cents = 999
//! ```
//!
//! ```rust
//! use storefront_core::money::Money;
//!
//! let price: Money = "9.99".parse().unwrap();
//! assert_eq!(price.cents(), 999);
//!
//! let total = price + Money::from_cents(500);
//! assert_eq!(total.to_decimal_string(), "14.99");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use std::str::FromStr;
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// An amount in cents.
///
/// Signed so that sums and differences never wrap at zero; a negative
/// price is a validation error, not a type error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// `None` if the result does not fit.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds every amount, stopping with `None` at the first overflow.
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |total, amount| total.checked_add(amount))
    }

    /// Whole units, truncated toward zero.
    #[inline]
    const fn whole(&self) -> i64 {
        self.0 / 100
    }

    /// The two fraction digits, without sign.
    #[inline]
    const fn fraction(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Plain decimal with exactly two fraction digits.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(999).to_decimal_string(), "9.99");
    /// assert_eq!(Money::from_cents(-550).to_decimal_string(), "-5.50");
    /// assert_eq!(Money::from_cents(7).to_decimal_string(), "0.07");
    /// ```
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.whole().abs(), self.fraction())
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Why a decimal string could not be turned into `Money`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyParseError {
    #[error("amount is empty")]
    Empty,

    #[error("amount '{0}' is not a decimal number")]
    InvalidFormat(String),

    #[error("amount '{0}' has more than two fraction digits")]
    TooPrecise(String),

    #[error("amount '{0}' is out of range")]
    Overflow(String),
}

/// Parses `"12"`, `"12.5"`, `"12.50"`, `"-3.10"`.
///
/// ## Grammar
/// ```text
/// amount   = ["-"] digits ["." fraction]
/// digits   = 1*DIGIT
/// fraction = 1*2DIGIT
/// ```
impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(MoneyParseError::Empty);
        }

        let (negative, unsigned) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (unsigned, None),
        };

        let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());

        if !all_digits(whole) {
            return Err(MoneyParseError::InvalidFormat(raw.to_string()));
        }

        let minor = match fraction {
            None => 0,
            Some(f) if !all_digits(f) => {
                return Err(MoneyParseError::InvalidFormat(raw.to_string()));
            }
            Some(f) if f.len() > 2 => return Err(MoneyParseError::TooPrecise(raw.to_string())),
            Some(f) if f.len() == 1 => i64::from(f.as_bytes()[0] - b'0') * 10,
            Some(f) => i64::from(f.as_bytes()[0] - b'0') * 10 + i64::from(f.as_bytes()[1] - b'0'),
        };

        let overflow = || MoneyParseError::Overflow(raw.to_string());
        let major: i64 = whole.parse().map_err(|_| overflow())?;
        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(overflow)?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Serde: decimal string representation
// =============================================================================

/// Serde adapter that (de)serializes `Money` as a decimal string.
///
/// ## Usage
/// ```rust,ignore
/// #[derive(Serialize, Deserialize)]
/// struct Body {
///     #[serde(with = "storefront_core::money::decimal")]
///     price: Money,
/// }
/// ```
///
/// Deserialization also accepts a JSON number (`9.99`). Its shortest textual
/// form is parsed with the same grammar, so no float arithmetic happens.
/// Numbers with more significant digits than an `f64` holds exactly are
/// refused; such amounts must be sent as strings.
pub mod decimal {
    use super::Money;
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    /// Significant decimal digits an `f64` always round-trips.
    const EXACT_F64_DIGITS: usize = 15;

    pub fn serialize<S: Serializer>(money: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&money.to_decimal_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        deserializer.deserialize_any(DecimalVisitor)
    }

    struct DecimalVisitor;

    impl<'de> Visitor<'de> for DecimalVisitor {
        type Value = Money;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a decimal amount with at most two fraction digits")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
            v.parse().map_err(E::custom)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
            self.visit_str(&v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
            self.visit_str(&v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
            if !v.is_finite() {
                return Err(E::custom("amount must be finite"));
            }

            let text = v.to_string();
            if significant_digits(&text) > EXACT_F64_DIGITS {
                return Err(E::custom(format!(
                    "amount {} is too precise for a JSON number; send it as a string",
                    text
                )));
            }
            self.visit_str(&text)
        }
    }

    /// Digits from the first non-zero one, ignoring sign and point.
    fn significant_digits(text: &str) -> usize {
        text.bytes()
            .filter(u8::is_ascii_digit)
            .skip_while(|&b| b == b'0')
            .count()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// `$9.99`, for logs.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.whole().abs(), self.fraction())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}


// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_for_logs() {
        assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn test_parse_valid_amounts() {
        assert_eq!("9.99".parse::<Money>().unwrap().cents(), 999);
        assert_eq!("12".parse::<Money>().unwrap().cents(), 1200);
        assert_eq!("12.5".parse::<Money>().unwrap().cents(), 1250);
        assert_eq!("0.07".parse::<Money>().unwrap().cents(), 7);
        assert_eq!(" 5.00 ".parse::<Money>().unwrap().cents(), 500);
        assert_eq!("-3.10".parse::<Money>().unwrap().cents(), -310);
        assert_eq!("0".parse::<Money>().unwrap(), Money::zero());
    }

    #[test]
    fn test_parse_rejects_bad_amounts() {
        assert_eq!("".parse::<Money>(), Err(MoneyParseError::Empty));
        assert!(matches!("abc".parse::<Money>(), Err(MoneyParseError::InvalidFormat(_))));
        assert!(matches!(".5".parse::<Money>(), Err(MoneyParseError::InvalidFormat(_))));
        assert!(matches!("5.".parse::<Money>(), Err(MoneyParseError::InvalidFormat(_))));
        assert!(matches!("1e3".parse::<Money>(), Err(MoneyParseError::InvalidFormat(_))));
        assert!(matches!("9.999".parse::<Money>(), Err(MoneyParseError::TooPrecise(_))));
        assert!(matches!(
            "99999999999999999999".parse::<Money>(),
            Err(MoneyParseError::Overflow(_))
        ));
    }

    #[test]
    fn test_decimal_string_round_trip_keeps_cents() {
        for cents in [0, 7, 99, 100, 999, 123456] {
            let money = Money::from_cents(cents);
            assert_eq!(money.to_decimal_string().parse::<Money>().unwrap(), money);
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct Priced {
        #[serde(with = "decimal")]
        price: Money,
    }

    #[test]
    fn test_serde_decimal_accepts_string_and_number() {
        let from_string: Priced = serde_json::from_str(r#"{"price":"9.99"}"#).unwrap();
        assert_eq!(from_string.price.cents(), 999);

        let from_number: Priced = serde_json::from_str(r#"{"price":9.99}"#).unwrap();
        assert_eq!(from_number.price.cents(), 999);

        let whole: Priced = serde_json::from_str(r#"{"price":15}"#).unwrap();
        assert_eq!(whole.price.cents(), 1500);

        assert!(serde_json::from_str::<Priced>(r#"{"price":"1.234"}"#).is_err());
    }

    #[test]
    fn test_serde_decimal_serializes_string() {
        let body = Priced {
            price: Money::from_cents(999),
        };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"price":"9.99"}"#);
    }

    #[test]
    fn test_checked_sum() {
        let total = Money::checked_sum([150, 250, 99].into_iter().map(Money::from_cents));
        assert_eq!(total, Some(Money::from_cents(499)));

        let huge = Money::from_cents(i64::MAX - 1);
        assert_eq!(Money::checked_sum([huge, Money::from_cents(2)]), None);
        assert_eq!(Money::checked_sum([]), Some(Money::zero()));
    }

    #[test]
    fn test_serde_decimal_refuses_rounded_numbers() {
        let err = serde_json::from_str::<Priced>(r#"{"price":12345678901234567.89}"#).unwrap_err();
        assert!(err.to_string().contains("send it as a string"));

        let exact: Priced = serde_json::from_str(r#"{"price":"12345678901234567.89"}"#).unwrap();
        assert_eq!(exact.price.cents(), 1234567890123456789);

        let small: Priced = serde_json::from_str(r#"{"price":0.05}"#).unwrap();
        assert_eq!(small.price.cents(), 5);
    }
}
