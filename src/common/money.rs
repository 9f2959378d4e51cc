use bigdecimal::{BigDecimal, ParseBigDecimalError, ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
const SCALE: i64 = 100;

#[derive(Debug, Clone, Copy, Default, Hash)]
/// A monetary value held in minor currency units (centavos).
///
/// Amounts are parsed through `BigDecimal` and rounded to two decimal places,
/// so arithmetic on balances never goes through floating point.
///
/// # Examples
/// ```
/// use wallet_ledger::common::money::Money;
///
/// let amount: Money = "1356".parse().unwrap();
/// assert_eq!(amount.as_i64(), 135_600);
/// assert_eq!(amount.to_string_2dp(), "1356.00");
///
/// let with_comma: Money = "50,5".parse().unwrap();
/// assert_eq!(with_comma.to_string(), "50.50");
/// ```
pub struct Money(i64);

impl Money {
    pub fn new(minor_units: i64) -> Self {
        Self(minor_units)
    }

    pub fn zero() -> Self {
        Money(0)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    pub fn to_string_2dp(&self) -> String {
        format!("{:.2}", BigDecimal::new(self.0.into(), 2))
    }
}

impl std::str::FromStr for Money {
    type Err = ParseBigDecimalError;

    /// Accepts both `.` and `,` as the decimal separator.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.is_empty() {
            return Err(ParseBigDecimalError::Other("empty amount".into()));
        }

        let bd: BigDecimal = t.replace(',', ".").parse()?;

        let scaled = (bd * BigDecimal::from(SCALE)).round(0);
        let value: i64 = scaled
            .to_i64()
            .ok_or_else(|| ParseBigDecimalError::Other("amount overflow".into()))?;

        Ok(Money(value))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_2dp())
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_2dp())
    }
}

// Records written by older clients hold plain JSON numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Text(String),
    Number(f64),
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = match RawAmount::deserialize(deserializer)? {
            RawAmount::Text(text) => text,
            RawAmount::Number(number) if number.is_finite() => number.to_string(),
            RawAmount::Number(number) => {
                return Err(serde::de::Error::custom(format!(
                    "amount is not finite: {number}"
                )));
            }
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for Money {}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Money {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        *self = *self - rhs;
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_zero() {
        assert_eq!(Money::zero(), Money(0));
        assert!(Money::zero().is_zero());
        assert!(!Money::zero().is_positive());
    }

    #[test]
    fn test_from_str_valid() {
        assert_eq!(Money::from_str("1").unwrap(), Money(100));
        assert_eq!(Money::from_str("1.5").unwrap(), Money(150));
        assert_eq!(Money::from_str("1356.00").unwrap(), Money(135_600));
        assert_eq!(Money::from_str("0.01").unwrap(), Money(1));
        assert_eq!(Money::from_str("  2.00 ").unwrap(), Money(200));
        assert_eq!(Money::from_str("50,25").unwrap(), Money(5025));
        assert_eq!(Money::from_str("-3").unwrap(), Money(-300));
    }

    #[test]
    fn test_from_str_rounding() {
        assert_eq!(Money::from_str("1.999").unwrap(), Money(200));
        assert_eq!(Money::from_str("0.001").unwrap(), Money(0));
    }

    #[test]
    fn test_from_str_invalid() {
        assert!(Money::from_str("").is_err());
        assert!(Money::from_str("   ").is_err());
        assert!(Money::from_str("abc").is_err());
        assert!(Money::from_str("NaN").is_err());
        assert!(Money::from_str("1e400").is_err());
    }

    #[test]
    fn test_to_string_2dp() {
        assert_eq!(Money(140_600).to_string_2dp(), "1406.00");
        assert_eq!(Money(5).to_string_2dp(), "0.05");
        assert_eq!(Money(0).to_string_2dp(), "0.00");
        assert_eq!(Money(-1250).to_string_2dp(), "-12.50");
    }

    #[test]
    fn test_checked_ops() {
        assert_eq!(Money(1).checked_add(Money(2)), Some(Money(3)));
        assert_eq!(Money(i64::MAX).checked_add(Money(1)), None);
        assert_eq!(Money(i64::MIN).checked_sub(Money(1)), None);
    }

    #[test]
    fn test_arithmetic_and_ordering() {
        let mut m = Money(10_000);
        m += Money(5_000);
        assert_eq!(m, Money(15_000));
        m -= Money(15_000);
        assert_eq!(m, Money::zero());
        assert!(Money(100) < Money(150));
        assert_eq!(
            vec![Money(100), Money(-30), Money(5)].into_iter().sum::<Money>(),
            Money(75)
        );
    }

    #[test]
    fn test_serde_as_text_and_legacy_numbers() {
        let json = serde_json::to_string(&Money(5000)).unwrap();
        assert_eq!(json, "\"50.00\"");

        let from_text: Money = serde_json::from_str("\"50.00\"").unwrap();
        assert_eq!(from_text, Money(5000));

        let from_number: Money = serde_json::from_str("1356.5").unwrap();
        assert_eq!(from_number, Money(135_650));

        assert!(serde_json::from_str::<Money>("\"abc\"").is_err());
    }
}
