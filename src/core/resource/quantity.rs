//! Canonical resource quantities and their textual grammar.
//!
//! A quantity is written the way Kubernetes manifests write them: a signed decimal number followed
//! by an optional suffix.
//! ```
//! use kubernetriks_simspec::Quantity;
//!
//! let cpu: Quantity = "500m".parse().unwrap();
//! let memory: Quantity = "256Mi".parse().unwrap();
//!
//! assert_eq!(500, cpu.milli_value());
//! assert_eq!(268435456, memory.value());
//! assert_eq!(cpu, "0.5".parse::<Quantity>().unwrap());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Multiplier {
    /// 1024^n
    Binary(u32),
    /// 10^n
    Decimal(i32),
}

lazy_static! {
    static ref SUFFIXES: HashMap<&'static str, Multiplier> = {
        HashMap::from([
            ("Ki", Multiplier::Binary(1)),
            ("Mi", Multiplier::Binary(2)),
            ("Gi", Multiplier::Binary(3)),
            ("Ti", Multiplier::Binary(4)),
            ("Pi", Multiplier::Binary(5)),
            ("Ei", Multiplier::Binary(6)),
            ("n", Multiplier::Decimal(-9)),
            ("u", Multiplier::Decimal(-6)),
            ("m", Multiplier::Decimal(-3)),
            ("", Multiplier::Decimal(0)),
            ("k", Multiplier::Decimal(3)),
            ("M", Multiplier::Decimal(6)),
            ("G", Multiplier::Decimal(9)),
            ("T", Multiplier::Decimal(12)),
            ("P", Multiplier::Decimal(15)),
            ("E", Multiplier::Decimal(18)),
        ])
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("quantity must not be empty")]
    Empty,
    #[error("invalid quantity {0:?}: expected a decimal number with an optional suffix")]
    InvalidFormat(String),
    #[error("invalid quantity {quantity:?}: unknown suffix {suffix:?}")]
    UnknownSuffix { quantity: String, suffix: String },
    #[error("quantity {0:?} is out of range")]
    OutOfRange(String),
    #[error("invalid quantity for resource {resource:?}: {source}")]
    InvalidEntry {
        resource: String,
        source: Box<QuantityError>,
    },
}

/// Amount of some resource in thousandths of its base unit (millicores for cpu, millibytes for
/// memory). Amounts below one milli-unit are rounded up.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity {
    milli: i64,
}

impl Quantity {
    pub fn from_milli(milli: i64) -> Self {
        Self { milli }
    }

    pub fn from_value(value: i64) -> Option<Self> {
        value.checked_mul(1000).map(Self::from_milli)
    }

    pub fn milli_value(&self) -> i64 {
        self.milli
    }

    /// Amount in base units, rounded up.
    pub fn value(&self) -> i64 {
        let whole = self.milli.div_euclid(1000);
        if self.milli.rem_euclid(1000) != 0 {
            whole + 1
        } else {
            whole
        }
    }

    pub fn as_f64(&self) -> f64 {
        self.milli as f64 / 1000.0
    }

    pub fn is_zero(&self) -> bool {
        self.milli == 0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.milli % 1000 == 0 {
            write!(f, "{}", self.milli / 1000)
        } else {
            write!(f, "{}m", self.milli)
        }
    }
}

impl FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(QuantityError::Empty);
        }
        let invalid = || QuantityError::InvalidFormat(s.to_string());
        let out_of_range = || QuantityError::OutOfRange(s.to_string());

        let (negative, unsigned) = match s.as_bytes()[0] {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };

        let number_len = unsigned
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(unsigned.len());
        let (number, suffix) = unsigned.split_at(number_len);

        let (whole, fraction) = match number.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (number, ""),
        };
        if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
            return Err(invalid());
        }

        let mut mantissa: i128 = 0;
        for digit in whole.bytes().chain(fraction.bytes()) {
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(i128::from(digit - b'0')))
                .ok_or_else(out_of_range)?;
        }
        if negative {
            mantissa = -mantissa;
        }
        let fraction_digits = i32::try_from(fraction.len()).map_err(|_| out_of_range())?;

        let multiplier = parse_suffix(suffix).ok_or_else(|| QuantityError::UnknownSuffix {
            quantity: s.to_string(),
            suffix: suffix.to_string(),
        })?;

        let milli = match multiplier {
            Multiplier::Decimal(exponent) => {
                let shift = exponent
                    .checked_add(3)
                    .and_then(|e| e.checked_sub(fraction_digits))
                    .ok_or_else(out_of_range)?;
                scale_decimal(mantissa, shift)
            }
            Multiplier::Binary(power) => mantissa
                .checked_mul(1000)
                .and_then(|m| m.checked_mul(1i128 << (10 * power)))
                .and_then(|m| scale_decimal(m, -fraction_digits)),
        }
        .ok_or_else(out_of_range)?;

        i64::try_from(milli)
            .map(Quantity::from_milli)
            .map_err(|_| out_of_range())
    }
}

fn parse_suffix(suffix: &str) -> Option<Multiplier> {
    if let Some(multiplier) = SUFFIXES.get(suffix) {
        return Some(*multiplier);
    }
    // "1e3", "2E-2"; a bare "E" is exa and handled by the table.
    let exponent = suffix.strip_prefix(['e', 'E'])?;
    let digits = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    exponent.parse::<i32>().ok().map(Multiplier::Decimal)
}

/// `value * 10^shift`, rounding towards positive infinity when `shift` is negative.
fn scale_decimal(value: i128, shift: i32) -> Option<i128> {
    if value == 0 {
        return Some(0);
    }
    if shift >= 0 {
        return 10i128
            .checked_pow(shift.unsigned_abs())
            .and_then(|factor| value.checked_mul(factor));
    }
    match 10i128.checked_pow(shift.unsigned_abs()) {
        Some(divisor) => {
            let whole = value.div_euclid(divisor);
            if value.rem_euclid(divisor) != 0 {
                Some(whole + 1)
            } else {
                Some(whole)
            }
        }
        // Divisor exceeds any representable mantissa: the result lies strictly in (-1, 1).
        None => Some(if value > 0 { 1 } else { 0 }),
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = deserializer.deserialize_any(QuantityTextVisitor)?;
        text.parse().map_err(de::Error::custom)
    }
}

/// Accepts a quantity written either as a string or as a bare YAML/JSON number and yields its
/// textual form without interpreting it.
pub(crate) struct QuantityTextVisitor;

impl<'de> Visitor<'de> for QuantityTextVisitor {
    type Value = String;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a resource quantity string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(v.to_string())
    }
}
