//! Resource quantities
//!
//! Fixed-point decimal numbers with an optional unit suffix, in the format the
//! Kubernetes metrics APIs use for values:
//!
//! ```text
//! <quantity>        ::= <signedNumber><suffix>
//! <number>          ::= <digits> | <digits>.<digits> | <digits>. | .<digits>
//! <suffix>          ::= <binarySI> | <decimalExponent> | <decimalSI>
//! <binarySI>        ::= Ki | Mi | Gi | Ti | Pi | Ei
//! <decimalSI>       ::= n | u | m | "" | k | M | G | T | P | E
//! <decimalExponent> ::= "e" <signedInteger> | "E" <signedInteger>
//! ```
//!
//! Values are held exactly as `mantissa * 10^scale`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValueError;

/// Suffix family a quantity was written in; drives canonical formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Powers of 1024: `Ki`, `Mi`, ...
    BinarySI,
    /// Powers of 1000: `m`, `k`, `M`, ...
    DecimalSI,
    /// Scientific notation: `1e3`
    DecimalExponent,
}

const BINARY_SUFFIXES: [&str; 6] = ["Ki", "Mi", "Gi", "Ti", "Pi", "Ei"];

/// Decimal quantity with unit-suffix semantics
#[derive(Debug, Clone, Copy)]
pub struct Quantity {
    mantissa: i128,
    scale: i32,
    format: Format,
}

impl Quantity {
    /// Parse a quantity string such as `"0.05"`, `"10Mi"` or `"5k"`
    pub fn parse(input: &str) -> Result<Self, ValueError> {
        let invalid = |reason: &str| ValueError::InvalidQuantity {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let (negative, unsigned) = match input.as_bytes().first() {
            Some(b'-') => (true, &input[1..]),
            Some(b'+') => (false, &input[1..]),
            Some(_) => (false, input),
            None => return Err(invalid("empty string")),
        };

        let number_len = unsigned
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(unsigned.len());
        let (number, suffix) = unsigned.split_at(number_len);

        let (whole, fraction) = match number.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (number, ""),
        };
        if fraction.contains('.') {
            return Err(invalid("more than one decimal point"));
        }
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("missing digits"));
        }

        let (format, exponent, binary_power) = parse_suffix(suffix).ok_or_else(|| invalid("unknown suffix"))?;

        // Zeros on either end carry no precision
        let fraction = fraction.trim_end_matches('0');
        let digits = format!("{}{}", whole, fraction);
        let digits = digits.trim_start_matches('0');

        let mut mantissa: i128 = if digits.is_empty() {
            0
        } else {
            digits.parse().map_err(|_| invalid("too many significant digits"))?
        };
        let mut scale = exponent
            .checked_sub(fraction.len() as i32)
            .ok_or_else(|| invalid("exponent out of range"))?;

        if binary_power > 0 {
            mantissa = mantissa
                .checked_mul(1i128 << (10 * binary_power))
                .ok_or_else(|| invalid("value out of range"))?;
        }

        if negative {
            mantissa = -mantissa;
        }

        if mantissa == 0 {
            scale = 0;
        } else {
            while mantissa % 10 == 0 {
                mantissa /= 10;
                scale = scale
                    .checked_add(1)
                    .ok_or_else(|| invalid("exponent out of range"))?;
            }
        }

        Ok(Self {
            mantissa,
            scale,
            format,
        })
    }

    /// Suffix family the quantity was written in
    pub fn format(&self) -> Format {
        self.format
    }

    /// Approximate value as a float
    pub fn as_f64(&self) -> f64 {
        self.mantissa as f64 * 10f64.powi(self.scale)
    }

    /// Value in thousandths, rounded up, if it fits in an `i64`
    pub fn milli_value(&self) -> Option<i64> {
        let shift = self.scale.checked_add(3)?;
        let value = if shift >= 0 {
            self.mantissa.checked_mul(10i128.checked_pow(shift as u32)?)?
        } else {
            // A divisor past i128 dwarfs any mantissa
            let (quotient, remainder) = match 10i128.checked_pow(shift.unsigned_abs()) {
                Some(divisor) => (self.mantissa / divisor, self.mantissa % divisor),
                None => (0, self.mantissa),
            };
            if remainder > 0 {
                quotient + 1
            } else {
                quotient
            }
        };
        i64::try_from(value).ok()
    }

    fn integer_value(&self) -> Option<i128> {
        if self.scale < 0 {
            return None;
        }
        self.mantissa.checked_mul(10i128.checked_pow(self.scale as u32)?)
    }

    fn fmt_binary(&self, f: &mut fmt::Formatter<'_>) -> Option<fmt::Result> {
        let value = self.integer_value()?;
        let mut power = 0;
        let mut reduced = value;
        while power < BINARY_SUFFIXES.len() && reduced % 1024 == 0 {
            reduced /= 1024;
            power += 1;
        }
        if power == 0 {
            return None;
        }
        Some(write!(f, "{}{}", reduced, BINARY_SUFFIXES[power - 1]))
    }

    fn fmt_decimal(&self, f: &mut fmt::Formatter<'_>, exponent_suffix: bool) -> fmt::Result {
        // Largest multiple of three not above the scale, clamped to the SI range
        let scale = i64::from(self.scale);
        let mut exponent = scale.div_euclid(3) * 3;
        if !exponent_suffix {
            exponent = exponent.clamp(-9, 18);
        }

        let shift = scale - exponent;
        let Some(mantissa) = u32::try_from(shift)
            .ok()
            .filter(|_| i32::try_from(exponent).is_ok())
            .and_then(|shift| 10i128.checked_pow(shift))
            .and_then(|m| self.mantissa.checked_mul(m))
        else {
            return write!(f, "{}e{}", self.mantissa, self.scale);
        };

        match (exponent_suffix, exponent) {
            (_, 0) => write!(f, "{}", mantissa),
            (true, e) => write!(f, "{}e{}", mantissa, e),
            (false, e) => write!(f, "{}{}", mantissa, decimal_si_suffix(e)),
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mantissa == 0 {
            return f.write_str("0");
        }
        match self.format {
            Format::BinarySI => match self.fmt_binary(f) {
                Some(result) => result,
                None => self.fmt_decimal(f, false),
            },
            Format::DecimalSI => self.fmt_decimal(f, false),
            Format::DecimalExponent => self.fmt_decimal(f, true),
        }
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.mantissa == other.mantissa && self.scale == other.scale
    }
}

impl Eq for Quantity {}

impl FromStr for Quantity {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Map a suffix to (format, decimal exponent, binary power)
fn parse_suffix(suffix: &str) -> Option<(Format, i32, u32)> {
    let decimal = |exponent| Some((Format::DecimalSI, exponent, 0));
    match suffix {
        "" => decimal(0),
        "n" => decimal(-9),
        "u" => decimal(-6),
        "m" => decimal(-3),
        "k" => decimal(3),
        "M" => decimal(6),
        "G" => decimal(9),
        "T" => decimal(12),
        "P" => decimal(15),
        "E" => decimal(18),
        _ => {
            if let Some(index) = BINARY_SUFFIXES.iter().position(|s| *s == suffix) {
                return Some((Format::BinarySI, 0, index as u32 + 1));
            }
            let exponent = suffix
                .strip_prefix('e')
                .or_else(|| suffix.strip_prefix('E'))?;
            let digits = exponent.trim_start_matches(['+', '-']);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) || exponent.len() - digits.len() > 1 {
                return None;
            }
            Some((Format::DecimalExponent, exponent.parse().ok()?, 0))
        }
    }
}

fn decimal_si_suffix(exponent: i64) -> &'static str {
    match exponent {
        -9 => "n",
        -6 => "u",
        -3 => "m",
        3 => "k",
        6 => "M",
        9 => "G",
        12 => "T",
        15 => "P",
        18 => "E",
        _ => "",
    }
}
