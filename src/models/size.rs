// src/models/size.rs

//! File sizes as shown in the portal's file tables.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static SIZE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)(\w+)$").expect("valid size pattern"));

/// Values at or above this render in exponent notation.
const EXPONENT_THRESHOLD: f64 = 1e16;

/// Unit of a [`Size`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    Unknown,
    Byte,
    KiloByte,
    MegaByte,
    GigaByte,
    TeraByte,
}

impl SizeUnit {
    /// Resolve a unit from the first letter of a unit token (`kB` -> `KiloByte`).
    fn from_token(token: &str) -> Option<Self> {
        match token.chars().next()?.to_ascii_uppercase() {
            'B' => Some(Self::Byte),
            'K' => Some(Self::KiloByte),
            'M' => Some(Self::MegaByte),
            'G' => Some(Self::GigaByte),
            'T' => Some(Self::TeraByte),
            _ => None,
        }
    }

    /// Short suffix used when rendering, `None` for [`SizeUnit::Unknown`].
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            Self::Unknown => None,
            Self::Byte => Some("B"),
            Self::KiloByte => Some("KB"),
            Self::MegaByte => Some("MB"),
            Self::GigaByte => Some("GB"),
            Self::TeraByte => Some("TB"),
        }
    }
}

/// A size value with its unit, e.g. `4.2 MB`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub value: f64,
    pub unit: SizeUnit,
}

impl Size {
    pub fn new(value: f64, unit: SizeUnit) -> Self {
        Self { value, unit }
    }

    /// Parse strings like `2.4 MB`, `643B` or `6.2kB`.
    ///
    /// Whitespace is ignored. Returns `None` when the text is not a number
    /// followed by a unit starting with B, K, M, G or T.
    pub fn parse(text: &str) -> Option<Self> {
        let compact: String = text.split_whitespace().collect();
        let caps = SIZE_PATTERN.captures(&compact)?;

        let value = caps.get(1)?.as_str().parse::<f64>().ok()?;
        let unit = SizeUnit::from_token(caps.get(2)?.as_str())?;

        Some(Self { value, unit })
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_finite() && self.value.abs() >= EXPONENT_THRESHOLD {
            // 1e+16 MB
            let formatted = format!("{:e}", self.value);
            match formatted.split_once('e') {
                Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                    write!(f, "{mantissa}e+{exponent}")?
                }
                _ => f.write_str(&formatted)?,
            }
        } else if self.value.fract() == 0.0 {
            // Integral values keep one decimal: 643.0 B
            write!(f, "{:.1}", self.value)?;
        } else {
            write!(f, "{}", self.value)?;
        }

        match self.unit.suffix() {
            Some(suffix) => write!(f, " {suffix}"),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(Size::parse("2.4MB"), Some(Size::new(2.4, SizeUnit::MegaByte)));
        assert_eq!(Size::parse("643B"), Some(Size::new(643.0, SizeUnit::Byte)));
        assert_eq!(Size::parse("6.2 kB"), Some(Size::new(6.2, SizeUnit::KiloByte)));
        assert_eq!(Size::parse("1 GiB"), Some(Size::new(1.0, SizeUnit::GigaByte)));
        assert_eq!(Size::parse(" 3\tTB "), Some(Size::new(3.0, SizeUnit::TeraByte)));
    }

    #[test]
    fn test_parse_whitespace_inside_number_is_collapsed() {
        assert_eq!(Size::parse("4 . 2 MB"), Some(Size::new(4.2, SizeUnit::MegaByte)));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(Size::parse("abc"), None);
        assert_eq!(Size::parse("5"), None);
        assert_eq!(Size::parse("5X"), None);
        assert_eq!(Size::parse(""), None);
        assert_eq!(Size::parse("4,2 MB"), None);
        assert_eq!(Size::parse("-1 MB"), None);
        assert_eq!(Size::parse("2023-01-05 10:00:00"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Size::new(4.2, SizeUnit::MegaByte).to_string(), "4.2 MB");
        assert_eq!(Size::new(643.0, SizeUnit::Byte).to_string(), "643.0 B");
        assert_eq!(Size::new(1.5, SizeUnit::TeraByte).to_string(), "1.5 TB");
        assert_eq!(Size::new(7.0, SizeUnit::Unknown).to_string(), "7.0");
    }

    #[test]
    fn test_display_large_values_use_exponent() {
        assert_eq!(Size::new(1e16, SizeUnit::MegaByte).to_string(), "1e+16 MB");
        assert_eq!(Size::new(1.5e20, SizeUnit::Byte).to_string(), "1.5e+20 B");
        assert_eq!(
            Size::new(9999999999999998.0, SizeUnit::Byte).to_string(),
            "9999999999999998.0 B"
        );
    }
}
