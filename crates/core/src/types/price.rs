//! Type-safe price representation using decimal arithmetic.
//!
//! Favorites store prices in **major** currency units (dollars, pesos) as a
//! [`Decimal`]. Storefront markup exposes prices in minor units (cents), so
//! conversion happens once, at ingestion, through [`Price::from_minor_units`]
//! or [`Price::parse_minor_units`].
//!
//! On the wire a price is a plain JSON number in major units, which keeps the
//! persisted layout readable by older page scripts.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A price in major currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from an amount already in major units.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an integer amount of minor units (e.g. cents).
    #[must_use]
    pub fn from_minor_units(minor: i64) -> Self {
        Self(Decimal::new(minor, 2).normalize())
    }

    /// Parse a minor-unit string the way storefront markup emits it.
    ///
    /// Leading whitespace and an optional sign are accepted, then digits are
    /// read up to the first non-digit (`"1999"`, `"1999.00"` and `"1999 COP"`
    /// all yield 19.99). Anything without a leading integer yields zero.
    #[must_use]
    pub fn parse_minor_units(raw: &str) -> Self {
        let trimmed = raw.trim_start();
        let (negative, rest) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, trimmed.get(1..).unwrap_or_default()),
            Some(b'+') => (false, trimmed.get(1..).unwrap_or_default()),
            _ => (false, trimmed),
        };
        let digits: &str = rest
            .find(|c: char| !c.is_ascii_digit())
            .map_or(rest, |end| rest.get(..end).unwrap_or_default());

        match digits.parse::<i64>() {
            Ok(minor) if negative => Self::from_minor_units(-minor),
            Ok(minor) => Self::from_minor_units(minor),
            Err(_) => Self::ZERO,
        }
    }

    /// Create a price from a floating point major-unit amount.
    ///
    /// Returns `None` for NaN and infinities.
    #[must_use]
    pub fn from_f64(amount: f64) -> Option<Self> {
        Decimal::from_f64(amount).map(|d| Self(d.normalize()))
    }

    /// The amount in major units.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount as a float, for hosts that only speak numbers.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.normalize(), f)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MajorUnitsVisitor)
    }
}

/// Reads a major-unit amount from a number or a decimal string.
struct MajorUnitsVisitor;

impl Visitor<'_> for MajorUnitsVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a price in major currency units")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Price(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Price(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Price::from_f64(v).ok_or_else(|| E::invalid_value(de::Unexpected::Float(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Decimal::from_str(v.trim())
            .map(Price)
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

/// Error returned when a currency code is not one the storefront sells in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown currency code: {0}")]
pub struct UnknownCurrency(pub String);

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    COP,
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
    MXN,
    BRL,
    JPY,
}

impl CurrencyCode {
    /// The ISO code, e.g. `"COP"`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::COP => "COP",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
            Self::MXN => "MXN",
            Self::BRL => "BRL",
            Self::JPY => "JPY",
        }
    }

    /// The display symbol, e.g. `"$"`.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::COP | Self::USD | Self::CAD | Self::AUD | Self::MXN => "$",
            Self::BRL => "R$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::JPY => "¥",
        }
    }

    /// Number of fraction digits shown for this currency.
    #[must_use]
    pub const fn fraction_digits(self) -> u32 {
        match self {
            Self::JPY => 0,
            _ => 2,
        }
    }
}

impl FromStr for CurrencyCode {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "COP" => Ok(Self::COP),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            "MXN" => Ok(Self::MXN),
            "BRL" => Ok(Self::BRL),
            "JPY" => Ok(Self::JPY),
            _ => Err(UnknownCurrency(s.to_owned())),
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
