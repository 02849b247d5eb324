//! Money formatting for drawer rows.
//!
//! Formatting is pluggable: anything implementing [`MoneyFormatter`],
//! including a plain `Fn(Price) -> String`, can be injected into the engine.
//! [`CurrencyFormatter`] is the default and approximates the storefront's
//! locale conventions for the currencies it sells in.

use rust_decimal::{Decimal, RoundingStrategy};
use wishlist_core::{CurrencyCode, Price};

use crate::config::WishlistConfig;

const NBSP: char = '\u{a0}';

/// Turns a major-unit price into display text.
pub trait MoneyFormatter {
    /// Format a price for display.
    fn format(&self, price: Price) -> String;
}

impl<F> MoneyFormatter for F
where
    F: Fn(Price) -> String,
{
    fn format(&self, price: Price) -> String {
        self(price)
    }
}

/// Locale-aware currency formatter.
///
/// Unknown currency codes fall back to `"<amount> <CODE>"` with the
/// locale's digit grouping.
#[derive(Debug, Clone)]
pub struct CurrencyFormatter {
    locale: String,
    currency: String,
}

impl CurrencyFormatter {
    /// Create a formatter for a locale (`es-CO`) and currency code (`COP`).
    #[must_use]
    pub fn new(locale: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            currency: currency.into(),
        }
    }

    /// Create a formatter from the resolved configuration.
    #[must_use]
    pub fn from_config(config: &WishlistConfig) -> Self {
        Self::new(config.locale.clone(), config.currency.clone())
    }
}

impl MoneyFormatter for CurrencyFormatter {
    fn format(&self, price: Price) -> String {
        let style = LocaleStyle::for_locale(&self.locale);

        let Ok(code) = self.currency.parse::<CurrencyCode>() else {
            let amount = price.amount().normalize();
            return format!(
                "{}{} {}",
                sign(amount),
                style.number(amount, amount.scale()),
                self.currency.trim()
            );
        };

        let digits = code.fraction_digits();
        let amount = price
            .amount()
            .round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero);
        let number = style.number(amount, digits);
        let sign = sign(amount);

        match style.symbol {
            SymbolPlacement::Prefix => format!("{sign}{}{number}", code.symbol()),
            SymbolPlacement::PrefixSpaced => format!("{sign}{}{NBSP}{number}", code.symbol()),
            SymbolPlacement::SuffixSpaced => format!("{sign}{number}{NBSP}{}", code.symbol()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum SymbolPlacement {
    Prefix,
    PrefixSpaced,
    SuffixSpaced,
}

#[derive(Debug, Clone, Copy)]
struct LocaleStyle {
    group: char,
    decimal: char,
    symbol: SymbolPlacement,
}

impl LocaleStyle {
    fn for_locale(locale: &str) -> Self {
        let language = locale
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match language.as_str() {
            "es" | "pt" | "nl" | "id" => Self {
                group: '.',
                decimal: ',',
                symbol: SymbolPlacement::PrefixSpaced,
            },
            "de" | "it" | "da" | "tr" => Self {
                group: '.',
                decimal: ',',
                symbol: SymbolPlacement::SuffixSpaced,
            },
            "fr" | "ru" | "pl" | "cs" | "sv" | "nb" | "fi" | "uk" => Self {
                group: NBSP,
                decimal: ',',
                symbol: SymbolPlacement::SuffixSpaced,
            },
            _ => Self {
                group: ',',
                decimal: '.',
                symbol: SymbolPlacement::Prefix,
            },
        }
    }

    /// Render a non-negative amount with `digits` fraction digits.
    fn number(self, amount: Decimal, digits: u32) -> String {
        let fixed = format!("{:.*}", digits as usize, amount.abs());
        let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

        let mut out = group_digits(int_part, self.group);
        if !frac_part.is_empty() {
            out.push(self.decimal);
            out.push_str(frac_part);
        }
        out
    }
}

fn sign(amount: Decimal) -> &'static str {
    if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    }
}

fn group_digits(int_part: &str, separator: char) -> String {
    let len = int_part.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(minor: i64) -> Price {
        Price::from_minor_units(minor)
    }

    #[test]
    fn test_format_usd_english() {
        let formatter = CurrencyFormatter::new("en-US", "USD");
        assert_eq!(formatter.format(price(2550)), "$25.50");
        assert_eq!(formatter.format(price(123_456_789)), "$1,234,567.89");
    }

    #[test]
    fn test_format_cop_colombian() {
        let formatter = CurrencyFormatter::new("es-CO", "COP");
        assert_eq!(formatter.format(price(2550)), "$\u{a0}25,50");
        assert_eq!(formatter.format(price(12_990_000)), "$\u{a0}129.900,00");
    }

    #[test]
    fn test_format_eur_german_suffix() {
        let formatter = CurrencyFormatter::new("de-DE", "EUR");
        assert_eq!(formatter.format(price(199_999)), "1.999,99\u{a0}€");
    }

    #[test]
    fn test_format_jpy_has_no_fraction() {
        let formatter = CurrencyFormatter::new("ja-JP", "JPY");
        assert_eq!(formatter.format(Price::new(Decimal::new(12345, 1))), "¥1,235");
    }

    #[test]
    fn test_format_negative() {
        let formatter = CurrencyFormatter::new("en-US", "USD");
        assert_eq!(formatter.format(price(-500)), "-$5.00");
    }

    #[test]
    fn test_unknown_currency_falls_back() {
        let formatter = CurrencyFormatter::new("en-US", "XYZ");
        assert_eq!(formatter.format(price(123_450)), "1,234.5 XYZ");
    }

    #[test]
    fn test_closure_formatter() {
        let formatter = |p: Price| format!("{p} pts");
        assert_eq!(MoneyFormatter::format(&formatter, price(2550)), "25.5 pts");
    }

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits("1", ','), "1");
        assert_eq!(group_digits("1000", ','), "1,000");
        assert_eq!(group_digits("100000", '.'), "100.000");
    }
}
