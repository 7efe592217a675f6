//! # Localized Formatter
//!
//! Turns raw numbers into display strings and fills summary templates.
//!
//! ## Rules
//!
//! - Currency: `|v| ≥ 1,000,000` abbreviates to `$1.23M`; headline amounts are
//!   grouped with no decimals; precise amounts (daily earnings and the like)
//!   keep two decimals.
//! - Numbers: `|v| ≥ 1000` are grouped with up to two decimals; smaller values
//!   use a fixed decimal count with trailing zeros stripped.
//! - Non-finite values never reach the output; callers pass a "not
//!   applicable" label instead.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::format::{format_currency, format_number, CurrencyStyle, NumberLocale};
//!
//! let en = NumberLocale::for_locale("en");
//! assert_eq!(format_currency(40_387.4, "$", CurrencyStyle::Headline, en), "$40,387");
//! assert_eq!(format_currency(2_500_000.0, "$", CurrencyStyle::Headline, en), "$2.50M");
//! assert_eq!(format_number(0.6400, 4, en), "0.64");
//!
//! let es = NumberLocale::for_locale("es");
//! assert_eq!(format_number(1234.5, 2, es), "1.234,5");
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Separators for one locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberLocale {
    pub thousands: char,
    pub decimal: char,
}

impl NumberLocale {
    pub const EN: NumberLocale = NumberLocale { thousands: ',', decimal: '.' };
    pub const CONTINENTAL: NumberLocale = NumberLocale { thousands: '.', decimal: ',' };

    /// Separators for a locale tag; unknown languages use English separators.
    pub fn for_locale(locale: &str) -> Self {
        let language = locale.split(['-', '_']).next().unwrap_or(locale).to_ascii_lowercase();
        match language.as_str() {
            "es" | "pt" | "de" | "it" | "nl" | "id" => Self::CONTINENTAL,
            _ => Self::EN,
        }
    }
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self::EN
    }
}

/// Precision of a currency amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurrencyStyle {
    /// Whole units, e.g. `$40,387`
    Headline,
    /// Two decimals, e.g. `$1.92`
    Precise,
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Insert group separators into a string of ASCII digits.
fn group_digits(digits: &str, sep: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(c);
    }
    out
}

/// Fixed-point rendering with grouping; `strip` drops trailing fractional zeros.
fn render(value: f64, decimals: usize, grouped: bool, strip: bool, locale: NumberLocale) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (fixed.as_str(), ""),
    };
    let frac = if strip { frac_part.trim_end_matches('0') } else { frac_part };

    let mut out = String::new();
    // -0.00 renders as 0
    if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    if grouped {
        out.push_str(&group_digits(int_part, locale.thousands));
    } else {
        out.push_str(int_part);
    }
    if !frac.is_empty() {
        out.push(locale.decimal);
        out.push_str(frac);
    }
    out
}

/// Generic number: grouped with up to 2 decimals from 1000 up, otherwise
/// `decimals` places with trailing zeros stripped.
pub fn format_number(value: f64, decimals: usize, locale: NumberLocale) -> String {
    if !value.is_finite() {
        return String::from("N/A");
    }
    if value.abs() >= 1000.0 {
        render(value, 2, true, true, locale)
    } else {
        render(value, decimals, false, true, locale)
    }
}

/// Whole number with grouping (`1,250`)
pub fn format_integer(value: f64, locale: NumberLocale) -> String {
    if !value.is_finite() {
        return String::from("N/A");
    }
    render(value.round(), 0, true, true, locale)
}

/// Currency amount with a leading symbol.
pub fn format_currency(value: f64, symbol: &str, style: CurrencyStyle, locale: NumberLocale) -> String {
    if !value.is_finite() {
        return String::from("N/A");
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();
    if abs >= 1_000_000.0 {
        let millions = render(abs / 1_000_000.0, 2, false, false, locale);
        return format!("{}{}{}M", sign, symbol, millions);
    }
    let body = match style {
        CurrencyStyle::Headline => render(abs, 0, true, false, locale),
        CurrencyStyle::Precise => render(abs, 2, true, false, locale),
    };
    let sign = if body.chars().any(|c| c.is_ascii_digit() && c != '0') { sign } else { "" };
    format!("{}{}{}", sign, symbol, body)
}

/// Percentage from a value already in percent units (`7.0` → `7%`).
pub fn format_percent(value_pct: f64, decimals: usize, locale: NumberLocale) -> String {
    if !value_pct.is_finite() {
        return String::from("N/A");
    }
    format!("{}%", render(value_pct, decimals, false, true, locale))
}

/// Number followed by a unit label (`39.54 acres`).
pub fn with_unit(number: &str, unit_label: &str) -> String {
    if unit_label.is_empty() {
        number.to_string()
    } else {
        format!("{} {}", number, unit_label)
    }
}

/// Empty string when the controlling toggle is off.
///
/// The presentation layer reads `""` as "hide this row"; it says nothing about
/// the validity of the underlying value.
pub fn gate(enabled: bool, formatted: String) -> String {
    if enabled {
        formatted
    } else {
        String::new()
    }
}

/// Named, pre-formatted values for template substitution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placeholders {
    entries: BTreeMap<String, String>,
}

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }
}

/// Substitute every `{name}` in `template`.
///
/// A placeholder without a value is an error, never passed through: templates
/// and calculators ship together, so a mismatch is a bug to catch in tests.
/// A lone `{` with no closing brace is copied literally.
pub fn fill_template(template: &str, values: &Placeholders) -> CalcResult<String> {
    let mut out = String::with_capacity(template.len() + 32);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return Ok(out);
        };
        let name = &after[..close];
        let value = values
            .get(name)
            .ok_or_else(|| CalcError::unresolved_placeholder(name))?;
        out.push_str(value);
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EN: NumberLocale = NumberLocale::EN;
    const ES: NumberLocale = NumberLocale::CONTINENTAL;

    #[test]
    fn test_currency_headline() {
        assert_eq!(format_currency(40_387.39, "$", CurrencyStyle::Headline, EN), "$40,387");
        assert_eq!(format_currency(999.5, "$", CurrencyStyle::Headline, EN), "$1,000");
        assert_eq!(format_currency(0.0, "€", CurrencyStyle::Headline, EN), "€0");
    }

    #[test]
    fn test_currency_millions() {
        assert_eq!(format_currency(1_000_000.0, "$", CurrencyStyle::Headline, EN), "$1.00M");
        assert_eq!(format_currency(12_345_678.0, "$", CurrencyStyle::Precise, EN), "$12.35M");
        assert_eq!(format_currency(2_500_000.0, "€", CurrencyStyle::Headline, ES), "€2,50M");
    }

    #[test]
    fn test_currency_precise() {
        assert_eq!(format_currency(1.917_808, "$", CurrencyStyle::Precise, EN), "$1.92");
        assert_eq!(format_currency(1234.5, "$", CurrencyStyle::Precise, ES), "$1.234,50");
    }

    #[test]
    fn test_currency_negative() {
        assert_eq!(format_currency(-1500.0, "$", CurrencyStyle::Headline, EN), "-$1,500");
        assert_eq!(format_currency(-0.2, "$", CurrencyStyle::Headline, EN), "$0");
    }

    #[test]
    fn test_number_small_strips_zeros() {
        assert_eq!(format_number(0.64, 4, EN), "0.64");
        assert_eq!(format_number(96.56064, 2, EN), "96.56");
        assert_eq!(format_number(5.0, 2, EN), "5");
        assert_eq!(format_number(39.5368, 2, ES), "39,54");
    }

    #[test]
    fn test_number_large_grouped() {
        assert_eq!(format_number(16_000.0, 4, EN), "16,000");
        assert_eq!(format_number(1_234_567.891, 4, EN), "1,234,567.89");
        assert_eq!(format_number(1234.5, 2, ES), "1.234,5");
        assert_eq!(format_number(-2500.25, 2, EN), "-2,500.25");
    }

    #[test]
    fn test_number_non_finite() {
        assert_eq!(format_number(f64::INFINITY, 2, EN), "N/A");
        assert_eq!(format_currency(f64::NAN, "$", CurrencyStyle::Headline, EN), "N/A");
    }

    #[test]
    fn test_integer_and_percent() {
        assert_eq!(format_integer(2345.6, EN), "2,346");
        assert_eq!(format_percent(7.0, 2, EN), "7%");
        assert_eq!(format_percent(4.5, 2, ES), "4,5%");
        assert_eq!(format_percent(7.229, 2, EN), "7.23%");
    }

    #[test]
    fn test_locale_lookup() {
        assert_eq!(NumberLocale::for_locale("es-MX"), ES);
        assert_eq!(NumberLocale::for_locale("en-GB"), EN);
        assert_eq!(NumberLocale::for_locale("xx"), EN);
    }

    #[test]
    fn test_fill_template() {
        let p = Placeholders::new().set("initial", "$10,000").set("rate", "7%");
        let s = fill_template("Invest {initial} at {rate}.", &p).unwrap();
        assert_eq!(s, "Invest $10,000 at 7%.");
    }

    #[test]
    fn test_fill_template_unresolved() {
        let p = Placeholders::new().set("initial", "$10,000");
        let err = fill_template("Invest {initial} at {rate}.", &p).unwrap_err();
        assert_eq!(err, CalcError::unresolved_placeholder("rate"));
    }

    #[test]
    fn test_fill_template_literal_brace() {
        let p = Placeholders::new().set("a", "1");
        assert_eq!(fill_template("{a} {", &p).unwrap(), "1 {");
    }

    #[test]
    fn test_gate() {
        assert_eq!(gate(false, "1,650 kcal".to_string()), "");
        assert_eq!(gate(true, "1,650 kcal".to_string()), "1,650 kcal");
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(40_387.394, 2), 40_387.39);
        assert_eq!(round_to(2.5, 0), 3.0);
    }
}
