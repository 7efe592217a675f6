//! Per-call evaluation context: the resolved translation bundle, number
//! locale, currency selection and engine limits a calculator formats with.

use crate::config::CalculatorConfig;
use crate::errors::CalcResult;
use crate::format::{self, CurrencyStyle, NumberLocale, Placeholders};
use crate::i18n::TranslationBundle;
use crate::resolver::CalculationRequest;
use crate::settings::EngineSettings;
use crate::units::{self, UnitFamily, DEFAULT_CURRENCY};

/// Everything a compute function needs besides the resolved values.
#[derive(Debug, Clone)]
pub struct EvalContext<'a> {
    pub config: &'a CalculatorConfig,
    pub request: &'a CalculationRequest,
    pub bundle: TranslationBundle,
    pub locale: NumberLocale,
    pub settings: &'a EngineSettings,
}

impl<'a> EvalContext<'a> {
    pub fn new(
        config: &'a CalculatorConfig,
        request: &'a CalculationRequest,
        bundle: TranslationBundle,
        locale_code: &str,
        settings: &'a EngineSettings,
    ) -> Self {
        EvalContext {
            config,
            request,
            bundle,
            locale: NumberLocale::for_locale(locale_code),
            settings,
        }
    }

    /// Display unit picked for a field, or its configured default.
    pub fn unit_of(&self, field: &str) -> &str {
        self.config
            .input_spec(field)
            .and_then(|spec| self.request.unit_for(spec))
            .unwrap_or("")
    }

    /// Currency glyph for a money field
    pub fn currency_symbol(&self, field: &str) -> &'static str {
        let code = match self.unit_of(field) {
            "" => DEFAULT_CURRENCY,
            code => code,
        };
        units::currency_symbol(code)
    }

    /// Convert a base-unit value back to the unit the user picked for `field`.
    pub fn display_value(&self, field: &str, family: UnitFamily, base: f64) -> CalcResult<f64> {
        match self.unit_of(field) {
            "" => Ok(base),
            unit => units::from_base(base, unit, family),
        }
    }

    /// Glossary word
    pub fn label<'b>(&'b self, key: &'b str) -> &'b str {
        self.bundle.label(key)
    }

    /// Whole-unit money string
    pub fn money(&self, value: f64, symbol: &str) -> String {
        self.or_na(value, || format::format_currency(value, symbol, CurrencyStyle::Headline, self.locale))
    }

    /// Two-decimal money string
    pub fn money_precise(&self, value: f64, symbol: &str) -> String {
        self.or_na(value, || format::format_currency(value, symbol, CurrencyStyle::Precise, self.locale))
    }

    pub fn number(&self, value: f64, decimals: usize) -> String {
        self.or_na(value, || format::format_number(value, decimals, self.locale))
    }

    pub fn integer(&self, value: f64) -> String {
        self.or_na(value, || format::format_integer(value, self.locale))
    }

    pub fn percent(&self, value_pct: f64, decimals: usize) -> String {
        self.or_na(value_pct, || format::format_percent(value_pct, decimals, self.locale))
    }

    /// Number followed by the localized label of `unit`, singular when the
    /// displayed number is exactly one
    pub fn quantity(&self, value: f64, decimals: usize, unit: &str) -> String {
        let shown = format::round_to(value, u32::try_from(decimals).unwrap_or(u32::MAX));
        format::with_unit(&self.number(value, decimals), self.bundle.counted_label(unit, shown))
    }

    fn or_na(&self, value: f64, render: impl FnOnce() -> String) -> String {
        if value.is_finite() {
            render()
        } else {
            self.bundle.not_applicable().to_string()
        }
    }

    /// Fill a named template from the bundle's `formats`.
    pub fn fill(&self, template: &str, values: &Placeholders) -> CalcResult<String> {
        format::fill_template(self.bundle.template(template)?, values)
    }

    /// Fill the summary template.
    pub fn summary(&self, values: &Placeholders) -> CalcResult<String> {
        self.fill("summary", values)
    }

    /// Years sampled for a yearly chart: every year when they fit, otherwise an
    /// even stride, always ending on the final year.
    pub fn chart_years(&self, total_years: u32) -> Vec<u32> {
        sample_points(total_years, self.settings.max_chart_points)
    }

    /// Rows kept for a per-period table
    pub fn table_rows(&self, total: u32) -> u32 {
        total.min(u32::try_from(self.settings.max_table_rows).unwrap_or(u32::MAX))
    }
}

/// Points `1..=total` thinned to at most `max_points`, last point included.
pub fn sample_points(total: u32, max_points: usize) -> Vec<u32> {
    let max_points = u32::try_from(max_points.max(2)).unwrap_or(u32::MAX);
    if total <= max_points {
        return (1..=total).collect();
    }
    let step = total.div_ceil(max_points - 1);
    let mut points: Vec<u32> = (step..=total).step_by(step as usize).collect();
    if points.last() != Some(&total) {
        points.push(total);
    }
    points
}
