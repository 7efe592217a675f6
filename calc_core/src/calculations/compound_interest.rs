//! # Compound Interest Calculator
//!
//! Projects a lump sum plus optional monthly contributions under periodic
//! compounding, and splits the interest into its simple part and the
//! "interest on interest" compounding adds on top.
//!
//! ## Formulas
//!
//! - FV = P(1 + r/n)^(n·t) + PMT·[((1 + r/n)^(n·t) − 1)/(r/n)]
//! - Simple = P·r·t + Σ PMT_m·r·(M − m)/12
//! - Interest on interest = (FV − contributions) − Simple
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::CalculatorId;
//! use calc_core::engine::calculate;
//! use calc_core::resolver::CalculationRequest;
//! use calc_core::settings::EngineSettings;
//!
//! let request = CalculationRequest::new()
//!     .with_value("initial_investment", 10_000.0)
//!     .with_value("monthly_contribution", 0.0)
//!     .with_value("annual_rate", 7.0)
//!     .with_value("years", 20.0);
//!
//! let result = calculate(CalculatorId::CompoundInterest, &request, &EngineSettings::default()).unwrap();
//! assert_eq!(result.formatted("futureValue"), Some("$40,387"));
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::context::EvalContext;
use crate::config::{
    CalculatorConfig, Category, ChartKind, ChartSpec, DetailedTableSpec, InputSpec, Preset, ResultKind, ResultSpec,
    SelectOption,
};
use crate::equations::growth::{self, PaymentTiming};
use crate::errors::CalcResult;
use crate::format::{gate, Placeholders};
use crate::resolver::ValuesMap;
use crate::results::{chart_record, table_record, CalculatorResults, ResultsBuilder};
use crate::units::UnitFamily;

pub const SLUG: &str = "compound-interest";

const CURRENCIES: &[&str] = &["USD", "EUR", "GBP", "MXN", "CRC", "NIO", "COP", "BRL"];

/// Static description of the form.
pub fn config() -> CalculatorConfig {
    let updated = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap_or_default();
    CalculatorConfig::new(SLUG, Category::Financial, updated)
        .input(
            InputSpec::number("initial_investment", 10_000.0)
                .range(0.0, 100_000_000.0)
                .with_step(100.0)
                .with_units(UnitFamily::Currency, "USD", CURRENCIES),
        )
        .input(
            InputSpec::number("monthly_contribution", 0.0)
                .range(0.0, 1_000_000.0)
                .with_step(10.0)
                .with_units(UnitFamily::Currency, "USD", CURRENCIES),
        )
        .input(InputSpec::slider("annual_rate", 7.0).range(0.0, 30.0).with_step(0.1))
        .input(InputSpec::stepper("years", 20.0).range(1.0, 50.0).with_step(1.0).strict())
        .input(InputSpec::select(
            "compound_frequency",
            vec![
                SelectOption::new(12.0, "frequency.monthly"),
                SelectOption::new(1.0, "frequency.annually"),
                SelectOption::new(2.0, "frequency.semiannually"),
                SelectOption::new(4.0, "frequency.quarterly"),
                SelectOption::new(365.0, "frequency.daily"),
            ],
        ))
        .input(InputSpec::radio(
            "contribution_timing",
            vec![SelectOption::new("end", "timing.end"), SelectOption::new("start", "timing.start")],
        ))
        .input(InputSpec::toggle("include_inflation", false))
        .input(InputSpec::number("inflation_rate", 3.0).range(0.0, 20.0).show_when("include_inflation", true))
        .input(InputSpec::toggle("include_tax", false))
        .input(InputSpec::number("tax_rate", 15.0).range(0.0, 60.0).show_when("include_tax", true))
        .result(ResultSpec::new("futureValue", ResultKind::Currency).primary())
        .result(ResultSpec::new("totalContributions", ResultKind::Currency))
        .result(ResultSpec::new("totalInterest", ResultKind::Currency))
        .result(ResultSpec::new("simpleInterest", ResultKind::Currency))
        .result(ResultSpec::new("interestOnInterest", ResultKind::Currency))
        .result(ResultSpec::new("effectiveRate", ResultKind::Percent).decimals(2))
        .result(ResultSpec::new("ruleOf72", ResultKind::Duration).decimals(1))
        .result(ResultSpec::new("dailyEarnings", ResultKind::Currency).decimals(2))
        .result(ResultSpec::new("inflationAdjusted", ResultKind::Currency).gated_by("include_inflation"))
        .result(ResultSpec::new("afterTax", ResultKind::Currency).gated_by("include_tax"))
        .preset(
            Preset::new("starter", "presets.starter")
                .set("initial_investment", 1_000.0)
                .set("monthly_contribution", 100.0)
                .set("annual_rate", 6.0)
                .set("years", 10.0),
        )
        .preset(
            Preset::new("long-term", "presets.longTerm")
                .set("initial_investment", 25_000.0)
                .set("monthly_contribution", 500.0)
                .set("annual_rate", 8.0)
                .set("years", 30.0)
                .set("include_inflation", true),
        )
        .chart(ChartSpec::new(
            ChartKind::StackedBar,
            "year",
            &["contributions", "principalInterest", "interestOnInterest"],
        ))
        .table(DetailedTableSpec::new(&["year", "contributions", "interest", "balance"]))
}

/// Typed view of the resolved values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundInterestInput {
    pub principal: f64,
    pub monthly: f64,
    pub rate_pct: f64,
    pub years: f64,
    pub periods_per_year: f64,
    pub timing: PaymentTiming,
    pub include_inflation: bool,
    pub inflation_pct: f64,
    pub include_tax: bool,
    pub tax_pct: f64,
}

impl CompoundInterestInput {
    pub fn from_values(values: &ValuesMap) -> Option<Self> {
        Some(CompoundInterestInput {
            principal: values.number("initial_investment")?,
            monthly: values.number_or("monthly_contribution", 0.0),
            rate_pct: values.number("annual_rate")?,
            years: values.number("years")?,
            periods_per_year: values.number("compound_frequency")?,
            timing: PaymentTiming::from_code(values.text("contribution_timing").unwrap_or("end")),
            include_inflation: values.flag("include_inflation"),
            inflation_pct: values.number_or("inflation_rate", 0.0),
            include_tax: values.flag("include_tax"),
            tax_pct: values.number_or("tax_rate", 0.0),
        })
    }

    /// Inputs a projection can be computed for
    pub fn is_viable(&self) -> bool {
        self.principal >= 0.0
            && self.monthly >= 0.0
            && self.principal + self.monthly > 0.0
            && self.rate_pct >= 0.0
            && self.years > 0.0
            && self.periods_per_year > 0.0
            && self.inflation_pct > -100.0
    }

    fn rate(&self) -> f64 {
        self.rate_pct / 100.0
    }

    fn payment_per_period(&self) -> f64 {
        growth::per_period_payment(self.monthly, self.periods_per_year)
    }

    /// Projected balance after `t` years
    pub fn balance_at(&self, t: f64) -> f64 {
        let (r, n) = (self.rate(), self.periods_per_year);
        growth::fv_lump_sum(self.principal, r, n, t) + growth::fv_annuity(self.payment_per_period(), r, n, t, self.timing)
    }

    /// Money put in by year `t`
    pub fn contributions_at(&self, t: f64) -> f64 {
        self.principal + self.monthly * 12.0 * t
    }

    /// Simple-interest counterfactual at year `t`
    pub fn simple_interest_at(&self, t: f64) -> f64 {
        let months = (t * 12.0).round() as u32;
        growth::simple_interest(self.principal, self.rate(), t)
            + growth::simple_interest_on_deposits(self.monthly, self.rate(), months, self.timing)
    }
}

pub fn is_viable(values: &ValuesMap) -> bool {
    CompoundInterestInput::from_values(values).is_some_and(|input| input.is_viable())
}

pub fn calculate(values: &ValuesMap, ctx: &EvalContext) -> CalcResult<CalculatorResults> {
    let Some(input) = CompoundInterestInput::from_values(values).filter(CompoundInterestInput::is_viable) else {
        return Ok(CalculatorResults::invalid());
    };

    let t = input.years;
    let future_value = input.balance_at(t);
    let contributions = input.contributions_at(t);
    let total_interest = future_value - contributions;
    let simple = input.simple_interest_at(t);
    let interest_on_interest = total_interest - simple;

    let effective_pct = growth::effective_annual_rate(input.rate(), input.periods_per_year) * 100.0;
    let doubling = growth::rule_of_72(input.rate_pct);
    let daily = growth::daily_earnings(input.principal, input.rate());
    let real_value = growth::inflation_adjusted(future_value, input.inflation_pct / 100.0, t);
    let after_tax = growth::after_tax(future_value, total_interest, input.tax_pct / 100.0);

    let sym = ctx.currency_symbol("initial_investment");

    let mut builder = ResultsBuilder::new()
        .entry("futureValue", future_value, 2, ctx.money(future_value, sym))
        .entry("totalContributions", contributions, 2, ctx.money(contributions, sym))
        .entry("totalInterest", total_interest, 2, ctx.money(total_interest, sym))
        .entry("simpleInterest", simple, 2, ctx.money(simple, sym))
        .entry("interestOnInterest", interest_on_interest, 2, ctx.money(interest_on_interest, sym))
        .entry("effectiveRate", effective_pct, 4, ctx.percent(effective_pct, 2))
        .value("dailyEarnings", daily)
        .formatted("dailyEarnings", ctx.money_precise(daily, sym))
        .entry("inflationAdjusted", real_value, 2, gate(input.include_inflation, ctx.money(real_value, sym)))
        .entry("afterTax", after_tax, 2, gate(input.include_tax, ctx.money(after_tax, sym)));

    builder = match doubling {
        Some(years) => builder.entry("ruleOf72", years, 1, ctx.quantity(years, 1, "years")),
        None => builder.formatted("ruleOf72", ctx.bundle.not_applicable()),
    };

    let whole_years = t.ceil() as u32;
    let chart = ctx
        .chart_years(whole_years)
        .into_iter()
        .map(|y| {
            let at = f64::from(y).min(t);
            let paid = input.contributions_at(at);
            let simple_at = input.simple_interest_at(at);
            let balance = input.balance_at(at);
            chart_record([
                ("year", f64::from(y)),
                ("contributions", round2(paid)),
                ("principalInterest", round2(simple_at)),
                ("interestOnInterest", round2(balance - paid - simple_at)),
            ])
        })
        .collect();

    let table = (1..=ctx.table_rows(whole_years))
        .map(|y| {
            let at = f64::from(y).min(t);
            let paid = input.contributions_at(at);
            let balance = input.balance_at(at);
            table_record([
                ("year", y.to_string()),
                ("contributions", ctx.money(paid, sym)),
                ("interest", ctx.money(balance - paid, sym)),
                ("balance", ctx.money(balance, sym)),
            ])
        })
        .collect();

    let placeholders = Placeholders::new()
        .set("initial", ctx.money(input.principal, sym))
        .set("monthly", ctx.money(input.monthly, sym))
        .set("rate", ctx.percent(input.rate_pct, 2))
        .set("years", ctx.number(t, 1))
        .set("futureValue", ctx.money(future_value, sym))
        .set("totalInterest", ctx.money(total_interest, sym))
        .set("interestOnInterest", ctx.money(interest_on_interest, sym));

    Ok(builder
        .summary(ctx.summary(&placeholders)?)
        .chart(chart)
        .table(table)
        .build())
}

fn round2(v: f64) -> f64 {
    crate::format::round_to(v, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::CalculatorId;
    use crate::engine;
    use crate::resolver::CalculationRequest;
    use crate::settings::EngineSettings;

    fn run(request: CalculationRequest) -> CalculatorResults {
        engine::calculate(CalculatorId::CompoundInterest, &request, &EngineSettings::default()).unwrap()
    }

    fn base_request() -> CalculationRequest {
        CalculationRequest::new()
            .with_value("initial_investment", 10_000.0)
            .with_value("monthly_contribution", 0.0)
            .with_value("annual_rate", 7.0)
            .with_value("years", 20.0)
            .with_value("compound_frequency", 12.0)
    }

    #[test]
    fn test_lump_sum_scenario() {
        let r = run(base_request());
        assert!(r.is_valid);
        assert!((r.value("futureValue").unwrap() - 40_387.39).abs() < 0.5);
        assert!((r.value("totalInterest").unwrap() - 30_387.39).abs() < 0.5);
        assert_eq!(r.value("simpleInterest"), Some(14_000.0));
        assert!((r.value("interestOnInterest").unwrap() - 16_387.39).abs() < 0.5);
        assert_eq!(r.formatted("futureValue"), Some("$40,387"));
        assert_eq!(r.formatted("totalInterest"), Some("$30,387"));
        assert_eq!(r.formatted("simpleInterest"), Some("$14,000"));
        assert_eq!(r.formatted("interestOnInterest"), Some("$16,387"));
        assert_eq!(r.formatted("effectiveRate"), Some("7.23%"));
        assert_eq!(r.value("ruleOf72"), Some(10.3));
    }

    #[test]
    fn test_daily_earnings_on_principal() {
        let r = run(base_request());
        assert!((r.value("dailyEarnings").unwrap() - 1.917_808).abs() < 1e-6);
        assert_eq!(r.formatted("dailyEarnings"), Some("$1.92"));
    }

    #[test]
    fn test_horizon_outside_bounds_is_invalid() {
        for years in [0.5, 51.0, 1.0e9] {
            let r = run(base_request().with_value("years", years).with_value("monthly_contribution", 10.0));
            assert_eq!(r, CalculatorResults::invalid(), "years = {}", years);
        }
        let r = run(base_request().with_value("years", 50.0).with_value("monthly_contribution", 10.0));
        assert!(r.is_valid);
    }

    #[test]
    fn test_summary_mentions_headline_numbers() {
        let r = run(base_request());
        assert!(r.summary.contains("$10,000"), "{}", r.summary);
        assert!(r.summary.contains("$40,387"), "{}", r.summary);
    }

    #[test]
    fn test_chart_and_table_shape() {
        let r = run(base_request());
        let spec = config().chart.unwrap();
        let mut keys = spec.keys();
        keys.sort_unstable();
        for record in r.chart_data() {
            let mut got: Vec<&str> = record.keys().map(String::as_str).collect();
            got.sort_unstable();
            assert_eq!(got, keys);
        }
        assert_eq!(r.chart_data().len(), 20);
        assert_eq!(r.table_data().len(), 20);
        let last = r.table_data().last().unwrap();
        assert_eq!(last.get("balance").map(String::as_str), Some("$40,387"));
    }

    #[test]
    fn test_stacked_chart_sums_to_balance() {
        let r = run(base_request().with_value("monthly_contribution", 150.0));
        let last = r.chart_data().last().unwrap();
        let stacked = last["contributions"] + last["principalInterest"] + last["interestOnInterest"];
        assert!((stacked - r.value("futureValue").unwrap()).abs() < 0.05);
    }

    #[test]
    fn test_zero_rate() {
        let r = run(base_request().with_value("annual_rate", 0.0).with_value("monthly_contribution", 100.0));
        assert!(r.is_valid);
        assert_eq!(r.value("futureValue"), Some(10_000.0 + 100.0 * 240.0));
        assert_eq!(r.value("totalInterest"), Some(0.0));
        assert_eq!(r.value("ruleOf72"), None);
        assert_eq!(r.formatted("ruleOf72"), Some("N/A"));
    }

    #[test]
    fn test_gated_results_empty_when_toggles_off() {
        let r = run(base_request());
        assert_eq!(r.formatted("inflationAdjusted"), Some(""));
        assert_eq!(r.formatted("afterTax"), Some(""));
        assert!(r.value("afterTax").is_some());

        let r = run(base_request().with_value("include_tax", true).with_value("tax_rate", 20.0));
        let expected = 40_387.39 - 30_387.39 * 0.2;
        assert!((r.value("afterTax").unwrap() - expected).abs() < 0.5);
        assert_ne!(r.formatted("afterTax"), Some(""));
    }

    #[test]
    fn test_inflation_adjustment() {
        let r = run(base_request().with_value("include_inflation", true).with_value("inflation_rate", 3.0));
        let expected = 40_387.39 / 1.03f64.powi(20);
        assert!((r.value("inflationAdjusted").unwrap() - expected).abs() < 0.5);
    }

    #[test]
    fn test_invalid_when_nothing_invested() {
        let r = run(base_request().with_value("initial_investment", 0.0));
        assert_eq!(r, CalculatorResults::invalid());
        let r = run(base_request().with_value("annual_rate", -1.0));
        assert!(!r.is_valid);
    }

    #[test]
    fn test_annuity_due_earns_more() {
        let end = run(base_request().with_value("monthly_contribution", 200.0));
        let start = run(
            base_request()
                .with_value("monthly_contribution", 200.0)
                .with_value("contribution_timing", "start"),
        );
        assert!(start.value("futureValue").unwrap() > end.value("futureValue").unwrap());
        assert!(start.value("simpleInterest").unwrap() > end.value("simpleInterest").unwrap());
    }

    #[test]
    fn test_spanish_formatting() {
        let r = run(base_request().with_locale("es").with_unit("initial_investment", "EUR"));
        assert_eq!(r.formatted("futureValue"), Some("€40.387"));
        assert_eq!(r.formatted("effectiveRate"), Some("7,23%"));
    }

    #[test]
    fn test_presets_apply() {
        let r = run(CalculationRequest::new().with_preset("starter"));
        assert!(r.is_valid);
        assert_eq!(r.value("totalContributions"), Some(1_000.0 + 100.0 * 120.0));
    }
}
