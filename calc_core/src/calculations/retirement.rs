//! # Retirement Calculator
//!
//! Accumulation until retirement age (closed form, monthly compounding), then
//! a drawdown simulation with fixed monthly withdrawals until the savings run
//! out or the declared age bound is hit.
//!
//! ## Outputs
//!
//! - Savings at retirement and the inflation-adjusted equivalent (gated)
//! - How long the savings last and the age they run out
//! - The level monthly withdrawal that empties the account exactly at life
//!   expectancy: `PV·i / (1 − (1 + i)^−N)`, `PV/N` at zero return

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::context::EvalContext;
use crate::config::{
    CalculatorConfig, Category, ChartKind, ChartSpec, DetailedTableSpec, InputSpec, Preset, ResultKind, ResultSpec,
};
use crate::equations::growth::{self, PaymentTiming};
use crate::equations::simulation::{simulate, Goal, SimulationOutcome};
use crate::errors::CalcResult;
use crate::format::{gate, Placeholders};
use crate::resolver::ValuesMap;
use crate::results::{chart_record, table_record, CalculatorResults, ResultsBuilder};
use crate::units::UnitFamily;

pub const SLUG: &str = "retirement";

const CURRENCIES: &[&str] = &["USD", "EUR", "GBP", "MXN", "CRC", "NIO", "COP", "BRL"];

/// Fallback age bound when the config declares none
const DEFAULT_MAX_AGE: f64 = 110.0;

pub fn config() -> CalculatorConfig {
    let updated = NaiveDate::from_ymd_opt(2025, 4, 2).unwrap_or_default();
    CalculatorConfig::new(SLUG, Category::Financial, updated)
        .input(InputSpec::stepper("current_age", 30.0).range(18.0, 80.0).with_step(1.0).strict())
        .input(InputSpec::stepper("retirement_age", 65.0).range(40.0, 85.0).with_step(1.0).strict())
        .input(InputSpec::stepper("life_expectancy", 90.0).range(60.0, 110.0).with_step(1.0).strict())
        .input(
            InputSpec::number("current_savings", 50_000.0)
                .range(0.0, 100_000_000.0)
                .with_units(UnitFamily::Currency, "USD", CURRENCIES),
        )
        .input(
            InputSpec::number("monthly_contribution", 500.0)
                .range(0.0, 1_000_000.0)
                .with_units(UnitFamily::Currency, "USD", CURRENCIES),
        )
        .input(InputSpec::slider("annual_return", 6.0).range(0.0, 15.0).with_step(0.1))
        .input(InputSpec::slider("retirement_return", 4.0).range(0.0, 15.0).with_step(0.1))
        .input(
            InputSpec::number("monthly_withdrawal", 3_000.0)
                .range(0.0, 1_000_000.0)
                .with_units(UnitFamily::Currency, "USD", CURRENCIES),
        )
        .input(InputSpec::toggle("include_inflation", false))
        .input(InputSpec::number("inflation_rate", 2.5).range(0.0, 20.0).show_when("include_inflation", true))
        .result(ResultSpec::new("savingsAtRetirement", ResultKind::Currency).primary())
        .result(ResultSpec::new("totalContributions", ResultKind::Currency))
        .result(ResultSpec::new("investmentGrowth", ResultKind::Currency))
        .result(ResultSpec::new("yearsFundsLast", ResultKind::Duration).decimals(1))
        .result(ResultSpec::new("depletionAge", ResultKind::Number).decimals(1))
        .result(ResultSpec::new("fundsOutlastLife", ResultKind::Text))
        .result(ResultSpec::new("sustainableWithdrawal", ResultKind::Currency))
        .result(ResultSpec::new("inflationAdjustedSavings", ResultKind::Currency).gated_by("include_inflation"))
        .preset(
            Preset::new("late-starter", "presets.lateStarter")
                .set("current_age", 45.0)
                .set("current_savings", 20_000.0)
                .set("monthly_contribution", 1_200.0),
        )
        .preset(
            Preset::new("early-retirement", "presets.earlyRetirement")
                .set("current_age", 25.0)
                .set("retirement_age", 50.0)
                .set("monthly_contribution", 1_500.0)
                .set("annual_return", 7.0),
        )
        .chart(ChartSpec::new(ChartKind::Line, "age", &["balance"]))
        .table(DetailedTableSpec::new(&["age", "phase", "balance"]))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementInput {
    pub current_age: f64,
    pub retirement_age: f64,
    pub life_expectancy: f64,
    pub savings: f64,
    pub monthly_contribution: f64,
    pub return_pct: f64,
    pub retirement_return_pct: f64,
    pub withdrawal: f64,
    pub include_inflation: bool,
    pub inflation_pct: f64,
}

impl RetirementInput {
    pub fn from_values(values: &ValuesMap) -> Option<Self> {
        Some(RetirementInput {
            current_age: values.number("current_age")?,
            retirement_age: values.number("retirement_age")?,
            life_expectancy: values.number("life_expectancy")?,
            savings: values.number_or("current_savings", 0.0),
            monthly_contribution: values.number_or("monthly_contribution", 0.0),
            return_pct: values.number("annual_return")?,
            retirement_return_pct: values.number("retirement_return")?,
            withdrawal: values.number_or("monthly_withdrawal", 0.0),
            include_inflation: values.flag("include_inflation"),
            inflation_pct: values.number_or("inflation_rate", 0.0),
        })
    }

    pub fn is_viable(&self) -> bool {
        self.current_age >= 0.0
            && self.current_age < self.retirement_age
            && self.retirement_age < self.life_expectancy
            && self.savings >= 0.0
            && self.monthly_contribution >= 0.0
            && self.return_pct >= 0.0
            && self.retirement_return_pct >= 0.0
            && self.withdrawal >= 0.0
            && self.inflation_pct > -100.0
    }

    pub fn years_to_retirement(&self) -> f64 {
        self.retirement_age - self.current_age
    }

    /// Balance `t` years into the accumulation phase
    pub fn accumulated_at(&self, t: f64) -> f64 {
        let r = self.return_pct / 100.0;
        growth::fv_lump_sum(self.savings, r, 12.0, t)
            + growth::fv_annuity(self.monthly_contribution, r, 12.0, t, PaymentTiming::End)
    }

    /// Run withdrawals from `start` until empty or until `max_age`
    pub fn drawdown(&self, start: f64, max_age: f64) -> SimulationOutcome {
        let cap_months = ((max_age - self.retirement_age).max(0.0) * 12.0).round() as u32;
        let i = self.retirement_return_pct / 100.0 / 12.0;
        simulate(start, i, -self.withdrawal, Goal::Exhaust, cap_months)
    }

    /// Level withdrawal that lasts exactly until life expectancy
    pub fn sustainable_withdrawal(&self, start: f64) -> f64 {
        let months = (self.life_expectancy - self.retirement_age) * 12.0;
        growth::annuity_payment(start, self.retirement_return_pct / 100.0 / 12.0, months)
    }
}

pub fn is_viable(values: &ValuesMap) -> bool {
    RetirementInput::from_values(values).is_some_and(|input| input.is_viable())
}

pub fn calculate(values: &ValuesMap, ctx: &EvalContext) -> CalcResult<CalculatorResults> {
    let Some(input) = RetirementInput::from_values(values).filter(RetirementInput::is_viable) else {
        return Ok(CalculatorResults::invalid());
    };

    let years_saving = input.years_to_retirement();
    let at_retirement = input.accumulated_at(years_saving);
    let contributions = input.savings + input.monthly_contribution * 12.0 * years_saving;
    let growth_amount = at_retirement - contributions;
    let real_value = growth::inflation_adjusted(at_retirement, input.inflation_pct / 100.0, years_saving);
    let sustainable = input.sustainable_withdrawal(at_retirement);

    let max_age = ctx.config.max_of("life_expectancy").unwrap_or(DEFAULT_MAX_AGE);
    let drawdown = input.drawdown(at_retirement, max_age);
    let depletion_age = input.retirement_age + drawdown.years();
    let outlasts_life = !drawdown.reached || depletion_age >= input.life_expectancy;

    let sym = ctx.currency_symbol("current_savings");

    let mut builder = ResultsBuilder::new()
        .entry("savingsAtRetirement", at_retirement, 2, ctx.money(at_retirement, sym))
        .entry("totalContributions", contributions, 2, ctx.money(contributions, sym))
        .entry("investmentGrowth", growth_amount, 2, ctx.money(growth_amount, sym))
        .entry("sustainableWithdrawal", sustainable, 2, ctx.money(sustainable, sym))
        .entry(
            "inflationAdjustedSavings",
            real_value,
            2,
            gate(input.include_inflation, ctx.money(real_value, sym)),
        )
        .value("fundsOutlastLife", if outlasts_life { 1.0 } else { 0.0 })
        .formatted("fundsOutlastLife", ctx.label(if outlasts_life { "yes" } else { "no" }));

    let common = Placeholders::new()
        .set("withdrawal", ctx.money(input.withdrawal, sym))
        .set("lifeExpectancy", ctx.number(input.life_expectancy, 0));

    let drawdown_sentence = if drawdown.reached {
        let lasts = drawdown.years();
        builder = builder
            .entry("yearsFundsLast", lasts, 1, ctx.quantity(lasts, 1, "years"))
            .entry("depletionAge", depletion_age, 1, ctx.number(depletion_age, 1));
        ctx.fill("fundsLast", &common.set("depletionAge", ctx.number(depletion_age, 1)))?
    } else {
        let na = ctx.bundle.not_applicable();
        builder = builder.formatted("yearsFundsLast", na).formatted("depletionAge", na);
        ctx.fill("fundsOutlast", &common)?
    };

    // accumulation years, then drawdown years up to depletion or the age bound
    let mut timeline: Vec<(f64, &str, f64)> = (1..=years_saving.ceil() as u32)
        .map(|y| {
            let t = f64::from(y).min(years_saving);
            (input.current_age + t, "accumulation", input.accumulated_at(t))
        })
        .collect();
    timeline.extend(drawdown.yearly_balances.iter().enumerate().map(|(k, balance)| {
        let age = (input.retirement_age + (k as f64 + 1.0)).min(depletion_age);
        (age, "drawdown", *balance)
    }));
    timeline.retain(|(age, _, _)| *age <= max_age);

    let chart = ctx
        .chart_years(timeline.len() as u32)
        .into_iter()
        .filter_map(|p| timeline.get(p as usize - 1))
        .map(|(age, _, balance)| chart_record([("age", round1(*age)), ("balance", round2(*balance))]))
        .collect();

    let table = timeline
        .iter()
        .take(ctx.table_rows(timeline.len() as u32) as usize)
        .map(|(age, phase, balance)| {
            table_record([
                ("age", ctx.number(*age, 1)),
                ("phase", ctx.label(phase).to_string()),
                ("balance", ctx.money(*balance, sym)),
            ])
        })
        .collect();

    let placeholders = Placeholders::new()
        .set("monthly", ctx.money(input.monthly_contribution, sym))
        .set("currentAge", ctx.number(input.current_age, 0))
        .set("retirementAge", ctx.number(input.retirement_age, 0))
        .set("savingsAtRetirement", ctx.money(at_retirement, sym))
        .set("drawdownSentence", drawdown_sentence);

    Ok(builder
        .summary(ctx.summary(&placeholders)?)
        .chart(chart)
        .table(table)
        .build())
}

fn round1(v: f64) -> f64 {
    crate::format::round_to(v, 1)
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
        engine::calculate(CalculatorId::Retirement, &request, &EngineSettings::default()).unwrap()
    }

    fn flat_plan() -> CalculationRequest {
        CalculationRequest::new()
            .with_value("current_age", 40.0)
            .with_value("retirement_age", 60.0)
            .with_value("life_expectancy", 85.0)
            .with_value("current_savings", 0.0)
            .with_value("monthly_contribution", 1_000.0)
            .with_value("annual_return", 0.0)
            .with_value("retirement_return", 0.0)
            .with_value("monthly_withdrawal", 2_000.0)
    }

    #[test]
    fn test_zero_return_accumulation_and_drawdown() {
        let r = run(flat_plan());
        assert!(r.is_valid);
        // 240 months × 1,000
        assert_eq!(r.value("savingsAtRetirement"), Some(240_000.0));
        assert_eq!(r.value("investmentGrowth"), Some(0.0));
        // 240,000 / 2,000 = 120 months
        assert_eq!(r.value("yearsFundsLast"), Some(10.0));
        assert_eq!(r.value("depletionAge"), Some(70.0));
        assert_eq!(r.value("fundsOutlastLife"), Some(0.0));
        // 240,000 over 300 months
        assert_eq!(r.value("sustainableWithdrawal"), Some(800.0));
        assert!(r.summary.contains("70"), "{}", r.summary);
    }

    #[test]
    fn test_funds_outlast_life() {
        let r = run(flat_plan().with_value("monthly_withdrawal", 100.0));
        assert_eq!(r.value("fundsOutlastLife"), Some(1.0));
        assert_eq!(r.value("depletionAge"), None);
        assert_eq!(r.formatted("depletionAge"), Some("N/A"));
        assert_eq!(r.formatted("fundsOutlastLife"), Some("Yes"));
    }

    #[test]
    fn test_growth_increases_savings() {
        let flat = run(flat_plan());
        let growing = run(flat_plan().with_value("annual_return", 6.0));
        assert!(growing.value("savingsAtRetirement").unwrap() > flat.value("savingsAtRetirement").unwrap());
        assert!(growing.value("investmentGrowth").unwrap() > 0.0);
    }

    #[test]
    fn test_inflation_toggle() {
        let r = run(flat_plan());
        assert_eq!(r.formatted("inflationAdjustedSavings"), Some(""));
        let r = run(flat_plan().with_value("include_inflation", true).with_value("inflation_rate", 2.0));
        let expected = 240_000.0 / 1.02f64.powi(20);
        assert!((r.value("inflationAdjustedSavings").unwrap() - expected).abs() < 0.01);
    }

    #[test]
    fn test_ages_must_be_ordered() {
        assert!(!run(flat_plan().with_value("retirement_age", 35.0)).is_valid);
        assert!(!run(flat_plan().with_value("life_expectancy", 60.0)).is_valid);
    }

    #[test]
    fn test_ages_outside_bounds_are_invalid() {
        assert!(!run(flat_plan().with_value("life_expectancy", 1.0e9)).is_valid);
        assert!(!run(flat_plan().with_value("current_age", 10.0)).is_valid);
        assert!(!run(flat_plan().with_value("retirement_age", 90.0)).is_valid);
    }

    #[test]
    fn test_timeline_table() {
        let r = run(flat_plan());
        let rows = r.table_data();
        // 20 accumulation years + 10 drawdown years
        assert_eq!(rows.len(), 30);
        assert_eq!(rows[0].get("phase").map(String::as_str), Some("Saving"));
        assert_eq!(rows[29].get("balance").map(String::as_str), Some("$0"));
        assert!(r.chart_data().len() <= EngineSettings::default().max_chart_points);
    }
}
