//! # Savings Goal Calculator
//!
//! Two questions about one savings plan: what the balance is worth at the end
//! of the horizon (closed form), and how long it takes to reach a target
//! amount (month-by-month simulation).
//!
//! The simulation cap is the declared maximum of the `years` input, so a goal
//! the form's own horizon cannot reach is reported as not reached instead of
//! looping.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::context::EvalContext;
use crate::config::{
    CalculatorConfig, Category, ChartKind, ChartSpec, DetailedTableSpec, InputSpec, Preset, ResultKind, ResultSpec,
    SelectOption,
};
use crate::equations::growth::{self, PaymentTiming};
use crate::equations::simulation::{simulate, Goal, SimulationOutcome};
use crate::errors::CalcResult;
use crate::format::Placeholders;
use crate::resolver::ValuesMap;
use crate::results::{chart_record, table_record, CalculatorResults, ResultsBuilder};
use crate::units::UnitFamily;

pub const SLUG: &str = "savings-goal";

const CURRENCIES: &[&str] = &["USD", "EUR", "GBP", "MXN", "CRC", "NIO", "COP", "BRL"];

/// Fallback horizon bound when the config declares none
const DEFAULT_MAX_YEARS: f64 = 50.0;

pub fn config() -> CalculatorConfig {
    let updated = NaiveDate::from_ymd_opt(2025, 2, 14).unwrap_or_default();
    CalculatorConfig::new(SLUG, Category::Financial, updated)
        .input(
            InputSpec::number("initial_deposit", 5_000.0)
                .range(0.0, 10_000_000.0)
                .with_units(UnitFamily::Currency, "USD", CURRENCIES),
        )
        .input(
            InputSpec::number("monthly_contribution", 200.0)
                .range(0.0, 100_000.0)
                .with_units(UnitFamily::Currency, "USD", CURRENCIES),
        )
        .input(InputSpec::slider("annual_rate", 4.5).range(0.0, 20.0).with_step(0.1))
        .input(InputSpec::stepper("years", 10.0).range(1.0, 50.0).with_step(1.0).strict())
        .input(
            InputSpec::number("savings_goal", 20_000.0)
                .range(0.0, 100_000_000.0)
                .with_units(UnitFamily::Currency, "USD", CURRENCIES),
        )
        .input(InputSpec::select(
            "compound_frequency",
            vec![
                SelectOption::new(12.0, "frequency.monthly"),
                SelectOption::new(4.0, "frequency.quarterly"),
                SelectOption::new(1.0, "frequency.annually"),
            ],
        ))
        .input(InputSpec::radio(
            "contribution_timing",
            vec![SelectOption::new("end", "timing.end"), SelectOption::new("start", "timing.start")],
        ))
        .result(ResultSpec::new("futureValue", ResultKind::Currency).primary())
        .result(ResultSpec::new("totalContributions", ResultKind::Currency))
        .result(ResultSpec::new("totalInterest", ResultKind::Currency))
        .result(ResultSpec::new("monthsToGoal", ResultKind::Number))
        .result(ResultSpec::new("yearsToGoal", ResultKind::Duration).decimals(1))
        .result(ResultSpec::new("goalReached", ResultKind::Text))
        .result(ResultSpec::new("balanceAtGoal", ResultKind::Currency))
        .result(ResultSpec::new("shortfall", ResultKind::Currency))
        .preset(
            Preset::new("emergency-fund", "presets.emergencyFund")
                .set("initial_deposit", 1_000.0)
                .set("monthly_contribution", 300.0)
                .set("savings_goal", 10_000.0)
                .set("years", 3.0),
        )
        .preset(
            Preset::new("house-deposit", "presets.houseDeposit")
                .set("initial_deposit", 10_000.0)
                .set("monthly_contribution", 800.0)
                .set("savings_goal", 60_000.0)
                .set("years", 5.0),
        )
        .chart(ChartSpec::new(ChartKind::Area, "year", &["balance", "contributions", "goal"]))
        .table(DetailedTableSpec::new(&["year", "contributions", "interest", "balance"]))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoalInput {
    pub initial: f64,
    pub monthly: f64,
    pub rate_pct: f64,
    pub years: f64,
    pub goal: f64,
    pub periods_per_year: f64,
    pub timing: PaymentTiming,
}

impl SavingsGoalInput {
    pub fn from_values(values: &ValuesMap) -> Option<Self> {
        Some(SavingsGoalInput {
            initial: values.number_or("initial_deposit", 0.0),
            monthly: values.number_or("monthly_contribution", 0.0),
            rate_pct: values.number("annual_rate")?,
            years: values.number("years")?,
            goal: values.number("savings_goal")?,
            periods_per_year: values.number_or("compound_frequency", 12.0),
            timing: PaymentTiming::from_code(values.text("contribution_timing").unwrap_or("end")),
        })
    }

    pub fn is_viable(&self) -> bool {
        self.initial >= 0.0
            && self.monthly >= 0.0
            && self.initial + self.monthly > 0.0
            && self.rate_pct >= 0.0
            && self.years > 0.0
            && self.goal > 0.0
            && self.periods_per_year > 0.0
    }

    fn rate(&self) -> f64 {
        self.rate_pct / 100.0
    }

    pub fn balance_at(&self, t: f64) -> f64 {
        let (r, n) = (self.rate(), self.periods_per_year);
        let pmt = growth::per_period_payment(self.monthly, n);
        growth::fv_lump_sum(self.initial, r, n, t) + growth::fv_annuity(pmt, r, n, t, self.timing)
    }

    pub fn contributions_at(&self, t: f64) -> f64 {
        self.initial + self.monthly * 12.0 * t
    }

    /// Monthly rate equivalent to `r/n` compounded `n` times a year
    fn monthly_rate(&self) -> f64 {
        (1.0 + self.rate() / self.periods_per_year).powf(self.periods_per_year / 12.0) - 1.0
    }

    /// Months until the goal, capped at `cap_months`.
    ///
    /// A start-of-month deposit earns one month of interest before the next
    /// step, so it enters the loop grown by one month.
    pub fn seek_goal(&self, cap_months: u32) -> SimulationOutcome {
        let i = self.monthly_rate();
        let flow = match self.timing {
            PaymentTiming::End => self.monthly,
            PaymentTiming::Start => self.monthly * (1.0 + i),
        };
        simulate(self.initial, i, flow, Goal::ReachAtLeast(self.goal), cap_months)
    }
}

pub fn is_viable(values: &ValuesMap) -> bool {
    SavingsGoalInput::from_values(values).is_some_and(|input| input.is_viable())
}

pub fn calculate(values: &ValuesMap, ctx: &EvalContext) -> CalcResult<CalculatorResults> {
    let Some(input) = SavingsGoalInput::from_values(values).filter(SavingsGoalInput::is_viable) else {
        return Ok(CalculatorResults::invalid());
    };

    let t = input.years;
    let future_value = input.balance_at(t);
    let contributions = input.contributions_at(t);
    let interest = future_value - contributions;

    let max_years = ctx.config.max_of("years").unwrap_or(DEFAULT_MAX_YEARS);
    let cap_months = (max_years * 12.0).round() as u32;
    let outcome = input.seek_goal(cap_months);
    let shortfall = (input.goal - future_value).max(0.0);

    let sym = ctx.currency_symbol("initial_deposit");

    let mut builder = ResultsBuilder::new()
        .entry("futureValue", future_value, 2, ctx.money(future_value, sym))
        .entry("totalContributions", contributions, 2, ctx.money(contributions, sym))
        .entry("totalInterest", interest, 2, ctx.money(interest, sym))
        .entry("shortfall", shortfall, 2, ctx.money(shortfall, sym))
        .value("goalReached", if outcome.reached { 1.0 } else { 0.0 })
        .formatted("goalReached", ctx.label(if outcome.reached { "yes" } else { "no" }));

    let goal_sentence = if outcome.reached {
        let time = ctx.quantity(outcome.years(), 1, "years");
        builder = builder
            .entry("monthsToGoal", f64::from(outcome.months), 0, ctx.integer(f64::from(outcome.months)))
            .entry("yearsToGoal", outcome.years(), 1, time.clone())
            .entry("balanceAtGoal", outcome.final_balance, 2, ctx.money(outcome.final_balance, sym));
        ctx.fill(
            "goalReached",
            &Placeholders::new().set("goal", ctx.money(input.goal, sym)).set("timeToGoal", time),
        )?
    } else {
        let na = ctx.bundle.not_applicable();
        builder = builder
            .formatted("monthsToGoal", na)
            .formatted("yearsToGoal", na)
            .formatted("balanceAtGoal", na);
        ctx.fill(
            "goalNotReached",
            &Placeholders::new()
                .set("goal", ctx.money(input.goal, sym))
                .set("horizon", ctx.number(max_years, 0)),
        )?
    };

    let whole_years = t.ceil() as u32;
    let chart = ctx
        .chart_years(whole_years)
        .into_iter()
        .map(|y| {
            let at = f64::from(y).min(t);
            chart_record([
                ("year", f64::from(y)),
                ("balance", round2(input.balance_at(at))),
                ("contributions", round2(input.contributions_at(at))),
                ("goal", input.goal),
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
        .set("initial", ctx.money(input.initial, sym))
        .set("monthly", ctx.money(input.monthly, sym))
        .set("rate", ctx.percent(input.rate_pct, 2))
        .set("years", ctx.number(t, 1))
        .set("futureValue", ctx.money(future_value, sym))
        .set("goalSentence", goal_sentence);

    Ok(builder
        .summary(ctx.summary(&placeholders)?)
        .chart(chart)
        .table(table)
        .build())
}

fn round2(v: f64) -> f64 {
    crate::format::round_to(v, 2)
}
