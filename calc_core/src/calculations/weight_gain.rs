//! # Weight Gain Planner
//!
//! Daily calorie target for gaining weight at a chosen weekly pace.
//!
//! ## Formulas
//!
//! - BMR (Mifflin-St Jeor): `10·kg + 6.25·cm − 5·age + 5` (male) or `− 161` (female)
//! - TDEE = BMR × activity factor
//! - Surplus = weekly gain (kg) × 7700 kcal / 7 days
//!
//! Weights are resolved to kilograms and heights to meters; results are shown
//! back in the unit the user picked for `current_weight`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::context::EvalContext;
use crate::config::{
    CalculatorConfig, Category, ChartKind, ChartSpec, DetailedTableSpec, InputSpec, Preset, ResultKind, ResultSpec,
    SelectOption,
};
use crate::errors::CalcResult;
use crate::format::{gate, Placeholders};
use crate::resolver::ValuesMap;
use crate::results::{chart_record, table_record, CalculatorResults, ResultsBuilder};
use crate::units::{Centimeters, Kilograms, Meters, UnitFamily};

pub const SLUG: &str = "weight-gain";

/// Energy stored per kilogram of body weight gained
pub const KCAL_PER_KG: f64 = 7_700.0;

const WEIGHT_UNITS: &[&str] = &["kg", "lbs", "st"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn from_code(code: &str) -> Self {
        if code.eq_ignore_ascii_case("female") {
            Sex::Female
        } else {
            Sex::Male
        }
    }

    /// Mifflin-St Jeor constant
    fn bmr_offset(&self) -> f64 {
        match self {
            Sex::Male => 5.0,
            Sex::Female => -161.0,
        }
    }
}

/// Basal metabolic rate in kcal/day
pub fn mifflin_st_jeor(weight: Kilograms, height: Centimeters, age: f64, sex: Sex) -> f64 {
    10.0 * weight.value() + 6.25 * height.value() - 5.0 * age + sex.bmr_offset()
}

pub fn config() -> CalculatorConfig {
    let updated = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap_or_default();
    CalculatorConfig::new(SLUG, Category::Health, updated)
        .input(InputSpec::radio(
            "sex",
            vec![SelectOption::new("male", "sex.male"), SelectOption::new("female", "sex.female")],
        ))
        .input(InputSpec::stepper("age", 30.0).range(15.0, 80.0).with_step(1.0))
        .input(
            InputSpec::number("current_weight", 70.0)
                .range(30.0, 300.0)
                .with_units(UnitFamily::Weight, "kg", WEIGHT_UNITS)
                .strict(),
        )
        .input(
            InputSpec::number("target_weight", 75.0)
                .range(30.0, 300.0)
                .with_units(UnitFamily::Weight, "kg", WEIGHT_UNITS)
                .strict(),
        )
        .input(
            InputSpec::number("height", 175.0)
                .range(100.0, 250.0)
                .with_units(UnitFamily::Height, "cm", &["cm", "m", "in", "ft"]),
        )
        .input(InputSpec::select(
            "activity_level",
            vec![
                SelectOption::new(1.55, "activity.moderate"),
                SelectOption::new(1.2, "activity.sedentary"),
                SelectOption::new(1.375, "activity.light"),
                SelectOption::new(1.725, "activity.active"),
                SelectOption::new(1.9, "activity.veryActive"),
            ],
        ))
        .input(
            InputSpec::number("weekly_gain", 0.5)
                .range(0.1, 1.0)
                .with_step(0.05)
                .with_units(UnitFamily::Weight, "kg", &["kg", "lbs"])
                .strict(),
        )
        .input(InputSpec::toggle("show_metabolic", true))
        .result(ResultSpec::new("dailyCalories", ResultKind::Number).primary())
        .result(ResultSpec::new("calorieSurplus", ResultKind::Number))
        .result(ResultSpec::new("weightToGain", ResultKind::Number).decimals(1))
        .result(ResultSpec::new("weeksToGoal", ResultKind::Duration).decimals(1))
        .result(ResultSpec::new("bmr", ResultKind::Number).gated_by("show_metabolic"))
        .result(ResultSpec::new("tdee", ResultKind::Number).gated_by("show_metabolic"))
        .preset(
            Preset::new("lean-bulk", "presets.leanBulk")
                .set("weekly_gain", 0.25)
                .set("activity_level", 1.725),
        )
        .chart(ChartSpec::new(ChartKind::Line, "week", &["weight"]))
        .table(DetailedTableSpec::new(&["week", "weight", "remaining"]))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightGainInput {
    pub sex: Sex,
    pub age: f64,
    pub current: Kilograms,
    pub target: Kilograms,
    pub height: Meters,
    pub activity: f64,
    pub weekly_gain: Kilograms,
    pub show_metabolic: bool,
}

impl WeightGainInput {
    pub fn from_values(values: &ValuesMap) -> Option<Self> {
        Some(WeightGainInput {
            sex: Sex::from_code(values.text("sex").unwrap_or("male")),
            age: values.number("age")?,
            current: Kilograms(values.number("current_weight")?),
            target: Kilograms(values.number("target_weight")?),
            height: Meters(values.number("height")?),
            activity: values.number("activity_level")?,
            weekly_gain: Kilograms(values.number("weekly_gain")?),
            show_metabolic: values.flag("show_metabolic"),
        })
    }

    pub fn is_viable(&self) -> bool {
        self.age > 0.0
            && self.current.value() > 0.0
            && self.height.value() > 0.0
            && self.activity > 0.0
            && self.weekly_gain.value() > 0.0
            && self.target > self.current
    }

    pub fn bmr(&self) -> f64 {
        mifflin_st_jeor(self.current, self.height.into(), self.age, self.sex)
    }

    pub fn tdee(&self) -> f64 {
        self.bmr() * self.activity
    }

    pub fn daily_surplus(&self) -> f64 {
        self.weekly_gain.value() * KCAL_PER_KG / 7.0
    }

    pub fn to_gain(&self) -> Kilograms {
        self.target - self.current
    }

    pub fn weeks(&self) -> f64 {
        self.to_gain().value() / self.weekly_gain.value()
    }
}

pub fn is_viable(values: &ValuesMap) -> bool {
    WeightGainInput::from_values(values).is_some_and(|input| input.is_viable())
}

pub fn calculate(values: &ValuesMap, ctx: &EvalContext) -> CalcResult<CalculatorResults> {
    let Some(input) = WeightGainInput::from_values(values).filter(WeightGainInput::is_viable) else {
        return Ok(CalculatorResults::invalid());
    };

    let bmr = input.bmr();
    let tdee = input.tdee();
    let surplus = input.daily_surplus();
    let daily = tdee + surplus;
    let weeks = input.weeks();

    let unit = match ctx.unit_of("current_weight") {
        "" => "kg",
        u => u,
    };
    let gain_unit = match ctx.unit_of("weekly_gain") {
        "" => "kg",
        u => u,
    };
    let shown = |field: &str, kg: Kilograms| ctx.display_value(field, UnitFamily::Weight, kg.value());
    let to_gain = shown("current_weight", input.to_gain())?;
    let kcal = ctx.label("kcal");

    let builder = ResultsBuilder::new()
        .entry("dailyCalories", daily, 0, format!("{} {}", ctx.integer(daily), kcal))
        .entry("calorieSurplus", surplus, 0, format!("{} {}", ctx.integer(surplus), kcal))
        .entry("weightToGain", to_gain, 1, ctx.quantity(to_gain, 1, unit))
        .entry("weeksToGoal", weeks, 1, ctx.quantity(weeks, 1, "weeks"))
        .entry("bmr", bmr, 0, gate(input.show_metabolic, format!("{} {}", ctx.integer(bmr), kcal)))
        .entry("tdee", tdee, 0, gate(input.show_metabolic, format!("{} {}", ctx.integer(tdee), kcal)));

    let total_weeks = weeks.ceil() as u32;
    let weight_at = |week: u32| -> CalcResult<f64> {
        let kg = (input.current + input.weekly_gain * f64::from(week)).value().min(input.target.value());
        shown("current_weight", Kilograms(kg))
    };

    let mut chart = Vec::new();
    for week in ctx.chart_years(total_weeks) {
        chart.push(chart_record([
            ("week", f64::from(week)),
            ("weight", crate::format::round_to(weight_at(week)?, 1)),
        ]));
    }

    let target_shown = shown("target_weight", input.target)?;
    let mut table = Vec::new();
    for week in 1..=ctx.table_rows(total_weeks) {
        let w = weight_at(week)?;
        let remaining = shown("current_weight", input.target)? - w;
        table.push(table_record([
            ("week", week.to_string()),
            ("weight", ctx.quantity(w, 1, unit)),
            ("remaining", ctx.quantity(remaining.max(0.0), 1, unit)),
        ]));
    }

    let placeholders = Placeholders::new()
        .set("currentWeight", ctx.quantity(shown("current_weight", input.current)?, 1, unit))
        .set("targetWeight", ctx.quantity(target_shown, 1, ctx.unit_of("target_weight")))
        .set("weeklyGain", ctx.quantity(shown("weekly_gain", input.weekly_gain)?, 2, gain_unit))
        .set("dailyCalories", format!("{} {}", ctx.integer(daily), kcal))
        .set("weeks", ctx.number(weeks, 1));

    Ok(builder
        .summary(ctx.summary(&placeholders)?)
        .chart(chart)
        .table(table)
        .build())
}
