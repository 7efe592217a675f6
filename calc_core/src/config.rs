//! # Calculator Configuration
//!
//! Static, author-provided description of one calculator: identity, inputs,
//! result slots, presets and chart/table shape. Configs are plain data; the
//! engine reads them but never mutates them.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "id": "mph-to-kmh",
//!   "version": 4,
//!   "category": "conversion",
//!   "last_updated": "2025-03-01",
//!   "inputs": [
//!     { "id": "value", "input_type": "number", "min": 0.0, "default_value": 60.0,
//!       "unit_type": "speed", "default_unit": "mph", "allowed_units": ["mph"] }
//!   ],
//!   "results": [ { "id": "kmh", "kind": "number", "decimals": 2, "primary": true } ]
//! }
//! ```

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::resolver::{FieldValue, RawValue, ValuesMap};
use crate::units::{self, UnitFamily};

/// Current config schema version
pub const CONFIG_SCHEMA_VERSION: u32 = 4;

/// Broad grouping used by the site navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Financial,
    Health,
    Conversion,
}

impl Category {
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Financial => "Financial",
            Category::Health => "Health",
            Category::Conversion => "Conversion",
        }
    }
}

/// Form control kind of an input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Number,
    Select,
    Toggle,
    Radio,
    Slider,
    Stepper,
}

impl InputType {
    /// Controls whose value is a number
    pub fn is_numeric(&self) -> bool {
        matches!(self, InputType::Number | InputType::Slider | InputType::Stepper)
    }

    /// Controls whose value must be one of the declared options
    pub fn is_choice(&self) -> bool {
        matches!(self, InputType::Select | InputType::Radio)
    }
}

/// One option of a select or radio input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: FieldValue,
    /// Translation key of the option label
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<FieldValue>, label: impl Into<String>) -> Self {
        SelectOption {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Conditional relevance: the input only matters when `field` resolves to `equals`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowWhen {
    pub field: String,
    pub equals: FieldValue,
}

/// One form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    /// Unique key within the calculator
    pub id: String,

    pub input_type: InputType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,

    /// Value used when the user leaves the field empty, in `default_unit`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<FieldValue>,

    /// Choices for select/radio inputs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,

    /// Unit family for dimensioned quantities
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_type: Option<UnitFamily>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_unit: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_units: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_when: Option<ShowWhen>,

    /// Values outside `min..=max` make the whole input set not viable.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub strict_range: bool,
}

impl InputSpec {
    fn base(id: impl Into<String>, input_type: InputType) -> Self {
        InputSpec {
            id: id.into(),
            input_type,
            min: None,
            max: None,
            step: None,
            default_value: None,
            options: Vec::new(),
            unit_type: None,
            default_unit: None,
            allowed_units: Vec::new(),
            show_when: None,
            strict_range: false,
        }
    }

    /// Plain number input
    pub fn number(id: impl Into<String>, default: f64) -> Self {
        InputSpec {
            default_value: Some(FieldValue::Number(default)),
            ..Self::base(id, InputType::Number)
        }
    }

    /// Slider with a numeric default
    pub fn slider(id: impl Into<String>, default: f64) -> Self {
        InputSpec {
            default_value: Some(FieldValue::Number(default)),
            ..Self::base(id, InputType::Slider)
        }
    }

    /// Stepper with a numeric default
    pub fn stepper(id: impl Into<String>, default: f64) -> Self {
        InputSpec {
            default_value: Some(FieldValue::Number(default)),
            ..Self::base(id, InputType::Stepper)
        }
    }

    /// On/off toggle
    pub fn toggle(id: impl Into<String>, default: bool) -> Self {
        InputSpec {
            default_value: Some(FieldValue::Bool(default)),
            ..Self::base(id, InputType::Toggle)
        }
    }

    /// Dropdown; the default is the first option unless overridden
    pub fn select(id: impl Into<String>, options: Vec<SelectOption>) -> Self {
        InputSpec {
            default_value: options.first().map(|o| o.value.clone()),
            options,
            ..Self::base(id, InputType::Select)
        }
    }

    /// Radio group; the default is the first option unless overridden
    pub fn radio(id: impl Into<String>, options: Vec<SelectOption>) -> Self {
        InputSpec {
            default_value: options.first().map(|o| o.value.clone()),
            options,
            ..Self::base(id, InputType::Radio)
        }
    }

    /// Numeric bounds
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Reject values outside the declared bounds instead of computing them.
    pub fn strict(mut self) -> Self {
        self.strict_range = true;
        self
    }

    /// Whether a resolved base-unit value lies inside the declared bounds.
    /// Bounds are written in `default_unit`; fields without `strict` always pass.
    pub fn accepts(&self, base_value: f64) -> bool {
        if !self.strict_range {
            return true;
        }
        let to_base = |bound: f64| match (self.unit_type, self.effective_default_unit()) {
            (Some(family), Some(unit)) => units::to_base(bound, unit, family).ok(),
            _ => Some(bound),
        };
        let above_min = self.min.map_or(Some(true), |m| to_base(m).map(|m| base_value >= m));
        let below_max = self.max.map_or(Some(true), |m| to_base(m).map(|m| base_value <= m));
        above_min == Some(true) && below_max == Some(true)
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn with_default(mut self, value: impl Into<FieldValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Dimensioned quantity: `default` is expressed in `default_unit`.
    pub fn with_units(mut self, family: UnitFamily, default_unit: &str, allowed: &[&str]) -> Self {
        self.unit_type = Some(family);
        self.default_unit = Some(default_unit.to_string());
        self.allowed_units = allowed.iter().map(|u| u.to_string()).collect();
        self
    }

    pub fn show_when(mut self, field: impl Into<String>, equals: impl Into<FieldValue>) -> Self {
        self.show_when = Some(ShowWhen {
            field: field.into(),
            equals: equals.into(),
        });
        self
    }

    /// Unit to use when the request does not pick one
    pub fn effective_default_unit(&self) -> Option<&str> {
        match (&self.default_unit, self.unit_type) {
            (Some(u), _) => Some(u.as_str()),
            (None, Some(family)) => Some(family.base_unit()),
            (None, None) => None,
        }
    }

    /// Whether `unit` may be selected for this field
    pub fn allows_unit(&self, unit: &str) -> bool {
        if self.allowed_units.is_empty() {
            self.effective_default_unit() == Some(unit)
        } else {
            self.allowed_units.iter().any(|u| u == unit)
        }
    }
}

/// How a result slot is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Currency,
    Number,
    Percent,
    Duration,
    Text,
}

/// One output slot of a calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSpec {
    pub id: String,
    pub kind: ResultKind,
    #[serde(default)]
    pub decimals: u8,
    /// Headline result shown in the hero card
    #[serde(default)]
    pub primary: bool,
    /// Toggle whose `false` value hides this result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gated_by: Option<String>,
}

impl ResultSpec {
    pub fn new(id: impl Into<String>, kind: ResultKind) -> Self {
        ResultSpec {
            id: id.into(),
            kind,
            decimals: 0,
            primary: false,
            gated_by: None,
        }
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub fn decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn gated_by(mut self, toggle: impl Into<String>) -> Self {
        self.gated_by = Some(toggle.into());
        self
    }
}

/// Named bundle of raw input values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    /// Translation key of the preset name
    pub label: String,
    pub values: Vec<(String, RawValue)>,
}

impl Preset {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Preset {
            id: id.into(),
            label: label.into(),
            values: Vec::new(),
        }
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.values.push((field.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Area,
    Bar,
    StackedBar,
}

/// Shape of `metadata.chartData`: every record has `x_key` plus each series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub x_key: String,
    pub series: Vec<String>,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, x_key: &str, series: &[&str]) -> Self {
        ChartSpec {
            kind,
            x_key: x_key.to_string(),
            series: series.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Every key a chart record carries
    pub fn keys(&self) -> Vec<&str> {
        std::iter::once(self.x_key.as_str())
            .chain(self.series.iter().map(String::as_str))
            .collect()
    }
}

/// Shape of `metadata.tableData`: every row has exactly these columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedTableSpec {
    pub columns: Vec<String>,
}

impl DetailedTableSpec {
    pub fn new(columns: &[&str]) -> Self {
        DetailedTableSpec {
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Complete static description of one calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// Slug, also the translation bundle name
    pub id: String,
    pub version: u32,
    pub category: Category,
    pub last_updated: NaiveDate,
    pub inputs: Vec<InputSpec>,
    pub results: Vec<ResultSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub presets: Vec<Preset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<DetailedTableSpec>,
}

impl CalculatorConfig {
    pub fn new(id: impl Into<String>, category: Category, last_updated: NaiveDate) -> Self {
        CalculatorConfig {
            id: id.into(),
            version: CONFIG_SCHEMA_VERSION,
            category,
            last_updated,
            inputs: Vec::new(),
            results: Vec::new(),
            presets: Vec::new(),
            chart: None,
            table: None,
        }
    }

    pub fn input(mut self, spec: InputSpec) -> Self {
        self.inputs.push(spec);
        self
    }

    pub fn result(mut self, spec: ResultSpec) -> Self {
        self.results.push(spec);
        self
    }

    pub fn preset(mut self, preset: Preset) -> Self {
        self.presets.push(preset);
        self
    }

    pub fn chart(mut self, chart: ChartSpec) -> Self {
        self.chart = Some(chart);
        self
    }

    pub fn table(mut self, table: DetailedTableSpec) -> Self {
        self.table = Some(table);
        self
    }

    /// Look up an input by id
    pub fn input_spec(&self, id: &str) -> Option<&InputSpec> {
        self.inputs.iter().find(|i| i.id == id)
    }

    /// Look up a preset by id
    pub fn find_preset(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// Declared upper bound of a numeric input
    pub fn max_of(&self, id: &str) -> Option<f64> {
        self.input_spec(id).and_then(|i| i.max)
    }

    /// Every enabled strict field lies inside its declared bounds.
    pub fn within_bounds(&self, values: &ValuesMap) -> bool {
        self.inputs
            .iter()
            .filter(|spec| spec.strict_range)
            .all(|spec| values.number(&spec.id).map_or(true, |v| spec.accepts(v)))
    }

    /// Development-time consistency check.
    ///
    /// Configs are author-controlled, so every failure here is a bug in a
    /// shipped calculator, not a user error.
    pub fn validate(&self) -> CalcResult<()> {
        let fail = |reason: String| Err(CalcError::config_invalid(self.id.clone(), reason));

        if self.version != CONFIG_SCHEMA_VERSION {
            return fail(format!("schema version {} (expected {})", self.version, CONFIG_SCHEMA_VERSION));
        }

        let mut seen = HashSet::new();
        for input in &self.inputs {
            if !seen.insert(input.id.as_str()) {
                return fail(format!("duplicate input id '{}'", input.id));
            }
        }

        for input in &self.inputs {
            if let (Some(min), Some(max)) = (input.min, input.max) {
                if min > max {
                    return fail(format!("input '{}' has min {} > max {}", input.id, min, max));
                }
            }
            if input.strict_range && (input.min.is_none() || input.max.is_none()) {
                return fail(format!("strict input '{}' needs both bounds", input.id));
            }

            if let Some(family) = input.unit_type {
                let Some(default_unit) = input.effective_default_unit() else {
                    return fail(format!("input '{}' has no default unit", input.id));
                };
                if !units::is_registered(default_unit, family) {
                    return fail(format!("input '{}' default unit '{}' is not a {} unit", input.id, default_unit, family));
                }
                for unit in &input.allowed_units {
                    if !units::is_registered(unit, family) {
                        return fail(format!("input '{}' allows unregistered {} unit '{}'", input.id, family, unit));
                    }
                }
                if !input.allows_unit(default_unit) {
                    return fail(format!("input '{}' default unit '{}' is not in allowed units", input.id, default_unit));
                }
            } else if input.default_unit.is_some() || !input.allowed_units.is_empty() {
                return fail(format!("input '{}' declares units without a unit type", input.id));
            }

            if input.input_type.is_choice() {
                if input.options.is_empty() {
                    return fail(format!("choice input '{}' has no options", input.id));
                }
                if let Some(default) = &input.default_value {
                    if !input.options.iter().any(|o| &o.value == default) {
                        return fail(format!("choice input '{}' default is not an option", input.id));
                    }
                }
            }

            if let Some(cond) = &input.show_when {
                if cond.field == input.id {
                    return fail(format!("input '{}' is conditional on itself", input.id));
                }
                if !seen.contains(cond.field.as_str()) {
                    return fail(format!("input '{}' shows when unknown field '{}'", input.id, cond.field));
                }
            }
        }

        let mut result_ids = HashSet::new();
        for result in &self.results {
            if !result_ids.insert(result.id.as_str()) {
                return fail(format!("duplicate result id '{}'", result.id));
            }
            if let Some(toggle) = &result.gated_by {
                match self.input_spec(toggle) {
                    Some(spec) if spec.input_type == InputType::Toggle => {}
                    _ => return fail(format!("result '{}' gated by non-toggle '{}'", result.id, toggle)),
                }
            }
        }

        let mut preset_ids = HashSet::new();
        for preset in &self.presets {
            if !preset_ids.insert(preset.id.as_str()) {
                return fail(format!("duplicate preset id '{}'", preset.id));
            }
            for (field, _) in &preset.values {
                if !seen.contains(field.as_str()) {
                    return fail(format!("preset '{}' sets unknown field '{}'", preset.id, field));
                }
            }
        }

        if let Some(chart) = &self.chart {
            if chart.series.is_empty() {
                return fail("chart declares no series".to_string());
            }
        }
        if let Some(table) = &self.table {
            if table.columns.is_empty() {
                return fail("table declares no columns".to_string());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn sample() -> CalculatorConfig {
        CalculatorConfig::new("sample", Category::Health, date())
            .input(
                InputSpec::number("weight", 70.0)
                    .range(20.0, 300.0)
                    .with_units(UnitFamily::Weight, "kg", &["kg", "lbs"]),
            )
            .input(InputSpec::toggle("details", false))
            .input(InputSpec::number("extra", 0.0).show_when("details", true))
            .result(ResultSpec::new("bmr", ResultKind::Number).gated_by("details"))
            .preset(Preset::new("heavy", "presets.heavy").set("weight", 120.0))
    }

    #[test]
    fn test_valid_config() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_duplicate_input_rejected() {
        let cfg = sample().input(InputSpec::number("weight", 1.0));
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_INVALID");
    }

    #[test]
    fn test_unregistered_unit_rejected() {
        let cfg = sample().input(
            InputSpec::number("speed", 1.0).with_units(UnitFamily::Speed, "mph", &["mph", "warp"]),
        );
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_default_unit_must_be_allowed() {
        let cfg = sample().input(
            InputSpec::number("h", 1.0).with_units(UnitFamily::Height, "cm", &["in"]),
        );
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_show_when_must_reference_known_field() {
        let cfg = sample().input(InputSpec::number("rate", 1.0).show_when("missing", true));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_preset_unknown_field_rejected() {
        let cfg = sample().preset(Preset::new("bad", "presets.bad").set("nope", 1.0));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_gated_result_needs_toggle() {
        let cfg = sample().result(ResultSpec::new("x", ResultKind::Number).gated_by("weight"));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_strict_needs_both_bounds() {
        let cfg = sample().input(InputSpec::number("years", 10.0).strict());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_strict_bounds_checked_in_base_units() {
        let spec = InputSpec::number("gain", 0.5)
            .range(0.1, 1.0)
            .with_units(UnitFamily::Weight, "kg", &["kg", "lbs"])
            .strict();
        assert!(spec.accepts(0.1));
        assert!(spec.accepts(1.0));
        assert!(!spec.accepts(0.09));
        assert!(!spec.accepts(1e-300));

        let values = ValuesMap::new().with("gain", 2.0);
        let cfg = sample().input(spec);
        assert!(!cfg.within_bounds(&values));
        assert!(cfg.within_bounds(&ValuesMap::new().with("gain", 0.5)));
        // out-of-range values are fine on fields that are not strict
        assert!(cfg.within_bounds(&ValuesMap::new().with("gain", 0.5).with("weight", 9_000.0)));
    }

    #[test]
    fn test_select_default_is_first_option() {
        let spec = InputSpec::select(
            "freq",
            vec![SelectOption::new(12.0, "monthly"), SelectOption::new(1.0, "annually")],
        );
        assert_eq!(spec.default_value, Some(FieldValue::Number(12.0)));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let cfg = sample();
        let json = serde_json::to_string_pretty(&cfg).unwrap();
        assert!(json.contains("\"last_updated\": \"2025-01-15\""));
        let roundtrip: CalculatorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, roundtrip);
    }
}
