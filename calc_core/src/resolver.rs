//! # Input Resolver
//!
//! Turns a raw `{field id: user value}` map into a [`ValuesMap`] in canonical
//! base units.
//!
//! ## Layering
//!
//! For each input, the first present source wins:
//!
//! 1. the explicit user value
//! 2. the selected preset's value
//! 3. the input's `default_value`
//!
//! Dimensioned values are then converted with [`units::to_base`]. Entered and
//! preset values use the unit picked in `field_units`; defaults are always
//! read in the input's `default_unit`. Inputs whose
//! `show_when` condition is false become [`Field::Disabled`].
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::CalculatorId;
//! use calc_core::resolver::{resolve, CalculationRequest};
//!
//! let config = CalculatorId::WeightGain.config();
//! let request = CalculationRequest::new()
//!     .with_value("current_weight", 150.0)
//!     .with_unit("current_weight", "lbs");
//!
//! let values = resolve(&config, &request).unwrap();
//! let kg = values.number("current_weight").unwrap();
//! assert!((kg - 68.0388555).abs() < 1e-6);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{CalculatorConfig, InputSpec, InputType};
use crate::errors::{CalcError, CalcResult};
use crate::format::NumberLocale;
use crate::i18n::TranslationBundle;
use crate::units::{self, UnitFamily};

// ============================================================================
// Values
// ============================================================================

/// A value exactly as the form submitted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

impl From<bool> for RawValue {
    fn from(v: bool) -> Self {
        RawValue::Bool(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Text(v)
    }
}

/// A typed, coerced value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether a raw submission denotes this value.
    ///
    /// Numbers match numerically (`"12"` matches `12.0`), text matches
    /// case-insensitively. Option codes always use `.` as the decimal point.
    fn matches_raw(&self, raw: &RawValue) -> bool {
        match (self, raw) {
            (FieldValue::Number(a), RawValue::Number(b)) => a == b,
            (FieldValue::Number(a), RawValue::Text(s)) => parse_number(s, NumberLocale::EN) == Some(*a),
            (FieldValue::Text(a), RawValue::Text(s)) => a.eq_ignore_ascii_case(s.trim()),
            (FieldValue::Text(a), RawValue::Number(n)) => parse_number(a, NumberLocale::EN) == Some(*n),
            (FieldValue::Bool(a), other) => coerce_bool(other) == Some(*a),
            (_, RawValue::Bool(_)) => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

/// A resolved input: either switched off by its `show_when` condition or
/// carrying a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum Field {
    Disabled,
    Enabled(FieldValue),
}

/// Resolved inputs keyed by field id, every number in base units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValuesMap {
    fields: BTreeMap<String, Field>,
}

impl ValuesMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, field: Field) {
        self.fields.insert(id.into(), field);
    }

    /// Builder-style insert of an enabled value
    pub fn with(mut self, id: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(id, Field::Enabled(value.into()));
        self
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.get(id)
    }

    /// Enabled value of a field
    pub fn value(&self, id: &str) -> Option<&FieldValue> {
        match self.fields.get(id) {
            Some(Field::Enabled(v)) => Some(v),
            _ => None,
        }
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        matches!(self.fields.get(id), Some(Field::Enabled(_)))
    }

    /// Numeric value; `None` when missing, disabled, or not a number
    pub fn number(&self, id: &str) -> Option<f64> {
        self.value(id).and_then(FieldValue::as_number)
    }

    /// Numeric value with an explicit fallback for missing or disabled fields
    pub fn number_or(&self, id: &str, fallback: f64) -> f64 {
        self.number(id).unwrap_or(fallback)
    }

    /// Toggle state; missing or disabled toggles read as off
    pub fn flag(&self, id: &str) -> bool {
        self.value(id).and_then(FieldValue::as_bool).unwrap_or(false)
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.value(id).and_then(FieldValue::as_text)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Field)> {
        self.fields.iter()
    }
}

// ============================================================================
// Request
// ============================================================================

/// Everything a calculator call receives from its host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRequest {
    /// Raw form values
    #[serde(default)]
    pub values: HashMap<String, RawValue>,

    /// Unit the user picked per dimensioned field
    #[serde(default)]
    pub field_units: HashMap<String, String>,

    /// Preset to apply under the explicit values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,

    /// Locale code; the engine default applies when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// Explicit translation bundle, overriding the embedded one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<TranslationBundle>,
}

impl CalculationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, id: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.values.insert(id.into(), value.into());
        self
    }

    pub fn with_unit(mut self, id: impl Into<String>, unit: impl Into<String>) -> Self {
        self.field_units.insert(id.into(), unit.into());
        self
    }

    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = Some(preset.into());
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_translations(mut self, t: TranslationBundle) -> Self {
        self.t = Some(t);
        self
    }

    /// Display unit of a field: the user's pick or the config default.
    pub fn unit_for<'a>(&'a self, spec: &'a InputSpec) -> Option<&'a str> {
        self.field_units
            .get(&spec.id)
            .map(String::as_str)
            .or_else(|| spec.effective_default_unit())
    }
}

// ============================================================================
// Coercion
// ============================================================================

/// Parse form text using the locale's separators: "12,500.5" in `en`,
/// "12.500,5" in `es`.
fn parse_number(s: &str, locale: NumberLocale) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| *c != locale.thousands && *c != '_' && !c.is_whitespace())
        .map(|c| if c == locale.decimal { '.' } else { c })
        .collect();
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn coerce_number(raw: &RawValue, locale: NumberLocale) -> Option<f64> {
    match raw {
        RawValue::Number(n) if n.is_finite() => Some(*n),
        RawValue::Number(_) => None,
        RawValue::Text(s) => parse_number(s, locale),
        RawValue::Bool(_) => None,
    }
}

fn coerce_bool(raw: &RawValue) -> Option<bool> {
    match raw {
        RawValue::Bool(b) => Some(*b),
        RawValue::Number(n) => Some(*n != 0.0),
        RawValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "on" | "yes" | "1" => Some(true),
            "false" | "off" | "no" | "0" | "" => Some(false),
            _ => None,
        },
    }
}

/// Coerce one raw value for `spec`; `None` means "not provided".
fn coerce(spec: &InputSpec, raw: &RawValue, locale: NumberLocale) -> Option<FieldValue> {
    match spec.input_type {
        InputType::Number | InputType::Slider | InputType::Stepper => {
            coerce_number(raw, locale).map(FieldValue::Number)
        }
        InputType::Toggle => coerce_bool(raw).map(FieldValue::Bool),
        InputType::Select | InputType::Radio => spec
            .options
            .iter()
            .find(|opt| opt.value.matches_raw(raw))
            .map(|opt| opt.value.clone()),
    }
}

/// Unit the user's value for `spec` is written in, checked against the
/// allowed list. `None` for non-dimensioned fields.
fn selected_unit<'a>(spec: &'a InputSpec, request: &'a CalculationRequest) -> CalcResult<Option<&'a str>> {
    let Some(family) = spec.unit_type else {
        if request.field_units.contains_key(&spec.id) {
            tracing::warn!(field = %spec.id, "unit selection ignored for non-dimensioned field");
        }
        return Ok(None);
    };

    let unit = request
        .unit_for(spec)
        .unwrap_or_else(|| family.base_unit());

    if family != UnitFamily::Currency && !spec.allows_unit(unit) {
        return Err(CalcError::unknown_unit(unit, family.code()));
    }
    Ok(Some(unit))
}

/// Convert a value written in `unit` to base units.
fn normalize(spec: &InputSpec, value: FieldValue, unit: Option<&str>) -> CalcResult<FieldValue> {
    match (spec.unit_type, unit, value) {
        (Some(family), Some(unit), FieldValue::Number(n)) => Ok(FieldValue::Number(units::to_base(n, unit, family)?)),
        (_, _, other) => Ok(other),
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve a request against a config, reading text numbers with the
/// request's locale (English separators when it has none).
///
/// Returns `Err` only for integration mistakes (unknown preset, a unit the
/// field does not allow). Missing or malformed user values fall back to
/// defaults and never error; whether the result is usable is decided by the
/// calculator's own viability predicate.
pub fn resolve(config: &CalculatorConfig, request: &CalculationRequest) -> CalcResult<ValuesMap> {
    let locale = NumberLocale::for_locale(request.locale.as_deref().unwrap_or("en"));
    resolve_with_locale(config, request, locale)
}

/// [`resolve`] with explicit number separators for text input.
pub fn resolve_with_locale(
    config: &CalculatorConfig,
    request: &CalculationRequest,
    locale: NumberLocale,
) -> CalcResult<ValuesMap> {
    let preset_values: HashMap<&str, &RawValue> = match &request.preset {
        Some(id) => config
            .find_preset(id)
            .ok_or_else(|| CalcError::preset_not_found(config.id.clone(), id.clone()))?
            .values
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect(),
        None => HashMap::new(),
    };

    // Pass 1: every field gets a value regardless of its condition
    let mut resolved: BTreeMap<String, Option<FieldValue>> = BTreeMap::new();
    for spec in &config.inputs {
        let explicit = request.values.get(&spec.id).and_then(|raw| coerce(spec, raw, locale));
        let from_preset = || preset_values.get(spec.id.as_str()).and_then(|raw| coerce(spec, raw, locale));

        // entered values are in the selected unit, defaults in the declared one
        let unit = selected_unit(spec, request)?;
        let value = match explicit.or_else(from_preset) {
            Some(v) => Some(normalize(spec, v, unit)?),
            None => match spec.default_value.clone() {
                Some(v) => Some(normalize(spec, v, spec.effective_default_unit())?),
                None => None,
            },
        };
        resolved.insert(spec.id.clone(), value);
    }

    // Pass 2: apply show_when gates
    let mut values = ValuesMap::new();
    for spec in &config.inputs {
        if !is_shown(config, &resolved, spec, config.inputs.len()) {
            values.insert(spec.id.clone(), Field::Disabled);
            continue;
        }
        if let Some(Some(value)) = resolved.get(&spec.id) {
            values.insert(spec.id.clone(), Field::Enabled(value.clone()));
        }
    }

    for id in request.values.keys() {
        if config.input_spec(id).is_none() {
            tracing::debug!(calculator = %config.id, field = %id, "ignoring unknown field");
        }
    }

    Ok(values)
}

/// A field is shown when its condition holds and its controlling field is
/// itself shown. `depth` bounds the walk so a cyclic config cannot loop.
fn is_shown(
    config: &CalculatorConfig,
    resolved: &BTreeMap<String, Option<FieldValue>>,
    spec: &InputSpec,
    depth: usize,
) -> bool {
    let Some(cond) = &spec.show_when else {
        return true;
    };
    if depth == 0 {
        return false;
    }
    let Some(controller) = config.input_spec(&cond.field) else {
        return false;
    };
    let holds = matches!(resolved.get(&cond.field), Some(Some(v)) if *v == cond.equals);
    holds && is_shown(config, resolved, controller, depth - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Category, Preset, SelectOption};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn config() -> CalculatorConfig {
        CalculatorConfig::new("test", Category::Financial, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
            .input(InputSpec::number("principal", 1000.0).with_units(UnitFamily::Currency, "USD", &["USD", "EUR"]))
            .input(InputSpec::number("weight", 70.0).with_units(UnitFamily::Weight, "kg", &["kg", "lbs"]))
            .input(InputSpec::select(
                "frequency",
                vec![SelectOption::new(12.0, "monthly"), SelectOption::new(1.0, "annually")],
            ))
            .input(InputSpec::toggle("include_tax", false))
            .input(InputSpec::number("tax_rate", 25.0).show_when("include_tax", true))
            .input(InputSpec::number("tax_note", 1.0).show_when("tax_rate", 30.0))
            .input(InputSpec::number("optional", 0.0).with_default(FieldValue::Number(0.0)))
            .preset(Preset::new("big", "presets.big").set("principal", 50_000.0).set("include_tax", true))
    }

    #[test]
    fn test_defaults_applied() {
        let values = resolve(&config(), &CalculationRequest::new()).unwrap();
        assert_eq!(values.number("principal"), Some(1000.0));
        assert_eq!(values.number("frequency"), Some(12.0));
        assert!(!values.flag("include_tax"));
    }

    #[test]
    fn test_weight_normalized_to_kg() {
        let req = CalculationRequest::new().with_value("weight", 100.0).with_unit("weight", "lbs");
        let values = resolve(&config(), &req).unwrap();
        assert!((values.number("weight").unwrap() - 45.359237).abs() < 1e-9);
    }

    #[test]
    fn test_default_is_in_default_unit() {
        // 70 kg default stays 70 kg even when the user picked lbs without typing
        let req = CalculationRequest::new().with_unit("weight", "lbs");
        let values = resolve(&config(), &req).unwrap();
        assert_eq!(values.number("weight"), Some(70.0));

        // an entered value is read in the picked unit
        let req = req.with_value("weight", 70.0);
        let values = resolve(&config(), &req).unwrap();
        assert!((values.number("weight").unwrap() - 31.751_465_9).abs() < 1e-6);
    }

    #[test]
    fn test_disallowed_unit_is_error() {
        let req = CalculationRequest::new().with_unit("weight", "st");
        let err = resolve(&config(), &req).unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_UNIT");
    }

    #[test]
    fn test_currency_keeps_amount() {
        let req = CalculationRequest::new().with_value("principal", 250.0).with_unit("principal", "EUR");
        let values = resolve(&config(), &req).unwrap();
        assert_eq!(values.number("principal"), Some(250.0));
    }

    #[test]
    fn test_text_numbers_coerced() {
        let req = CalculationRequest::new().with_value("principal", "12,500.50").with_value("frequency", "1");
        let values = resolve(&config(), &req).unwrap();
        assert_eq!(values.number("principal"), Some(12_500.5));
        assert_eq!(values.number("frequency"), Some(1.0));
    }

    #[test]
    fn test_text_numbers_use_locale_separators() {
        let req = CalculationRequest::new().with_value("principal", "1.234,5").with_locale("es");
        let values = resolve(&config(), &req).unwrap();
        assert_eq!(values.number("principal"), Some(1_234.5));

        let req = CalculationRequest::new().with_value("principal", "1,234.5");
        let values = resolve(&config(), &req).unwrap();
        assert_eq!(values.number("principal"), Some(1_234.5));

        let values = resolve_with_locale(
            &config(),
            &CalculationRequest::new().with_value("principal", "2 500,75"),
            NumberLocale::CONTINENTAL,
        )
        .unwrap();
        assert_eq!(values.number("principal"), Some(2_500.75));
    }

    #[test]
    fn test_garbage_falls_back_to_default() {
        let req = CalculationRequest::new()
            .with_value("principal", "lots")
            .with_value("frequency", "weekly")
            .with_value("weight", f64::NAN);
        let values = resolve(&config(), &req).unwrap();
        assert_eq!(values.number("principal"), Some(1000.0));
        assert_eq!(values.number("frequency"), Some(12.0));
        assert_eq!(values.number("weight"), Some(70.0));
    }

    #[test]
    fn test_show_when_disables_field() {
        let values = resolve(&config(), &CalculationRequest::new().with_value("tax_rate", 30.0)).unwrap();
        assert_eq!(values.field("tax_rate"), Some(&Field::Disabled));
        assert_eq!(values.number("tax_rate"), None);
        assert_eq!(values.number_or("tax_rate", 0.0), 0.0);
        // controlled by a disabled field, so disabled too
        assert_eq!(values.field("tax_note"), Some(&Field::Disabled));
    }

    #[test]
    fn test_show_when_enables_field() {
        let req = CalculationRequest::new()
            .with_value("include_tax", "on")
            .with_value("tax_rate", 30.0);
        let values = resolve(&config(), &req).unwrap();
        assert_eq!(values.number("tax_rate"), Some(30.0));
        assert_eq!(values.number("tax_note"), Some(1.0));
    }

    #[test]
    fn test_preset_layering() {
        let req = CalculationRequest::new().with_preset("big");
        let values = resolve(&config(), &req).unwrap();
        assert_eq!(values.number("principal"), Some(50_000.0));
        assert!(values.flag("include_tax"));

        let req = CalculationRequest::new().with_preset("big").with_value("principal", 10.0);
        let values = resolve(&config(), &req).unwrap();
        assert_eq!(values.number("principal"), Some(10.0));
    }

    #[test]
    fn test_unknown_preset_is_error() {
        let req = CalculationRequest::new().with_preset("nope");
        assert_eq!(resolve(&config(), &req).unwrap_err().error_code(), "PRESET_NOT_FOUND");
    }

    #[test]
    fn test_request_deserializes_from_form_json() {
        let json = r#"{
            "values": {"principal": "2500", "include_tax": true, "frequency": 1},
            "fieldUnits": {"principal": "EUR"},
            "locale": "es"
        }"#;
        let req: CalculationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.values.get("include_tax"), Some(&RawValue::Bool(true)));
        assert_eq!(req.field_units.get("principal").map(String::as_str), Some("EUR"));
        let values = resolve(&config(), &req).unwrap();
        assert_eq!(values.number("principal"), Some(2500.0));
        assert_eq!(values.number("frequency"), Some(1.0));
    }
}
