//! # Calculators
//!
//! Every calculator follows the same pattern:
//!
//! - `config()` - static [`CalculatorConfig`] describing the form
//! - `*Input::from_values` - typed view of the resolved [`ValuesMap`]
//! - `is_viable(values)` - whether the inputs describe a computable case
//! - `calculate(values, ctx) -> CalcResult<CalculatorResults>` - pure evaluation
//!
//! [`CalculatorId`] selects a calculator by identity and dispatches to it.
//!
//! ## Available Calculators
//!
//! - [`compound_interest`] - Lump sum plus contributions under compounding
//! - [`savings_goal`] - Projection and months-to-goal simulation
//! - [`retirement`] - Accumulation then drawdown
//! - [`weight_gain`] - BMR/TDEE based calorie target
//! - [`conversion`] - Fanegadas, manzanas, varas and mph converters

pub mod compound_interest;
pub mod context;
pub mod conversion;
pub mod retirement;
pub mod savings_goal;
pub mod weight_gain;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{CalculatorConfig, Category};
use crate::errors::{CalcError, CalcResult};
use crate::resolver::ValuesMap;
use crate::results::CalculatorResults;

pub use context::EvalContext;
pub use conversion::{ConversionSpec, ConversionTarget};

/// Identity of a shipped calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalculatorId {
    CompoundInterest,
    SavingsGoal,
    Retirement,
    WeightGain,
    FanegadasToHectares,
    ManzanasToHectares,
    VarasToMeters,
    MphToKmh,
}

impl CalculatorId {
    /// All calculators, in navigation order
    pub const ALL: [CalculatorId; 8] = [
        CalculatorId::CompoundInterest,
        CalculatorId::SavingsGoal,
        CalculatorId::Retirement,
        CalculatorId::WeightGain,
        CalculatorId::FanegadasToHectares,
        CalculatorId::ManzanasToHectares,
        CalculatorId::VarasToMeters,
        CalculatorId::MphToKmh,
    ];

    /// URL slug, also the config id and translation bundle name
    pub fn slug(&self) -> &'static str {
        match self {
            CalculatorId::CompoundInterest => compound_interest::SLUG,
            CalculatorId::SavingsGoal => savings_goal::SLUG,
            CalculatorId::Retirement => retirement::SLUG,
            CalculatorId::WeightGain => weight_gain::SLUG,
            CalculatorId::FanegadasToHectares => conversion::FANEGADAS_TO_HECTARES.slug,
            CalculatorId::ManzanasToHectares => conversion::MANZANAS_TO_HECTARES.slug,
            CalculatorId::VarasToMeters => conversion::VARAS_TO_METERS.slug,
            CalculatorId::MphToKmh => conversion::MPH_TO_KMH.slug,
        }
    }

    pub fn from_slug(slug: &str) -> CalcResult<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.slug() == slug)
            .ok_or_else(|| CalcError::unknown_calculator(slug))
    }

    pub fn category(&self) -> Category {
        match self {
            CalculatorId::CompoundInterest | CalculatorId::SavingsGoal | CalculatorId::Retirement => {
                Category::Financial
            }
            CalculatorId::WeightGain => Category::Health,
            _ => Category::Conversion,
        }
    }

    /// Conversion description, for the conversion family
    pub fn conversion(&self) -> Option<&'static ConversionSpec> {
        match self {
            CalculatorId::FanegadasToHectares => Some(&conversion::FANEGADAS_TO_HECTARES),
            CalculatorId::ManzanasToHectares => Some(&conversion::MANZANAS_TO_HECTARES),
            CalculatorId::VarasToMeters => Some(&conversion::VARAS_TO_METERS),
            CalculatorId::MphToKmh => Some(&conversion::MPH_TO_KMH),
            _ => None,
        }
    }

    pub fn config(&self) -> CalculatorConfig {
        match self {
            CalculatorId::CompoundInterest => compound_interest::config(),
            CalculatorId::SavingsGoal => savings_goal::config(),
            CalculatorId::Retirement => retirement::config(),
            CalculatorId::WeightGain => weight_gain::config(),
            CalculatorId::FanegadasToHectares => conversion::FANEGADAS_TO_HECTARES.config(),
            CalculatorId::ManzanasToHectares => conversion::MANZANAS_TO_HECTARES.config(),
            CalculatorId::VarasToMeters => conversion::VARAS_TO_METERS.config(),
            CalculatorId::MphToKmh => conversion::MPH_TO_KMH.config(),
        }
    }

    /// Per-calculator validity predicate over resolved values
    pub fn is_viable(&self, values: &ValuesMap) -> bool {
        match self {
            CalculatorId::CompoundInterest => compound_interest::is_viable(values),
            CalculatorId::SavingsGoal => savings_goal::is_viable(values),
            CalculatorId::Retirement => retirement::is_viable(values),
            CalculatorId::WeightGain => weight_gain::is_viable(values),
            other => other.conversion().is_some_and(|spec| spec.is_viable(values)),
        }
    }

    /// Evaluate resolved values. Callers go through [`crate::engine::calculate`].
    pub(crate) fn compute(&self, values: &ValuesMap, ctx: &EvalContext) -> CalcResult<CalculatorResults> {
        match self {
            CalculatorId::CompoundInterest => compound_interest::calculate(values, ctx),
            CalculatorId::SavingsGoal => savings_goal::calculate(values, ctx),
            CalculatorId::Retirement => retirement::calculate(values, ctx),
            CalculatorId::WeightGain => weight_gain::calculate(values, ctx),
            CalculatorId::FanegadasToHectares => conversion::FANEGADAS_TO_HECTARES.calculate(values, ctx),
            CalculatorId::ManzanasToHectares => conversion::MANZANAS_TO_HECTARES.calculate(values, ctx),
            CalculatorId::VarasToMeters => conversion::VARAS_TO_METERS.calculate(values, ctx),
            CalculatorId::MphToKmh => conversion::MPH_TO_KMH.calculate(values, ctx),
        }
    }
}

impl fmt::Display for CalculatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for CalculatorId {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slug(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_SCHEMA_VERSION;
    use crate::engine;
    use crate::i18n;
    use crate::resolver::{resolve, CalculationRequest};
    use crate::settings::EngineSettings;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_config_validates() {
        for id in CalculatorId::ALL {
            let config = id.config();
            assert_eq!(config.id, id.slug());
            assert_eq!(config.version, CONFIG_SCHEMA_VERSION);
            assert_eq!(config.category, id.category());
            config.validate().unwrap_or_else(|e| panic!("{}: {}", id, e));
        }
    }

    #[test]
    fn test_slug_round_trip() {
        for id in CalculatorId::ALL {
            assert_eq!(CalculatorId::from_slug(id.slug()).unwrap(), id);
            assert_eq!(id.to_string().parse::<CalculatorId>().unwrap(), id);
        }
        assert_eq!(
            CalculatorId::from_slug("mortgage").unwrap_err(),
            CalcError::unknown_calculator("mortgage")
        );
    }

    #[test]
    fn test_serde_uses_slug() {
        let json = serde_json::to_string(&CalculatorId::MphToKmh).unwrap();
        assert_eq!(json, "\"mph-to-kmh\"");
    }

    #[test]
    fn test_every_calculator_has_a_bundle() {
        let available = i18n::available();
        for id in CalculatorId::ALL {
            assert!(available.contains(&id.slug()), "{} has no translations", id);
        }
    }

    #[test]
    fn test_defaults_are_viable() {
        for id in CalculatorId::ALL {
            let values = resolve(&id.config(), &CalculationRequest::new()).unwrap();
            assert!(id.is_viable(&values), "{} defaults are not viable", id);
        }
    }

    /// Every valid result formats every declared result slot, and its chart and
    /// table records carry exactly the declared keys.
    #[test]
    fn test_results_match_config_shape() {
        let settings = EngineSettings::default();
        for id in CalculatorId::ALL {
            let config = id.config();
            for locale in ["en", "es"] {
                let request = CalculationRequest::new().with_locale(locale);
                let r = engine::calculate(id, &request, &settings).unwrap();
                assert!(r.is_valid, "{} invalid with defaults", id);
                assert!(!r.summary.is_empty());

                for spec in &config.results {
                    assert!(r.formatted.contains_key(&spec.id), "{} missing formatted {}", id, spec.id);
                }
                for key in r.values.keys() {
                    assert!(config.results.iter().any(|s| &s.id == key), "{} stray value {}", id, key);
                }

                if let Some(chart) = &config.chart {
                    let mut expected = chart.keys();
                    expected.sort_unstable();
                    assert!(!r.chart_data().is_empty());
                    for record in r.chart_data() {
                        let got: Vec<&str> = record.keys().map(String::as_str).collect();
                        assert_eq!(got, expected, "{} chart keys", id);
                        assert!(record.values().all(|v| v.is_finite()));
                    }
                    assert!(r.chart_data().len() <= settings.max_chart_points);
                }
                if let Some(table) = &config.table {
                    let mut expected: Vec<&str> = table.columns.iter().map(String::as_str).collect();
                    expected.sort_unstable();
                    for row in r.table_data() {
                        let got: Vec<&str> = row.keys().map(String::as_str).collect();
                        assert_eq!(got, expected, "{} table columns", id);
                    }
                    assert!(r.table_data().len() <= settings.max_table_rows);
                }
            }
        }
    }

    #[test]
    fn test_presets_resolve() {
        for id in CalculatorId::ALL {
            let config = id.config();
            for preset in &config.presets {
                let request = CalculationRequest::new().with_preset(preset.id.clone());
                let r = engine::calculate(id, &request, &EngineSettings::default()).unwrap();
                assert!(r.is_valid, "{} preset {} not viable", id, preset.id);
            }
        }
    }

    #[test]
    fn test_no_nan_in_formatted_output() {
        for id in CalculatorId::ALL {
            let r = engine::calculate(id, &CalculationRequest::new(), &EngineSettings::default()).unwrap();
            for (key, text) in &r.formatted {
                assert!(!text.contains("NaN") && !text.contains("inf"), "{}.{} = {}", id, key, text);
            }
        }
    }
}
