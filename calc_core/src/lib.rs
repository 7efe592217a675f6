//! # calc_core - Calculator Engine
//!
//! `calc_core` evaluates the site's calculators: it normalizes raw form input
//! into base units, runs the calculator's formulas and assembles one result
//! with raw values, localized display strings, a summary sentence and
//! optional chart/table metadata. All inputs and outputs are
//! JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: every call is a pure function of config, request and settings
//! - **Config as data**: calculators are described by [`config::CalculatorConfig`]
//! - **Invalid is not an error**: bad user input yields [`CalculatorResults::invalid`]
//! - **Rich Errors**: integration mistakes are structured [`CalcError`]s
//!
//! ## Quick Start
//!
//! ```rust
//! use calc_core::{calculate, CalculationRequest, CalculatorId, EngineSettings};
//!
//! let request = CalculationRequest::new()
//!     .with_value("value", 25.0)
//!     .with_locale("en");
//!
//! let result = calculate(CalculatorId::FanegadasToHectares, &request, &EngineSettings::default()).unwrap();
//! assert_eq!(result.value("acres"), Some(39.54));
//!
//! let json = serde_json::to_string_pretty(&result).unwrap();
//! assert!(json.contains("\"isValid\": true"));
//! ```
//!
//! ## Modules
//!
//! - [`units`] - Unit table, base-unit conversion, currency glyphs
//! - [`config`] - Calculator configuration schema and validation
//! - [`resolver`] - Defaults, presets, unit normalization and `show_when`
//! - [`equations`] - Compound growth formulas and goal-seeking simulation
//! - [`calculations`] - The shipped calculators and their registry
//! - [`format`] - Localized number, currency and template formatting
//! - [`results`] - Result contract and builder
//! - [`i18n`] - Embedded translation bundles
//! - [`settings`] - Engine settings with atomic save
//! - [`engine`] - The evaluation entry point
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod config;
pub mod engine;
pub mod equations;
pub mod errors;
pub mod format;
pub mod i18n;
pub mod resolver;
pub mod results;
pub mod settings;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::CalculatorId;
pub use config::CalculatorConfig;
pub use engine::{calculate, calculate_slug};
pub use errors::{CalcError, CalcResult};
pub use resolver::{CalculationRequest, Field, FieldValue, RawValue, ValuesMap};
pub use results::CalculatorResults;
pub use settings::{load_settings, save_settings, EngineSettings};
