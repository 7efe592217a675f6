//! # Engine Entry Point
//!
//! One call evaluates one calculator:
//!
//! 1. resolve the request against the config (defaults, preset, units)
//! 2. check strict input bounds and the calculator's viability predicate
//! 3. pick the translation bundle and number locale
//! 4. run the compute function
//!
//! User-level problems (empty fields, a target below the current value)
//! produce [`CalculatorResults::invalid`]. `Err` is reserved for integration
//! mistakes such as an unknown preset or a unit the field does not allow.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::CalculatorId;
//! use calc_core::engine::calculate;
//! use calc_core::resolver::CalculationRequest;
//! use calc_core::settings::EngineSettings;
//!
//! let request = CalculationRequest::new().with_value("value", 60.0);
//! let result = calculate(CalculatorId::MphToKmh, &request, &EngineSettings::default()).unwrap();
//! assert!(result.is_valid);
//! assert_eq!(result.value("kmh"), Some(96.56));
//! ```

use crate::calculations::{CalculatorId, EvalContext};
use crate::errors::CalcResult;
use crate::i18n::{self, TranslationBundle};
use crate::format::NumberLocale;
use crate::resolver::{resolve_with_locale, CalculationRequest};
use crate::results::CalculatorResults;
use crate::settings::EngineSettings;

/// Evaluate calculator `id` for `request`.
pub fn calculate(
    id: CalculatorId,
    request: &CalculationRequest,
    settings: &EngineSettings,
) -> CalcResult<CalculatorResults> {
    let locale = request.locale.as_deref().unwrap_or(&settings.default_locale);
    let span = tracing::debug_span!("calculate", calculator = id.slug(), locale);
    let _enter = span.enter();

    let config = id.config();
    let values = resolve_with_locale(&config, request, NumberLocale::for_locale(locale))?;

    if !config.within_bounds(&values) || !id.is_viable(&values) {
        tracing::debug!("inputs not viable, returning invalid result");
        return Ok(CalculatorResults::invalid());
    }

    let bundle = translations(id, locale, request.t.as_ref())?;
    let ctx = EvalContext::new(&config, request, bundle, locale, settings);
    let result = id.compute(&values, &ctx)?;

    tracing::debug!(valid = result.is_valid, values = result.values.len(), "evaluation finished");
    Ok(result)
}

/// Evaluate by slug.
pub fn calculate_slug(
    slug: &str,
    request: &CalculationRequest,
    settings: &EngineSettings,
) -> CalcResult<CalculatorResults> {
    calculate(CalculatorId::from_slug(slug)?, request, settings)
}

/// Embedded bundle for the locale, with a request-supplied bundle layered on
/// top so a partial override keeps the shipped templates it does not replace.
fn translations(
    id: CalculatorId,
    locale: &str,
    explicit: Option<&TranslationBundle>,
) -> CalcResult<TranslationBundle> {
    let mut bundle = i18n::bundle(id.slug(), locale)?;
    if let Some(t) = explicit {
        bundle.values.extend(t.values.clone());
        bundle.formats.extend(t.formats.clone());
        if !t.locale.is_empty() {
            bundle.locale = t.locale.clone();
        }
    }
    Ok(bundle)
}
