//! # Error Types
//!
//! Structured error types for calc_core.
//!
//! Errors here describe *programming* or *integration* mistakes: a unit that a
//! config never registered, a preset id that does not exist, a summary
//! template that references a value nobody computed. Ordinary bad user input
//! is not an error at all; it produces [`CalculatorResults::invalid`].
//!
//! ## Example
//!
//! ```rust
//! use calc_core::errors::{CalcError, CalcResult};
//!
//! fn validate_rate(rate_pct: f64) -> CalcResult<()> {
//!     if !rate_pct.is_finite() {
//!         return Err(CalcError::InvalidInput {
//!             field: "annual_rate".to_string(),
//!             value: rate_pct.to_string(),
//!             reason: "Rate must be a finite number".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```
//!
//! [`CalculatorResults::invalid`]: crate::results::CalculatorResults::invalid

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for calc_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for engine operations.
///
/// Each variant carries enough context to locate the offending config,
/// field or template without a debugger.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (wrong type, out of range, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// A unit is not registered for the requested family
    #[error("Unknown unit '{unit}' for family {family}")]
    UnknownUnit { unit: String, family: String },

    /// No calculator is registered under the slug
    #[error("Unknown calculator: {slug}")]
    UnknownCalculator { slug: String },

    /// A preset id does not exist in the calculator config
    #[error("Preset '{preset}' not found in calculator '{calculator}'")]
    PresetNotFound { calculator: String, preset: String },

    /// A summary template references a placeholder with no computed value
    #[error("Unresolved placeholder '{{{placeholder}}}' in template")]
    UnresolvedPlaceholder { placeholder: String },

    /// A translation key or locale bundle is missing
    #[error("Translation missing: {key} ({locale})")]
    TranslationMissing { key: String, locale: String },

    /// A calculator config failed development-time validation
    #[error("Invalid config for '{calculator}': {reason}")]
    ConfigInvalid { calculator: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON/TOML serialization or deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create an UnknownUnit error
    pub fn unknown_unit(unit: impl Into<String>, family: impl Into<String>) -> Self {
        CalcError::UnknownUnit {
            unit: unit.into(),
            family: family.into(),
        }
    }

    /// Create an UnknownCalculator error
    pub fn unknown_calculator(slug: impl Into<String>) -> Self {
        CalcError::UnknownCalculator { slug: slug.into() }
    }

    /// Create a PresetNotFound error
    pub fn preset_not_found(calculator: impl Into<String>, preset: impl Into<String>) -> Self {
        CalcError::PresetNotFound {
            calculator: calculator.into(),
            preset: preset.into(),
        }
    }

    /// Create an UnresolvedPlaceholder error
    pub fn unresolved_placeholder(placeholder: impl Into<String>) -> Self {
        CalcError::UnresolvedPlaceholder {
            placeholder: placeholder.into(),
        }
    }

    /// Create a TranslationMissing error
    pub fn translation_missing(key: impl Into<String>, locale: impl Into<String>) -> Self {
        CalcError::TranslationMissing {
            key: key.into(),
            locale: locale.into(),
        }
    }

    /// Create a ConfigInvalid error
    pub fn config_invalid(calculator: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::ConfigInvalid {
            calculator: calculator.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        CalcError::SerializationError {
            reason: reason.into(),
        }
    }

    /// True for errors caused by the caller's request rather than by shipped
    /// configs or templates.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            CalcError::InvalidInput { .. }
                | CalcError::MissingField { .. }
                | CalcError::UnknownCalculator { .. }
                | CalcError::PresetNotFound { .. }
                | CalcError::UnknownUnit { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::UnknownUnit { .. } => "UNKNOWN_UNIT",
            CalcError::UnknownCalculator { .. } => "UNKNOWN_CALCULATOR",
            CalcError::PresetNotFound { .. } => "PRESET_NOT_FOUND",
            CalcError::UnresolvedPlaceholder { .. } => "UNRESOLVED_PLACEHOLDER",
            CalcError::TranslationMissing { .. } => "TRANSLATION_MISSING",
            CalcError::ConfigInvalid { .. } => "CONFIG_INVALID",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(e: serde_json::Error) -> Self {
        CalcError::serialization(e.to_string())
    }
}

impl From<toml::de::Error> for CalcError {
    fn from(e: toml::de::Error) -> Self {
        CalcError::serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::unknown_unit("furlong", "speed");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"UnknownUnit\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::missing_field("test").error_code(), "MISSING_FIELD");
        assert_eq!(CalcError::unknown_calculator("x").error_code(), "UNKNOWN_CALCULATOR");
        assert_eq!(CalcError::unresolved_placeholder("rate").error_code(), "UNRESOLVED_PLACEHOLDER");
    }

    #[test]
    fn test_placeholder_message_keeps_braces() {
        let e = CalcError::unresolved_placeholder("futureValue");
        assert_eq!(e.to_string(), "Unresolved placeholder '{futureValue}' in template");
    }

    #[test]
    fn test_request_errors() {
        assert!(CalcError::preset_not_found("savings-goal", "nope").is_request_error());
        assert!(!CalcError::config_invalid("x", "dup").is_request_error());
    }
}
