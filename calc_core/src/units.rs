//! # Unit Conversion Table
//!
//! Static mapping of unit identifiers to canonical base-unit factors, grouped
//! by [`UnitFamily`]. Every conversion is routed through the family's base
//! unit, so two units of the same family can never disagree about the
//! quantity they describe.
//!
//! ## Base Units
//!
//! | Family   | Base unit | Example units                          |
//! |----------|-----------|----------------------------------------|
//! | weight   | kg        | g, lbs, oz, st                         |
//! | height   | m         | cm, in, ft                             |
//! | length   | m         | mm, km, yd, mi, vara                   |
//! | speed    | m/s       | kmh, mph, knots, fps                   |
//! | area     | m²        | ha, acre, fanegada, manzana, vara2     |
//! | currency | (none)    | display only, amounts are never converted |
//!
//! ## Example
//!
//! ```rust
//! use calc_core::units::{to_base, from_base, UnitFamily};
//!
//! let kg = to_base(150.0, "lbs", UnitFamily::Weight).unwrap();
//! assert!((kg - 68.0388555).abs() < 1e-6);
//!
//! let back = from_base(kg, "lbs", UnitFamily::Weight).unwrap();
//! assert!((back - 150.0).abs() < 1e-9);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

// ============================================================================
// Unit Families
// ============================================================================

/// A group of units sharing one canonical base unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitFamily {
    /// Mass, base kilograms
    Weight,
    /// Body height, base meters
    Height,
    /// Distance, base meters
    Length,
    /// Velocity, base meters per second
    Speed,
    /// Surface, base square meters
    Area,
    /// Money. Display only: amounts keep their value, only the glyph changes.
    Currency,
}

impl UnitFamily {
    /// All families
    pub const ALL: [UnitFamily; 6] = [
        UnitFamily::Weight,
        UnitFamily::Height,
        UnitFamily::Length,
        UnitFamily::Speed,
        UnitFamily::Area,
        UnitFamily::Currency,
    ];

    /// Identifier of the family's base unit
    pub fn base_unit(&self) -> &'static str {
        match self {
            UnitFamily::Weight => "kg",
            UnitFamily::Height => "m",
            UnitFamily::Length => "m",
            UnitFamily::Speed => "mps",
            UnitFamily::Area => "m2",
            UnitFamily::Currency => "USD",
        }
    }

    /// Lowercase name used in error messages and JSON
    pub fn code(&self) -> &'static str {
        match self {
            UnitFamily::Weight => "weight",
            UnitFamily::Height => "height",
            UnitFamily::Length => "length",
            UnitFamily::Speed => "speed",
            UnitFamily::Area => "area",
            UnitFamily::Currency => "currency",
        }
    }
}

impl fmt::Display for UnitFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// Factor Table
// ============================================================================

/// One registered unit: `value_in_base = value * factor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitDef {
    pub id: &'static str,
    pub family: UnitFamily,
    pub factor: f64,
}

const fn unit(id: &'static str, family: UnitFamily, factor: f64) -> UnitDef {
    UnitDef { id, family, factor }
}

/// Castilian vara in meters
pub const VARA_M: f64 = 0.8359;

/// Every dimensioned unit the engine knows about.
pub const UNIT_TABLE: &[UnitDef] = &[
    // Weight (kg)
    unit("kg", UnitFamily::Weight, 1.0),
    unit("g", UnitFamily::Weight, 0.001),
    unit("lbs", UnitFamily::Weight, 0.453_592_37),
    unit("oz", UnitFamily::Weight, 0.028_349_523_125),
    unit("st", UnitFamily::Weight, 6.350_293_18),
    // Height (m)
    unit("m", UnitFamily::Height, 1.0),
    unit("cm", UnitFamily::Height, 0.01),
    unit("in", UnitFamily::Height, 0.0254),
    unit("ft", UnitFamily::Height, 0.3048),
    // Length (m)
    unit("m", UnitFamily::Length, 1.0),
    unit("mm", UnitFamily::Length, 0.001),
    unit("cm", UnitFamily::Length, 0.01),
    unit("km", UnitFamily::Length, 1000.0),
    unit("in", UnitFamily::Length, 0.0254),
    unit("ft", UnitFamily::Length, 0.3048),
    unit("yd", UnitFamily::Length, 0.9144),
    unit("mi", UnitFamily::Length, 1609.344),
    unit("vara", UnitFamily::Length, VARA_M),
    // Speed (m/s)
    unit("mps", UnitFamily::Speed, 1.0),
    unit("kmh", UnitFamily::Speed, 1.0 / 3.6),
    unit("mph", UnitFamily::Speed, 0.447_04),
    unit("knots", UnitFamily::Speed, 1852.0 / 3600.0),
    unit("fps", UnitFamily::Speed, 0.3048),
    // Area (m²)
    unit("m2", UnitFamily::Area, 1.0),
    unit("ha", UnitFamily::Area, 10_000.0),
    unit("km2", UnitFamily::Area, 1_000_000.0),
    unit("acre", UnitFamily::Area, 4_046.856_422_4),
    unit("ft2", UnitFamily::Area, 0.092_903_04),
    unit("fanegada", UnitFamily::Area, 6_400.0),
    unit("manzana", UnitFamily::Area, 6_987.4),
    unit("vara2", UnitFamily::Area, VARA_M * VARA_M),
];

static UNIT_INDEX: Lazy<HashMap<(UnitFamily, &'static str), f64>> = Lazy::new(|| {
    UNIT_TABLE
        .iter()
        .map(|def| ((def.family, def.id), def.factor))
        .collect()
});

/// Currency code → glyph. Codes missing here render with `"$"`.
static CURRENCY_SYMBOLS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("USD", "$"),
        ("EUR", "€"),
        ("GBP", "£"),
        ("JPY", "¥"),
        ("INR", "₹"),
        ("BRL", "R$"),
        ("MXN", "$"),
        ("COP", "$"),
        ("ARS", "$"),
        ("CLP", "$"),
        ("CAD", "$"),
        ("AUD", "$"),
        ("CRC", "₡"),
        ("NIO", "C$"),
        ("HNL", "L"),
        ("GTQ", "Q"),
        ("PEN", "S/"),
        ("CHF", "CHF "),
    ])
});

/// Default currency code when a field has no selection
pub const DEFAULT_CURRENCY: &str = "USD";

/// Conversion factor of `unit` relative to the family's base unit.
pub fn factor(unit: &str, family: UnitFamily) -> CalcResult<f64> {
    UNIT_INDEX
        .get(&(family, unit))
        .copied()
        .ok_or_else(|| CalcError::unknown_unit(unit, family.code()))
}

/// Whether `unit` may be used with `family`.
///
/// Currency accepts any code; unknown codes simply fall back to `"$"` for
/// display.
pub fn is_registered(unit: &str, family: UnitFamily) -> bool {
    match family {
        UnitFamily::Currency => !unit.trim().is_empty(),
        _ => UNIT_INDEX.contains_key(&(family, unit)),
    }
}

/// Units registered for a family, in table order.
pub fn units_of(family: UnitFamily) -> Vec<&'static str> {
    match family {
        UnitFamily::Currency => {
            let mut codes: Vec<_> = CURRENCY_SYMBOLS.keys().copied().collect();
            codes.sort_unstable();
            codes
        }
        _ => UNIT_TABLE
            .iter()
            .filter(|def| def.family == family)
            .map(|def| def.id)
            .collect(),
    }
}

/// Convert `value` expressed in `unit` to the family's base unit.
pub fn to_base(value: f64, unit: &str, family: UnitFamily) -> CalcResult<f64> {
    match family {
        UnitFamily::Currency => Ok(value),
        _ => Ok(value * factor(unit, family)?),
    }
}

/// Convert a base-unit `value` back to `unit`.
pub fn from_base(value: f64, unit: &str, family: UnitFamily) -> CalcResult<f64> {
    match family {
        UnitFamily::Currency => Ok(value),
        _ => Ok(value / factor(unit, family)?),
    }
}

/// Convert between two units of the same family via the base unit.
pub fn convert(value: f64, from: &str, to: &str, family: UnitFamily) -> CalcResult<f64> {
    from_base(to_base(value, from, family)?, to, family)
}

/// Glyph for a currency code, `"$"` when unknown.
pub fn currency_symbol(code: &str) -> &'static str {
    CURRENCY_SYMBOLS
        .get(code.trim().to_uppercase().as_str())
        .copied()
        .unwrap_or("$")
}

// ============================================================================
// Typed Quantities
// ============================================================================

/// Mass in kilograms
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilograms(pub f64);

/// Length in centimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Centimeters(pub f64);

/// Length in meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Area in square meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SquareMeters(pub f64);

/// Area in hectares
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hectares(pub f64);

impl From<Meters> for Centimeters {
    fn from(m: Meters) -> Self {
        Centimeters(m.0 * 100.0)
    }
}

impl From<Centimeters> for Meters {
    fn from(cm: Centimeters) -> Self {
        Meters(cm.0 / 100.0)
    }
}

impl From<SquareMeters> for Hectares {
    fn from(m2: SquareMeters) -> Self {
        Hectares(m2.0 / 10_000.0)
    }
}

impl From<Hectares> for SquareMeters {
    fn from(ha: Hectares) -> Self {
        SquareMeters(ha.0 * 10_000.0)
    }
}

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Kilograms);
impl_arithmetic!(Centimeters);
impl_arithmetic!(Meters);
impl_arithmetic!(SquareMeters);
impl_arithmetic!(Hectares);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_lbs_to_kg() {
        let kg = to_base(1.0, "lbs", UnitFamily::Weight).unwrap();
        assert_eq!(kg, 0.453_592_37);
    }

    #[test]
    fn test_fanegada_is_exactly_064_hectares() {
        let ha = convert(1.0, "fanegada", "ha", UnitFamily::Area).unwrap();
        assert_eq!(ha, 0.64);
    }

    #[test]
    fn test_mph_to_kmh() {
        let kmh = convert(60.0, "mph", "kmh", UnitFamily::Speed).unwrap();
        assert!((kmh - 96.56064).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_unit_is_deterministic_error() {
        let a = to_base(1.0, "furlong", UnitFamily::Length);
        let b = to_base(1.0, "furlong", UnitFamily::Length);
        assert_eq!(a, b);
        assert_eq!(a.unwrap_err().error_code(), "UNKNOWN_UNIT");
    }

    #[test]
    fn test_unit_registered_in_wrong_family() {
        // "vara" is a length, not an area
        assert!(to_base(1.0, "vara", UnitFamily::Area).is_err());
        assert!(is_registered("vara2", UnitFamily::Area));
    }

    #[test]
    fn test_currency_is_display_only() {
        assert_eq!(to_base(123.45, "EUR", UnitFamily::Currency).unwrap(), 123.45);
        assert_eq!(from_base(123.45, "XYZ", UnitFamily::Currency).unwrap(), 123.45);
        assert_eq!(currency_symbol("EUR"), "€");
        assert_eq!(currency_symbol("eur"), "€");
        assert_eq!(currency_symbol("XYZ"), "$");
    }

    #[test]
    fn test_units_of_family() {
        let speed = units_of(UnitFamily::Speed);
        assert_eq!(speed, vec!["mps", "kmh", "mph", "knots", "fps"]);
        assert!(units_of(UnitFamily::Currency).contains(&"USD"));
    }

    #[test]
    fn test_typed_conversions() {
        let cm: Centimeters = Meters(1.75).into();
        assert!((cm.0 - 175.0).abs() < 1e-9);
        let ha: Hectares = SquareMeters(6400.0).into();
        assert_eq!(ha.0, 0.64);
        assert_eq!((Kilograms(70.0) + Kilograms(2.5)).value(), 72.5);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&UnitFamily::Speed).unwrap();
        assert_eq!(json, "\"speed\"");
        let kg = Kilograms(72.5);
        assert_eq!(serde_json::to_string(&kg).unwrap(), "72.5");
    }

    proptest! {
        #[test]
        fn round_trip_every_registered_unit(x in -1.0e9f64..1.0e9f64) {
            for def in UNIT_TABLE {
                let base = to_base(x, def.id, def.family).unwrap();
                let back = from_base(base, def.id, def.family).unwrap();
                let tolerance = 1e-9 * x.abs().max(1.0);
                prop_assert!((back - x).abs() <= tolerance,
                    "{} ({}) round trip: {} -> {}", def.id, def.family, x, back);
            }
        }
    }
}
