//! # Unit Conversion Calculators
//!
//! Every conversion page is one [`ConversionSpec`]: a unit family, the source
//! unit the user types in, and the target units to show. The only scalar in
//! play is each unit's factor in [`crate::units`]; the user's value is stored
//! in base units by the resolver and every target is derived from that.
//!
//! ## Metadata
//!
//! - `referenceData`: fixed quick-lookup inputs (1, 5, 10, 50, 100)
//! - `tableData`: common magnitudes plus the user's value, deduplicated and sorted
//! - `chartData`: the primary target for each reference input

use chrono::NaiveDate;

use super::context::EvalContext;
use crate::config::{CalculatorConfig, Category, ChartKind, ChartSpec, DetailedTableSpec, InputSpec, ResultKind, ResultSpec};
use crate::errors::CalcResult;
use crate::format::Placeholders;
use crate::resolver::ValuesMap;
use crate::results::{ChartRecord, CalculatorResults, ResultsBuilder, TableRecord};
use crate::units::{self, UnitFamily};

/// Inputs shown in the quick-lookup cards
pub const REFERENCE_INPUTS: [f64; 5] = [1.0, 5.0, 10.0, 50.0, 100.0];

/// Key of the source column in tables and charts
const INPUT_KEY: &str = "input";

/// One output of a conversion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionTarget {
    /// Registered unit id
    pub unit: &'static str,
    /// Result id and table column
    pub key: &'static str,
    pub decimals: u8,
}

/// Static description of one conversion page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionSpec {
    pub slug: &'static str,
    pub family: UnitFamily,
    pub source: &'static str,
    pub default_value: f64,
    /// First target is the headline result
    pub targets: &'static [ConversionTarget],
    /// Rows of the full conversion table, in source units
    pub common: &'static [f64],
    pub last_updated: (i32, u32, u32),
}

pub const FANEGADAS_TO_HECTARES: ConversionSpec = ConversionSpec {
    slug: "fanegadas-to-hectares",
    family: UnitFamily::Area,
    source: "fanegada",
    default_value: 1.0,
    targets: &[
        ConversionTarget { unit: "ha", key: "hectares", decimals: 4 },
        ConversionTarget { unit: "acre", key: "acres", decimals: 2 },
        ConversionTarget { unit: "m2", key: "squareMeters", decimals: 2 },
        ConversionTarget { unit: "manzana", key: "manzanas", decimals: 4 },
    ],
    common: &[0.5, 1.0, 2.0, 3.0, 5.0, 10.0, 20.0, 25.0, 50.0, 100.0],
    last_updated: (2025, 3, 10),
};

pub const MANZANAS_TO_HECTARES: ConversionSpec = ConversionSpec {
    slug: "manzanas-to-hectares",
    family: UnitFamily::Area,
    source: "manzana",
    default_value: 1.0,
    targets: &[
        ConversionTarget { unit: "ha", key: "hectares", decimals: 4 },
        ConversionTarget { unit: "acre", key: "acres", decimals: 2 },
        ConversionTarget { unit: "m2", key: "squareMeters", decimals: 2 },
        ConversionTarget { unit: "vara2", key: "squareVaras", decimals: 0 },
    ],
    common: &[0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0],
    last_updated: (2025, 3, 10),
};

pub const VARAS_TO_METERS: ConversionSpec = ConversionSpec {
    slug: "varas-to-meters",
    family: UnitFamily::Length,
    source: "vara",
    default_value: 1.0,
    targets: &[
        ConversionTarget { unit: "m", key: "meters", decimals: 4 },
        ConversionTarget { unit: "ft", key: "feet", decimals: 2 },
        ConversionTarget { unit: "yd", key: "yards", decimals: 2 },
        ConversionTarget { unit: "cm", key: "centimeters", decimals: 1 },
    ],
    common: &[1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0, 500.0, 1_000.0],
    last_updated: (2025, 2, 3),
};

pub const MPH_TO_KMH: ConversionSpec = ConversionSpec {
    slug: "mph-to-kmh",
    family: UnitFamily::Speed,
    source: "mph",
    default_value: 60.0,
    targets: &[
        ConversionTarget { unit: "kmh", key: "kmh", decimals: 2 },
        ConversionTarget { unit: "mps", key: "metersPerSecond", decimals: 2 },
        ConversionTarget { unit: "knots", key: "knots", decimals: 2 },
    ],
    common: &[10.0, 20.0, 25.0, 30.0, 40.0, 50.0, 55.0, 60.0, 65.0, 70.0, 75.0, 80.0, 100.0],
    last_updated: (2025, 1, 15),
};

/// Field id of the single input
pub const VALUE_FIELD: &str = "value";

impl ConversionSpec {
    pub fn primary(&self) -> &ConversionTarget {
        &self.targets[0]
    }

    pub fn config(&self) -> CalculatorConfig {
        let (y, m, d) = self.last_updated;
        let updated = NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
        let columns: Vec<&str> = std::iter::once(INPUT_KEY).chain(self.targets.iter().map(|t| t.key)).collect();

        let mut config = CalculatorConfig::new(self.slug, Category::Conversion, updated)
            .input(
                InputSpec::number(VALUE_FIELD, self.default_value)
                    .range(0.0, 1_000_000_000.0)
                    .with_units(self.family, self.source, &[self.source]),
            )
            .chart(ChartSpec::new(ChartKind::Bar, INPUT_KEY, &[self.primary().key]))
            .table(DetailedTableSpec::new(&columns));

        for (i, target) in self.targets.iter().enumerate() {
            let spec = ResultSpec::new(target.key, ResultKind::Number).decimals(target.decimals);
            config = config.result(if i == 0 { spec.primary() } else { spec });
        }
        config
    }

    pub fn is_viable(&self, values: &ValuesMap) -> bool {
        values.number(VALUE_FIELD).is_some_and(|v| v >= 0.0)
    }

    /// Convert a value typed in the source unit into `target`.
    pub fn convert(&self, source_value: f64, target: &ConversionTarget) -> CalcResult<f64> {
        units::convert(source_value, self.source, target.unit, self.family)
    }

    /// One row: the source amount and every target, formatted.
    fn row(&self, source_value: f64, ctx: &EvalContext) -> CalcResult<TableRecord> {
        let mut row = TableRecord::new();
        row.insert(INPUT_KEY.to_string(), ctx.quantity(source_value, 4, self.source));
        for target in self.targets {
            let converted = self.convert(source_value, target)?;
            row.insert(
                target.key.to_string(),
                ctx.quantity(converted, usize::from(target.decimals), target.unit),
            );
        }
        Ok(row)
    }

    pub fn calculate(&self, values: &ValuesMap, ctx: &EvalContext) -> CalcResult<CalculatorResults> {
        let Some(base) = values.number(VALUE_FIELD).filter(|v| *v >= 0.0) else {
            return Ok(CalculatorResults::invalid());
        };
        let input = units::from_base(base, self.source, self.family)?;

        let mut builder = ResultsBuilder::new();
        for target in self.targets {
            let converted = units::from_base(base, target.unit, self.family)?;
            let text = ctx.quantity(converted, usize::from(target.decimals), target.unit);
            builder = builder.entry(target.key, converted, u32::from(target.decimals), text);
        }

        let reference = REFERENCE_INPUTS
            .iter()
            .map(|v| self.row(*v, ctx))
            .collect::<CalcResult<Vec<_>>>()?;

        let mut magnitudes: Vec<f64> = self.common.to_vec();
        magnitudes.push(input);
        magnitudes.sort_by(f64::total_cmp);
        magnitudes.dedup_by(|a, b| (*a - *b).abs() <= 1e-9 * b.abs().max(1.0));
        let table = magnitudes
            .into_iter()
            .take(ctx.settings.max_table_rows)
            .map(|v| self.row(v, ctx))
            .collect::<CalcResult<Vec<_>>>()?;

        let primary = self.primary();
        let mut chart = Vec::with_capacity(REFERENCE_INPUTS.len());
        for v in REFERENCE_INPUTS {
            let mut record = ChartRecord::new();
            record.insert(INPUT_KEY.to_string(), v);
            record.insert(
                primary.key.to_string(),
                crate::format::round_to(self.convert(v, primary)?, u32::from(primary.decimals)),
            );
            chart.push(record);
        }

        let headline = units::from_base(base, primary.unit, self.family)?;
        let placeholders = Placeholders::new()
            .set("input", ctx.quantity(input, 4, self.source))
            .set("result", ctx.quantity(headline, usize::from(primary.decimals), primary.unit));
        // verb agreement for a single source unit
        let summary = if crate::format::round_to(input, 4) == 1.0 && ctx.bundle.formats.contains_key("summaryOne") {
            ctx.fill("summaryOne", &placeholders)?
        } else {
            ctx.summary(&placeholders)?
        };

        Ok(builder
            .summary(summary)
            .reference(reference)
            .table(table)
            .chart(chart)
            .build())
    }
}
