//! # Calculator Results
//!
//! The engine's single output contract, and the builder every calculator uses
//! to assemble it.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "values": { "futureValue": 40387.39, "totalInterest": 30387.39 },
//!   "formatted": { "futureValue": "$40,387", "totalInterest": "$30,387" },
//!   "summary": "An initial investment of $10,000 ...",
//!   "isValid": true,
//!   "metadata": {
//!     "chartData": [ { "year": 1, "contributions": 10000, "principalInterest": 700, "interestOnInterest": 22.9 } ],
//!     "tableData": [ { "year": "1", "balance": "$10,723" } ]
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::format::round_to;

/// One point of a chart series, flat and numeric
pub type ChartRecord = BTreeMap<String, f64>;

/// One row of a breakdown table, already formatted for display
pub type TableRecord = BTreeMap<String, String>;

/// Visualization payloads attached to a valid result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chart_data: Vec<ChartRecord>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub table_data: Vec<TableRecord>,

    /// Quick-lookup cards (round-number conversions and the like)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_data: Vec<TableRecord>,
}

impl ResultMetadata {
    pub fn is_empty(&self) -> bool {
        self.chart_data.is_empty() && self.table_data.is_empty() && self.reference_data.is_empty()
    }
}

/// Output of one calculator evaluation.
///
/// `is_valid == false` always comes with empty `values`, empty `formatted`, an
/// empty summary and no metadata. Callers must read it as "no result to
/// show", never as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorResults {
    pub values: BTreeMap<String, f64>,
    pub formatted: BTreeMap<String, String>,
    pub summary: String,
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResultMetadata>,
}

impl CalculatorResults {
    /// The canonical invalid result
    pub fn invalid() -> Self {
        CalculatorResults::default()
    }

    pub fn value(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn formatted(&self, key: &str) -> Option<&str> {
        self.formatted.get(key).map(String::as_str)
    }

    pub fn chart_data(&self) -> &[ChartRecord] {
        self.metadata.as_ref().map(|m| m.chart_data.as_slice()).unwrap_or(&[])
    }

    pub fn table_data(&self) -> &[TableRecord] {
        self.metadata.as_ref().map(|m| m.table_data.as_slice()).unwrap_or(&[])
    }

    pub fn reference_data(&self) -> &[TableRecord] {
        self.metadata.as_ref().map(|m| m.reference_data.as_slice()).unwrap_or(&[])
    }
}

/// Collects the pieces of a valid result.
#[derive(Debug, Default)]
pub struct ResultsBuilder {
    values: BTreeMap<String, f64>,
    formatted: BTreeMap<String, String>,
    summary: String,
    metadata: ResultMetadata,
}

impl ResultsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value, kept at full precision. Non-finite values are dropped.
    pub fn value(mut self, key: &str, value: f64) -> Self {
        if value.is_finite() {
            self.values.insert(key.to_string(), value);
        }
        self
    }

    /// Headline value rounded to `decimals` places
    pub fn rounded(self, key: &str, value: f64, decimals: u32) -> Self {
        self.value(key, round_to(value, decimals))
    }

    pub fn formatted(mut self, key: &str, text: impl Into<String>) -> Self {
        self.formatted.insert(key.to_string(), text.into());
        self
    }

    /// Value and its display string in one call
    pub fn entry(self, key: &str, value: f64, decimals: u32, text: impl Into<String>) -> Self {
        self.rounded(key, value, decimals).formatted(key, text)
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn chart(mut self, records: Vec<ChartRecord>) -> Self {
        self.metadata.chart_data = records;
        self
    }

    pub fn table(mut self, rows: Vec<TableRecord>) -> Self {
        self.metadata.table_data = rows;
        self
    }

    pub fn reference(mut self, rows: Vec<TableRecord>) -> Self {
        self.metadata.reference_data = rows;
        self
    }

    pub fn build(self) -> CalculatorResults {
        CalculatorResults {
            values: self.values,
            formatted: self.formatted,
            summary: self.summary,
            is_valid: true,
            metadata: if self.metadata.is_empty() { None } else { Some(self.metadata) },
        }
    }
}

/// Build a chart record from `(key, value)` pairs
pub fn chart_record<const N: usize>(pairs: [(&str, f64); N]) -> ChartRecord {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

/// Build a table row from `(column, text)` pairs
pub fn table_record<const N: usize>(pairs: [(&str, String); N]) -> TableRecord {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}
