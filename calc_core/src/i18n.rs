//! # Translation Bundles
//!
//! Each calculator ships one TOML file under `calc_core/i18n/`, keyed by
//! locale and then by section:
//!
//! ```toml
//! [en.values]
//! years = "years"
//!
//! [en.formats]
//! summary = "Your {initial} grows to {futureValue}."
//! ```
//!
//! The engine only reads two sections: `values` (a string glossary for unit
//! and label words) and `formats` (summary templates). Everything else a page
//! needs is presentation metadata and lives outside this crate.
//!
//! Files are embedded at compile time and parsed once on first use.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Locale every bundle must provide
pub const FALLBACK_LOCALE: &str = "en";

/// Glossary plus templates for one calculator in one locale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationBundle {
    /// Locale code this bundle was resolved for
    #[serde(default)]
    pub locale: String,
    #[serde(default)]
    pub values: BTreeMap<String, String>,
    #[serde(default)]
    pub formats: BTreeMap<String, String>,
}

impl TranslationBundle {
    /// Glossary word, or the key itself when the bundle lacks it.
    pub fn label<'a>(&'a self, key: &'a str) -> &'a str {
        self.values.get(key).map(String::as_str).unwrap_or(key)
    }

    /// Label agreeing with `count`: the `<key>.one` entry when `count` is
    /// exactly one and the bundle has it, the plain label otherwise.
    pub fn counted_label<'a>(&'a self, key: &'a str, count: f64) -> &'a str {
        if count == 1.0 {
            if let Some(one) = self.values.get(&format!("{}.one", key)) {
                return one;
            }
        }
        self.label(key)
    }

    /// A named template from `formats`.
    pub fn template(&self, name: &str) -> CalcResult<&str> {
        self.formats
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| CalcError::translation_missing(format!("formats.{}", name), self.locale.clone()))
    }

    /// The summary template
    pub fn summary(&self) -> CalcResult<&str> {
        self.template("summary")
    }

    /// Label shown for undefined metrics (Rule of 72 at 0 %, etc.)
    pub fn not_applicable(&self) -> &str {
        self.values.get("notApplicable").map(String::as_str).unwrap_or("N/A")
    }
}

#[derive(Debug, Deserialize)]
struct LocaleSection {
    #[serde(default)]
    values: BTreeMap<String, String>,
    #[serde(default)]
    formats: BTreeMap<String, String>,
}

type LocaleTable = HashMap<String, LocaleSection>;

const SOURCES: &[(&str, &str)] = &[
    ("compound-interest", include_str!("../i18n/compound-interest.toml")),
    ("savings-goal", include_str!("../i18n/savings-goal.toml")),
    ("retirement", include_str!("../i18n/retirement.toml")),
    ("weight-gain", include_str!("../i18n/weight-gain.toml")),
    ("fanegadas-to-hectares", include_str!("../i18n/fanegadas-to-hectares.toml")),
    ("manzanas-to-hectares", include_str!("../i18n/manzanas-to-hectares.toml")),
    ("varas-to-meters", include_str!("../i18n/varas-to-meters.toml")),
    ("mph-to-kmh", include_str!("../i18n/mph-to-kmh.toml")),
];

static TABLES: Lazy<HashMap<&'static str, Result<LocaleTable, String>>> = Lazy::new(|| {
    SOURCES
        .iter()
        .map(|(slug, src)| (*slug, toml::from_str::<LocaleTable>(src).map_err(|e| e.to_string())))
        .collect()
});

/// Slugs with an embedded bundle
pub fn available() -> Vec<&'static str> {
    SOURCES.iter().map(|(slug, _)| *slug).collect()
}

/// Locales available for a calculator, sorted.
pub fn locales(slug: &str) -> CalcResult<Vec<String>> {
    let table = table(slug)?;
    let mut locales: Vec<String> = table.keys().cloned().collect();
    locales.sort();
    Ok(locales)
}

fn table(slug: &str) -> CalcResult<&'static LocaleTable> {
    match TABLES.get(slug) {
        Some(Ok(table)) => Ok(table),
        Some(Err(reason)) => Err(CalcError::serialization(format!("i18n/{}.toml: {}", slug, reason))),
        None => Err(CalcError::translation_missing(slug, FALLBACK_LOCALE)),
    }
}

/// Resolve the bundle for `slug` in `locale`.
///
/// Tries the exact tag (`es-MX`), then its language (`es`), then
/// [`FALLBACK_LOCALE`]. Keys missing from the chosen locale are filled from
/// the fallback locale so a partial translation still yields complete
/// templates.
pub fn bundle(slug: &str, locale: &str) -> CalcResult<TranslationBundle> {
    let table = table(slug)?;
    let language = locale.split(['-', '_']).next().unwrap_or(locale);

    let (chosen, section) = [locale, language, FALLBACK_LOCALE]
        .into_iter()
        .find_map(|code| table.get(code).map(|s| (code, s)))
        .ok_or_else(|| CalcError::translation_missing(slug, locale))?;

    let mut values = BTreeMap::new();
    let mut formats = BTreeMap::new();
    if chosen != FALLBACK_LOCALE {
        if let Some(base) = table.get(FALLBACK_LOCALE) {
            values.extend(base.values.clone());
            formats.extend(base.formats.clone());
        }
    } else if locale != FALLBACK_LOCALE {
        tracing::debug!(calculator = slug, locale, "no translation, using fallback locale");
    }
    values.extend(section.values.clone());
    formats.extend(section.formats.clone());

    Ok(TranslationBundle {
        locale: chosen.to_string(),
        values,
        formats,
    })
}

/// Placeholder names in a template, in order of appearance.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                names.push(&after[..close]);
                rest = &after[close + 1..];
            }
            None => break,
        }
    }
    names
}
