//! # Calcverse CLI
//!
//! Terminal front end for the calculator engine.
//!
//! ```text
//! calc_cli list
//! calc_cli describe compound-interest
//! calc_cli run compound-interest --set initial_investment=10000 --set years=20
//! calc_cli run weight-gain --set current_weight=154 --unit current_weight=lbs --locale es --json
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use calc_core::{
    calculate, load_settings, CalcError, CalcResult, CalculationRequest, CalculatorId, EngineSettings, RawValue,
};

#[derive(Parser)]
#[command(name = "calc_cli")]
#[command(about = "Run site calculators from the terminal", long_about = None)]
struct Cli {
    /// Engine settings file (TOML or JSON)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every calculator
    List,

    /// Print a calculator's config as JSON
    Describe {
        /// Calculator slug (e.g. "mph-to-kmh")
        slug: String,
    },

    /// Evaluate a calculator
    Run {
        /// Calculator slug
        slug: String,

        /// Field value, repeatable (e.g. --set annual_rate=7)
        #[arg(long = "set", value_name = "ID=VALUE")]
        values: Vec<String>,

        /// Field unit, repeatable (e.g. --unit current_weight=lbs)
        #[arg(long = "unit", value_name = "ID=UNIT")]
        units: Vec<String>,

        /// Preset to apply under explicit values
        #[arg(long)]
        preset: Option<String>,

        /// Locale code (defaults to the settings' locale)
        #[arg(long)]
        locale: Option<String>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = engine_settings(cli.settings.as_ref()).and_then(|settings| match cli.command {
        Commands::List => list_calculators(),
        Commands::Describe { slug } => describe(&slug),
        Commands::Run {
            slug,
            values,
            units,
            preset,
            locale,
            json,
        } => build_request(&values, &units, preset, locale)
            .and_then(|request| run(&slug, &request, &settings, json)),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        if let Ok(json) = serde_json::to_string_pretty(&e) {
            eprintln!("{}", json);
        }
        std::process::exit(1);
    }
}

fn engine_settings(path: Option<&PathBuf>) -> CalcResult<EngineSettings> {
    let settings = match path {
        Some(path) => {
            let settings = load_settings(path)?;
            tracing::debug!(path = %path.display(), "loaded engine settings");
            settings
        }
        None => EngineSettings::default(),
    };
    tracing::debug!(
        locale = %settings.default_locale,
        max_chart_points = settings.max_chart_points,
        max_table_rows = settings.max_table_rows,
        "engine settings"
    );
    Ok(settings)
}

fn list_calculators() -> CalcResult<()> {
    println!("{:<24} {:<12} {:>7}  {}", "SLUG", "CATEGORY", "VERSION", "UPDATED");
    for id in CalculatorId::ALL {
        let config = id.config();
        println!(
            "{:<24} {:<12} {:>7}  {}",
            id.slug(),
            config.category.display_name(),
            config.version,
            config.last_updated
        );
    }
    Ok(())
}

fn describe(slug: &str) -> CalcResult<()> {
    let config = CalculatorId::from_slug(slug)?.config();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Split `id=value`, rejecting pairs without an `=` or with an empty id.
fn split_pair<'a>(pair: &'a str, flag: &str) -> CalcResult<(&'a str, &'a str)> {
    match pair.split_once('=') {
        Some((id, value)) if !id.trim().is_empty() => Ok((id.trim(), value.trim())),
        _ => Err(CalcError::invalid_input(flag, pair, "Expected ID=VALUE")),
    }
}

/// Typed raw value from command-line text
fn parse_raw(text: &str) -> RawValue {
    if let Ok(b) = text.parse::<bool>() {
        return RawValue::Bool(b);
    }
    match text.parse::<f64>() {
        Ok(n) if n.is_finite() => RawValue::Number(n),
        _ => RawValue::Text(text.to_string()),
    }
}

fn build_request(
    values: &[String],
    units: &[String],
    preset: Option<String>,
    locale: Option<String>,
) -> CalcResult<CalculationRequest> {
    let mut request = CalculationRequest::new();
    for pair in values {
        let (id, value) = split_pair(pair, "--set")?;
        request = request.with_value(id, parse_raw(value));
    }
    for pair in units {
        let (id, unit) = split_pair(pair, "--unit")?;
        request = request.with_unit(id, unit);
    }
    if let Some(preset) = preset {
        request = request.with_preset(preset);
    }
    if let Some(locale) = locale {
        request = request.with_locale(locale);
    }
    Ok(request)
}

fn run(slug: &str, request: &CalculationRequest, settings: &EngineSettings, json: bool) -> CalcResult<()> {
    let id = CalculatorId::from_slug(slug)?;
    tracing::info!(calculator = %id, values = request.values.len(), "running calculator");
    let result = calculate(id, request, settings)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if !result.is_valid {
        println!("{}: inputs do not describe a computable case", id);
        return Ok(());
    }

    let config = id.config();
    let width = config.results.iter().map(|r| r.id.len()).max().unwrap_or(0);
    for spec in &config.results {
        let text = result.formatted(&spec.id).unwrap_or("");
        if text.is_empty() {
            continue;
        }
        let marker = if spec.primary { "*" } else { " " };
        println!("{} {:<width$}  {}", marker, spec.id, text, width = width);
    }
    println!();
    println!("{}", result.summary);
    Ok(())
}
