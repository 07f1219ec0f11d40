//! ACA Forecaster CLI
//!
//! Offline tooling for household scenario files: validation and analysis planning.

use aca_forecaster::config::{coverage_year, ForecastConfig};
use aca_forecaster::household::{load_scenario, validate_household, Scenario};
use aca_forecaster::projection::{format_currency, AnalysisPlan, AnalysisRequest};
use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "aca_forecaster",
    about = "Household projection and subsidy forecasting for ACA marketplace plans"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a scenario file against the household rules
    Validate { scenario: PathBuf },

    /// Project the household and show the planned long-term analysis
    Plan {
        scenario: PathBuf,
        /// Configuration overrides (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Coverage year; defaults to the current enrollment year
        #[arg(long)]
        year: Option<i32>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Validate { scenario } => validate(&scenario),
        Command::Plan { scenario, config, year } => plan(&scenario, config, year),
    }
}

fn read_scenario(path: &Path) -> Result<Scenario> {
    load_scenario(path).with_context(|| format!("Failed to load scenario: {}", path.display()))
}

fn validate(path: &Path) -> Result<()> {
    let scenario = read_scenario(path)?;
    let errors = validate_household(&scenario.people, scenario.has_married_couple, &scenario.future_events);

    if errors.is_empty() {
        println!("{}: household is valid ({} members)", path.display(), scenario.people.len());
        return Ok(());
    }

    println!("{}: {} problem(s) found", path.display(), errors.len());
    for error in &errors {
        println!("  - {}", error);
    }
    anyhow::bail!("scenario is invalid")
}

fn plan(path: &Path, config_path: Option<PathBuf>, year: Option<i32>) -> Result<()> {
    let config = match config_path {
        Some(p) => ForecastConfig::from_json_path(&p)
            .with_context(|| format!("Failed to load config: {}", p.display()))?,
        None => ForecastConfig::from_default_path().context("Failed to load default config")?,
    };
    let scenario = read_scenario(path)?;

    let errors = validate_household(&scenario.people, scenario.has_married_couple, &scenario.future_events);
    if !errors.is_empty() {
        anyhow::bail!("scenario is invalid: {}", errors.join(" "));
    }

    let target_year =
        year.unwrap_or_else(|| coverage_year(Local::now().date_naive(), config.fallback_window_start_month));
    let request = AnalysisRequest {
        household: scenario.household(),
        future_events: scenario.future_events.clone(),
        income_range: scenario.income_range,
        coverage_year: target_year,
        place: scenario.place.clone(),
    };
    let plan = AnalysisPlan::build(&request, &config).context("Failed to plan analysis")?;

    println!("ACA Forecaster v{}", env!("CARGO_PKG_VERSION"));
    println!("======================\n");
    println!(
        "Location: {} ({}, {})",
        plan.place.zipcode, plan.place.county_name, plan.place.state
    );
    println!("Coverage year: {}", plan.coverage_year);
    println!();

    println!("{:>6} {:>7} {:>8}  {}", "Year", "Active", "Eligible", "Household");
    println!("{}", "-".repeat(60));
    for (year, header) in plan.years.iter().zip(&plan.headers) {
        println!(
            "{:>6} {:>7} {:>8}  {}",
            format!("+{}", year.offset),
            year.active_members().len(),
            if year.has_eligible_member() { "yes" } else { "no" },
            header
        );
    }

    let incomes: Vec<String> = plan.incomes.iter().map(|&i| format_currency(i as f64)).collect();
    println!("\nIncome levels ({}): {}", incomes.len(), incomes.join(", "));
    println!("Planned API calls: {}", plan.total_calls());
    if let Some(warning) = plan.preflight_warning(&config) {
        println!("\nWarning: {}", warning);
    }

    Ok(())
}
