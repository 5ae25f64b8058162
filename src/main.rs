//! Cohort Projection CLI
//!
//! Command-line interface for calibrating variants and running projections

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

use cohort_projection::assumptions::{ScalePoint, TFR_DISPLAY_FACTOR};
use cohort_projection::population::load_index;
use cohort_projection::projection::ProjectionRow;
use cohort_projection::{ModelConfig, ProjectionConfig, ScenarioRunner};

#[derive(Parser, Debug)]
#[command(name = "cohort_projection", version, about = "Cohort-component population projection")]
struct Cli {
    #[arg(long, global = true, default_value = "data/male.csv", help = "Male population table")]
    male: PathBuf,
    #[arg(long, global = true, default_value = "data/female.csv", help = "Female population table")]
    female: PathBuf,
    #[arg(long, global = true, help = "JSON model configuration")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Project one variant forward and write the yearly series
    Project {
        #[arg(long)]
        variant: String,
        #[arg(long, allow_negative_numbers = true)]
        fertility_bias: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        fertility_slope: Option<f64>,
        #[arg(long)]
        survival_multiplier: Option<f64>,
        #[arg(long)]
        start_year: Option<i32>,
        #[arg(long)]
        end_year: Option<i32>,
        #[arg(long, default_value = "projection_output.csv")]
        output: PathBuf,
    },
    /// Print the calibration of every variant
    Calibrate {
        #[arg(long, help = "Output machine-readable JSON")]
        json: bool,
    },
    /// Write historical totals and mean ages per variant
    History {
        #[arg(long, default_value = "historical_output.csv")]
        output: PathBuf,
    },
}

#[derive(Debug, Serialize)]
struct HistoryRow<'a> {
    variant: &'a str,
    year: i32,
    total: f64,
    mean_age: f64,
}

#[derive(Debug, Serialize)]
struct CalibrationReport<'a> {
    variant: &'a str,
    base_fertility_scale: f64,
    base_tfr: f64,
    trend_intercept: f64,
    trend_slope: f64,
    fertility_years: usize,
    latest_tfr: Option<f64>,
    starting_population: f64,
    starting_mean_age: f64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let model = match &cli.config {
        Some(path) => ModelConfig::from_json_path(path)
            .with_context(|| format!("Failed to read configuration {}", path.display()))?,
        None => ModelConfig::default(),
    };

    let index = load_index(&cli.male, &cli.female).context("Failed to load population tables")?;
    let runner = ScenarioRunner::calibrate(&index, model.calibration.clone());

    match cli.command {
        Commands::Project {
            variant,
            fertility_bias,
            fertility_slope,
            survival_multiplier,
            start_year,
            end_year,
            output,
        } => {
            let config = ProjectionConfig {
                fertility_bias: fertility_bias.unwrap_or(model.projection.fertility_bias),
                fertility_slope: fertility_slope.unwrap_or(model.projection.fertility_slope),
                survival_multiplier: survival_multiplier.unwrap_or(model.projection.survival_multiplier),
                start_year: start_year.unwrap_or(model.projection.start_year),
                end_year: end_year.unwrap_or(model.projection.end_year),
                ..model.projection.clone()
            };
            project(&runner, &variant, &config, &output)
        }
        Commands::Calibrate { json } => calibrate(&runner, json),
        Commands::History { output } => history(&runner, &output),
    }
}

fn project(runner: &ScenarioRunner, variant: &str, config: &ProjectionConfig, path: &Path) -> anyhow::Result<()> {
    let result = runner.run(variant, config)?;

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Unable to create {}", path.display()))?;
    for row in result.rows() {
        writer.serialize(row)?;
    }
    writer.flush()?;

    println!("Projection of {} ({} years) written to {}", variant, result.len(), path.display());
    println!("{:>6} {:>16} {:>9} {:>8}", "Year", "Population", "MeanAge", "TFR");
    println!("{}", "-".repeat(42));
    for (row, point) in result.rows().zip(result.fertility_path()) {
        if row.year % 25 == 0 || row.year == config.start_year {
            print_row(&row, &point);
        }
    }

    let summary = result.summary();
    println!("\nSummary:");
    println!("  Final Population: {:.0}", summary.final_total);
    println!("  Final Mean Age: {:.2}", summary.final_mean_age);
    if let Some(year) = summary.peak_year {
        println!("  Peak Population: {:.0} in {}", summary.peak_total, year);
    }
    Ok(())
}

fn print_row(row: &ProjectionRow, point: &ScalePoint) {
    println!("{:>6} {:>16.0} {:>9.2} {:>8.3}", row.year, row.total, row.mean_age, point.tfr());
}

fn calibrate(runner: &ScenarioRunner, json: bool) -> anyhow::Result<()> {
    let reports: Vec<CalibrationReport> = runner
        .calibrations()
        .map(|c| CalibrationReport {
            variant: &c.variant,
            base_fertility_scale: c.assumptions.base_fertility_scale,
            base_tfr: c.assumptions.base_fertility_scale * TFR_DISPLAY_FACTOR,
            trend_intercept: c.fertility_trend.intercept,
            trend_slope: c.fertility_trend.slope,
            fertility_years: c.fertility_series.len(),
            latest_tfr: c.fertility_series.last().map(ScalePoint::tfr),
            starting_population: c.starting_population.total_persons(),
            starting_mean_age: c.starting_population.mean_age(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    println!(
        "{:<12} {:>10} {:>8} {:>12} {:>6} {:>16} {:>9}",
        "Variant", "BaseScale", "BaseTFR", "TrendSlope", "Years", "StartPop", "MeanAge"
    );
    println!("{}", "-".repeat(80));
    for r in &reports {
        println!(
            "{:<12} {:>10.5} {:>8.3} {:>12.6} {:>6} {:>16.0} {:>9.2}",
            r.variant,
            r.base_fertility_scale,
            r.base_tfr,
            r.trend_slope,
            r.fertility_years,
            r.starting_population,
            r.starting_mean_age
        );
    }
    Ok(())
}

fn history(runner: &ScenarioRunner, path: &Path) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Unable to create {}", path.display()))?;

    let mut rows = 0;
    for calibration in runner.calibrations() {
        let totals = runner
            .historical_totals()
            .get(&calibration.variant)
            .map(Vec::as_slice)
            .unwrap_or_default();
        // Both series come from the same observed years
        for (total, mean) in totals.iter().zip(&calibration.mean_ages) {
            writer.serialize(HistoryRow {
                variant: &calibration.variant,
                year: total.year,
                total: total.total,
                mean_age: mean.mean_age,
            })?;
            rows += 1;
        }
    }
    writer.flush()?;

    println!("{} historical rows written to {}", rows, path.display());
    Ok(())
}
