//! Scenario runner for repeated projections over calibrated variants
//!
//! Calibrates every variant once (starting pyramid, survival, fertility),
//! then runs as many projections as needed against that cache. Changing a
//! projection parameter never refits anything.

use log::{debug, info};
use rayon::prelude::*;
use std::collections::BTreeMap;

use crate::assumptions::{
    base_fertility_scale, fertility_scale_series, fit_fertility_trend, fit_survival, Assumptions,
    FertilityScaleSeries, FertilityTrend,
};
use crate::config::CalibrationSettings;
use crate::error::{ModelError, Result};
use crate::population::{historical_totals, mean_age_series, MeanAgePoint, PopulationIndex, PopulationPyramid, TotalPoint};
use crate::projection::{ProjectionConfig, ProjectionEngine, ProjectionOutput};

/// Everything fitted from history for one variant
#[derive(Debug, Clone)]
pub struct Calibration {
    pub variant: String,
    pub starting_population: PopulationPyramid,
    pub assumptions: Assumptions,
    pub fertility_series: FertilityScaleSeries,
    pub fertility_trend: FertilityTrend,
    pub mean_ages: Vec<MeanAgePoint>,
}

impl Calibration {
    /// Fit one variant
    ///
    /// The base fertility scale prefers `baseline` at the base-scale year and
    /// falls back to the variant's own series.
    pub fn fit(
        index: &PopulationIndex,
        variant: &str,
        settings: &CalibrationSettings,
        baseline: Option<&FertilityScaleSeries>,
    ) -> Self {
        let survival = fit_survival(index, variant, settings.survival_start_year, settings.survival_end_year);
        let fertility_series = fertility_scale_series(index, variant);
        let fertility_trend = fit_fertility_trend(index, variant, settings.trend_start_year, settings.trend_end_year);
        let base_scale = base_fertility_scale(baseline, &fertility_series, settings.base_scale_year);

        debug!(
            "Calibrated {}: {} fertility years, trend slope {:.6}",
            variant,
            fertility_series.len(),
            fertility_trend.slope
        );

        Self {
            variant: variant.to_string(),
            starting_population: index.population(variant, settings.pyramid_year),
            assumptions: Assumptions::new(survival, base_scale),
            fertility_series,
            fertility_trend,
            mean_ages: mean_age_series(index, variant),
        }
    }
}

/// Pre-calibrated scenario runner for efficient repeated projections
///
/// # Example
/// ```ignore
/// let index = load_index("male.csv", "female.csv")?;
/// let runner = ScenarioRunner::calibrate(&index, CalibrationSettings::default());
///
/// for bias in [-0.5, 0.0, 0.5] {
///     let config = ProjectionConfig { fertility_bias: bias, ..Default::default() };
///     let output = runner.run("Medium", &config)?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    settings: CalibrationSettings,
    calibrations: BTreeMap<String, Calibration>,
    historical_totals: BTreeMap<String, Vec<TotalPoint>>,
}

impl ScenarioRunner {
    /// Calibrate every variant in `index`
    pub fn calibrate(index: &PopulationIndex, settings: CalibrationSettings) -> Self {
        let variants = index.variants();
        info!("Calibrating {} variants", variants.len());

        let baseline = index
            .has_variant(&settings.baseline_variant)
            .then(|| fertility_scale_series(index, &settings.baseline_variant));

        let calibrations: BTreeMap<String, Calibration> = variants
            .par_iter()
            .map(|variant| {
                let calibration = Calibration::fit(index, variant, &settings, baseline.as_ref());
                (variant.clone(), calibration)
            })
            .collect();

        Self {
            settings,
            calibrations,
            historical_totals: historical_totals(index),
        }
    }

    pub fn settings(&self) -> &CalibrationSettings {
        &self.settings
    }

    pub fn variants(&self) -> impl Iterator<Item = &str> {
        self.calibrations.keys().map(String::as_str)
    }

    pub fn calibrations(&self) -> impl Iterator<Item = &Calibration> {
        self.calibrations.values()
    }

    pub fn calibration(&self, variant: &str) -> Result<&Calibration> {
        self.calibrations
            .get(variant)
            .ok_or_else(|| ModelError::UnknownVariant(variant.to_string()))
    }

    /// Fertility series of the baseline variant, if it was in the data
    pub fn baseline_series(&self) -> Option<&FertilityScaleSeries> {
        self.calibrations
            .get(&self.settings.baseline_variant)
            .map(|c| &c.fertility_series)
    }

    /// Historical totals per variant, in persons
    pub fn historical_totals(&self) -> &BTreeMap<String, Vec<TotalPoint>> {
        &self.historical_totals
    }

    /// Run a single projection for `variant`
    pub fn run(&self, variant: &str, config: &ProjectionConfig) -> Result<ProjectionOutput> {
        let calibration = self.calibration(variant)?;
        let engine = ProjectionEngine::new(calibration.assumptions.clone(), config.clone());
        Ok(engine.project(&calibration.starting_population))
    }

    /// Run many parameter sets for one variant in parallel
    pub fn run_batch(&self, variant: &str, configs: &[ProjectionConfig]) -> Result<Vec<ProjectionOutput>> {
        let calibration = self.calibration(variant)?;
        Ok(configs
            .par_iter()
            .map(|config| {
                ProjectionEngine::new(calibration.assumptions.clone(), config.clone())
                    .project(&calibration.starting_population)
            })
            .collect())
    }

    /// The same parameters for every variant
    pub fn run_all(&self, config: &ProjectionConfig) -> BTreeMap<String, ProjectionOutput> {
        self.calibrations
            .par_iter()
            .map(|(variant, calibration)| {
                let engine = ProjectionEngine::new(calibration.assumptions.clone(), config.clone());
                (variant.clone(), engine.project(&calibration.starting_population))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::{Record, Sex};

    fn record(variant: &str, year: i32, age: u32, value: f64) -> Record {
        Record {
            location: "Argentina".to_string(),
            year,
            age,
            value,
            variant: variant.to_string(),
        }
    }

    /// Flat population of 10 per age, with births of 5.4 per sex,
    /// for `years` of `variant`
    fn records(variant: &str, years: std::ops::RangeInclusive<i32>, births: f64) -> Vec<Record> {
        let mut rows = Vec::new();
        for year in years {
            for age in 0..=100 {
                let value = if age == 0 { births } else { 10.0 };
                rows.push(record(variant, year, age, value));
            }
        }
        rows
    }

    fn test_index() -> PopulationIndex {
        let mut male = records("Estimates", 2020..=2025, 5.4);
        male.extend(records("Medium", 2024..=2030, 2.7));
        let mut female = records("Estimates", 2020..=2025, 5.4);
        female.extend(records("Medium", 2024..=2030, 2.7));
        PopulationIndex::from_records(&male, &female)
    }

    fn settings() -> CalibrationSettings {
        CalibrationSettings {
            pyramid_year: 2025,
            survival_start_year: 2024,
            survival_end_year: 2030,
            trend_start_year: 2024,
            trend_end_year: 2030,
            base_scale_year: 2024,
            ..Default::default()
        }
    }

    #[test]
    fn test_calibrates_every_variant() {
        let runner = ScenarioRunner::calibrate(&test_index(), settings());
        let variants: Vec<&str> = runner.variants().collect();
        assert_eq!(variants, vec!["Estimates", "Medium"]);

        let medium = runner.calibration("Medium").unwrap();
        assert_eq!(medium.starting_population.male[50], 10.0);
        assert_eq!(medium.mean_ages.len(), 7);
        assert!(!medium.fertility_series.is_empty());
        for sex in Sex::ALL {
            assert!(medium.assumptions.survival.rates(sex).iter().all(|&s| (0.5..=1.0).contains(&s)));
        }
    }

    #[test]
    fn test_base_scale_prefers_baseline_variant() {
        let runner = ScenarioRunner::calibrate(&test_index(), settings());

        // Exposure is 10 per age over 15..=49 weighted: 10 * 5 = 50
        let estimates = runner.baseline_series().unwrap().scale_at(2024).unwrap();
        assert!((estimates - 10.8 / 50.0).abs() < 1e-12);

        let medium = runner.calibration("Medium").unwrap();
        assert_eq!(medium.assumptions.base_fertility_scale, estimates);
        assert!((medium.fertility_series.scale_at(2024).unwrap() - 5.4 / 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_base_scale_without_baseline_uses_own_series() {
        let settings = CalibrationSettings {
            baseline_variant: "Missing".to_string(),
            ..settings()
        };
        let runner = ScenarioRunner::calibrate(&test_index(), settings);

        let medium = runner.calibration("Medium").unwrap();
        assert!((medium.assumptions.base_fertility_scale - 5.4 / 50.0).abs() < 1e-12);
        assert!(runner.baseline_series().is_none());
    }

    #[test]
    fn test_fit_takes_baseline_scale_when_given() {
        let index = test_index();
        let baseline = fertility_scale_series(&index, "Estimates");

        let own = Calibration::fit(&index, "Medium", &settings(), None);
        let anchored = Calibration::fit(&index, "Medium", &settings(), Some(&baseline));

        assert!((own.assumptions.base_fertility_scale - 5.4 / 50.0).abs() < 1e-12);
        assert!((anchored.assumptions.base_fertility_scale - 10.8 / 50.0).abs() < 1e-12);
        assert_eq!(own.fertility_series, anchored.fertility_series);
    }

    #[test]
    fn test_unknown_variant_is_an_error() {
        let runner = ScenarioRunner::calibrate(&test_index(), settings());
        let result = runner.run("High", &ProjectionConfig::default());
        assert!(matches!(result, Err(ModelError::UnknownVariant(v)) if v == "High"));
    }

    #[test]
    fn test_batch_matches_single_runs() {
        let runner = ScenarioRunner::calibrate(&test_index(), settings());
        let configs: Vec<ProjectionConfig> = [-1.0, 0.0, 1.0]
            .iter()
            .map(|&bias| ProjectionConfig {
                fertility_bias: bias,
                end_year: 2060,
                ..Default::default()
            })
            .collect();

        let batch = runner.run_batch("Medium", &configs).unwrap();
        assert_eq!(batch.len(), 3);
        for (config, output) in configs.iter().zip(&batch) {
            assert_eq!(output, &runner.run("Medium", config).unwrap());
        }

        // Higher fertility bias gives a larger population at the horizon
        assert!(batch[2].summary().final_total > batch[0].summary().final_total);
    }

    #[test]
    fn test_run_all_and_history() {
        let runner = ScenarioRunner::calibrate(&test_index(), settings());
        let config = ProjectionConfig {
            end_year: 2030,
            ..Default::default()
        };

        let all = runner.run_all(&config);
        assert_eq!(all.len(), 2);
        assert!(all.values().all(|out| out.len() == 5));

        let totals = &runner.historical_totals()["Estimates"];
        assert_eq!(totals.len(), 6);
        assert_eq!(totals[0].year, 2020);
    }
}
