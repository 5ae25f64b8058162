//! Core cohort-component projection engine
//!
//! Each projected year: work out the effective fertility scale, derive births
//! from the female fertile ages, age every cohort by one year through the
//! survival profile, and record totals and mean age.

use serde::{Deserialize, Serialize};

use super::output::{ProjectionOutput, ProjectionRow};
use super::state::ProjectionState;
use crate::assumptions::{Assumptions, SurvivalProfile};
use crate::population::PopulationPyramid;

/// Bias and slope are entered in steps of 5; the engine works per year
pub const SLIDER_STEP: f64 = 5.0;

/// Configuration for a projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Year the fertility slope is measured from
    #[serde(default = "default_base_year")]
    pub base_year: i32,

    /// First projected year
    #[serde(default = "default_start_year")]
    pub start_year: i32,

    /// Last projected year (inclusive)
    #[serde(default = "default_end_year")]
    pub end_year: i32,

    /// Constant shift of the fertility scale, in slider units
    #[serde(default)]
    pub fertility_bias: f64,

    /// Change of the fertility scale per year since `base_year`, in slider units
    #[serde(default)]
    pub fertility_slope: f64,

    /// Multiplier on every survival rate; the product is capped at 1
    #[serde(default = "default_survival_multiplier")]
    pub survival_multiplier: f64,
}

fn default_base_year() -> i32 { 2024 }
fn default_start_year() -> i32 { 2026 }
fn default_end_year() -> i32 { 2200 }
fn default_survival_multiplier() -> f64 { 1.0 }

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            base_year: default_base_year(),
            start_year: default_start_year(),
            end_year: default_end_year(),
            fertility_bias: 0.0,
            fertility_slope: 0.0,
            survival_multiplier: default_survival_multiplier(),
        }
    }
}

impl ProjectionConfig {
    /// Number of years the run will produce
    pub fn horizon(&self) -> usize {
        (self.end_year - self.start_year + 1).max(0) as usize
    }
}

/// Main projection engine
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    assumptions: Assumptions,
    config: ProjectionConfig,
}

impl ProjectionEngine {
    /// Create a new projection engine with given assumptions and config
    pub fn new(assumptions: Assumptions, config: ProjectionConfig) -> Self {
        Self { assumptions, config }
    }

    /// `max(0, base + bias/5 + (slope/5) * (year - base_year))`
    pub fn fertility_scale(&self, year: i32) -> f64 {
        let bias = self.config.fertility_bias / SLIDER_STEP;
        let slope = self.config.fertility_slope / SLIDER_STEP;
        let scale = self.assumptions.base_fertility_scale + bias + slope * (year - self.config.base_year) as f64;
        scale.max(0.0)
    }

    /// Run the projection from `pyramid`, which is left untouched
    pub fn project(&self, pyramid: &PopulationPyramid) -> ProjectionOutput {
        let mut output = ProjectionOutput::with_capacity(self.config.horizon());
        let mut state = ProjectionState::from_pyramid(pyramid, self.config.start_year - 1);

        for year in self.config.start_year..=self.config.end_year {
            let fertility_scale = self.fertility_scale(year);
            let births = state.births(fertility_scale);
            state.advance_year(&self.assumptions.survival, self.config.survival_multiplier, births);

            output.push(ProjectionRow {
                year,
                total: state.total_persons(),
                mean_age: state.mean_age(),
                fertility_scale,
            });
        }

        output
    }
}

/// Project `pyramid` from `start_year` to `end_year` inclusive
#[allow(clippy::too_many_arguments)]
pub fn project(
    pyramid: &PopulationPyramid,
    survival: &SurvivalProfile,
    base_fertility_scale: f64,
    fertility_slope: f64,
    fertility_bias: f64,
    base_year: i32,
    start_year: i32,
    end_year: i32,
    survival_multiplier: f64,
) -> ProjectionOutput {
    let assumptions = Assumptions::new(survival.clone(), base_fertility_scale);
    let config = ProjectionConfig {
        base_year,
        start_year,
        end_year,
        fertility_bias,
        fertility_slope,
        survival_multiplier,
    };
    ProjectionEngine::new(assumptions, config).project(pyramid)
}
