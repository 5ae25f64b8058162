//! Model configuration: calibration windows and projection parameters
//!
//! Every field has a default, so a JSON file only needs the values it
//! changes:
//!
//! ```json
//! {
//!   "calibration": { "baseline_variant": "Estimates", "survival_end_year": 2060 },
//!   "projection": { "fertility_bias": -0.25, "end_year": 2150 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::Result;
use crate::projection::ProjectionConfig;

/// Default label of the historical estimates series
pub const DEFAULT_BASELINE_VARIANT: &str = "Estimates";

/// Which years each variant is calibrated on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationSettings {
    /// Variant whose fertility series is preferred for the base scale
    pub baseline_variant: String,
    /// Year of the pyramid projections start from
    pub pyramid_year: i32,
    /// Survival ratios use years `[survival_start_year, survival_end_year)`
    pub survival_start_year: i32,
    pub survival_end_year: i32,
    /// Fertility trend uses years `(trend_start_year, trend_end_year]`
    pub trend_start_year: i32,
    pub trend_end_year: i32,
    /// Year whose fertility scale seeds every projection
    pub base_scale_year: i32,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            baseline_variant: DEFAULT_BASELINE_VARIANT.to_string(),
            pyramid_year: 2025,
            survival_start_year: 2025,
            survival_end_year: 2100,
            trend_start_year: 2025,
            trend_end_year: 2100,
            base_scale_year: 2024,
        }
    }
}

/// Calibration plus default projection parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub calibration: CalibrationSettings,
    pub projection: ProjectionConfig,
}

impl ModelConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}
