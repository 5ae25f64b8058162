//! Cohort Projection - cohort-component population projection engine
//!
//! This library provides:
//! - Indexing of historical age-sex population counts by variant and year
//! - Survival profiles fitted from year-over-year cohort ratios
//! - Fertility intensity series, trends and base scale selection
//! - Year-by-year projection of population pyramids under adjustable assumptions
//! - Cached per-variant calibration and latest-wins projection scheduling

pub mod error;
pub mod config;
pub mod population;
pub mod assumptions;
pub mod projection;
pub mod scenario;
pub mod scheduler;

// Re-export commonly used types
pub use error::{ModelError, Result};
pub use config::{CalibrationSettings, ModelConfig};
pub use population::{AgePyramid, PopulationIndex, PopulationPyramid, Record, Sex};
pub use assumptions::{Assumptions, FertilityScaleSeries, FertilityTrend, SurvivalProfile};
pub use projection::{ProjectionConfig, ProjectionEngine, ProjectionOutput};
pub use scenario::{Calibration, ScenarioRunner};
pub use scheduler::{ProjectionRequest, ProjectionScheduler};
