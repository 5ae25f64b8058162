//! Demographic assumptions fitted from history: survival and fertility

mod survival;
mod fertility;

pub use survival::{fit_survival, median, SurvivalProfile, MAX_SURVIVAL, MIN_SURVIVAL, UNFITTED_SURVIVAL};
pub use fertility::{
    base_fertility_scale, fertility_scale, fertility_scale_series, fertility_weight, fit_fertility_trend,
    weighted_exposure, FertilityScaleSeries, FertilityTrend, ScalePoint, FERTILITY_AGE_END, FERTILITY_AGE_START,
    TFR_DISPLAY_FACTOR, TREND_WINDOW,
};

/// Container for the parameters a projection consumes
#[derive(Debug, Clone, PartialEq)]
pub struct Assumptions {
    pub survival: SurvivalProfile,
    /// Fertility scale at the base year, before bias and slope adjustments
    pub base_fertility_scale: f64,
}

impl Assumptions {
    pub fn new(survival: SurvivalProfile, base_fertility_scale: f64) -> Self {
        Self {
            survival,
            base_fertility_scale,
        }
    }
}

impl Default for Assumptions {
    /// Nobody dies and nobody is born
    fn default() -> Self {
        Self::new(SurvivalProfile::identity(), 0.0)
    }
}
