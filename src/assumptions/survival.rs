//! One-year survival probabilities fitted from historical cohort ratios
//!
//! For each age the fitted rate is the median of `pop[y+1][a+1] / pop[y][a]`
//! over the fitting window. The median keeps a single shock year (a war, an
//! epidemic, a census revision) from dragging the whole profile. The open top
//! bucket is compared with itself, `pop[y+1][100] / pop[y][100]`.

use crate::population::{PopulationIndex, Sex, AGE_BUCKETS, MAX_AGE};

/// Lowest survival rate a fitted age can take
pub const MIN_SURVIVAL: f64 = 0.5;

/// Highest survival rate a fitted age can take
pub const MAX_SURVIVAL: f64 = 0.9999;

/// Survival rate for ages with no usable ratio in the window
pub const UNFITTED_SURVIVAL: f64 = 1.0;

/// Per-sex, per-age probability of surviving to the next age and year
#[derive(Debug, Clone, PartialEq)]
pub struct SurvivalProfile {
    male: [f64; AGE_BUCKETS],
    female: [f64; AGE_BUCKETS],
}

impl SurvivalProfile {
    /// Everyone survives; the starting point of every fit
    pub fn identity() -> Self {
        Self::uniform(UNFITTED_SURVIVAL)
    }

    /// Same rate at every age for both sexes
    pub fn uniform(rate: f64) -> Self {
        Self {
            male: [rate; AGE_BUCKETS],
            female: [rate; AGE_BUCKETS],
        }
    }

    /// Fit both sexes over years `[start_year, end_year)`
    pub fn fit(index: &PopulationIndex, variant: &str, start_year: i32, end_year: i32) -> Self {
        Self {
            male: fit_sex(index, Sex::Male, variant, start_year, end_year),
            female: fit_sex(index, Sex::Female, variant, start_year, end_year),
        }
    }

    pub fn rates(&self, sex: Sex) -> &[f64; AGE_BUCKETS] {
        match sex {
            Sex::Male => &self.male,
            Sex::Female => &self.female,
        }
    }

    /// Survival rate for `age`; ages past the top bucket use the top bucket
    pub fn rate(&self, age: usize, sex: Sex) -> f64 {
        self.rates(sex)[age.min(MAX_AGE)]
    }

    /// Rate scaled by `multiplier`, capped at certainty
    pub fn adjusted_rate(&self, age: usize, sex: Sex, multiplier: f64) -> f64 {
        (self.rate(age, sex) * multiplier).min(1.0)
    }
}

impl Default for SurvivalProfile {
    fn default() -> Self {
        Self::identity()
    }
}

/// Fit survival profiles for `variant` over `[start_year, end_year)`
pub fn fit_survival(index: &PopulationIndex, variant: &str, start_year: i32, end_year: i32) -> SurvivalProfile {
    SurvivalProfile::fit(index, variant, start_year, end_year)
}

fn fit_sex(index: &PopulationIndex, sex: Sex, variant: &str, start_year: i32, end_year: i32) -> [f64; AGE_BUCKETS] {
    let mut ratios: Vec<Vec<f64>> = vec![Vec::new(); AGE_BUCKETS];

    for year in start_year..end_year {
        let current = index.pyramid(sex, variant, year);
        let next = index.pyramid(sex, variant, year + 1);

        for age in 0..MAX_AGE {
            if current[age] > 0.0 {
                ratios[age].push(next[age + 1] / current[age]);
            }
        }
        if current[MAX_AGE] > 0.0 {
            ratios[MAX_AGE].push(next[MAX_AGE] / current[MAX_AGE]);
        }
    }

    let mut rates = [UNFITTED_SURVIVAL; AGE_BUCKETS];
    for (rate, age_ratios) in rates.iter_mut().zip(ratios.iter_mut()) {
        if let Some(mid) = median(age_ratios) {
            *rate = mid.clamp(MIN_SURVIVAL, MAX_SURVIVAL);
        }
    }
    rates
}

/// Middle element after sorting; the upper middle for even lengths
///
/// Sorts `values` in place. Returns `None` for an empty slice.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    Some(values[values.len() / 2])
}
