//! Fertility intensity: observed births relative to a fixed age pattern
//!
//! Births are proxied by the age-0 population of a year. Exposure is the
//! female population aged 15-49 weighted by a stylized fertility-by-age
//! curve. Their ratio is the fertility scale, the single multiplier the
//! projection applies to the same curve.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::population::{lookup_or_default, AgePyramid, PopulationIndex, Sex};

/// First fertile age
pub const FERTILITY_AGE_START: usize = 15;

/// Last fertile age
pub const FERTILITY_AGE_END: usize = 49;

/// Number of most recent scale observations the trend is fitted on
pub const TREND_WINDOW: usize = 10;

/// Scale × this factor reads as children per woman (the weights sum to 1 over 5-year bands)
pub const TFR_DISPLAY_FACTOR: f64 = 5.0;

/// Stylized fertility weight for a single age (non-normalized)
pub fn fertility_weight(age: usize) -> f64 {
    match age {
        15..=19 => 0.08,
        20..=24 => 0.20,
        25..=29 => 0.27,
        30..=34 => 0.24,
        35..=39 => 0.14,
        40..=44 => 0.05,
        45..=49 => 0.02,
        _ => 0.0,
    }
}

/// Σ female[age] · weight[age] over the fertile ages
pub fn weighted_exposure(female: &AgePyramid) -> f64 {
    (FERTILITY_AGE_START..=FERTILITY_AGE_END)
        .map(|age| female[age] * fertility_weight(age))
        .sum()
}

/// Births per unit of weighted exposure; `None` when there is no exposure
pub fn fertility_scale(births: f64, exposure: f64) -> Option<f64> {
    if exposure > 0.0 {
        Some(births / exposure)
    } else {
        None
    }
}

/// Fertility scale observed in one year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalePoint {
    pub year: i32,
    pub scale: f64,
}

impl ScalePoint {
    /// Scale expressed as children per woman
    pub fn tfr(&self) -> f64 {
        self.scale * TFR_DISPLAY_FACTOR
    }
}

/// Year-ordered fertility scales; years without exposure are absent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FertilityScaleSeries {
    points: Vec<ScalePoint>,
}

impl FertilityScaleSeries {
    pub fn new(points: Vec<ScalePoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[ScalePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Scale recorded for exactly `year`
    pub fn scale_at(&self, year: i32) -> Option<f64> {
        self.points.iter().find(|p| p.year == year).map(|p| p.scale)
    }

    pub fn last(&self) -> Option<&ScalePoint> {
        self.points.last()
    }
}

/// Births for `year` (age-0 population of both sexes)
fn births(index: &PopulationIndex, variant: &str, year: i32) -> f64 {
    index.pyramid(Sex::Male, variant, year)[0] + index.pyramid(Sex::Female, variant, year)[0]
}

/// Fertility scale for every year of the variant's observed range
///
/// Exposure comes from the previous year's female pyramid, or from the same
/// year when the previous one was not observed.
pub fn fertility_scale_series(index: &PopulationIndex, variant: &str) -> FertilityScaleSeries {
    let Some((first, last)) = index.year_range(variant) else {
        return FertilityScaleSeries::default();
    };

    let points = (first..=last)
        .filter_map(|year| {
            let exposed = index
                .get(Sex::Female, variant, year - 1)
                .or_else(|| index.get(Sex::Female, variant, year));
            let exposure = weighted_exposure(lookup_or_default(exposed));
            fertility_scale(births(index, variant, year), exposure).map(|scale| ScalePoint { year, scale })
        })
        .collect();

    FertilityScaleSeries::new(points)
}

/// Linear trend of fertility scale against calendar year
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FertilityTrend {
    pub intercept: f64,
    pub slope: f64,
}

impl FertilityTrend {
    /// Ordinary least squares of scale on year
    ///
    /// No points gives (0, 0); no spread in years gives slope 0 through the
    /// mean scale.
    pub fn fit(points: &[ScalePoint]) -> Self {
        if points.is_empty() {
            return Self::default();
        }

        let n = points.len() as f64;
        let mean_x = points.iter().map(|p| p.year as f64).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p.scale).sum::<f64>() / n;

        let mut num = 0.0;
        let mut den = 0.0;
        for p in points {
            let dx = p.year as f64 - mean_x;
            num += dx * (p.scale - mean_y);
            den += dx * dx;
        }

        let slope = if den > 0.0 { num / den } else { 0.0 };
        Self {
            intercept: mean_y - slope * mean_x,
            slope,
        }
    }

    pub fn value_at(&self, year: i32) -> f64 {
        self.intercept + self.slope * year as f64
    }
}

/// Fit the fertility trend on years `(start_year, end_year]`
///
/// Unlike [`fertility_scale_series`], exposure always comes from the
/// previous year, with no same-year fallback. Only the last
/// [`TREND_WINDOW`] observations enter the regression.
pub fn fit_fertility_trend(index: &PopulationIndex, variant: &str, start_year: i32, end_year: i32) -> FertilityTrend {
    let points: Vec<ScalePoint> = (start_year + 1..=end_year)
        .filter_map(|year| {
            let exposure = weighted_exposure(index.pyramid(Sex::Female, variant, year - 1));
            fertility_scale(births(index, variant, year), exposure).map(|scale| ScalePoint { year, scale })
        })
        .collect();

    let tail = &points[points.len().saturating_sub(TREND_WINDOW)..];
    let trend = FertilityTrend::fit(tail);
    if tail.is_empty() {
        warn!(
            "No fertility observations for {} in ({}, {}]; trend defaults to zero",
            variant, start_year, end_year
        );
    }
    trend
}

/// Fertility scale a projection starts from
///
/// Prefers the baseline series at `year`, then the variant's own series at
/// `year`, then the variant's last observed scale, then 0.
pub fn base_fertility_scale(
    baseline: Option<&FertilityScaleSeries>,
    series: &FertilityScaleSeries,
    year: i32,
) -> f64 {
    if let Some(scale) = baseline.and_then(|s| s.scale_at(year)) {
        return scale;
    }
    if let Some(scale) = series.scale_at(year) {
        return scale;
    }
    match series.last() {
        Some(point) => {
            warn!("No fertility scale for {}; using last observed year {}", year, point.year);
            point.scale
        }
        None => {
            warn!("No fertility scale observations; base scale defaults to zero");
            0.0
        }
    }
}
