//! Population-weighted mean age and historical totals

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::data::{AgePyramid, Sex, PERSONS_PER_UNIT};
use super::index::PopulationIndex;

/// Mean age of a population at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanAgePoint {
    pub year: i32,
    pub mean_age: f64,
}

/// Total population of a variant in one year, in persons
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TotalPoint {
    pub year: i32,
    pub total: f64,
}

/// `Σ age·(m+f) / Σ (m+f)`, or 0 for an empty population
pub fn mean_age(male: &AgePyramid, female: &AgePyramid) -> f64 {
    let mut total = 0.0;
    let mut weighted = 0.0;
    for (age, (m, f)) in male.iter().zip(female.iter()).enumerate() {
        let value = m + f;
        total += value;
        weighted += value * age as f64;
    }
    if total > 0.0 {
        weighted / total
    } else {
        0.0
    }
}

/// Mean age for every observed year of `variant`
pub fn mean_age_series(index: &PopulationIndex, variant: &str) -> Vec<MeanAgePoint> {
    index
        .years(variant)
        .into_iter()
        .map(|year| MeanAgePoint {
            year,
            mean_age: mean_age(
                index.pyramid(Sex::Male, variant, year),
                index.pyramid(Sex::Female, variant, year),
            ),
        })
        .collect()
}

/// Total population per variant and year, both sexes, in persons
pub fn historical_totals(index: &PopulationIndex) -> BTreeMap<String, Vec<TotalPoint>> {
    index
        .variants()
        .into_iter()
        .map(|variant| {
            let series = index
                .years(&variant)
                .into_iter()
                .map(|year| TotalPoint {
                    year,
                    total: index.population(&variant, year).total() * PERSONS_PER_UNIT,
                })
                .collect();
            (variant, series)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::data::Record;
    use approx::assert_relative_eq;

    fn record(variant: &str, year: i32, age: u32, value: f64) -> Record {
        Record {
            location: "Argentina".to_string(),
            year,
            age,
            value,
            variant: variant.to_string(),
        }
    }

    #[test]
    fn test_mean_age_of_empty_population_is_zero() {
        assert_eq!(mean_age(&AgePyramid::zeros(), &AgePyramid::zeros()), 0.0);
    }

    #[test]
    fn test_mean_age_weights_both_sexes() {
        let male = AgePyramid::from_ages([(10, 1.0)]);
        let female = AgePyramid::from_ages([(40, 3.0)]);
        // (10*1 + 40*3) / 4 = 32.5
        assert_relative_eq!(mean_age(&male, &female), 32.5);
    }

    #[test]
    fn test_mean_age_series_covers_observed_years() {
        let male = vec![record("Estimates", 2000, 20, 1.0), record("Estimates", 2002, 30, 1.0)];
        let female = vec![record("Estimates", 2001, 50, 2.0)];
        let index = PopulationIndex::from_records(&male, &female);

        let series = mean_age_series(&index, "Estimates");
        let years: Vec<i32> = series.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2000, 2001, 2002]);
        assert_relative_eq!(series[1].mean_age, 50.0);
        assert!(mean_age_series(&index, "High").is_empty());
    }

    #[test]
    fn test_historical_totals_in_persons() {
        let male = vec![record("Estimates", 2000, 0, 1.5), record("Medium", 2030, 0, 1.0)];
        let female = vec![record("Estimates", 2000, 120, 0.5), record("Estimates", 1999, 1, 2.0)];
        let index = PopulationIndex::from_records(&male, &female);

        let totals = historical_totals(&index);
        let estimates = &totals["Estimates"];
        assert_eq!(estimates.len(), 2);
        assert_eq!(estimates[0], TotalPoint { year: 1999, total: 2000.0 });
        assert_eq!(estimates[1], TotalPoint { year: 2000, total: 2000.0 });
        assert_eq!(totals["Medium"][0].total, 1000.0);
    }
}
