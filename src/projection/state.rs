//! Population state carried from one projected year to the next

use crate::assumptions::{fertility_weight, SurvivalProfile, FERTILITY_AGE_END, FERTILITY_AGE_START};
use crate::population::{AgePyramid, PopulationPyramid, Sex, MAX_AGE};

/// Share of births that are boys
pub const MALE_BIRTH_SHARE: f64 = 0.512;

/// Share of births that are girls
pub const FEMALE_BIRTH_SHARE: f64 = 0.488;

/// Population pyramid at the end of `year`
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionState {
    pub year: i32,
    pub population: PopulationPyramid,
}

impl ProjectionState {
    /// Start from a copy of `pyramid`, observed at `year`
    pub fn from_pyramid(pyramid: &PopulationPyramid, year: i32) -> Self {
        Self {
            year,
            population: pyramid.clone(),
        }
    }

    /// Σ female[age] · weight[age] · scale over the fertile ages
    pub fn births(&self, fertility_scale: f64) -> f64 {
        let female = &self.population.female;
        (FERTILITY_AGE_START..=FERTILITY_AGE_END)
            .map(|age| female[age] * fertility_weight(age) * fertility_scale)
            .sum()
    }

    /// Age everyone by one year and add the new birth cohort
    pub fn advance_year(&mut self, survival: &SurvivalProfile, survival_multiplier: f64, births: f64) {
        let male = age_forward(
            &self.population.male,
            survival,
            Sex::Male,
            survival_multiplier,
            births * MALE_BIRTH_SHARE,
        );
        let female = age_forward(
            &self.population.female,
            survival,
            Sex::Female,
            survival_multiplier,
            births * FEMALE_BIRTH_SHARE,
        );

        self.population = PopulationPyramid::new(male, female);
        self.year += 1;
    }

    pub fn total_persons(&self) -> f64 {
        self.population.total_persons()
    }

    pub fn mean_age(&self) -> f64 {
        self.population.mean_age()
    }
}

fn age_forward(old: &AgePyramid, survival: &SurvivalProfile, sex: Sex, multiplier: f64, newborns: f64) -> AgePyramid {
    let mut aged = AgePyramid::zeros();
    aged[0] = newborns;
    for age in 0..MAX_AGE {
        aged[age + 1] = old[age] * survival.adjusted_rate(age, sex, multiplier);
    }
    // The open top bucket keeps its own survivors on top of those arriving from 99
    aged[MAX_AGE] += old[MAX_AGE] * survival.adjusted_rate(MAX_AGE, sex, multiplier);
    aged
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn state(male: &[(usize, f64)], female: &[(usize, f64)]) -> ProjectionState {
        let pyramid = PopulationPyramid::new(
            AgePyramid::from_ages(male.iter().copied()),
            AgePyramid::from_ages(female.iter().copied()),
        );
        ProjectionState::from_pyramid(&pyramid, 2025)
    }

    #[test]
    fn test_births_use_fertility_pattern() {
        let state = state(&[(25, 500.0)], &[(25, 100.0), (60, 100.0)]);
        // Only fertile women count: 100 * 0.27 * 2
        assert_relative_eq!(state.births(2.0), 54.0, epsilon = 1e-12);
        assert_eq!(state.births(0.0), 0.0);
    }

    #[test]
    fn test_advance_splits_births_by_sex() {
        let mut state = state(&[], &[]);
        state.advance_year(&SurvivalProfile::identity(), 1.0, 100.0);

        assert_relative_eq!(state.population.male[0], 51.2, epsilon = 1e-12);
        assert_relative_eq!(state.population.female[0], 48.8, epsilon = 1e-12);
        assert_eq!(state.year, 2026);
    }

    #[test]
    fn test_top_bucket_accumulates() {
        let mut state = state(&[(99, 10.0), (100, 20.0)], &[]);
        state.advance_year(&SurvivalProfile::uniform(0.5), 1.0, 0.0);

        assert_relative_eq!(state.population.male[100], 15.0);
        assert_eq!(state.population.male[99], 0.0);
    }

    #[test]
    fn test_multiplier_never_exceeds_certainty() {
        let mut state = state(&[(40, 100.0)], &[(40, 100.0)]);
        state.advance_year(&SurvivalProfile::uniform(0.9), 1.5, 0.0);

        assert_eq!(state.population.male[41], 100.0);
        assert_eq!(state.population.female[41], 100.0);
    }
}
