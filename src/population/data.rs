//! Population records and age pyramids

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Number of single-year age classes (0..=100)
pub const AGE_BUCKETS: usize = 101;

/// Open-ended top age class; every age at or above it folds into this slot
pub const MAX_AGE: usize = AGE_BUCKETS - 1;

/// Counts are stored in thousands of persons
pub const PERSONS_PER_UNIT: f64 = 1000.0;

/// Sex of a population table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];
}

/// One historical observation from the input tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub location: String,
    pub year: i32,
    pub age: u32,
    /// Count in thousands
    pub value: f64,
    pub variant: String,
}

impl Record {
    /// Age slot this record lands in, with the top bucket folded
    pub fn age_slot(&self) -> usize {
        (self.age as usize).min(MAX_AGE)
    }
}

/// Population by single year of age for one sex, one year, one variant
#[derive(Debug, Clone, PartialEq)]
pub struct AgePyramid {
    values: [f64; AGE_BUCKETS],
}

impl AgePyramid {
    pub const fn zeros() -> Self {
        Self { values: [0.0; AGE_BUCKETS] }
    }

    /// Build a pyramid from `(age, value)` pairs, summing duplicates
    pub fn from_ages<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (usize, f64)>,
    {
        let mut pyramid = Self::zeros();
        for (age, value) in entries {
            pyramid.add(age, value);
        }
        pyramid
    }

    /// Accumulate `value` at `age`, folding ages above the top bucket into it
    pub fn add(&mut self, age: usize, value: f64) {
        self.values[age.min(MAX_AGE)] += value;
    }

    pub fn values(&self) -> &[f64; AGE_BUCKETS] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.values.iter()
    }

    /// Sum over all ages, in thousands
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }
}

impl Default for AgePyramid {
    fn default() -> Self {
        Self::zeros()
    }
}

impl Index<usize> for AgePyramid {
    type Output = f64;

    fn index(&self, age: usize) -> &f64 {
        &self.values[age]
    }
}

impl IndexMut<usize> for AgePyramid {
    fn index_mut(&mut self, age: usize) -> &mut f64 {
        &mut self.values[age]
    }
}

/// Male and female pyramids for the same year
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulationPyramid {
    pub male: AgePyramid,
    pub female: AgePyramid,
}

impl PopulationPyramid {
    pub fn new(male: AgePyramid, female: AgePyramid) -> Self {
        Self { male, female }
    }

    pub fn get(&self, sex: Sex) -> &AgePyramid {
        match sex {
            Sex::Male => &self.male,
            Sex::Female => &self.female,
        }
    }

    /// Both sexes combined, in thousands
    pub fn total(&self) -> f64 {
        self.male.total() + self.female.total()
    }

    /// Both sexes combined, in persons
    pub fn total_persons(&self) -> f64 {
        self.total() * PERSONS_PER_UNIT
    }

    pub fn mean_age(&self) -> f64 {
        super::aggregate::mean_age(&self.male, &self.female)
    }
}
