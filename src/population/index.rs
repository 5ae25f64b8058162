//! Population index: variant → year → age pyramid, kept per sex
//!
//! Every lookup that can miss goes through [`lookup_or_default`], so the
//! zero-pyramid fallback for absent years and variants lives in one place.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::data::{AgePyramid, PopulationPyramid, Record, Sex};

static ZERO_PYRAMID: AgePyramid = AgePyramid::zeros();

/// Resolve an optional pyramid to the all-zero pyramid when absent
pub fn lookup_or_default(pyramid: Option<&AgePyramid>) -> &AgePyramid {
    pyramid.unwrap_or(&ZERO_PYRAMID)
}

type YearTable = BTreeMap<i32, AgePyramid>;

/// Historical population counts organised for per-year lookup
#[derive(Debug, Clone, Default)]
pub struct PopulationIndex {
    male: HashMap<String, YearTable>,
    female: HashMap<String, YearTable>,
}

impl PopulationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from separate male and female record sets
    pub fn from_records(male: &[Record], female: &[Record]) -> Self {
        let mut index = Self::new();
        index.extend(Sex::Male, male);
        index.extend(Sex::Female, female);
        index
    }

    /// Accumulate records for one sex
    pub fn extend<'a, I>(&mut self, sex: Sex, records: I)
    where
        I: IntoIterator<Item = &'a Record>,
    {
        for record in records {
            self.insert(sex, record);
        }
    }

    /// Add a single record's value into its (variant, year, age) slot
    pub fn insert(&mut self, sex: Sex, record: &Record) {
        let table = match sex {
            Sex::Male => &mut self.male,
            Sex::Female => &mut self.female,
        };
        table
            .entry(record.variant.clone())
            .or_default()
            .entry(record.year)
            .or_default()
            .add(record.age_slot(), record.value);
    }

    fn years_for(&self, sex: Sex, variant: &str) -> Option<&YearTable> {
        match sex {
            Sex::Male => self.male.get(variant),
            Sex::Female => self.female.get(variant),
        }
    }

    /// The stored pyramid, if that (variant, year) was observed for `sex`
    pub fn get(&self, sex: Sex, variant: &str, year: i32) -> Option<&AgePyramid> {
        self.years_for(sex, variant).and_then(|years| years.get(&year))
    }

    /// Whether (variant, year) was observed for `sex`
    pub fn contains(&self, sex: Sex, variant: &str, year: i32) -> bool {
        self.get(sex, variant, year).is_some()
    }

    /// Pyramid for (variant, year), all zeros when absent
    pub fn pyramid(&self, sex: Sex, variant: &str, year: i32) -> &AgePyramid {
        lookup_or_default(self.get(sex, variant, year))
    }

    /// Owned copy of both sexes for one year, the usual projection start
    pub fn population(&self, variant: &str, year: i32) -> PopulationPyramid {
        PopulationPyramid::new(
            self.pyramid(Sex::Male, variant, year).clone(),
            self.pyramid(Sex::Female, variant, year).clone(),
        )
    }

    /// All variant labels present for either sex, sorted
    pub fn variants(&self) -> Vec<String> {
        let labels: BTreeSet<&String> = self.male.keys().chain(self.female.keys()).collect();
        labels.into_iter().cloned().collect()
    }

    pub fn has_variant(&self, variant: &str) -> bool {
        self.male.contains_key(variant) || self.female.contains_key(variant)
    }

    /// Years observed for `variant` in either sex, ascending
    pub fn years(&self, variant: &str) -> Vec<i32> {
        let years: BTreeSet<i32> = Sex::ALL
            .iter()
            .filter_map(|&sex| self.years_for(sex, variant))
            .flat_map(|table| table.keys().copied())
            .collect();
        years.into_iter().collect()
    }

    /// First and last observed year for `variant`
    pub fn year_range(&self, variant: &str) -> Option<(i32, i32)> {
        let years = self.years(variant);
        Some((*years.first()?, *years.last()?))
    }

    pub fn is_empty(&self) -> bool {
        self.male.is_empty() && self.female.is_empty()
    }
}
