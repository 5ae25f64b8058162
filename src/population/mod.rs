//! Historical population data: records, age pyramids and the per-sex index

mod data;
pub mod aggregate;
pub mod index;
pub mod loader;

pub use data::{AgePyramid, PopulationPyramid, Record, Sex, AGE_BUCKETS, MAX_AGE, PERSONS_PER_UNIT};
pub use aggregate::{historical_totals, mean_age, mean_age_series, MeanAgePoint, TotalPoint};
pub use index::{lookup_or_default, PopulationIndex};
pub use loader::{load_index, load_records, load_records_from_reader};
