//! Load population records from `location,year,age,value,variant` CSV tables
//!
//! Columns are matched by header name, so their order does not matter and
//! extra columns are ignored.

use csv::Reader;
use log::info;
use std::path::Path;

use super::data::{Record, Sex};
use super::index::PopulationIndex;
use crate::error::Result;

/// Load all records from a CSV file
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let reader = Reader::from_path(path)?;
    let records = read_records(reader)?;
    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Load records from any reader (e.g., string buffer, network stream)
pub fn load_records_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<Record>> {
    read_records(Reader::from_reader(reader))
}

fn read_records<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for result in reader.deserialize() {
        let record: Record = result?;
        records.push(record);
    }
    Ok(records)
}

/// Load the male and female tables and index them
pub fn load_index<P: AsRef<Path>, Q: AsRef<Path>>(male_path: P, female_path: Q) -> Result<PopulationIndex> {
    let male = load_records(male_path)?;
    let female = load_records(female_path)?;

    let mut index = PopulationIndex::new();
    index.extend(Sex::Male, &male);
    index.extend(Sex::Female, &female);
    info!("Indexed {} variants", index.variants().len());

    Ok(index)
}
