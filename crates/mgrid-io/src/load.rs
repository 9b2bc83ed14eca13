//! Electrical load CSV ingestion.
//!
//! The load file is a two-column CSV with a required header row:
//! `Time (since start of data) [hrs]` and `Electrical Load [kW]`, with
//! strictly increasing times. It defines the grid every resource series
//! must match.

use std::path::Path;

use mgrid_core::error::{SimError, SimResult};
use mgrid_core::LoadProfile;

pub const TIME_COLUMN: &str = "Time (since start of data) [hrs]";
pub const LOAD_COLUMN: &str = "Electrical Load [kW]";

/// Parse one CSV cell as a float, reporting the file and location on
/// failure.
pub(crate) fn parse_cell(path: &Path, row: usize, column: &str, raw: &str) -> SimResult<f64> {
    raw.trim().parse::<f64>().map_err(|_| {
        SimError::Parse(format!(
            "{}: row {row}, column '{column}': expected a number, got '{raw}'",
            path.display()
        ))
    })
}

/// Read the electrical load time series.
pub fn read_load_profile(path: impl AsRef<Path>) -> SimResult<LoadProfile> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader.headers().map_err(|err| {
        SimError::Parse(format!("{}: unreadable header row: {err}", path.display()))
    })?;
    let time_index = headers
        .iter()
        .position(|header| header.trim() == TIME_COLUMN)
        .ok_or_else(|| {
            SimError::Parse(format!(
                "{}: missing required column '{TIME_COLUMN}'",
                path.display()
            ))
        })?;
    let load_index = headers
        .iter()
        .position(|header| header.trim() == LOAD_COLUMN)
        .ok_or_else(|| {
            SimError::Parse(format!(
                "{}: missing required column '{LOAD_COLUMN}'",
                path.display()
            ))
        })?;

    let mut time_hrs = Vec::new();
    let mut load_kw = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record
            .map_err(|err| SimError::Parse(format!("{}: row {row}: {err}", path.display())))?;
        let time_raw = record.get(time_index).ok_or_else(|| {
            SimError::Parse(format!("{}: row {row}: missing time cell", path.display()))
        })?;
        let load_raw = record.get(load_index).ok_or_else(|| {
            SimError::Parse(format!("{}: row {row}: missing load cell", path.display()))
        })?;
        time_hrs.push(parse_cell(path, row, TIME_COLUMN, time_raw)?);
        load_kw.push(parse_cell(path, row, LOAD_COLUMN, load_raw)?);
    }

    LoadProfile::from_series(time_hrs, load_kw)
}
