//! Lookup-table CSV ingestion.
//!
//! Two shapes are supported: a two-column 1-D table (fuel consumption
//! against load ratio, or a normalised power curve against speed) and the
//! 2-D wave performance matrix, whose top row carries significant wave
//! heights and whose first column carries energy periods.

use std::path::Path;

use mgrid_core::error::{SimError, SimResult};

use crate::load::parse_cell;

fn open(path: &Path) -> SimResult<csv::Reader<std::fs::File>> {
    let file = std::fs::File::open(path)?;
    Ok(csv::Reader::from_reader(file))
}

/// Read a two-column 1-D lookup table (x, y), header row required.
pub fn read_table_1d(path: impl AsRef<Path>) -> SimResult<(Vec<f64>, Vec<f64>)> {
    let path = path.as_ref();
    let mut reader = open(path)?;

    let mut x = Vec::new();
    let mut y = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record
            .map_err(|err| SimError::Parse(format!("{}: row {row}: {err}", path.display())))?;
        if record.len() < 2 {
            return Err(SimError::Parse(format!(
                "{}: row {row}: expected 2 columns, got {}",
                path.display(),
                record.len()
            )));
        }
        x.push(parse_cell(path, row, "x", &record[0])?);
        y.push(parse_cell(path, row, "y", &record[1])?);
    }

    Ok((x, y))
}

/// Read a 2-D performance matrix. The header row is the x axis (first
/// cell ignored), the first column of each following row is the y axis,
/// and the remaining cells are values. Returns `(x, y, z)` with `z[j][i]`
/// the value at `(x[i], y[j])`.
pub fn read_table_2d(
    path: impl AsRef<Path>,
) -> SimResult<(Vec<f64>, Vec<f64>, Vec<Vec<f64>>)> {
    let path = path.as_ref();
    let mut reader = open(path)?;

    let headers = reader.headers().map_err(|err| {
        SimError::Parse(format!("{}: unreadable header row: {err}", path.display()))
    })?;
    let mut x = Vec::new();
    for (column, raw) in headers.iter().enumerate().skip(1) {
        x.push(parse_cell(path, 0, &format!("header column {column}"), raw)?);
    }
    if x.is_empty() {
        return Err(SimError::Parse(format!(
            "{}: header row carries no axis values",
            path.display()
        )));
    }

    let mut y = Vec::new();
    let mut z = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record
            .map_err(|err| SimError::Parse(format!("{}: row {row}: {err}", path.display())))?;
        if record.len() != x.len() + 1 {
            return Err(SimError::Parse(format!(
                "{}: row {row}: expected {} columns, got {}",
                path.display(),
                x.len() + 1,
                record.len()
            )));
        }
        y.push(parse_cell(path, row, "y axis", &record[0])?);
        let mut z_row = Vec::with_capacity(x.len());
        for (column, raw) in record.iter().enumerate().skip(1) {
            z_row.push(parse_cell(path, row, &format!("column {column}"), raw)?);
        }
        z.push(z_row);
    }

    Ok((x, y, z))
}

/// Read a normalised production override series: a two-column CSV of time
/// and normalised production. Only the values are returned; the caller
/// validates the length against the load grid.
pub fn read_normalized_series(path: impl AsRef<Path>) -> SimResult<Vec<f64>> {
    let (_, values) = read_table_1d(path)?;
    Ok(values)
}
