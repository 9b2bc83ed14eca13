//! Resource CSV ingestion.
//!
//! 1-D resources (solar GHI, tidal/wind speed, hydro inflow) share the
//! two-column shape of the load file: a time column and a value column,
//! with times that must match the load grid. The wave resource is 2-D:
//! each row is a time step with significant wave height and energy period
//! columns.

use std::path::Path;

use mgrid_core::error::{SimError, SimResult};

use crate::load::parse_cell;

/// A parsed 1-D resource series: sample instants and values.
pub struct ResourceSeries1d {
    pub time_hrs: Vec<f64>,
    pub values: Vec<f64>,
}

/// A parsed wave resource series: sample instants and `[H_s, T_e]` pairs.
pub struct ResourceSeries2d {
    pub time_hrs: Vec<f64>,
    pub values: Vec<[f64; 2]>,
}

fn open(path: &Path) -> SimResult<csv::Reader<std::fs::File>> {
    let file = std::fs::File::open(path)?;
    Ok(csv::Reader::from_reader(file))
}

/// Read a two-column (time, value) resource CSV. The header row is
/// required; column names are not interpreted beyond that.
pub fn read_resource_1d(path: impl AsRef<Path>) -> SimResult<ResourceSeries1d> {
    let path = path.as_ref();
    let mut reader = open(path)?;

    let mut time_hrs = Vec::new();
    let mut values = Vec::new();

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
        time_hrs.push(parse_cell(path, row, "time", &record[0])?);
        values.push(parse_cell(path, row, "value", &record[1])?);
    }

    Ok(ResourceSeries1d { time_hrs, values })
}

/// Read a wave resource CSV: one row per time step with time, significant
/// wave height [m], and energy period [s] columns.
pub fn read_resource_wave(path: impl AsRef<Path>) -> SimResult<ResourceSeries2d> {
    let path = path.as_ref();
    let mut reader = open(path)?;

    let mut time_hrs = Vec::new();
    let mut values = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record
            .map_err(|err| SimError::Parse(format!("{}: row {row}: {err}", path.display())))?;
        if record.len() < 3 {
            return Err(SimError::Parse(format!(
                "{}: row {row}: expected 3 columns (time, H_s, T_e), got {}",
                path.display(),
                record.len()
            )));
        }
        time_hrs.push(parse_cell(path, row, "time", &record[0])?);
        let significant_wave_height_m = parse_cell(path, row, "H_s", &record[1])?;
        let energy_period_s = parse_cell(path, row, "T_e", &record[2])?;
        values.push([significant_wave_height_m, energy_period_s]);
    }

    Ok(ResourceSeries2d { time_hrs, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_read_resource_1d() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ghi.csv");
        fs::write(
            &path,
            "Time (since start of data) [hrs],Solar GHI [kW/m2]\n0,0.0\n1,0.45\n2,0.81\n",
        )
        .unwrap();
        let series = read_resource_1d(&path).unwrap();
        assert_eq!(series.time_hrs, vec![0.0, 1.0, 2.0]);
        assert_eq!(series.values, vec![0.0, 0.45, 0.81]);
    }

    #[test]
    fn test_read_resource_wave() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("waves.csv");
        fs::write(
            &path,
            "Time (since start of data) [hrs],Significant Wave Height [m],Energy Period [s]\n\
             0,1.2,8.5\n1,1.4,9.0\n",
        )
        .unwrap();
        let series = read_resource_wave(&path).unwrap();
        assert_eq!(series.time_hrs, vec![0.0, 1.0]);
        assert_eq!(series.values, vec![[1.2, 8.5], [1.4, 9.0]]);
    }

    #[test]
    fn test_non_numeric_resource_cell() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("speed.csv");
        fs::write(&path, "Time,Speed\n0,2.0\n1,calm\n").unwrap();
        assert!(matches!(
            read_resource_1d(&path),
            Err(SimError::Parse(_))
        ));
    }

    #[test]
    fn test_wave_missing_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("waves.csv");
        fs::write(&path, "Time,H_s\n0,1.2\n").unwrap();
        assert!(matches!(
            read_resource_wave(&path),
            Err(SimError::Parse(_))
        ));
    }
}
