//! Electrical load time series and the modelling time grid derived from it.
//!
//! The load profile defines the grid every other time series must conform
//! to: an ordered, strictly increasing sequence of sample instants with
//! derived interval widths. The grid may be non-uniform; the last interval
//! repeats the previous width.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Hours in a modelling year, used to convert simulation time to years.
pub const HOURS_PER_YEAR: f64 = 8760.0;

/// The electrical load time series, and the time grid the whole model runs on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadProfile {
    /// Sample instants [hrs since start of data], strictly increasing
    pub time_hrs: Vec<f64>,
    /// Interval widths [hrs]; the last entry repeats the previous width
    pub dt_hrs: Vec<f64>,
    /// Load at each sample instant [kW]
    pub load_kw: Vec<f64>,
    /// Minimum load over the series [kW]
    pub min_load_kw: f64,
    /// Mean load over the series [kW]
    pub mean_load_kw: f64,
    /// Maximum load over the series [kW]
    pub max_load_kw: f64,
}

impl LoadProfile {
    /// Build a load profile from parallel time and load vectors.
    ///
    /// Times must be strictly increasing and at least two points long, so
    /// that interval widths are defined.
    pub fn from_series(time_hrs: Vec<f64>, load_kw: Vec<f64>) -> SimResult<Self> {
        if time_hrs.len() != load_kw.len() {
            return Err(SimError::InvalidConfig(format!(
                "load series length mismatch: {} times, {} loads",
                time_hrs.len(),
                load_kw.len()
            )));
        }
        if time_hrs.len() < 2 {
            return Err(SimError::InvalidConfig(
                "load series must contain at least two points".into(),
            ));
        }
        for pair in time_hrs.windows(2) {
            if pair[1] <= pair[0] {
                return Err(SimError::InvalidConfig(format!(
                    "load times must be strictly increasing ({} then {})",
                    pair[0], pair[1]
                )));
            }
        }

        let n = time_hrs.len();
        let mut dt_hrs = vec![0.0; n];
        for i in 0..n - 1 {
            dt_hrs[i] = time_hrs[i + 1] - time_hrs[i];
        }
        dt_hrs[n - 1] = dt_hrs[n - 2];

        let min_load_kw = load_kw.iter().copied().fold(f64::INFINITY, f64::min);
        let max_load_kw = load_kw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean_load_kw = load_kw.iter().sum::<f64>() / n as f64;

        Ok(Self {
            time_hrs,
            dt_hrs,
            load_kw,
            min_load_kw,
            mean_load_kw,
            max_load_kw,
        })
    }

    /// Number of points in the modelling time series.
    pub fn n_points(&self) -> usize {
        self.time_hrs.len()
    }

    /// Total modelled years, assuming 8760 hours per year.
    pub fn n_years(&self) -> f64 {
        match self.time_hrs.last() {
            Some(t) => t / HOURS_PER_YEAR,
            None => 0.0,
        }
    }
}
