//! Per-key exogenous resource time series (sun, wind, wave, inflow, ...).
//!
//! Series are registered against the load grid at initialisation and are
//! read-only afterwards; the store may be shared across parallel runs. A
//! 1-D series carries one value per step (irradiance, stream speed,
//! inflow); a 2-D series carries a pair per step (significant wave height,
//! energy period).

use std::collections::HashMap;

use crate::error::{SimError, SimResult};
use crate::load::LoadProfile;

/// Tolerance for comparing resource sample instants against the load grid.
pub const GRID_TOLERANCE_HRS: f64 = 1e-6;

/// Keyed store of exogenous resource series, validated against the load grid.
#[derive(Debug, Clone, Default)]
pub struct ResourceStore {
    series_1d: HashMap<u32, Vec<f64>>,
    series_2d: HashMap<u32, Vec<[f64; 2]>>,
}

fn check_grid(key: u32, time_hrs: &[f64], profile: &LoadProfile) -> SimResult<()> {
    if time_hrs.len() != profile.n_points() {
        return Err(SimError::GridMismatch(format!(
            "resource key {key} has {} points, load grid has {}",
            time_hrs.len(),
            profile.n_points()
        )));
    }
    for (i, (resource_t, load_t)) in time_hrs.iter().zip(profile.time_hrs.iter()).enumerate() {
        if (resource_t - load_t).abs() > GRID_TOLERANCE_HRS {
            return Err(SimError::GridMismatch(format!(
                "resource key {key}, step {i}: sample instant {resource_t} does not match load grid instant {load_t}"
            )));
        }
    }
    Ok(())
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a 1-D resource series under the given key.
    pub fn register_1d(
        &mut self,
        key: u32,
        time_hrs: &[f64],
        values: Vec<f64>,
        profile: &LoadProfile,
    ) -> SimResult<()> {
        if self.series_1d.contains_key(&key) {
            return Err(SimError::InvalidConfig(format!(
                "1-D resource key {key} already registered"
            )));
        }
        if values.len() != time_hrs.len() {
            return Err(SimError::GridMismatch(format!(
                "resource key {key} has {} values for {} sample instants",
                values.len(),
                time_hrs.len()
            )));
        }
        check_grid(key, time_hrs, profile)?;
        self.series_1d.insert(key, values);
        Ok(())
    }

    /// Register a 2-D resource series (one `[H_s, T_e]` pair per step).
    pub fn register_2d(
        &mut self,
        key: u32,
        time_hrs: &[f64],
        values: Vec<[f64; 2]>,
        profile: &LoadProfile,
    ) -> SimResult<()> {
        if self.series_2d.contains_key(&key) {
            return Err(SimError::InvalidConfig(format!(
                "2-D resource key {key} already registered"
            )));
        }
        if values.len() != time_hrs.len() {
            return Err(SimError::GridMismatch(format!(
                "resource key {key} has {} values for {} sample instants",
                values.len(),
                time_hrs.len()
            )));
        }
        check_grid(key, time_hrs, profile)?;
        self.series_2d.insert(key, values);
        Ok(())
    }

    /// Value of the 1-D series under `key` at the given step.
    pub fn get_1d(&self, key: u32, step: usize) -> SimResult<f64> {
        let series = self
            .series_1d
            .get(&key)
            .ok_or_else(|| SimError::OutOfDomain(format!("no 1-D resource under key {key}")))?;
        series.get(step).copied().ok_or_else(|| {
            SimError::OutOfDomain(format!(
                "step {step} beyond 1-D resource under key {key} ({} points)",
                series.len()
            ))
        })
    }

    /// `[H_s, T_e]` pair of the 2-D series under `key` at the given step.
    pub fn get_2d(&self, key: u32, step: usize) -> SimResult<[f64; 2]> {
        let series = self
            .series_2d
            .get(&key)
            .ok_or_else(|| SimError::OutOfDomain(format!("no 2-D resource under key {key}")))?;
        series.get(step).copied().ok_or_else(|| {
            SimError::OutOfDomain(format!(
                "step {step} beyond 2-D resource under key {key} ({} points)",
                series.len()
            ))
        })
    }

    pub fn has_1d(&self, key: u32) -> bool {
        self.series_1d.contains_key(&key)
    }

    pub fn has_2d(&self, key: u32) -> bool {
        self.series_2d.contains_key(&key)
    }

    /// Drop all registered series.
    pub fn clear(&mut self) {
        self.series_1d.clear();
        self.series_2d.clear();
    }
}
