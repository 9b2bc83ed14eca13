//! Renewable production assets driven by exogenous resources.
//!
//! A renewable asset couples a resource series (irradiance, stream speed,
//! or sea state) to a production model. Production models are pure
//! functions of step-local inputs plus asset attributes; the dispatch
//! controller precomputes production for every step at init and the commit
//! merely splits it into dispatch and curtailment against the residual
//! load. The firmness factor is the fraction of instantaneous production
//! counted as firm when computing reserve requirements.

pub mod solar;
pub mod tidal;
pub mod wave;
pub mod wind;

use serde::{Deserialize, Serialize};

use mgrid_core::error::{SimError, SimResult};
use mgrid_core::units::{Hours, Kilowatts};
use mgrid_core::Interpolator;

use crate::base::ProductionBase;

pub use solar::SolarGeometry;

/// Which renewable family an asset belongs to; fixes the resource
/// dimensionality and the results directory label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenewableKind {
    Solar,
    Wind,
    Tidal,
    Wave,
}

impl RenewableKind {
    pub fn type_str(&self) -> &'static str {
        match self {
            RenewableKind::Solar => "SOLAR",
            RenewableKind::Wind => "WIND",
            RenewableKind::Tidal => "TIDAL",
            RenewableKind::Wave => "WAVE",
        }
    }

    /// Wave assets sample a 2-D resource; all others are 1-D.
    pub fn uses_wave_resource(&self) -> bool {
        matches!(self, RenewableKind::Wave)
    }
}

/// One step's resource sample, matching the asset's resource dimensionality.
#[derive(Debug, Clone, Copy)]
pub enum ResourceSample {
    Scalar(f64),
    Wave {
        significant_wave_height_m: f64,
        energy_period_s: f64,
    },
}

/// The production model applied to the resource sample.
#[derive(Debug, Clone)]
pub enum RenewableModel {
    SolarSimple {
        derating: f64,
    },
    SolarDetailed(SolarGeometry),
    WindExponential {
        design_speed_ms: f64,
    },
    TidalCubic {
        design_speed_ms: f64,
    },
    TidalExponential {
        design_speed_ms: f64,
    },
    /// 1-D normalised power curve against speed, for wind or tidal
    PowerCurveLookup {
        curve: Interpolator,
    },
    WaveGaussian {
        design_height_m: f64,
        design_period_s: f64,
    },
    WaveParaboloid {
        design_height_m: f64,
        design_period_s: f64,
    },
    /// 2-D normalised performance matrix over (H_s, T_e)
    WaveLookup {
        performance: Interpolator,
    },
}

/// Constructor inputs for a solar PV array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolarInputs {
    pub capacity_kw: f64,
    pub resource_key: u32,
    pub firmness_factor: f64,
    pub power_model: String,
    pub derating: f64,
    /// Days (including partial days) since 12:00 on 1 Jan 2000
    pub julian_day: f64,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub panel_azimuth_deg: f64,
    pub panel_tilt_deg: f64,
    pub albedo_ground_reflectance: f64,
    pub is_sunk: bool,
    pub capital_cost: f64,
    pub om_cost_kwh: f64,
    pub nominal_inflation_annual: f64,
    pub nominal_discount_annual: f64,
    pub replace_running_hrs: f64,
    pub normalized_production_path: Option<String>,
}

impl Default for SolarInputs {
    fn default() -> Self {
        Self {
            capacity_kw: 100.0,
            resource_key: 0,
            firmness_factor: 0.0,
            power_model: "simple".into(),
            derating: 0.8,
            julian_day: 0.0,
            latitude_deg: 0.0,
            longitude_deg: 0.0,
            panel_azimuth_deg: 0.0,
            panel_tilt_deg: 0.0,
            albedo_ground_reflectance: 0.5,
            is_sunk: false,
            capital_cost: -1.0,
            om_cost_kwh: -1.0,
            nominal_inflation_annual: 0.02,
            nominal_discount_annual: 0.04,
            replace_running_hrs: 90_000.0,
            normalized_production_path: None,
        }
    }
}

/// Constructor inputs for a wind turbine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindInputs {
    pub capacity_kw: f64,
    pub resource_key: u32,
    pub firmness_factor: f64,
    pub power_model: String,
    pub design_speed_ms: f64,
    /// CSV of speed vs normalised power; required for the lookup model
    pub power_curve_path: Option<String>,
    pub is_sunk: bool,
    pub capital_cost: f64,
    pub om_cost_kwh: f64,
    pub nominal_inflation_annual: f64,
    pub nominal_discount_annual: f64,
    pub replace_running_hrs: f64,
    pub normalized_production_path: Option<String>,
}

impl Default for WindInputs {
    fn default() -> Self {
        Self {
            capacity_kw: 100.0,
            resource_key: 0,
            firmness_factor: 0.0,
            power_model: "exponential".into(),
            design_speed_ms: 8.0,
            power_curve_path: None,
            is_sunk: false,
            capital_cost: -1.0,
            om_cost_kwh: -1.0,
            nominal_inflation_annual: 0.02,
            nominal_discount_annual: 0.04,
            replace_running_hrs: 90_000.0,
            normalized_production_path: None,
        }
    }
}

/// Constructor inputs for a tidal turbine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TidalInputs {
    pub capacity_kw: f64,
    pub resource_key: u32,
    pub firmness_factor: f64,
    pub power_model: String,
    pub design_speed_ms: f64,
    pub power_curve_path: Option<String>,
    pub is_sunk: bool,
    pub capital_cost: f64,
    pub om_cost_kwh: f64,
    pub nominal_inflation_annual: f64,
    pub nominal_discount_annual: f64,
    pub replace_running_hrs: f64,
    pub normalized_production_path: Option<String>,
}

impl Default for TidalInputs {
    fn default() -> Self {
        Self {
            capacity_kw: 100.0,
            resource_key: 0,
            firmness_factor: 0.0,
            power_model: "cubic".into(),
            design_speed_ms: 2.5,
            power_curve_path: None,
            is_sunk: false,
            capital_cost: -1.0,
            om_cost_kwh: -1.0,
            nominal_inflation_annual: 0.02,
            nominal_discount_annual: 0.04,
            replace_running_hrs: 90_000.0,
            normalized_production_path: None,
        }
    }
}

/// Constructor inputs for a wave energy converter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveInputs {
    pub capacity_kw: f64,
    pub resource_key: u32,
    pub firmness_factor: f64,
    pub power_model: String,
    pub design_significant_wave_height_m: f64,
    pub design_energy_period_s: f64,
    /// CSV performance matrix (H_s across, T_e down); required for lookup
    pub performance_matrix_path: Option<String>,
    pub is_sunk: bool,
    pub capital_cost: f64,
    pub om_cost_kwh: f64,
    pub nominal_inflation_annual: f64,
    pub nominal_discount_annual: f64,
    pub replace_running_hrs: f64,
    pub normalized_production_path: Option<String>,
}

impl Default for WaveInputs {
    fn default() -> Self {
        Self {
            capacity_kw: 100.0,
            resource_key: 0,
            firmness_factor: 0.0,
            power_model: "paraboloid".into(),
            design_significant_wave_height_m: 3.0,
            design_energy_period_s: 10.0,
            performance_matrix_path: None,
            is_sunk: false,
            capital_cost: -1.0,
            om_cost_kwh: -1.0,
            nominal_inflation_annual: 0.02,
            nominal_discount_annual: 0.04,
            replace_running_hrs: 90_000.0,
            normalized_production_path: None,
        }
    }
}

/// A renewable production asset.
#[derive(Debug, Clone)]
pub struct RenewableAsset {
    pub kind: RenewableKind,
    pub base: ProductionBase,
    pub resource_key: u32,
    pub firmness_factor: f64,
    pub model: RenewableModel,
}

fn generic_solar_capital_cost(capacity_kw: f64) -> f64 {
    (1000.0 * capacity_kw.powf(-0.15) + 3000.0) * capacity_kw
}

fn generic_turbine_capital_cost(capacity_kw: f64) -> f64 {
    (3000.0 * capacity_kw.powf(-0.15) + 3000.0) * capacity_kw
}

fn generic_wave_capital_cost(capacity_kw: f64) -> f64 {
    (7000.0 * capacity_kw.powf(-0.15) + 5000.0) * capacity_kw
}

fn generic_om_cost_kwh(capacity_kw: f64) -> f64 {
    0.05 * capacity_kw.powf(-0.2) + 0.05
}

fn check_common(
    kind: RenewableKind,
    capacity_kw: f64,
    firmness_factor: f64,
    n_points: usize,
    normalized: &Option<Vec<f64>>,
) -> SimResult<()> {
    if capacity_kw <= 0.0 {
        return Err(SimError::InvalidConfig(format!(
            "{} capacity must be > 0 kW, got {capacity_kw}",
            kind.type_str()
        )));
    }
    if !(0.0..=1.0).contains(&firmness_factor) {
        return Err(SimError::InvalidConfig(format!(
            "{} firmness factor must be in [0, 1], got {firmness_factor}",
            kind.type_str()
        )));
    }
    if let Some(series) = normalized {
        if series.len() != n_points {
            return Err(SimError::GridMismatch(format!(
                "normalized production series has {} points, load grid has {n_points}",
                series.len()
            )));
        }
    }
    Ok(())
}

impl RenewableAsset {
    pub fn new_solar(
        n_points: usize,
        inputs: &SolarInputs,
        normalized_production: Option<Vec<f64>>,
    ) -> SimResult<Self> {
        check_common(
            RenewableKind::Solar,
            inputs.capacity_kw,
            inputs.firmness_factor,
            n_points,
            &normalized_production,
        )?;
        if !(0.0..=1.0).contains(&inputs.derating) {
            return Err(SimError::InvalidConfig(format!(
                "solar derating must be in [0, 1], got {}",
                inputs.derating
            )));
        }
        if !(-90.0..=90.0).contains(&inputs.latitude_deg) {
            return Err(SimError::InvalidConfig(format!(
                "latitude must be in [-90, 90] deg, got {}",
                inputs.latitude_deg
            )));
        }
        if !(-180.0..=180.0).contains(&inputs.longitude_deg) {
            return Err(SimError::InvalidConfig(format!(
                "longitude must be in [-180, 180] deg, got {}",
                inputs.longitude_deg
            )));
        }
        if inputs.julian_day < 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "julian day must be >= 0, got {}",
                inputs.julian_day
            )));
        }

        let model = match inputs.power_model.as_str() {
            "simple" => RenewableModel::SolarSimple {
                derating: inputs.derating,
            },
            "detailed" => RenewableModel::SolarDetailed(SolarGeometry {
                derating: inputs.derating,
                julian_day_start: inputs.julian_day,
                latitude_rad: inputs.latitude_deg.to_radians(),
                longitude_deg: inputs.longitude_deg,
                panel_azimuth_rad: inputs.panel_azimuth_deg.to_radians(),
                panel_tilt_rad: inputs.panel_tilt_deg.to_radians(),
                albedo_ground_reflectance: inputs.albedo_ground_reflectance,
            }),
            other => {
                return Err(SimError::UnknownKind(format!(
                    "solar power model '{other}' (expected 'simple' or 'detailed')"
                )))
            }
        };

        Ok(Self::assemble(
            RenewableKind::Solar,
            n_points,
            inputs.capacity_kw,
            inputs.resource_key,
            inputs.firmness_factor,
            model,
            inputs.is_sunk,
            if inputs.capital_cost < 0.0 {
                generic_solar_capital_cost(inputs.capacity_kw)
            } else {
                inputs.capital_cost
            },
            if inputs.om_cost_kwh < 0.0 {
                0.01
            } else {
                inputs.om_cost_kwh
            },
            inputs.nominal_inflation_annual,
            inputs.nominal_discount_annual,
            inputs.replace_running_hrs,
            normalized_production,
        ))
    }

    pub fn new_wind(
        n_points: usize,
        inputs: &WindInputs,
        power_curve: Option<(Vec<f64>, Vec<f64>)>,
        normalized_production: Option<Vec<f64>>,
    ) -> SimResult<Self> {
        check_common(
            RenewableKind::Wind,
            inputs.capacity_kw,
            inputs.firmness_factor,
            n_points,
            &normalized_production,
        )?;
        if inputs.design_speed_ms <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "wind design speed must be > 0 m/s, got {}",
                inputs.design_speed_ms
            )));
        }

        let model = match inputs.power_model.as_str() {
            "exponential" => RenewableModel::WindExponential {
                design_speed_ms: inputs.design_speed_ms,
            },
            "lookup" => RenewableModel::PowerCurveLookup {
                curve: speed_curve(power_curve, "wind")?,
            },
            other => {
                return Err(SimError::UnknownKind(format!(
                    "wind power model '{other}' (expected 'exponential' or 'lookup')"
                )))
            }
        };

        Ok(Self::assemble(
            RenewableKind::Wind,
            n_points,
            inputs.capacity_kw,
            inputs.resource_key,
            inputs.firmness_factor,
            model,
            inputs.is_sunk,
            if inputs.capital_cost < 0.0 {
                generic_turbine_capital_cost(inputs.capacity_kw)
            } else {
                inputs.capital_cost
            },
            if inputs.om_cost_kwh < 0.0 {
                generic_om_cost_kwh(inputs.capacity_kw)
            } else {
                inputs.om_cost_kwh
            },
            inputs.nominal_inflation_annual,
            inputs.nominal_discount_annual,
            inputs.replace_running_hrs,
            normalized_production,
        ))
    }

    pub fn new_tidal(
        n_points: usize,
        inputs: &TidalInputs,
        power_curve: Option<(Vec<f64>, Vec<f64>)>,
        normalized_production: Option<Vec<f64>>,
    ) -> SimResult<Self> {
        check_common(
            RenewableKind::Tidal,
            inputs.capacity_kw,
            inputs.firmness_factor,
            n_points,
            &normalized_production,
        )?;
        if inputs.design_speed_ms <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "tidal design speed must be > 0 m/s, got {}",
                inputs.design_speed_ms
            )));
        }

        let model = match inputs.power_model.as_str() {
            "cubic" => RenewableModel::TidalCubic {
                design_speed_ms: inputs.design_speed_ms,
            },
            "exponential" => RenewableModel::TidalExponential {
                design_speed_ms: inputs.design_speed_ms,
            },
            "lookup" => RenewableModel::PowerCurveLookup {
                curve: speed_curve(power_curve, "tidal")?,
            },
            other => {
                return Err(SimError::UnknownKind(format!(
                    "tidal power model '{other}' (expected 'cubic', 'exponential', or 'lookup')"
                )))
            }
        };

        Ok(Self::assemble(
            RenewableKind::Tidal,
            n_points,
            inputs.capacity_kw,
            inputs.resource_key,
            inputs.firmness_factor,
            model,
            inputs.is_sunk,
            if inputs.capital_cost < 0.0 {
                generic_turbine_capital_cost(inputs.capacity_kw)
            } else {
                inputs.capital_cost
            },
            if inputs.om_cost_kwh < 0.0 {
                generic_om_cost_kwh(inputs.capacity_kw)
            } else {
                inputs.om_cost_kwh
            },
            inputs.nominal_inflation_annual,
            inputs.nominal_discount_annual,
            inputs.replace_running_hrs,
            normalized_production,
        ))
    }

    pub fn new_wave(
        n_points: usize,
        inputs: &WaveInputs,
        performance_matrix: Option<(Vec<f64>, Vec<f64>, Vec<Vec<f64>>)>,
        normalized_production: Option<Vec<f64>>,
    ) -> SimResult<Self> {
        check_common(
            RenewableKind::Wave,
            inputs.capacity_kw,
            inputs.firmness_factor,
            n_points,
            &normalized_production,
        )?;
        if inputs.design_significant_wave_height_m <= 0.0 || inputs.design_energy_period_s <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "wave design sea state must be positive, got H_s = {} m, T_e = {} s",
                inputs.design_significant_wave_height_m, inputs.design_energy_period_s
            )));
        }

        let model = match inputs.power_model.as_str() {
            "gaussian" => RenewableModel::WaveGaussian {
                design_height_m: inputs.design_significant_wave_height_m,
                design_period_s: inputs.design_energy_period_s,
            },
            "paraboloid" => RenewableModel::WaveParaboloid {
                design_height_m: inputs.design_significant_wave_height_m,
                design_period_s: inputs.design_energy_period_s,
            },
            "lookup" => {
                let (heights, periods, matrix) = performance_matrix.ok_or_else(|| {
                    SimError::InvalidConfig(
                        "wave lookup model requires a performance matrix".into(),
                    )
                })?;
                let mut performance = Interpolator::new();
                performance.add_2d(0, heights, periods, matrix)?;
                RenewableModel::WaveLookup { performance }
            }
            other => {
                return Err(SimError::UnknownKind(format!(
                    "wave power model '{other}' (expected 'gaussian', 'paraboloid', or 'lookup')"
                )))
            }
        };

        Ok(Self::assemble(
            RenewableKind::Wave,
            n_points,
            inputs.capacity_kw,
            inputs.resource_key,
            inputs.firmness_factor,
            model,
            inputs.is_sunk,
            if inputs.capital_cost < 0.0 {
                generic_wave_capital_cost(inputs.capacity_kw)
            } else {
                inputs.capital_cost
            },
            if inputs.om_cost_kwh < 0.0 {
                generic_om_cost_kwh(inputs.capacity_kw)
            } else {
                inputs.om_cost_kwh
            },
            inputs.nominal_inflation_annual,
            inputs.nominal_discount_annual,
            inputs.replace_running_hrs,
            normalized_production,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        kind: RenewableKind,
        n_points: usize,
        capacity_kw: f64,
        resource_key: u32,
        firmness_factor: f64,
        model: RenewableModel,
        is_sunk: bool,
        capital_cost: f64,
        om_cost_kwh: f64,
        nominal_inflation_annual: f64,
        nominal_discount_annual: f64,
        replace_running_hrs: f64,
        normalized_production: Option<Vec<f64>>,
    ) -> Self {
        Self {
            kind,
            base: ProductionBase::new(
                n_points,
                capacity_kw,
                is_sunk,
                capital_cost,
                om_cost_kwh,
                nominal_inflation_annual,
                nominal_discount_annual,
                replace_running_hrs,
                normalized_production,
            ),
            resource_key,
            firmness_factor,
            model,
        }
    }

    /// Instantaneous production for the given step and resource sample,
    /// capped at capacity.
    ///
    /// `t_hrs` is the sample instant, used by the detailed solar model to
    /// advance its Julian-day clock.
    pub fn compute_production(
        &self,
        step: usize,
        t_hrs: f64,
        resource: ResourceSample,
    ) -> SimResult<Kilowatts> {
        if let Some(production) = self.base.override_production(step) {
            return Ok(production);
        }

        let capacity = self.base.capacity_kw.value();

        let normalized = match (&self.model, resource) {
            (RenewableModel::SolarSimple { derating }, ResourceSample::Scalar(ghi)) => {
                if ghi <= 0.0 {
                    0.0
                } else {
                    derating * ghi
                }
            }
            (RenewableModel::SolarDetailed(geometry), ResourceSample::Scalar(ghi)) => {
                if ghi <= 0.0 {
                    0.0
                } else {
                    let julian_day = geometry.julian_day_start + t_hrs / 24.0;
                    geometry.derating * geometry.plane_of_array_irradiance(julian_day, ghi)
                }
            }
            (
                RenewableModel::WindExponential { design_speed_ms },
                ResourceSample::Scalar(speed),
            ) => {
                if speed <= 0.0 {
                    0.0
                } else {
                    wind::exponential_production(speed, *design_speed_ms)
                }
            }
            (RenewableModel::TidalCubic { design_speed_ms }, ResourceSample::Scalar(speed)) => {
                if speed <= 0.0 {
                    0.0
                } else {
                    tidal::cubic_production(speed, *design_speed_ms)
                }
            }
            (
                RenewableModel::TidalExponential { design_speed_ms },
                ResourceSample::Scalar(speed),
            ) => {
                if speed <= 0.0 {
                    0.0
                } else {
                    tidal::exponential_production(speed, *design_speed_ms)
                }
            }
            (RenewableModel::PowerCurveLookup { curve }, ResourceSample::Scalar(speed)) => {
                if speed <= 0.0 {
                    0.0
                } else {
                    match curve.interp_1d(0, speed) {
                        Ok(value) => value.clamp(0.0, 1.0),
                        Err(SimError::OutOfDomain(_)) => 0.0,
                        Err(err) => return Err(err),
                    }
                }
            }
            (
                RenewableModel::WaveGaussian {
                    design_height_m,
                    design_period_s,
                },
                ResourceSample::Wave {
                    significant_wave_height_m,
                    energy_period_s,
                },
            ) => {
                if significant_wave_height_m <= 0.0 || energy_period_s <= 0.0 {
                    0.0
                } else {
                    wave::gaussian_production(
                        significant_wave_height_m,
                        energy_period_s,
                        *design_height_m,
                        *design_period_s,
                    )
                }
            }
            (
                RenewableModel::WaveParaboloid {
                    design_height_m,
                    design_period_s,
                },
                ResourceSample::Wave {
                    significant_wave_height_m,
                    energy_period_s,
                },
            ) => {
                if significant_wave_height_m <= 0.0 || energy_period_s <= 0.0 {
                    0.0
                } else {
                    wave::paraboloid_production(
                        significant_wave_height_m,
                        energy_period_s,
                        *design_height_m,
                        *design_period_s,
                    )
                }
            }
            (
                RenewableModel::WaveLookup { performance },
                ResourceSample::Wave {
                    significant_wave_height_m,
                    energy_period_s,
                },
            ) => {
                if significant_wave_height_m <= 0.0 || energy_period_s <= 0.0 {
                    0.0
                } else {
                    match performance.interp_2d(0, significant_wave_height_m, energy_period_s) {
                        Ok(value) => value.clamp(0.0, 1.0),
                        Err(SimError::OutOfDomain(_)) => 0.0,
                        Err(err) => return Err(err),
                    }
                }
            }
            (_, sample) => {
                return Err(SimError::InvalidConfig(format!(
                    "{} asset received a resource sample of the wrong dimensionality: {sample:?}",
                    self.kind.type_str()
                )))
            }
        };

        Ok(Kilowatts((normalized * capacity).clamp(0.0, capacity)))
    }

    /// Commit precomputed production against the residual load, splitting
    /// it into dispatch and curtailment. Returns the load left over.
    pub fn commit(
        &mut self,
        step: usize,
        dt: Hours,
        production: Kilowatts,
        load: Kilowatts,
    ) -> Kilowatts {
        self.base.is_running = production.value() > 0.0;
        let remaining = self.base.commit_production(step, dt, production, load);
        if self.base.replacement_due() {
            self.base.handle_replacement(step);
        }
        remaining
    }

    pub fn reset(&mut self) {
        self.base.reset();
    }
}

fn speed_curve(data: Option<(Vec<f64>, Vec<f64>)>, kind: &str) -> SimResult<Interpolator> {
    let (speeds, normalized) = data.ok_or_else(|| {
        SimError::InvalidConfig(format!("{kind} lookup model requires a power curve"))
    })?;
    let mut curve = Interpolator::new();
    curve.add_1d(0, speeds, normalized)?;
    Ok(curve)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_solar_production() {
        let inputs = SolarInputs {
            capacity_kw: 100.0,
            derating: 0.8,
            ..SolarInputs::default()
        };
        let asset = RenewableAsset::new_solar(4, &inputs, None).unwrap();
        let production = asset
            .compute_production(0, 0.0, ResourceSample::Scalar(0.5))
            .unwrap();
        assert!((production.value() - 40.0).abs() < 1e-12);
        // capped at capacity under strong irradiance
        let production = asset
            .compute_production(0, 0.0, ResourceSample::Scalar(2.0))
            .unwrap();
        assert_eq!(production.value(), 100.0);
    }

    #[test]
    fn test_zero_resource_means_zero_production() {
        let asset = RenewableAsset::new_solar(4, &SolarInputs::default(), None).unwrap();
        let production = asset
            .compute_production(0, 0.0, ResourceSample::Scalar(0.0))
            .unwrap();
        assert_eq!(production.value(), 0.0);
    }

    #[test]
    fn test_override_wins_over_resource() {
        let inputs = SolarInputs {
            capacity_kw: 100.0,
            ..SolarInputs::default()
        };
        let asset =
            RenewableAsset::new_solar(2, &inputs, Some(vec![0.3, 0.6])).unwrap();
        let production = asset
            .compute_production(1, 1.0, ResourceSample::Scalar(0.0))
            .unwrap();
        assert!((production.value() - 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_model_tag() {
        let inputs = SolarInputs {
            power_model: "astral".into(),
            ..SolarInputs::default()
        };
        assert!(matches!(
            RenewableAsset::new_solar(4, &inputs, None),
            Err(SimError::UnknownKind(_))
        ));
    }

    #[test]
    fn test_tidal_cubic_band() {
        let inputs = TidalInputs {
            capacity_kw: 100.0,
            design_speed_ms: 2.0,
            ..TidalInputs::default()
        };
        let asset = RenewableAsset::new_tidal(4, &inputs, None, None).unwrap();
        let at_design = asset
            .compute_production(0, 0.0, ResourceSample::Scalar(2.0))
            .unwrap();
        assert!((at_design.value() - 100.0).abs() < 1e-9);
        let below_cut_in = asset
            .compute_production(0, 0.0, ResourceSample::Scalar(0.2))
            .unwrap();
        assert_eq!(below_cut_in.value(), 0.0);
    }

    #[test]
    fn test_power_curve_lookup_zero_outside_domain() {
        let inputs = WindInputs {
            capacity_kw: 100.0,
            power_model: "lookup".into(),
            ..WindInputs::default()
        };
        let curve = (vec![3.0, 8.0, 12.0], vec![0.0, 1.0, 0.9]);
        let asset = RenewableAsset::new_wind(4, &inputs, Some(curve), None).unwrap();
        let inside = asset
            .compute_production(0, 0.0, ResourceSample::Scalar(8.0))
            .unwrap();
        assert!((inside.value() - 100.0).abs() < 1e-9);
        let outside = asset
            .compute_production(0, 0.0, ResourceSample::Scalar(20.0))
            .unwrap();
        assert_eq!(outside.value(), 0.0);
    }

    #[test]
    fn test_wave_lookup_bilinear() {
        let inputs = WaveInputs {
            capacity_kw: 200.0,
            power_model: "lookup".into(),
            ..WaveInputs::default()
        };
        let matrix = (
            vec![1.0, 3.0],
            vec![6.0, 12.0],
            vec![vec![0.2, 0.6], vec![0.4, 1.0]],
        );
        let asset = RenewableAsset::new_wave(4, &inputs, Some(matrix), None).unwrap();
        let centre = asset
            .compute_production(
                0,
                0.0,
                ResourceSample::Wave {
                    significant_wave_height_m: 2.0,
                    energy_period_s: 9.0,
                },
            )
            .unwrap();
        assert!((centre.value() - 0.55 * 200.0).abs() < 1e-9);
        // outside the table domain produces nothing
        let outside = asset
            .compute_production(
                0,
                0.0,
                ResourceSample::Wave {
                    significant_wave_height_m: 5.0,
                    energy_period_s: 9.0,
                },
            )
            .unwrap();
        assert_eq!(outside.value(), 0.0);
    }

    #[test]
    fn test_commit_splits_and_flags_running() {
        let inputs = SolarInputs {
            capacity_kw: 100.0,
            ..SolarInputs::default()
        };
        let mut asset = RenewableAsset::new_solar(2, &inputs, None).unwrap();
        let remaining = asset.commit(0, Hours(1.0), Kilowatts(60.0), Kilowatts(40.0));
        assert_eq!(remaining.value(), 0.0);
        assert_eq!(asset.base.series.dispatch_kw[0], 40.0);
        assert_eq!(asset.base.series.curtailment_kw[0], 20.0);
        assert!(asset.base.series.is_running[0]);

        let remaining = asset.commit(1, Hours(1.0), Kilowatts(0.0), Kilowatts(40.0));
        assert_eq!(remaining.value(), 40.0);
        assert!(!asset.base.series.is_running[1]);
    }

    #[test]
    fn test_firmness_bounds_enforced() {
        let inputs = WindInputs {
            firmness_factor: 1.4,
            ..WindInputs::default()
        };
        assert!(matches!(
            RenewableAsset::new_wind(4, &inputs, None, None),
            Err(SimError::InvalidConfig(_))
        ));
    }
}
