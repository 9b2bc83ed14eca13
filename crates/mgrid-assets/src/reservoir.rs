//! Hydro-like dispatchable production with reservoir state.
//!
//! The asset converts a turbine flow drawn from a finite reservoir into
//! power via `P = eta * rho * g * Q * H / 1000` (Q in m3/s). Dispatch picks
//! a flow as close to the request as the flow window and reservoir level
//! allow; inflow the reservoir cannot hold is spilled.

use serde::{Deserialize, Serialize};

use mgrid_core::error::{SimError, SimResult};
use mgrid_core::units::{Hours, Kilowatts};

use crate::base::ProductionBase;

/// Standard gravity [m/s2]
const GRAVITY_MS2: f64 = 9.80665;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Hydro turbine family; fixes the conversion efficiency applied in the
/// power law.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurbineType {
    Pelton,
    Francis,
    Kaplan,
}

impl TurbineType {
    pub fn efficiency(&self) -> f64 {
        match self {
            TurbineType::Pelton => 0.88,
            TurbineType::Francis => 0.90,
            TurbineType::Kaplan => 0.92,
        }
    }

    pub fn type_str(&self) -> &'static str {
        match self {
            TurbineType::Pelton => "PELTON",
            TurbineType::Francis => "FRANCIS",
            TurbineType::Kaplan => "KAPLAN",
        }
    }
}

impl std::str::FromStr for TurbineType {
    type Err = SimError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "pelton" => Ok(TurbineType::Pelton),
            "francis" => Ok(TurbineType::Francis),
            "kaplan" => Ok(TurbineType::Kaplan),
            other => Err(SimError::UnknownKind(format!(
                "turbine type '{other}' (expected 'pelton', 'francis', or 'kaplan')"
            ))),
        }
    }
}

/// Constructor inputs for a hydro asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HydroInputs {
    pub capacity_kw: f64,
    /// Key of the 1-D inflow series [m3/hr]
    pub resource_key: u32,
    pub turbine_type: String,
    pub fluid_density_kgm3: f64,
    pub net_head_m: f64,
    pub reservoir_capacity_m3: f64,
    /// Initial stored volume as a fraction of reservoir capacity
    pub init_reservoir_state: f64,
    pub minimum_flow_m3hr: f64,
    /// Negative selects the flow that yields rated power at net head
    pub maximum_flow_m3hr: f64,
    pub is_sunk: bool,
    pub capital_cost: f64,
    pub om_cost_kwh: f64,
    pub nominal_inflation_annual: f64,
    pub nominal_discount_annual: f64,
    pub replace_running_hrs: f64,
    pub normalized_production_path: Option<String>,
}

impl Default for HydroInputs {
    fn default() -> Self {
        Self {
            capacity_kw: 100.0,
            resource_key: 0,
            turbine_type: "francis".into(),
            fluid_density_kgm3: 1000.0,
            net_head_m: 10.0,
            reservoir_capacity_m3: 10_000.0,
            init_reservoir_state: 0.5,
            minimum_flow_m3hr: 0.0,
            maximum_flow_m3hr: -1.0,
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

/// A dispatchable non-combustion production asset with reservoir state.
#[derive(Debug, Clone)]
pub struct ReservoirAsset {
    pub base: ProductionBase,
    pub resource_key: u32,
    pub turbine: TurbineType,
    pub fluid_density_kgm3: f64,
    pub net_head_m: f64,
    pub reservoir_capacity_m3: f64,
    pub init_reservoir_state: f64,
    pub stored_volume_m3: f64,
    pub minimum_flow_m3hr: f64,
    pub maximum_flow_m3hr: f64,
    pub turbine_flow_m3hr: Vec<f64>,
    pub spill_rate_m3hr: Vec<f64>,
    pub stored_volume_series_m3: Vec<f64>,
}

fn generic_hydro_capital_cost(capacity_kw: f64) -> f64 {
    (4000.0 * capacity_kw.powf(-0.2) + 2000.0) * capacity_kw
}

impl ReservoirAsset {
    pub fn new_hydro(
        n_points: usize,
        inputs: &HydroInputs,
        normalized_production: Option<Vec<f64>>,
    ) -> SimResult<Self> {
        if inputs.capacity_kw <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "hydro capacity must be > 0 kW, got {}",
                inputs.capacity_kw
            )));
        }
        if inputs.fluid_density_kgm3 <= 0.0 || inputs.net_head_m <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "hydro density and head must be positive, got {} kg/m3 at {} m",
                inputs.fluid_density_kgm3, inputs.net_head_m
            )));
        }
        if inputs.reservoir_capacity_m3 <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "reservoir capacity must be > 0 m3, got {}",
                inputs.reservoir_capacity_m3
            )));
        }
        if !(0.0..=1.0).contains(&inputs.init_reservoir_state) {
            return Err(SimError::InvalidConfig(format!(
                "initial reservoir state must be in [0, 1], got {}",
                inputs.init_reservoir_state
            )));
        }
        if inputs.minimum_flow_m3hr < 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "minimum flow must be >= 0 m3/hr, got {}",
                inputs.minimum_flow_m3hr
            )));
        }
        if let Some(series) = &normalized_production {
            if series.len() != n_points {
                return Err(SimError::GridMismatch(format!(
                    "normalized production series has {} points, load grid has {n_points}",
                    series.len()
                )));
            }
        }

        let turbine: TurbineType = inputs.turbine_type.parse()?;

        let mut asset = Self {
            base: ProductionBase::new(
                n_points,
                inputs.capacity_kw,
                inputs.is_sunk,
                if inputs.capital_cost < 0.0 {
                    generic_hydro_capital_cost(inputs.capacity_kw)
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
            ),
            resource_key: inputs.resource_key,
            turbine,
            fluid_density_kgm3: inputs.fluid_density_kgm3,
            net_head_m: inputs.net_head_m,
            reservoir_capacity_m3: inputs.reservoir_capacity_m3,
            init_reservoir_state: inputs.init_reservoir_state,
            stored_volume_m3: inputs.init_reservoir_state * inputs.reservoir_capacity_m3,
            minimum_flow_m3hr: inputs.minimum_flow_m3hr,
            maximum_flow_m3hr: 0.0,
            turbine_flow_m3hr: vec![0.0; n_points],
            spill_rate_m3hr: vec![0.0; n_points],
            stored_volume_series_m3: vec![0.0; n_points],
        };

        asset.maximum_flow_m3hr = if inputs.maximum_flow_m3hr < 0.0 {
            asset.flow_from_power_m3hr(inputs.capacity_kw)
        } else {
            inputs.maximum_flow_m3hr
        };
        if asset.maximum_flow_m3hr < asset.minimum_flow_m3hr {
            return Err(SimError::InvalidConfig(format!(
                "maximum flow {} m3/hr is below minimum flow {} m3/hr",
                asset.maximum_flow_m3hr, asset.minimum_flow_m3hr
            )));
        }

        Ok(asset)
    }

    /// Power [kW] produced by a turbine flow [m3/hr] at net head.
    pub fn power_from_flow_kw(&self, flow_m3hr: f64) -> f64 {
        self.turbine.efficiency() * self.fluid_density_kgm3 * GRAVITY_MS2
            * (flow_m3hr / SECONDS_PER_HOUR)
            * self.net_head_m
            / 1000.0
    }

    /// Turbine flow [m3/hr] required to produce the given power [kW].
    pub fn flow_from_power_m3hr(&self, power_kw: f64) -> f64 {
        power_kw * 1000.0 * SECONDS_PER_HOUR
            / (self.turbine.efficiency() * self.fluid_density_kgm3 * GRAVITY_MS2 * self.net_head_m)
    }

    /// What the asset can deliver against a request this step, subject to
    /// the flow window and the water actually available.
    pub fn request_production(
        &self,
        step: usize,
        dt: Hours,
        request: Kilowatts,
        inflow_m3hr: f64,
    ) -> Kilowatts {
        if let Some(production) = self.base.override_production(step) {
            return production;
        }
        if request.value() <= 0.0 {
            return Kilowatts(0.0);
        }

        // flow sustainable over the step: stored water plus inflow
        let water_budget_m3hr = self.stored_volume_m3 / dt.value() + inflow_m3hr.max(0.0);

        let mut flow = self
            .flow_from_power_m3hr(request.value())
            .min(self.maximum_flow_m3hr)
            .min(water_budget_m3hr);

        if flow < self.minimum_flow_m3hr {
            return Kilowatts(0.0);
        }
        if flow < 0.0 {
            flow = 0.0;
        }

        Kilowatts(
            self.power_from_flow_kw(flow)
                .min(self.base.capacity_kw.value()),
        )
    }

    /// Commit production, update the reservoir, and return the remaining
    /// load. Inflow beyond what the reservoir can hold is spilled.
    pub fn commit(
        &mut self,
        step: usize,
        dt: Hours,
        production: Kilowatts,
        load: Kilowatts,
        inflow_m3hr: f64,
    ) -> Kilowatts {
        let dt_hrs = dt.value();
        let flow_m3hr = if production.value() > 0.0 {
            self.flow_from_power_m3hr(production.value())
        } else {
            0.0
        };

        let unclamped_m3 =
            self.stored_volume_m3 + (inflow_m3hr.max(0.0) - flow_m3hr) * dt_hrs;
        let spill_m3hr = ((unclamped_m3 - self.reservoir_capacity_m3) / dt_hrs).max(0.0);
        let volume_m3 = (unclamped_m3 - spill_m3hr * dt_hrs).clamp(0.0, self.reservoir_capacity_m3);

        self.turbine_flow_m3hr[step] = flow_m3hr;
        self.spill_rate_m3hr[step] = spill_m3hr;
        self.stored_volume_series_m3[step] = volume_m3;
        self.stored_volume_m3 = volume_m3;

        self.base.is_running = production.value() > 0.0;
        let remaining = self.base.commit_production(step, dt, production, load);
        if self.base.replacement_due() {
            self.base.handle_replacement(step);
        }
        remaining
    }

    pub fn reset(&mut self) {
        self.stored_volume_m3 = self.init_reservoir_state * self.reservoir_capacity_m3;
        self.turbine_flow_m3hr.fill(0.0);
        self.spill_rate_m3hr.fill(0.0);
        self.stored_volume_series_m3.fill(0.0);
        self.base.reset();
    }
}
