//! Fuel-burning dispatchable production (diesel generator sets).
//!
//! A combustion asset is an on/off state machine with a minimum load ratio
//! and a minimum runtime: once started it cannot stop until it has run for
//! at least `minimum_runtime_hrs` since the last start, even when asked for
//! zero power (it idles, burning intercept fuel). Fuel is either a linear
//! law `L = (a·P + b·C)·Δt` or a lookup on load ratio; emissions are scalar
//! intensities applied to litres burned.

use serde::{Deserialize, Serialize};

use mgrid_core::error::{SimError, SimResult};
use mgrid_core::units::{Hours, Kilowatts};
use mgrid_core::Interpolator;

use crate::base::ProductionBase;

/// Fraction of capacity used to assess O&M when idling at zero production.
const IDLE_OM_CAPACITY_FRACTION: f64 = 0.01;

/// Emission intensities per litre of fuel burned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmissionIntensities {
    pub co2_kg_per_l: f64,
    pub co_kg_per_l: f64,
    pub nox_kg_per_l: f64,
    pub sox_kg_per_l: f64,
    pub ch4_kg_per_l: f64,
    pub pm_kg_per_l: f64,
}

impl Default for EmissionIntensities {
    fn default() -> Self {
        // survey values for diesel gensets
        Self {
            co2_kg_per_l: 2.7,
            co_kg_per_l: 0.0178,
            nox_kg_per_l: 0.0014,
            sox_kg_per_l: 0.0042,
            ch4_kg_per_l: 0.0007,
            pm_kg_per_l: 0.0001,
        }
    }
}

impl EmissionIntensities {
    pub fn emissions_for(&self, fuel_l: f64) -> Emissions {
        Emissions {
            co2_kg: self.co2_kg_per_l * fuel_l,
            co_kg: self.co_kg_per_l * fuel_l,
            nox_kg: self.nox_kg_per_l * fuel_l,
            sox_kg: self.sox_kg_per_l * fuel_l,
            ch4_kg: self.ch4_kg_per_l * fuel_l,
            pm_kg: self.pm_kg_per_l * fuel_l,
        }
    }

    fn validate(&self) -> SimResult<()> {
        let fields = [
            ("co2", self.co2_kg_per_l),
            ("co", self.co_kg_per_l),
            ("nox", self.nox_kg_per_l),
            ("sox", self.sox_kg_per_l),
            ("ch4", self.ch4_kg_per_l),
            ("pm", self.pm_kg_per_l),
        ];
        for (name, value) in fields {
            if value < 0.0 {
                return Err(SimError::InvalidConfig(format!(
                    "{name} emission intensity must be >= 0 kg/L, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Emitted masses for one step or one whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Emissions {
    pub co2_kg: f64,
    pub co_kg: f64,
    pub nox_kg: f64,
    pub sox_kg: f64,
    pub ch4_kg: f64,
    pub pm_kg: f64,
}

impl Emissions {
    pub fn add(&mut self, other: &Emissions) {
        self.co2_kg += other.co2_kg;
        self.co_kg += other.co_kg;
        self.nox_kg += other.nox_kg;
        self.sox_kg += other.sox_kg;
        self.ch4_kg += other.ch4_kg;
        self.pm_kg += other.pm_kg;
    }
}

/// Per-step emitted masses, one vector per species.
#[derive(Debug, Clone, Default)]
pub struct EmissionsSeries {
    pub co2_kg: Vec<f64>,
    pub co_kg: Vec<f64>,
    pub nox_kg: Vec<f64>,
    pub sox_kg: Vec<f64>,
    pub ch4_kg: Vec<f64>,
    pub pm_kg: Vec<f64>,
}

impl EmissionsSeries {
    pub fn new(n_points: usize) -> Self {
        Self {
            co2_kg: vec![0.0; n_points],
            co_kg: vec![0.0; n_points],
            nox_kg: vec![0.0; n_points],
            sox_kg: vec![0.0; n_points],
            ch4_kg: vec![0.0; n_points],
            pm_kg: vec![0.0; n_points],
        }
    }

    pub fn record(&mut self, step: usize, emissions: &Emissions) {
        self.co2_kg[step] = emissions.co2_kg;
        self.co_kg[step] = emissions.co_kg;
        self.nox_kg[step] = emissions.nox_kg;
        self.sox_kg[step] = emissions.sox_kg;
        self.ch4_kg[step] = emissions.ch4_kg;
        self.pm_kg[step] = emissions.pm_kg;
    }

    pub fn totals(&self) -> Emissions {
        Emissions {
            co2_kg: self.co2_kg.iter().sum(),
            co_kg: self.co_kg.iter().sum(),
            nox_kg: self.nox_kg.iter().sum(),
            sox_kg: self.sox_kg.iter().sum(),
            ch4_kg: self.ch4_kg.iter().sum(),
            pm_kg: self.pm_kg.iter().sum(),
        }
    }

    pub fn reset(&mut self) {
        self.co2_kg.fill(0.0);
        self.co_kg.fill(0.0);
        self.nox_kg.fill(0.0);
        self.sox_kg.fill(0.0);
        self.ch4_kg.fill(0.0);
        self.pm_kg.fill(0.0);
    }
}

/// How fuel consumption follows from production.
#[derive(Debug, Clone)]
pub enum FuelModel {
    /// `L = (slope·P + intercept·C)·Δt`
    Linear {
        slope_l_per_kwh: f64,
        intercept_l_per_kwh: f64,
    },
    /// 1-D lookup of litres-per-hour against load ratio `P/C`
    Lookup(Interpolator),
}

/// Constructor inputs for a diesel genset. Negative cost or fuel-curve
/// values select the generic survey fits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DieselInputs {
    pub capacity_kw: f64,
    pub is_sunk: bool,
    pub capital_cost: f64,
    pub om_cost_kwh: f64,
    pub nominal_inflation_annual: f64,
    pub nominal_discount_annual: f64,
    pub replace_running_hrs: f64,
    pub fuel_cost_per_l: f64,
    pub linear_fuel_slope_l_per_kwh: f64,
    pub linear_fuel_intercept_l_per_kwh: f64,
    pub minimum_load_ratio: f64,
    pub minimum_runtime_hrs: f64,
    pub cycle_charging_setpoint: f64,
    pub emissions: EmissionIntensities,
    /// CSV of load ratio vs litres-per-hour; switches fuel to lookup mode
    pub fuel_lookup_path: Option<String>,
    /// CSV of a normalised production series overriding dispatch control
    pub normalized_production_path: Option<String>,
}

impl Default for DieselInputs {
    fn default() -> Self {
        Self {
            capacity_kw: 100.0,
            is_sunk: false,
            capital_cost: -1.0,
            om_cost_kwh: -1.0,
            nominal_inflation_annual: 0.02,
            nominal_discount_annual: 0.04,
            replace_running_hrs: 30_000.0,
            fuel_cost_per_l: 1.70,
            linear_fuel_slope_l_per_kwh: -1.0,
            linear_fuel_intercept_l_per_kwh: -1.0,
            minimum_load_ratio: 0.2,
            minimum_runtime_hrs: 4.0,
            cycle_charging_setpoint: 0.85,
            emissions: EmissionIntensities::default(),
            fuel_lookup_path: None,
            normalized_production_path: None,
        }
    }
}

/// A fuel-burning dispatchable production asset.
#[derive(Debug, Clone)]
pub struct CombustionAsset {
    pub base: ProductionBase,
    pub fuel: FuelModel,
    pub fuel_cost_per_l: f64,
    pub minimum_load_ratio: f64,
    pub minimum_runtime_hrs: f64,
    pub time_since_last_start_hrs: f64,
    pub cycle_charging_setpoint: f64,
    pub intensities: EmissionIntensities,
    pub fuel_consumption_l: Vec<f64>,
    pub fuel_cost: Vec<f64>,
    pub emissions: EmissionsSeries,
    pub total_fuel_consumed_l: f64,
}

/// Generic linearised fuel slope [L/kWh], fit over published genset data.
fn generic_fuel_slope(capacity_kw: f64) -> f64 {
    0.4234 * capacity_kw.powf(-0.1012)
}

/// Generic linearised fuel intercept [L/kWh], fit over published genset data.
fn generic_fuel_intercept(capacity_kw: f64) -> f64 {
    0.0940 * capacity_kw.powf(-0.2735)
}

fn generic_capital_cost(capacity_kw: f64) -> f64 {
    (1000.0 * capacity_kw.powf(-0.425) + 800.0) * capacity_kw
}

fn generic_om_cost_kwh(capacity_kw: f64) -> f64 {
    0.05 * capacity_kw.powf(-0.2) + 0.05
}

impl CombustionAsset {
    /// Construct a diesel genset.
    ///
    /// `fuel_lookup` carries parsed (load ratio, litres-per-hour) columns
    /// when the inputs name a lookup file; `normalized_production` carries
    /// the parsed override series.
    pub fn new_diesel(
        n_points: usize,
        inputs: &DieselInputs,
        fuel_lookup: Option<(Vec<f64>, Vec<f64>)>,
        normalized_production: Option<Vec<f64>>,
    ) -> SimResult<Self> {
        if inputs.capacity_kw <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "diesel capacity must be > 0 kW, got {}",
                inputs.capacity_kw
            )));
        }
        if !(0.0..=1.0).contains(&inputs.minimum_load_ratio) {
            return Err(SimError::InvalidConfig(format!(
                "minimum load ratio must be in [0, 1], got {}",
                inputs.minimum_load_ratio
            )));
        }
        if inputs.minimum_runtime_hrs < 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "minimum runtime must be >= 0 hrs, got {}",
                inputs.minimum_runtime_hrs
            )));
        }
        if !(0.0..=1.0).contains(&inputs.cycle_charging_setpoint) {
            return Err(SimError::InvalidConfig(format!(
                "cycle charging setpoint must be in [0, 1], got {}",
                inputs.cycle_charging_setpoint
            )));
        }
        if inputs.fuel_cost_per_l < 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "fuel cost must be >= 0 per litre, got {}",
                inputs.fuel_cost_per_l
            )));
        }
        inputs.emissions.validate()?;
        if let Some(series) = &normalized_production {
            if series.len() != n_points {
                return Err(SimError::GridMismatch(format!(
                    "normalized production series has {} points, load grid has {n_points}",
                    series.len()
                )));
            }
        }

        let fuel = match fuel_lookup {
            Some((load_ratio, litres_per_hr)) => {
                let mut interp = Interpolator::new();
                interp.add_1d(0, load_ratio, litres_per_hr)?;
                FuelModel::Lookup(interp)
            }
            None => FuelModel::Linear {
                slope_l_per_kwh: if inputs.linear_fuel_slope_l_per_kwh < 0.0 {
                    generic_fuel_slope(inputs.capacity_kw)
                } else {
                    inputs.linear_fuel_slope_l_per_kwh
                },
                intercept_l_per_kwh: if inputs.linear_fuel_intercept_l_per_kwh < 0.0 {
                    generic_fuel_intercept(inputs.capacity_kw)
                } else {
                    inputs.linear_fuel_intercept_l_per_kwh
                },
            },
        };

        let capital_cost = if inputs.capital_cost < 0.0 {
            generic_capital_cost(inputs.capacity_kw)
        } else {
            inputs.capital_cost
        };
        let om_cost_kwh = if inputs.om_cost_kwh < 0.0 {
            generic_om_cost_kwh(inputs.capacity_kw)
        } else {
            inputs.om_cost_kwh
        };

        Ok(Self {
            base: ProductionBase::new(
                n_points,
                inputs.capacity_kw,
                inputs.is_sunk,
                capital_cost,
                om_cost_kwh,
                inputs.nominal_inflation_annual,
                inputs.nominal_discount_annual,
                inputs.replace_running_hrs,
                normalized_production,
            ),
            fuel,
            fuel_cost_per_l: inputs.fuel_cost_per_l,
            minimum_load_ratio: inputs.minimum_load_ratio,
            minimum_runtime_hrs: inputs.minimum_runtime_hrs,
            time_since_last_start_hrs: 0.0,
            cycle_charging_setpoint: inputs.cycle_charging_setpoint,
            intensities: inputs.emissions.clone(),
            fuel_consumption_l: vec![0.0; n_points],
            fuel_cost: vec![0.0; n_points],
            emissions: EmissionsSeries::new(n_points),
            total_fuel_consumed_l: 0.0,
        })
    }

    /// What the asset can deliver against a request, subject to its
    /// capacity and minimum-load-ratio constraints.
    pub fn request_production(&self, step: usize, _dt: Hours, request: Kilowatts) -> Kilowatts {
        if let Some(production) = self.base.override_production(step) {
            return production;
        }
        if request.value() <= 0.0 {
            return Kilowatts(0.0);
        }
        let capacity = self.base.capacity_kw;
        request.clamp(capacity * self.minimum_load_ratio, capacity)
    }

    /// Litres burned over the step at the given production.
    pub fn fuel_consumption(&self, dt: Hours, production: Kilowatts) -> SimResult<f64> {
        match &self.fuel {
            FuelModel::Linear {
                slope_l_per_kwh,
                intercept_l_per_kwh,
            } => Ok((slope_l_per_kwh * production.value()
                + intercept_l_per_kwh * self.base.capacity_kw.value())
                * dt.value()),
            FuelModel::Lookup(interp) => {
                let load_ratio = production.value() / self.base.capacity_kw.value();
                Ok(interp.interp_1d(0, load_ratio)? * dt.value())
            }
        }
    }

    fn handle_start_stop(&mut self, production: Kilowatts) {
        if self.base.is_running {
            if production.value() <= 0.0
                && self.time_since_last_start_hrs >= self.minimum_runtime_hrs
            {
                self.base.is_running = false;
            }
        } else if production.value() > 0.0 {
            self.base.is_running = true;
            self.base.n_starts += 1;
            self.time_since_last_start_hrs = 0.0;
        }
    }

    /// Commit production against the remaining load: drive the state
    /// machine, record the dispatch split, burn fuel, emit, incur costs,
    /// and return the load left over.
    pub fn commit(
        &mut self,
        step: usize,
        dt: Hours,
        production: Kilowatts,
        load: Kilowatts,
    ) -> SimResult<Kilowatts> {
        self.handle_start_stop(production);

        let remaining = self.base.commit_production(step, dt, production, load);

        if self.base.is_running {
            let litres = self.fuel_consumption(dt, production)?;
            self.fuel_consumption_l[step] = litres;
            self.total_fuel_consumed_l += litres;
            let emitted = self.intensities.emissions_for(litres);
            self.emissions.record(step, &emitted);
            self.fuel_cost[step] = litres * self.fuel_cost_per_l;

            self.time_since_last_start_hrs += dt.value();

            if production.value() <= 0.0 {
                let idle_kwh =
                    IDLE_OM_CAPACITY_FRACTION * self.base.capacity_kw.value() * dt.value();
                self.base.series.om_cost[step] = self.base.om_cost_kwh * idle_kwh;
            }
        }

        if self.base.replacement_due() {
            self.handle_replacement(step);
        }

        Ok(remaining)
    }

    /// Replace in place: counters reset, capital cost entry at this step.
    pub fn handle_replacement(&mut self, step: usize) {
        self.time_since_last_start_hrs = 0.0;
        self.base.handle_replacement(step);
    }

    /// Return the asset to its pre-run state.
    pub fn reset(&mut self) {
        self.time_since_last_start_hrs = 0.0;
        self.total_fuel_consumed_l = 0.0;
        self.fuel_consumption_l.fill(0.0);
        self.fuel_cost.fill(0.0);
        self.emissions.reset();
        self.base.reset();
    }
}
