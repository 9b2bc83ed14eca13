//! The model facade: asset registration, the run loop, and results.
//!
//! A `Model` owns the load profile, the resource store, the asset fleet,
//! and the dispatch controller. Assets register in call order, which fixes
//! their visit order in every dispatch stage. A run precomputes renewable
//! production and the combustion subset table, walks the dispatch pipeline
//! over every step, then rolls up fuel, emissions, and economics.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use mgrid_assets::{
    BatteryAsset, CombustionAsset, DieselInputs, Emissions, HydroInputs, LiIonInputs,
    RenewableAsset, ReservoirAsset, SolarInputs, TidalInputs, WaveInputs, WindInputs,
};
use mgrid_core::error::{SimError, SimResult};
use mgrid_core::{LoadProfile, ResourceStore};
use mgrid_io::{DispatchSummary, EconomicsSummary};

use crate::controller::{ControlMode, Controller};
use crate::economics;

/// Model-level constructor inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelInputs {
    /// Path to the electrical load time series CSV
    pub load_path: String,
    pub control_mode: String,
    pub firm_dispatch_ratio: f64,
    pub load_reserve_ratio: f64,
}

impl Default for ModelInputs {
    fn default() -> Self {
        Self {
            load_path: String::new(),
            control_mode: "load_following".into(),
            firm_dispatch_ratio: 0.1,
            load_reserve_ratio: 0.1,
        }
    }
}

/// Run-level aggregates, rolled up after dispatch.
#[derive(Debug, Clone, Default)]
pub struct RunTotals {
    pub total_fuel_consumed_l: f64,
    pub total_emissions: Emissions,
    pub total_dispatch_kwh: f64,
    pub total_discharge_kwh: f64,
    pub total_renewable_noncombustion_dispatch_kwh: f64,
    pub total_missed_load_kwh: f64,
    pub renewable_penetration: f64,
    pub net_present_cost: f64,
    pub levellized_cost_of_energy_kwh: f64,
}

/// The simulation model: load, resources, assets, controller.
#[derive(Debug)]
pub struct Model {
    pub profile: LoadProfile,
    pub resources: ResourceStore,
    pub controller: Controller,
    pub combustion: Vec<CombustionAsset>,
    pub noncombustion: Vec<ReservoirAsset>,
    pub renewables: Vec<RenewableAsset>,
    pub storage: Vec<BatteryAsset>,
    pub totals: RunTotals,
}

impl Model {
    /// Build a model, reading the electrical load from disk.
    pub fn new(inputs: &ModelInputs) -> SimResult<Self> {
        let profile = mgrid_io::read_load_profile(&inputs.load_path)?;
        Self::with_profile(profile, inputs)
    }

    /// Build a model over an already-constructed load profile.
    pub fn with_profile(profile: LoadProfile, inputs: &ModelInputs) -> SimResult<Self> {
        let mode: ControlMode = inputs.control_mode.parse()?;
        let controller = Controller::new(
            mode,
            inputs.firm_dispatch_ratio,
            inputs.load_reserve_ratio,
        )?;
        Ok(Self {
            profile,
            resources: ResourceStore::new(),
            controller,
            combustion: Vec::new(),
            noncombustion: Vec::new(),
            renewables: Vec::new(),
            storage: Vec::new(),
            totals: RunTotals::default(),
        })
    }

    fn n_points(&self) -> usize {
        self.profile.n_points()
    }

    fn normalized_series(&self, path: &Option<String>) -> SimResult<Option<Vec<f64>>> {
        match path {
            Some(path) => Ok(Some(mgrid_io::read_normalized_series(path)?)),
            None => Ok(None),
        }
    }

    /// Register an exogenous resource series. `kind` names the resource
    /// family; everything except `wave` is a 1-D series.
    pub fn add_resource(&mut self, kind: &str, path: &str, key: u32) -> SimResult<()> {
        match kind {
            "solar" | "wind" | "tidal" | "hydro" => {
                let series = mgrid_io::read_resource_1d(path)?;
                self.resources
                    .register_1d(key, &series.time_hrs, series.values, &self.profile)
            }
            "wave" => {
                let series = mgrid_io::read_resource_wave(path)?;
                self.resources
                    .register_2d(key, &series.time_hrs, series.values, &self.profile)
            }
            other => Err(SimError::UnknownKind(format!(
                "resource kind '{other}' (expected 'solar', 'wind', 'tidal', 'hydro', or 'wave')"
            ))),
        }
    }

    pub fn add_diesel(&mut self, inputs: &DieselInputs) -> SimResult<()> {
        let fuel_lookup = match &inputs.fuel_lookup_path {
            Some(path) => Some(mgrid_io::read_table_1d(path)?),
            None => None,
        };
        let normalized = self.normalized_series(&inputs.normalized_production_path)?;
        self.combustion.push(CombustionAsset::new_diesel(
            self.n_points(),
            inputs,
            fuel_lookup,
            normalized,
        )?);
        Ok(())
    }

    pub fn add_solar(&mut self, inputs: &SolarInputs) -> SimResult<()> {
        let normalized = self.normalized_series(&inputs.normalized_production_path)?;
        self.renewables
            .push(RenewableAsset::new_solar(self.n_points(), inputs, normalized)?);
        Ok(())
    }

    pub fn add_wind(&mut self, inputs: &WindInputs) -> SimResult<()> {
        let power_curve = match &inputs.power_curve_path {
            Some(path) => Some(mgrid_io::read_table_1d(path)?),
            None => None,
        };
        let normalized = self.normalized_series(&inputs.normalized_production_path)?;
        self.renewables.push(RenewableAsset::new_wind(
            self.n_points(),
            inputs,
            power_curve,
            normalized,
        )?);
        Ok(())
    }

    pub fn add_tidal(&mut self, inputs: &TidalInputs) -> SimResult<()> {
        let power_curve = match &inputs.power_curve_path {
            Some(path) => Some(mgrid_io::read_table_1d(path)?),
            None => None,
        };
        let normalized = self.normalized_series(&inputs.normalized_production_path)?;
        self.renewables.push(RenewableAsset::new_tidal(
            self.n_points(),
            inputs,
            power_curve,
            normalized,
        )?);
        Ok(())
    }

    pub fn add_wave(&mut self, inputs: &WaveInputs) -> SimResult<()> {
        let performance = match &inputs.performance_matrix_path {
            Some(path) => Some(mgrid_io::read_table_2d(path)?),
            None => None,
        };
        let normalized = self.normalized_series(&inputs.normalized_production_path)?;
        self.renewables.push(RenewableAsset::new_wave(
            self.n_points(),
            inputs,
            performance,
            normalized,
        )?);
        Ok(())
    }

    pub fn add_hydro(&mut self, inputs: &HydroInputs) -> SimResult<()> {
        let normalized = self.normalized_series(&inputs.normalized_production_path)?;
        self.noncombustion
            .push(ReservoirAsset::new_hydro(self.n_points(), inputs, normalized)?);
        Ok(())
    }

    pub fn add_liion(&mut self, inputs: &LiIonInputs) -> SimResult<()> {
        self.storage
            .push(BatteryAsset::new_liion(self.n_points(), inputs)?);
        Ok(())
    }

    /// Run the full simulation: init, dispatch every step, roll up totals.
    pub fn run(&mut self) -> SimResult<()> {
        self.controller.init(
            &self.profile,
            &self.resources,
            &self.combustion,
            &mut self.renewables,
        )?;
        self.controller.apply_dispatch(
            &self.profile,
            &self.resources,
            &mut self.combustion,
            &mut self.noncombustion,
            &mut self.renewables,
            &mut self.storage,
        )?;
        self.compute_totals();
        info!(
            steps = self.n_points(),
            missed_load_kwh = self.totals.total_missed_load_kwh,
            "run complete"
        );
        Ok(())
    }

    fn compute_totals(&mut self) {
        let mut totals = RunTotals::default();
        let time_hrs = &self.profile.time_hrs;
        let dt_hrs = &self.profile.dt_hrs;

        let mut discounted_energy_kwh = 0.0;

        for asset in &self.combustion {
            totals.total_fuel_consumed_l += asset.total_fuel_consumed_l;
            totals.total_emissions.add(&asset.emissions.totals());
            totals.total_dispatch_kwh += asset.base.total_dispatch_kwh;
            let economics = economics::production_economics(
                &asset.base,
                Some(&asset.fuel_cost),
                time_hrs,
                dt_hrs,
            );
            totals.net_present_cost += economics.net_present_cost;
            discounted_energy_kwh += economics.discounted_energy_kwh;
        }
        for asset in &self.noncombustion {
            totals.total_dispatch_kwh += asset.base.total_dispatch_kwh;
            totals.total_renewable_noncombustion_dispatch_kwh += asset.base.total_dispatch_kwh;
            let economics =
                economics::production_economics(&asset.base, None, time_hrs, dt_hrs);
            totals.net_present_cost += economics.net_present_cost;
            discounted_energy_kwh += economics.discounted_energy_kwh;
        }
        for asset in &self.renewables {
            totals.total_dispatch_kwh += asset.base.total_dispatch_kwh;
            totals.total_renewable_noncombustion_dispatch_kwh += asset.base.total_dispatch_kwh;
            let economics =
                economics::production_economics(&asset.base, None, time_hrs, dt_hrs);
            totals.net_present_cost += economics.net_present_cost;
            discounted_energy_kwh += economics.discounted_energy_kwh;
        }
        for battery in &self.storage {
            totals.total_discharge_kwh += battery.total_discharge_kwh;
            let economics = economics::storage_economics(battery, time_hrs, dt_hrs);
            totals.net_present_cost += economics.net_present_cost;
            discounted_energy_kwh += economics.discounted_energy_kwh;
        }

        for step in 0..self.n_points() {
            totals.total_missed_load_kwh +=
                self.controller.missed_load_kw[step] * dt_hrs[step];
        }

        totals.renewable_penetration = if totals.total_dispatch_kwh > 0.0 {
            totals.total_renewable_noncombustion_dispatch_kwh / totals.total_dispatch_kwh
        } else {
            0.0
        };
        totals.levellized_cost_of_energy_kwh = if discounted_energy_kwh > 0.0 {
            totals.net_present_cost / discounted_energy_kwh
        } else {
            0.0
        };

        self.totals = totals;
    }

    /// Reset all assets and controller accounting so the model can run
    /// again from step 0.
    pub fn reset(&mut self) {
        for asset in &mut self.combustion {
            asset.reset();
        }
        for asset in &mut self.noncombustion {
            asset.reset();
        }
        for asset in &mut self.renewables {
            asset.reset();
        }
        for battery in &mut self.storage {
            battery.reset();
        }
        self.controller.reset();
        self.totals = RunTotals::default();
    }

    /// Drop every asset and resource, keeping only the load profile and
    /// control settings.
    pub fn clear(&mut self) {
        self.combustion.clear();
        self.noncombustion.clear();
        self.renewables.clear();
        self.storage.clear();
        self.resources.clear();
        self.controller.clear();
        self.totals = RunTotals::default();
    }

    /// Persist per-asset and model-level results under `root`.
    pub fn write_results(&self, root: impl AsRef<Path>, max_lines: i64) -> SimResult<()> {
        let root = root.as_ref();
        let time_hrs = &self.profile.time_hrs;
        let dt_hrs = &self.profile.dt_hrs;

        for (index, asset) in self.combustion.iter().enumerate() {
            let economics = economics::production_economics(
                &asset.base,
                Some(&asset.fuel_cost),
                time_hrs,
                dt_hrs,
            );
            mgrid_io::write_combustion_results(
                root,
                time_hrs,
                asset,
                index,
                EconomicsSummary {
                    net_present_cost: economics.net_present_cost,
                    levellized_cost_of_energy_kwh: economics.levellized_cost_of_energy_kwh,
                },
                max_lines,
            )?;
        }
        for (index, asset) in self.noncombustion.iter().enumerate() {
            let economics =
                economics::production_economics(&asset.base, None, time_hrs, dt_hrs);
            mgrid_io::write_reservoir_results(
                root,
                time_hrs,
                asset,
                index,
                EconomicsSummary {
                    net_present_cost: economics.net_present_cost,
                    levellized_cost_of_energy_kwh: economics.levellized_cost_of_energy_kwh,
                },
                max_lines,
            )?;
        }
        for (index, asset) in self.renewables.iter().enumerate() {
            let economics =
                economics::production_economics(&asset.base, None, time_hrs, dt_hrs);
            mgrid_io::write_renewable_results(
                root,
                time_hrs,
                asset,
                index,
                EconomicsSummary {
                    net_present_cost: economics.net_present_cost,
                    levellized_cost_of_energy_kwh: economics.levellized_cost_of_energy_kwh,
                },
                max_lines,
            )?;
        }
        for (index, battery) in self.storage.iter().enumerate() {
            let economics = economics::storage_economics(battery, time_hrs, dt_hrs);
            mgrid_io::write_storage_results(
                root,
                time_hrs,
                battery,
                index,
                EconomicsSummary {
                    net_present_cost: economics.net_present_cost,
                    levellized_cost_of_energy_kwh: economics.levellized_cost_of_energy_kwh,
                },
                max_lines,
            )?;
        }

        mgrid_io::write_dispatch_results(
            root,
            time_hrs,
            &self.profile.load_kw,
            &self.controller.net_load_kw,
            &self.controller.missed_load_kw,
            &self.controller.missed_firm_dispatch_kw,
            &self.controller.missed_spinning_reserve_kw,
            DispatchSummary {
                n_points: self.n_points(),
                n_years: self.profile.n_years(),
                total_fuel_consumed_l: self.totals.total_fuel_consumed_l,
                total_dispatch_kwh: self.totals.total_dispatch_kwh,
                total_discharge_kwh: self.totals.total_discharge_kwh,
                renewable_penetration: self.totals.renewable_penetration,
                net_present_cost: self.totals.net_present_cost,
                levellized_cost_of_energy_kwh: self.totals.levellized_cost_of_energy_kwh,
            },
            max_lines,
        )
    }
}
