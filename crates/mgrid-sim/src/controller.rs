//! The per-step dispatch pipeline.
//!
//! For every step, in fixed order: renewable production is already
//! precomputed; non-combustion assets dispatch proportionally to their
//! availability; storage discharges; combustion dispatches over the
//! optimal subset; renewables commit against the residual load; storage
//! charges from curtailment; and any shortfalls are recorded as missed
//! load, missed firm dispatch, and missed spinning reserve. Shortfalls are
//! normal outputs of the simulation, never errors.
//!
//! Within each stage, assets are visited in registration order, which is
//! stable and observable in the recorded time series.

use serde::{Deserialize, Serialize};
use tracing::debug;

use mgrid_assets::{BatteryAsset, CombustionAsset, RenewableAsset, ReservoirAsset, ResourceSample};
use mgrid_core::error::{SimError, SimResult};
use mgrid_core::units::{Hours, Kilowatts};
use mgrid_core::{LoadProfile, ResourceStore};

use crate::subset::CombustionSubsetTable;

/// Residual load below this threshold is treated as fully served.
pub const MISSED_LOAD_THRESHOLD_KW: f64 = 1e-6;

/// Dispatch control mode for the combustion fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// Combustion follows net load only
    LoadFollowing,
    /// Combustion is raised to a setpoint while any battery remains
    /// uncharged, so the surplus charges storage
    CycleCharging,
}

impl std::str::FromStr for ControlMode {
    type Err = SimError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "load_following" => Ok(ControlMode::LoadFollowing),
            "cycle_charging" => Ok(ControlMode::CycleCharging),
            other => Err(SimError::UnknownKind(format!(
                "control mode '{other}' (expected 'load_following' or 'cycle_charging')"
            ))),
        }
    }
}

/// The quantities threaded through the dispatch stages of one step.
#[derive(Debug, Clone, Copy, Default)]
struct StepLoads {
    /// Load remaining [kW]
    load_kw: f64,
    /// Total renewable production this step [kW]
    renewable_kw: f64,
    /// Firm dispatch requirement remaining [kW]
    firm_kw: f64,
    /// Spinning reserve requirement remaining [kW]
    reserve_kw: f64,
}

/// The dispatch controller and its per-run accounting.
#[derive(Debug, Clone)]
pub struct Controller {
    pub mode: ControlMode,
    /// Fraction of load that must be met from firm sources each step
    pub firm_dispatch_ratio: f64,
    /// Fraction of load added to the required spinning reserve each step
    pub load_reserve_ratio: f64,
    /// Load minus all available renewable production, per step
    pub net_load_kw: Vec<f64>,
    pub missed_load_kw: Vec<f64>,
    pub missed_firm_dispatch_kw: Vec<f64>,
    pub missed_spinning_reserve_kw: Vec<f64>,
    storage_discharged: Vec<bool>,
    subset_table: Option<CombustionSubsetTable>,
}

impl Controller {
    pub fn new(
        mode: ControlMode,
        firm_dispatch_ratio: f64,
        load_reserve_ratio: f64,
    ) -> SimResult<Self> {
        if !(0.0..=1.0).contains(&firm_dispatch_ratio) {
            return Err(SimError::InvalidConfig(format!(
                "firm dispatch ratio must be in [0, 1], got {firm_dispatch_ratio}"
            )));
        }
        if !(0.0..=1.0).contains(&load_reserve_ratio) {
            return Err(SimError::InvalidConfig(format!(
                "load reserve ratio must be in [0, 1], got {load_reserve_ratio}"
            )));
        }
        Ok(Self {
            mode,
            firm_dispatch_ratio,
            load_reserve_ratio,
            net_load_kw: Vec::new(),
            missed_load_kw: Vec::new(),
            missed_firm_dispatch_kw: Vec::new(),
            missed_spinning_reserve_kw: Vec::new(),
            storage_discharged: Vec::new(),
            subset_table: None,
        })
    }

    /// Precompute renewable production and net load for every step, and
    /// build the combustion subset table.
    pub fn init(
        &mut self,
        profile: &LoadProfile,
        resources: &ResourceStore,
        combustion: &[CombustionAsset],
        renewables: &mut [RenewableAsset],
    ) -> SimResult<()> {
        let n_points = profile.n_points();
        self.net_load_kw = vec![0.0; n_points];
        self.missed_load_kw = vec![0.0; n_points];
        self.missed_firm_dispatch_kw = vec![0.0; n_points];
        self.missed_spinning_reserve_kw = vec![0.0; n_points];

        for step in 0..n_points {
            let t_hrs = profile.time_hrs[step];
            let mut net_load_kw = profile.load_kw[step];

            for renewable in renewables.iter_mut() {
                let sample = renewable_sample(renewable, resources, step)?;
                let production = renewable.compute_production(step, t_hrs, sample)?;
                renewable.base.series.production_kw[step] = production.value();
                net_load_kw -= production.value();
            }

            self.net_load_kw[step] = net_load_kw;
        }

        let capacities: Vec<f64> = combustion
            .iter()
            .map(|asset| asset.base.capacity_kw.value())
            .collect();
        self.subset_table = Some(CombustionSubsetTable::build(&capacities)?);

        debug!(
            steps = n_points,
            combustion_units = combustion.len(),
            "controller initialised"
        );
        Ok(())
    }

    /// Run the dispatch pipeline over every step of the time grid.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_dispatch(
        &mut self,
        profile: &LoadProfile,
        resources: &ResourceStore,
        combustion: &mut [CombustionAsset],
        noncombustion: &mut [ReservoirAsset],
        renewables: &mut [RenewableAsset],
        storage: &mut [BatteryAsset],
    ) -> SimResult<()> {
        self.storage_discharged = vec![false; storage.len()];

        for step in 0..profile.n_points() {
            let dt = Hours(profile.dt_hrs[step]);
            let load_kw = profile.load_kw[step];

            // renewable totals and the reserve the fleet must back
            let mut renewable_kw = 0.0;
            let mut reserve_kw = self.load_reserve_ratio * load_kw;
            for renewable in renewables.iter() {
                let production_kw = renewable.base.series.production_kw[step];
                renewable_kw += production_kw;
                reserve_kw += (1.0 - renewable.firmness_factor) * production_kw;
            }
            if reserve_kw > load_kw {
                reserve_kw = load_kw;
            }

            let mut loads = StepLoads {
                load_kw,
                renewable_kw,
                firm_kw: self.firm_dispatch_ratio * load_kw,
                reserve_kw,
            };

            loads = self.dispatch_noncombustion(step, dt, loads, noncombustion, resources)?;
            loads = self.discharge_storage(step, dt, loads, storage);

            let cycle_charging = match self.mode {
                ControlMode::LoadFollowing => false,
                ControlMode::CycleCharging => {
                    self.storage_discharged.iter().any(|discharged| !discharged)
                }
            };
            loads = self.dispatch_combustion(step, dt, loads, combustion, cycle_charging)?;

            loads.load_kw = commit_renewables(step, dt, loads.load_kw, renewables);

            self.charge_storage(step, dt, storage, combustion, noncombustion, renewables);

            if loads.load_kw > MISSED_LOAD_THRESHOLD_KW {
                self.missed_load_kw[step] = loads.load_kw;
            }
            if loads.firm_kw > MISSED_LOAD_THRESHOLD_KW {
                self.missed_firm_dispatch_kw[step] = loads.firm_kw;
            }
            if loads.reserve_kw > MISSED_LOAD_THRESHOLD_KW {
                self.missed_spinning_reserve_kw[step] = loads.reserve_kw;
            }

            self.storage_discharged.fill(false);
        }

        Ok(())
    }

    /// Proportional dispatch of reservoir assets against net load.
    fn dispatch_noncombustion(
        &mut self,
        step: usize,
        dt: Hours,
        mut loads: StepLoads,
        assets: &mut [ReservoirAsset],
        resources: &ResourceStore,
    ) -> SimResult<StepLoads> {
        let mut available_kw = vec![0.0; assets.len()];
        let mut total_available_kw = 0.0;

        for (index, asset) in assets.iter().enumerate() {
            let inflow_m3hr = reservoir_inflow(asset, resources, step)?;
            available_kw[index] = asset
                .request_production(step, dt, asset.base.capacity_kw, inflow_m3hr)
                .value();
            total_available_kw += available_kw[index];
        }

        loads.reserve_kw = (loads.reserve_kw - total_available_kw).max(0.0);

        let mut target_kw = loads.load_kw - loads.renewable_kw;
        if target_kw < loads.firm_kw {
            target_kw = loads.firm_kw;
        }
        if target_kw > total_available_kw {
            target_kw = total_available_kw;
        }

        loads.firm_kw = (loads.firm_kw - target_kw).max(0.0);

        for (index, asset) in assets.iter_mut().enumerate() {
            let share_kw = if total_available_kw <= 0.0 {
                0.0
            } else {
                target_kw / total_available_kw * available_kw[index]
            };
            let inflow_m3hr = reservoir_inflow(asset, resources, step)?;
            loads.load_kw = asset
                .commit(
                    step,
                    dt,
                    Kilowatts(share_kw),
                    Kilowatts(loads.load_kw),
                    inflow_m3hr,
                )
                .value();
        }

        Ok(loads)
    }

    /// Proportional discharge of every non-depleted battery.
    fn discharge_storage(
        &mut self,
        step: usize,
        dt: Hours,
        mut loads: StepLoads,
        batteries: &mut [BatteryAsset],
    ) -> StepLoads {
        let mut available_kw = vec![0.0; batteries.len()];
        let mut total_available_kw = 0.0;

        for (index, battery) in batteries.iter().enumerate() {
            if battery.is_depleted {
                continue;
            }
            available_kw[index] = battery.available_kw(dt).value();
            total_available_kw += available_kw[index];
        }

        loads.reserve_kw = (loads.reserve_kw - total_available_kw).max(0.0);

        let mut target_kw = loads.load_kw - loads.renewable_kw;
        if target_kw < loads.firm_kw {
            target_kw = loads.firm_kw;
        }
        if target_kw > total_available_kw {
            target_kw = total_available_kw;
        }

        loads.firm_kw = (loads.firm_kw - target_kw).max(0.0);

        for (index, battery) in batteries.iter_mut().enumerate() {
            if battery.is_depleted {
                continue;
            }
            let share_kw = if total_available_kw <= 0.0 {
                0.0
            } else {
                target_kw / total_available_kw * available_kw[index]
            };
            if share_kw > 0.0 {
                loads.load_kw = battery
                    .commit_discharge(step, dt, Kilowatts(share_kw), Kilowatts(loads.load_kw))
                    .value();
                self.storage_discharged[index] = true;
            }
        }

        loads
    }

    /// Subset-table combustion dispatch with capacity-proportional shares.
    ///
    /// Spinning reserve is covered by the committed headroom of the
    /// selected subset (allocated capacity minus production), not by its
    /// full installed capacity.
    fn dispatch_combustion(
        &self,
        step: usize,
        dt: Hours,
        mut loads: StepLoads,
        assets: &mut [CombustionAsset],
        cycle_charging: bool,
    ) -> SimResult<StepLoads> {
        let table = self.subset_table.as_ref().ok_or_else(|| {
            SimError::InvalidConfig("dispatch invoked before controller init".into())
        })?;

        let mut allocation_kw = loads.load_kw - loads.renewable_kw;
        if allocation_kw < loads.reserve_kw {
            allocation_kw = loads.reserve_kw;
        }
        if allocation_kw < loads.firm_kw {
            allocation_kw = loads.firm_kw;
        }

        let (allocated_capacity_kw, pattern) = table.select(allocation_kw);
        let pattern = pattern.to_vec();

        let mut target_kw = loads.load_kw - loads.renewable_kw;
        if target_kw < loads.firm_kw {
            target_kw = loads.firm_kw;
        }
        if target_kw > allocated_capacity_kw {
            target_kw = allocated_capacity_kw;
        }

        loads.firm_kw = (loads.firm_kw - target_kw).max(0.0);

        let mut committed_kw = 0.0;
        for (index, asset) in assets.iter_mut().enumerate() {
            let mut share_kw = if allocated_capacity_kw <= 0.0 || !pattern[index] {
                0.0
            } else {
                asset.base.capacity_kw.value() / allocated_capacity_kw * target_kw
            };

            if cycle_charging && share_kw > 0.0 {
                let setpoint_kw = asset.cycle_charging_setpoint * asset.base.capacity_kw.value();
                if share_kw < setpoint_kw {
                    share_kw = setpoint_kw;
                }
            }

            let offered = asset.request_production(step, dt, Kilowatts(share_kw));
            committed_kw += offered.value();
            loads.load_kw = asset
                .commit(step, dt, offered, Kilowatts(loads.load_kw))?
                .value();
        }

        let headroom_kw = (allocated_capacity_kw - committed_kw).max(0.0);
        loads.reserve_kw = (loads.reserve_kw - headroom_kw).max(0.0);

        Ok(loads)
    }

    /// Greedy storage charging from curtailment, in producer order
    /// combustion, then non-combustion, then renewable.
    fn charge_storage(
        &mut self,
        step: usize,
        dt: Hours,
        batteries: &mut [BatteryAsset],
        combustion: &mut [CombustionAsset],
        noncombustion: &mut [ReservoirAsset],
        renewables: &mut [RenewableAsset],
    ) {
        for (index, battery) in batteries.iter_mut().enumerate() {
            if self.storage_discharged[index] {
                continue;
            }

            for asset in combustion.iter_mut() {
                absorb_curtailment(step, dt, battery, &mut asset.base);
            }
            for asset in noncombustion.iter_mut() {
                absorb_curtailment(step, dt, battery, &mut asset.base);
            }
            for asset in renewables.iter_mut() {
                absorb_curtailment(step, dt, battery, &mut asset.base);
            }

            let staged = Kilowatts(battery.staged_power_kw);
            battery.commit_charge(step, dt, staged);
        }
    }

    /// Clear per-run accounting so the controller can drive a fresh run.
    pub fn reset(&mut self) {
        self.net_load_kw.fill(0.0);
        self.missed_load_kw.fill(0.0);
        self.missed_firm_dispatch_kw.fill(0.0);
        self.missed_spinning_reserve_kw.fill(0.0);
        self.storage_discharged.fill(false);
    }

    /// Drop all per-run state, including the subset table.
    pub fn clear(&mut self) {
        self.net_load_kw.clear();
        self.missed_load_kw.clear();
        self.missed_firm_dispatch_kw.clear();
        self.missed_spinning_reserve_kw.clear();
        self.storage_discharged.clear();
        self.subset_table = None;
    }

    pub fn subset_table(&self) -> Option<&CombustionSubsetTable> {
        self.subset_table.as_ref()
    }
}

/// Commit every renewable's precomputed production against the residual
/// load, in registration order. Returns the load left over.
fn commit_renewables(
    step: usize,
    dt: Hours,
    load_kw: f64,
    renewables: &mut [RenewableAsset],
) -> f64 {
    let mut target_kw = load_kw.max(0.0);
    for renewable in renewables.iter_mut() {
        let production = Kilowatts(renewable.base.series.production_kw[step]);
        target_kw = renewable
            .commit(step, dt, production, Kilowatts(target_kw))
            .value();
    }
    target_kw
}

/// Move curtailment from one producer into the battery's staged charge
/// power, bounded by what the battery can still accept this step.
fn absorb_curtailment(
    step: usize,
    dt: Hours,
    battery: &mut BatteryAsset,
    producer: &mut mgrid_assets::ProductionBase,
) {
    let curtailment_kw = producer.series.curtailment_kw[step];
    if curtailment_kw <= 0.0 {
        return;
    }
    let transfer_kw = battery.acceptable_kw(dt).value().min(curtailment_kw);
    if transfer_kw <= 0.0 {
        return;
    }
    producer.series.curtailment_kw[step] -= transfer_kw;
    producer.series.storage_kw[step] += transfer_kw;
    producer.total_stored_kwh += transfer_kw * dt.value();
    battery.staged_power_kw += transfer_kw;
}

/// Fetch the resource sample a renewable asset needs for the given step.
fn renewable_sample(
    renewable: &RenewableAsset,
    resources: &ResourceStore,
    step: usize,
) -> SimResult<ResourceSample> {
    if renewable.base.normalized_production.is_some() {
        // override series wins; the resource is never consulted
        return Ok(ResourceSample::Scalar(0.0));
    }
    if renewable.kind.uses_wave_resource() {
        let [significant_wave_height_m, energy_period_s] =
            resources.get_2d(renewable.resource_key, step)?;
        Ok(ResourceSample::Wave {
            significant_wave_height_m,
            energy_period_s,
        })
    } else {
        Ok(ResourceSample::Scalar(
            resources.get_1d(renewable.resource_key, step)?,
        ))
    }
}

/// Inflow for a reservoir asset, zero when the asset runs on an override
/// series.
fn reservoir_inflow(
    asset: &ReservoirAsset,
    resources: &ResourceStore,
    step: usize,
) -> SimResult<f64> {
    if asset.base.normalized_production.is_some() {
        return Ok(0.0);
    }
    resources.get_1d(asset.resource_key, step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mgrid_assets::{DieselInputs, LiIonInputs, SolarInputs};

    fn profile(loads: &[f64]) -> LoadProfile {
        let times: Vec<f64> = (0..loads.len()).map(|i| i as f64).collect();
        LoadProfile::from_series(times, loads.to_vec()).unwrap()
    }

    fn diesel(capacity_kw: f64, n_points: usize) -> CombustionAsset {
        let inputs = DieselInputs {
            capacity_kw,
            minimum_load_ratio: 0.0,
            minimum_runtime_hrs: 0.0,
            ..DieselInputs::default()
        };
        CombustionAsset::new_diesel(n_points, &inputs, None, None).unwrap()
    }

    fn run_controller(
        mode: ControlMode,
        firm_ratio: f64,
        reserve_ratio: f64,
        profile: &LoadProfile,
        combustion: &mut Vec<CombustionAsset>,
        storage: &mut Vec<BatteryAsset>,
    ) -> Controller {
        let resources = ResourceStore::new();
        let mut renewables: Vec<RenewableAsset> = Vec::new();
        let mut noncombustion: Vec<ReservoirAsset> = Vec::new();
        let mut controller = Controller::new(mode, firm_ratio, reserve_ratio).unwrap();
        controller
            .init(profile, &resources, combustion, &mut renewables)
            .unwrap();
        controller
            .apply_dispatch(
                profile,
                &resources,
                combustion,
                &mut noncombustion,
                &mut renewables,
                storage,
            )
            .unwrap();
        controller
    }

    #[test]
    fn test_proportional_combustion_allocation() {
        // two 150 kW units, target 200: each commits 100
        let profile = profile(&[200.0, 200.0]);
        let mut combustion = vec![diesel(150.0, 2), diesel(150.0, 2)];
        let mut storage = Vec::new();
        run_controller(
            ControlMode::LoadFollowing,
            0.0,
            0.0,
            &profile,
            &mut combustion,
            &mut storage,
        );
        assert!((combustion[0].base.series.production_kw[0] - 100.0).abs() < 1e-9);
        assert!((combustion[1].base.series.production_kw[0] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_cycle_charging_raises_to_setpoint() {
        // a depleted battery cannot discharge, so cycle charging raises
        // both selected units to their setpoint and the surplus charges it
        let profile = profile(&[200.0, 200.0]);
        let mut combustion = vec![diesel(150.0, 2), diesel(150.0, 2)];
        combustion[0].cycle_charging_setpoint = 0.8;
        combustion[1].cycle_charging_setpoint = 0.8;
        let mut storage = vec![BatteryAsset::new_liion(2, &LiIonInputs::default()).unwrap()];
        storage[0].charge_kwh = storage[0].min_soc * storage[0].energy_capacity_kwh;
        storage[0].is_depleted = true;

        run_controller(
            ControlMode::CycleCharging,
            0.0,
            0.0,
            &profile,
            &mut combustion,
            &mut storage,
        );
        // proportional share would be 100 kW each; the setpoint lifts both
        // to 0.8 * 150 = 120 kW
        assert!((combustion[0].base.series.production_kw[0] - 120.0).abs() < 1e-9);
        assert!((combustion[1].base.series.production_kw[0] - 120.0).abs() < 1e-9);
        // the surplus beyond load lands in the battery, not curtailment
        let stored: f64 = combustion
            .iter()
            .map(|asset| asset.base.series.storage_kw[0])
            .sum();
        assert!((stored - 40.0).abs() < 1e-9);
        assert!(storage[0].charging_power_kw[0] > 0.0);
    }

    #[test]
    fn test_missed_reserve_counts_headroom_shortfall() {
        // 500 kW load on a 300 kW unit with 10% reserve: the unit runs
        // flat out, leaving no headroom, so the full 50 kW reserve is
        // missed
        let profile = profile(&[500.0, 500.0]);
        let mut combustion = vec![diesel(300.0, 2)];
        let mut storage = Vec::new();
        let controller = run_controller(
            ControlMode::LoadFollowing,
            0.0,
            0.1,
            &profile,
            &mut combustion,
            &mut storage,
        );
        assert!((controller.missed_spinning_reserve_kw[0] - 50.0).abs() < 1e-9);
        assert!((controller.missed_load_kw[0] - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_reserve_satisfied_by_subset_headroom() {
        // 100 kW load on a 300 kW unit: 200 kW headroom covers the 10 kW
        // reserve requirement
        let profile = profile(&[100.0, 100.0]);
        let mut combustion = vec![diesel(300.0, 2)];
        let mut storage = Vec::new();
        let controller = run_controller(
            ControlMode::LoadFollowing,
            0.0,
            0.1,
            &profile,
            &mut combustion,
            &mut storage,
        );
        assert_eq!(controller.missed_spinning_reserve_kw[0], 0.0);
        assert_eq!(controller.missed_load_kw[0], 0.0);
    }

    #[test]
    fn test_minimum_runtime_through_dispatch() {
        let loads: Vec<f64> = [1.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]
            .iter()
            .map(|multiplier| multiplier * 100.0)
            .collect();
        let profile = profile(&loads);
        let inputs = DieselInputs {
            capacity_kw: 100.0,
            minimum_load_ratio: 0.0,
            minimum_runtime_hrs: 4.0,
            ..DieselInputs::default()
        };
        let mut combustion =
            vec![CombustionAsset::new_diesel(loads.len(), &inputs, None, None).unwrap()];
        let mut storage = Vec::new();
        run_controller(
            ControlMode::LoadFollowing,
            0.0,
            0.0,
            &profile,
            &mut combustion,
            &mut storage,
        );
        let expected = [
            true, true, true, true, false, false, true, true, true, true, true, true,
        ];
        assert_eq!(&combustion[0].base.series.is_running[..], &expected);
    }

    #[test]
    fn test_storage_discharges_before_combustion_curtails() {
        // battery covers a load the diesel fleet cannot
        let profile = profile(&[50.0, 50.0]);
        let mut combustion = Vec::new();
        let mut storage = vec![BatteryAsset::new_liion(2, &LiIonInputs::default()).unwrap()];
        let controller = run_controller(
            ControlMode::LoadFollowing,
            0.0,
            0.0,
            &profile,
            &mut combustion,
            &mut storage,
        );
        assert_eq!(controller.missed_load_kw[0], 0.0);
        assert!((storage[0].discharging_power_kw[0] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_renewable_surplus_charges_battery() {
        let loads = vec![10.0, 10.0, 10.0];
        let profile = profile(&loads);
        let mut resources = ResourceStore::new();
        resources
            .register_1d(0, &profile.time_hrs, vec![1.0, 1.0, 1.0], &profile)
            .unwrap();

        let solar_inputs = SolarInputs {
            capacity_kw: 100.0,
            derating: 0.8,
            ..SolarInputs::default()
        };
        let mut renewables =
            vec![RenewableAsset::new_solar(loads.len(), &solar_inputs, None).unwrap()];
        let mut combustion: Vec<CombustionAsset> = Vec::new();
        let mut noncombustion: Vec<ReservoirAsset> = Vec::new();
        let mut storage = vec![BatteryAsset::new_liion(loads.len(), &LiIonInputs::default()).unwrap()];

        let mut controller = Controller::new(ControlMode::LoadFollowing, 0.0, 0.0).unwrap();
        controller
            .init(&profile, &resources, &combustion, &mut renewables)
            .unwrap();
        controller
            .apply_dispatch(
                &profile,
                &resources,
                &mut combustion,
                &mut noncombustion,
                &mut renewables,
                &mut storage,
            )
            .unwrap();

        // 80 kW produced, 10 kW dispatched, the battery takes the surplus
        // up to its charge acceptance
        assert!((renewables[0].base.series.dispatch_kw[0] - 10.0).abs() < 1e-9);
        assert!(storage[0].charging_power_kw[0] > 0.0);
        let series = &renewables[0].base.series;
        assert!(
            (series.production_kw[0]
                - (series.dispatch_kw[0] + series.storage_kw[0] + series.curtailment_kw[0]))
                .abs()
                < 1e-9
        );
    }

    #[test]
    fn test_depleted_battery_does_not_discharge() {
        let profile = profile(&[50.0, 50.0]);
        let mut combustion = Vec::new();
        let mut storage = vec![BatteryAsset::new_liion(2, &LiIonInputs::default()).unwrap()];
        storage[0].charge_kwh = storage[0].min_soc * storage[0].energy_capacity_kwh;
        storage[0].is_depleted = true;
        let controller = run_controller(
            ControlMode::LoadFollowing,
            0.0,
            0.0,
            &profile,
            &mut combustion,
            &mut storage,
        );
        assert_eq!(storage[0].discharging_power_kw[0], 0.0);
        assert!((controller.missed_load_kw[0] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_firm_dispatch_shortfall_recorded() {
        // nothing firm can run: the firm requirement is missed in full
        let profile = profile(&[100.0, 100.0]);
        let mut combustion = Vec::new();
        let mut storage = Vec::new();
        let controller = run_controller(
            ControlMode::LoadFollowing,
            0.2,
            0.0,
            &profile,
            &mut combustion,
            &mut storage,
        );
        assert!((controller.missed_firm_dispatch_kw[0] - 20.0).abs() < 1e-9);
        assert!((controller.missed_load_kw[0] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_control_mode_tag() {
        let parsed: Result<ControlMode, _> = "peak_shaving".parse();
        assert!(matches!(parsed, Err(SimError::UnknownKind(_))));
    }

    #[test]
    fn test_net_load_records_renewable_excess() {
        let loads = vec![50.0, 50.0];
        let profile = profile(&loads);
        let mut resources = ResourceStore::new();
        resources
            .register_1d(0, &profile.time_hrs, vec![1.0, 0.0], &profile)
            .unwrap();
        let solar_inputs = SolarInputs {
            capacity_kw: 100.0,
            derating: 0.8,
            ..SolarInputs::default()
        };
        let mut renewables = vec![RenewableAsset::new_solar(2, &solar_inputs, None).unwrap()];
        let combustion: Vec<CombustionAsset> = Vec::new();
        let mut controller = Controller::new(ControlMode::LoadFollowing, 0.0, 0.0).unwrap();
        controller
            .init(&profile, &resources, &combustion, &mut renewables)
            .unwrap();
        assert!((controller.net_load_kw[0] - (50.0 - 80.0)).abs() < 1e-9);
        assert!((controller.net_load_kw[1] - 50.0).abs() < 1e-9);
    }
}
