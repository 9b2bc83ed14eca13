//! Results writing.
//!
//! Each asset gets a directory `<TYPE>_<kW>kW_idx<n>/` under the results
//! root, holding `summary_results.md` (attributes and run aggregates) and
//! `time_series_results.csv` (one row per step). `max_lines < 0` writes
//! every row, `0` writes the summary only, and a positive value truncates
//! the time series.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use mgrid_assets::{BatteryAsset, CombustionAsset, RenewableAsset, ReservoirAsset};
use mgrid_core::error::{SimError, SimResult};

/// Number of time-series rows to write for a given `max_lines` argument.
fn row_limit(n_points: usize, max_lines: i64) -> usize {
    if max_lines < 0 {
        n_points
    } else {
        (max_lines as usize).min(n_points)
    }
}

fn asset_dir(root: &Path, type_str: &str, capacity_kw: f64, index: usize) -> SimResult<PathBuf> {
    let dir = root.join(format!("{type_str}_{:.0}kW_idx{index}", capacity_kw.ceil()));
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn write_csv(
    path: &Path,
    header: &[&str],
    rows: impl Iterator<Item = Vec<String>>,
) -> SimResult<()> {
    let file = fs::File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    writer
        .write_record(header)
        .map_err(|err| SimError::Parse(format!("{}: {err}", path.display())))?;
    for row in rows {
        writer
            .write_record(&row)
            .map_err(|err| SimError::Parse(format!("{}: {err}", path.display())))?;
    }
    writer.flush().map_err(SimError::Io)?;
    Ok(())
}

/// Aggregate economics figures carried into an asset summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EconomicsSummary {
    pub net_present_cost: f64,
    pub levellized_cost_of_energy_kwh: f64,
}

fn summary_header(title: &str) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "# {title}");
    let _ = writeln!(text);
    let _ = writeln!(text, "Written: {}", Utc::now().to_rfc3339());
    let _ = writeln!(text);
    let _ = writeln!(text, "--------");
    let _ = writeln!(text);
    text
}

/// Write results for a combustion asset.
pub fn write_combustion_results(
    root: &Path,
    time_hrs: &[f64],
    asset: &CombustionAsset,
    index: usize,
    economics: EconomicsSummary,
    max_lines: i64,
) -> SimResult<()> {
    let capacity_kw = asset.base.capacity_kw.value();
    let dir = asset_dir(root, "DIESEL", capacity_kw, index)?;

    let totals = asset.emissions.totals();
    let mut text = summary_header(&format!(
        "{:.0} kW DIESEL Summary Results",
        capacity_kw.ceil()
    ));
    let _ = writeln!(text, "## Production Attributes");
    let _ = writeln!(text);
    let _ = writeln!(text, "Capacity: {capacity_kw} kW  ");
    let _ = writeln!(text, "Sunk Cost (N = 0 / Y = 1): {}  ", u8::from(asset.base.is_sunk));
    let _ = writeln!(text, "Capital Cost: {:.2}  ", asset.base.capital_cost);
    let _ = writeln!(
        text,
        "Operation and Maintenance Cost: {:.4} per kWh produced  ",
        asset.base.om_cost_kwh
    );
    let _ = writeln!(
        text,
        "Replacement Running Hours: {}  ",
        asset.base.replace_running_hrs
    );
    let _ = writeln!(text, "Minimum Load Ratio: {}  ", asset.minimum_load_ratio);
    let _ = writeln!(text, "Minimum Runtime: {} hrs  ", asset.minimum_runtime_hrs);
    let _ = writeln!(
        text,
        "Cycle Charging Setpoint: {}  ",
        asset.cycle_charging_setpoint
    );
    let _ = writeln!(text);
    let _ = writeln!(text, "--------");
    let _ = writeln!(text);
    let _ = writeln!(text, "## Results");
    let _ = writeln!(text);
    let _ = writeln!(text, "Running Hours: {:.2}  ", asset.base.running_hours);
    let _ = writeln!(text, "Starts: {}  ", asset.base.n_starts);
    let _ = writeln!(text, "Replacements: {}  ", asset.base.n_replacements);
    let _ = writeln!(
        text,
        "Total Dispatch: {:.2} kWh  ",
        asset.base.total_dispatch_kwh
    );
    let _ = writeln!(
        text,
        "Total Fuel Consumed: {:.2} L  ",
        asset.total_fuel_consumed_l
    );
    let _ = writeln!(text, "Total CO2 Emitted: {:.2} kg  ", totals.co2_kg);
    let _ = writeln!(text, "Total CO Emitted: {:.4} kg  ", totals.co_kg);
    let _ = writeln!(text, "Total NOx Emitted: {:.4} kg  ", totals.nox_kg);
    let _ = writeln!(text, "Total SOx Emitted: {:.4} kg  ", totals.sox_kg);
    let _ = writeln!(text, "Total CH4 Emitted: {:.4} kg  ", totals.ch4_kg);
    let _ = writeln!(text, "Total PM Emitted: {:.4} kg  ", totals.pm_kg);
    let _ = writeln!(
        text,
        "Net Present Cost: {:.2}  ",
        economics.net_present_cost
    );
    let _ = writeln!(
        text,
        "Levellized Cost of Energy: {:.4} per kWh  ",
        economics.levellized_cost_of_energy_kwh
    );
    fs::write(dir.join("summary_results.md"), text)?;

    if max_lines == 0 {
        return Ok(());
    }
    let limit = row_limit(time_hrs.len(), max_lines);
    let series = &asset.base.series;
    write_csv(
        &dir.join("time_series_results.csv"),
        &[
            "Time (since start of data) [hrs]",
            "Production [kW]",
            "Dispatch [kW]",
            "Storage [kW]",
            "Curtailment [kW]",
            "Is Running [ ]",
            "Fuel Consumption [L]",
            "CO2 Emissions [kg]",
            "CO Emissions [kg]",
            "NOx Emissions [kg]",
            "SOx Emissions [kg]",
            "CH4 Emissions [kg]",
            "PM Emissions [kg]",
            "Fuel Cost",
            "Capital Cost",
            "O&M Cost",
        ],
        (0..limit).map(|step| {
            vec![
                time_hrs[step].to_string(),
                series.production_kw[step].to_string(),
                series.dispatch_kw[step].to_string(),
                series.storage_kw[step].to_string(),
                series.curtailment_kw[step].to_string(),
                u8::from(series.is_running[step]).to_string(),
                asset.fuel_consumption_l[step].to_string(),
                asset.emissions.co2_kg[step].to_string(),
                asset.emissions.co_kg[step].to_string(),
                asset.emissions.nox_kg[step].to_string(),
                asset.emissions.sox_kg[step].to_string(),
                asset.emissions.ch4_kg[step].to_string(),
                asset.emissions.pm_kg[step].to_string(),
                asset.fuel_cost[step].to_string(),
                series.capital_cost[step].to_string(),
                series.om_cost[step].to_string(),
            ]
        }),
    )
}

/// Write results for a renewable asset.
pub fn write_renewable_results(
    root: &Path,
    time_hrs: &[f64],
    asset: &RenewableAsset,
    index: usize,
    economics: EconomicsSummary,
    max_lines: i64,
) -> SimResult<()> {
    let capacity_kw = asset.base.capacity_kw.value();
    let dir = asset_dir(root, asset.kind.type_str(), capacity_kw, index)?;

    let mut text = summary_header(&format!(
        "{:.0} kW {} Summary Results",
        capacity_kw.ceil(),
        asset.kind.type_str()
    ));
    let _ = writeln!(text, "## Production Attributes");
    let _ = writeln!(text);
    let _ = writeln!(text, "Capacity: {capacity_kw} kW  ");
    let _ = writeln!(text, "Resource Key: {}  ", asset.resource_key);
    let _ = writeln!(text, "Firmness Factor: {}  ", asset.firmness_factor);
    let _ = writeln!(text, "Sunk Cost (N = 0 / Y = 1): {}  ", u8::from(asset.base.is_sunk));
    let _ = writeln!(text, "Capital Cost: {:.2}  ", asset.base.capital_cost);
    let _ = writeln!(
        text,
        "Operation and Maintenance Cost: {:.4} per kWh produced  ",
        asset.base.om_cost_kwh
    );
    let _ = writeln!(text);
    let _ = writeln!(text, "--------");
    let _ = writeln!(text);
    let _ = writeln!(text, "## Results");
    let _ = writeln!(text);
    let _ = writeln!(text, "Running Hours: {:.2}  ", asset.base.running_hours);
    let _ = writeln!(text, "Replacements: {}  ", asset.base.n_replacements);
    let _ = writeln!(
        text,
        "Total Dispatch: {:.2} kWh  ",
        asset.base.total_dispatch_kwh
    );
    let _ = writeln!(
        text,
        "Total Stored: {:.2} kWh  ",
        asset.base.total_stored_kwh
    );
    let _ = writeln!(
        text,
        "Net Present Cost: {:.2}  ",
        economics.net_present_cost
    );
    let _ = writeln!(
        text,
        "Levellized Cost of Energy: {:.4} per kWh  ",
        economics.levellized_cost_of_energy_kwh
    );
    fs::write(dir.join("summary_results.md"), text)?;

    if max_lines == 0 {
        return Ok(());
    }
    let limit = row_limit(time_hrs.len(), max_lines);
    let series = &asset.base.series;
    write_csv(
        &dir.join("time_series_results.csv"),
        &[
            "Time (since start of data) [hrs]",
            "Production [kW]",
            "Dispatch [kW]",
            "Storage [kW]",
            "Curtailment [kW]",
            "Is Running [ ]",
            "Capital Cost",
            "O&M Cost",
        ],
        (0..limit).map(|step| {
            vec![
                time_hrs[step].to_string(),
                series.production_kw[step].to_string(),
                series.dispatch_kw[step].to_string(),
                series.storage_kw[step].to_string(),
                series.curtailment_kw[step].to_string(),
                u8::from(series.is_running[step]).to_string(),
                series.capital_cost[step].to_string(),
                series.om_cost[step].to_string(),
            ]
        }),
    )
}

/// Write results for a reservoir asset.
pub fn write_reservoir_results(
    root: &Path,
    time_hrs: &[f64],
    asset: &ReservoirAsset,
    index: usize,
    economics: EconomicsSummary,
    max_lines: i64,
) -> SimResult<()> {
    let capacity_kw = asset.base.capacity_kw.value();
    let dir = asset_dir(root, "HYDRO", capacity_kw, index)?;

    let mut text = summary_header(&format!(
        "{:.0} kW HYDRO Summary Results",
        capacity_kw.ceil()
    ));
    let _ = writeln!(text, "## Production Attributes");
    let _ = writeln!(text);
    let _ = writeln!(text, "Capacity: {capacity_kw} kW  ");
    let _ = writeln!(text, "Turbine Type: {}  ", asset.turbine.type_str());
    let _ = writeln!(text, "Net Head: {} m  ", asset.net_head_m);
    let _ = writeln!(text, "Fluid Density: {} kg/m3  ", asset.fluid_density_kgm3);
    let _ = writeln!(
        text,
        "Reservoir Capacity: {} m3  ",
        asset.reservoir_capacity_m3
    );
    let _ = writeln!(
        text,
        "Flow Window: [{}, {}] m3/hr  ",
        asset.minimum_flow_m3hr, asset.maximum_flow_m3hr
    );
    let _ = writeln!(text);
    let _ = writeln!(text, "--------");
    let _ = writeln!(text);
    let _ = writeln!(text, "## Results");
    let _ = writeln!(text);
    let _ = writeln!(text, "Running Hours: {:.2}  ", asset.base.running_hours);
    let _ = writeln!(text, "Replacements: {}  ", asset.base.n_replacements);
    let _ = writeln!(
        text,
        "Total Dispatch: {:.2} kWh  ",
        asset.base.total_dispatch_kwh
    );
    let _ = writeln!(
        text,
        "Final Stored Volume: {:.2} m3  ",
        asset.stored_volume_m3
    );
    let _ = writeln!(
        text,
        "Net Present Cost: {:.2}  ",
        economics.net_present_cost
    );
    let _ = writeln!(
        text,
        "Levellized Cost of Energy: {:.4} per kWh  ",
        economics.levellized_cost_of_energy_kwh
    );
    fs::write(dir.join("summary_results.md"), text)?;

    if max_lines == 0 {
        return Ok(());
    }
    let limit = row_limit(time_hrs.len(), max_lines);
    let series = &asset.base.series;
    write_csv(
        &dir.join("time_series_results.csv"),
        &[
            "Time (since start of data) [hrs]",
            "Production [kW]",
            "Dispatch [kW]",
            "Storage [kW]",
            "Curtailment [kW]",
            "Is Running [ ]",
            "Turbine Flow [m3/hr]",
            "Spill Rate [m3/hr]",
            "Stored Volume [m3]",
            "Capital Cost",
            "O&M Cost",
        ],
        (0..limit).map(|step| {
            vec![
                time_hrs[step].to_string(),
                series.production_kw[step].to_string(),
                series.dispatch_kw[step].to_string(),
                series.storage_kw[step].to_string(),
                series.curtailment_kw[step].to_string(),
                u8::from(series.is_running[step]).to_string(),
                asset.turbine_flow_m3hr[step].to_string(),
                asset.spill_rate_m3hr[step].to_string(),
                asset.stored_volume_series_m3[step].to_string(),
                series.capital_cost[step].to_string(),
                series.om_cost[step].to_string(),
            ]
        }),
    )
}

/// Write results for a battery asset.
pub fn write_storage_results(
    root: &Path,
    time_hrs: &[f64],
    asset: &BatteryAsset,
    index: usize,
    economics: EconomicsSummary,
    max_lines: i64,
) -> SimResult<()> {
    let dir = asset_dir(root, "LIION", asset.power_capacity_kw, index)?;

    let mut text = summary_header(&format!(
        "{:.0} kW LIION Summary Results",
        asset.power_capacity_kw.ceil()
    ));
    let _ = writeln!(text, "## Storage Attributes");
    let _ = writeln!(text);
    let _ = writeln!(text, "Power Capacity: {} kW  ", asset.power_capacity_kw);
    let _ = writeln!(
        text,
        "Energy Capacity: {} kWh  ",
        asset.energy_capacity_kwh
    );
    let _ = writeln!(
        text,
        "SOC Window: [{}, {}] (hysteresis {})  ",
        asset.min_soc, asset.max_soc, asset.hysteresis_soc
    );
    let _ = writeln!(
        text,
        "Charging / Discharging Efficiency: {} / {}  ",
        asset.charging_efficiency, asset.discharging_efficiency
    );
    let _ = writeln!(text, "Replacement SOH: {}  ", asset.replace_soh);
    let _ = writeln!(text, "Sunk Cost (N = 0 / Y = 1): {}  ", u8::from(asset.is_sunk));
    let _ = writeln!(text, "Capital Cost: {:.2}  ", asset.capital_cost);
    let _ = writeln!(text);
    let _ = writeln!(text, "--------");
    let _ = writeln!(text);
    let _ = writeln!(text, "## Results");
    let _ = writeln!(text);
    let _ = writeln!(text, "Final SOH: {:.6}  ", asset.soh);
    let _ = writeln!(text, "Replacements: {}  ", asset.n_replacements);
    let _ = writeln!(
        text,
        "Total Discharge: {:.2} kWh  ",
        asset.total_discharge_kwh
    );
    let _ = writeln!(
        text,
        "Net Present Cost: {:.2}  ",
        economics.net_present_cost
    );
    let _ = writeln!(
        text,
        "Levellized Cost of Energy: {:.4} per kWh  ",
        economics.levellized_cost_of_energy_kwh
    );
    fs::write(dir.join("summary_results.md"), text)?;

    if max_lines == 0 {
        return Ok(());
    }
    let limit = row_limit(time_hrs.len(), max_lines);
    write_csv(
        &dir.join("time_series_results.csv"),
        &[
            "Time (since start of data) [hrs]",
            "Charging Power [kW]",
            "Discharging Power [kW]",
            "Charge [kWh]",
            "SOH [ ]",
            "Capital Cost",
            "O&M Cost",
        ],
        (0..limit).map(|step| {
            vec![
                time_hrs[step].to_string(),
                asset.charging_power_kw[step].to_string(),
                asset.discharging_power_kw[step].to_string(),
                asset.charge_series_kwh[step].to_string(),
                asset.soh_series[step].to_string(),
                asset.capital_cost_series[step].to_string(),
                asset.om_cost_series[step].to_string(),
            ]
        }),
    )
}

/// Controller-level aggregates written at the results root.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchSummary {
    pub n_points: usize,
    pub n_years: f64,
    pub total_fuel_consumed_l: f64,
    pub total_dispatch_kwh: f64,
    pub total_discharge_kwh: f64,
    pub renewable_penetration: f64,
    pub net_present_cost: f64,
    pub levellized_cost_of_energy_kwh: f64,
}

/// Write the model-level summary and the controller time series at the
/// results root.
#[allow(clippy::too_many_arguments)]
pub fn write_dispatch_results(
    root: &Path,
    time_hrs: &[f64],
    load_kw: &[f64],
    net_load_kw: &[f64],
    missed_load_kw: &[f64],
    missed_firm_dispatch_kw: &[f64],
    missed_spinning_reserve_kw: &[f64],
    summary: DispatchSummary,
    max_lines: i64,
) -> SimResult<()> {
    fs::create_dir_all(root)?;

    let mut text = summary_header("Model Summary Results");
    let _ = writeln!(text, "## Model Attributes");
    let _ = writeln!(text);
    let _ = writeln!(text, "Points: {}  ", summary.n_points);
    let _ = writeln!(text, "Years Modelled: {:.4}  ", summary.n_years);
    let _ = writeln!(text);
    let _ = writeln!(text, "--------");
    let _ = writeln!(text);
    let _ = writeln!(text, "## Results");
    let _ = writeln!(text);
    let _ = writeln!(
        text,
        "Total Fuel Consumed: {:.2} L  ",
        summary.total_fuel_consumed_l
    );
    let _ = writeln!(
        text,
        "Total Dispatch: {:.2} kWh  ",
        summary.total_dispatch_kwh
    );
    let _ = writeln!(
        text,
        "Total Discharge: {:.2} kWh  ",
        summary.total_discharge_kwh
    );
    let _ = writeln!(
        text,
        "Renewable Penetration: {:.4}  ",
        summary.renewable_penetration
    );
    let _ = writeln!(
        text,
        "Total Missed Load: {:.2} kWh  ",
        missed_energy_kwh(time_hrs, missed_load_kw)
    );
    let _ = writeln!(
        text,
        "Net Present Cost: {:.2}  ",
        summary.net_present_cost
    );
    let _ = writeln!(
        text,
        "Levellized Cost of Energy: {:.4} per kWh  ",
        summary.levellized_cost_of_energy_kwh
    );
    fs::write(root.join("summary_results.md"), text)?;

    if max_lines == 0 {
        return Ok(());
    }
    let limit = row_limit(time_hrs.len(), max_lines);
    write_csv(
        &root.join("time_series_results.csv"),
        &[
            "Time (since start of data) [hrs]",
            "Electrical Load [kW]",
            "Net Load [kW]",
            "Missed Load [kW]",
            "Missed Firm Dispatch [kW]",
            "Missed Spinning Reserve [kW]",
        ],
        (0..limit).map(|step| {
            vec![
                time_hrs[step].to_string(),
                load_kw[step].to_string(),
                net_load_kw[step].to_string(),
                missed_load_kw[step].to_string(),
                missed_firm_dispatch_kw[step].to_string(),
                missed_spinning_reserve_kw[step].to_string(),
            ]
        }),
    )
}

/// Total missed energy, integrating missed power over interval widths
/// (the last interval repeats the previous width).
fn missed_energy_kwh(time_hrs: &[f64], missed_kw: &[f64]) -> f64 {
    let n = time_hrs.len();
    if n < 2 {
        return 0.0;
    }
    let mut total = 0.0;
    for step in 0..n {
        let dt = if step + 1 < n {
            time_hrs[step + 1] - time_hrs[step]
        } else {
            time_hrs[step] - time_hrs[step - 1]
        };
        total += missed_kw.get(step).copied().unwrap_or(0.0) * dt;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use mgrid_assets::{DieselInputs, LiIonInputs};
    use tempfile::tempdir;

    fn diesel() -> CombustionAsset {
        let inputs = DieselInputs {
            capacity_kw: 250.0,
            ..DieselInputs::default()
        };
        CombustionAsset::new_diesel(4, &inputs, None, None).unwrap()
    }

    #[test]
    fn test_combustion_results_layout() {
        let dir = tempdir().unwrap();
        let asset = diesel();
        let time_hrs = [0.0, 1.0, 2.0, 3.0];
        write_combustion_results(
            dir.path(),
            &time_hrs,
            &asset,
            0,
            EconomicsSummary::default(),
            -1,
        )
        .unwrap();

        let asset_dir = dir.path().join("DIESEL_250kW_idx0");
        assert!(asset_dir.join("summary_results.md").exists());
        let csv_text = fs::read_to_string(asset_dir.join("time_series_results.csv")).unwrap();
        // header plus one row per step
        assert_eq!(csv_text.lines().count(), 5);
        assert!(csv_text.starts_with("Time (since start of data) [hrs]"));
    }

    #[test]
    fn test_max_lines_zero_writes_summary_only() {
        let dir = tempdir().unwrap();
        let asset = diesel();
        write_combustion_results(
            dir.path(),
            &[0.0, 1.0, 2.0, 3.0],
            &asset,
            1,
            EconomicsSummary::default(),
            0,
        )
        .unwrap();
        let asset_dir = dir.path().join("DIESEL_250kW_idx1");
        assert!(asset_dir.join("summary_results.md").exists());
        assert!(!asset_dir.join("time_series_results.csv").exists());
    }

    #[test]
    fn test_max_lines_truncates() {
        let dir = tempdir().unwrap();
        let asset = diesel();
        write_combustion_results(
            dir.path(),
            &[0.0, 1.0, 2.0, 3.0],
            &asset,
            0,
            EconomicsSummary::default(),
            2,
        )
        .unwrap();
        let csv_text = fs::read_to_string(
            dir.path()
                .join("DIESEL_250kW_idx0")
                .join("time_series_results.csv"),
        )
        .unwrap();
        assert_eq!(csv_text.lines().count(), 3);
    }

    #[test]
    fn test_storage_results_layout() {
        let dir = tempdir().unwrap();
        let asset = BatteryAsset::new_liion(4, &LiIonInputs::default()).unwrap();
        write_storage_results(
            dir.path(),
            &[0.0, 1.0, 2.0, 3.0],
            &asset,
            0,
            EconomicsSummary::default(),
            -1,
        )
        .unwrap();
        let asset_dir = dir.path().join("LIION_100kW_idx0");
        assert!(asset_dir.join("summary_results.md").exists());
        assert!(asset_dir.join("time_series_results.csv").exists());
    }

    #[test]
    fn test_dispatch_results_layout() {
        let dir = tempdir().unwrap();
        let time_hrs = [0.0, 1.0, 2.0];
        write_dispatch_results(
            dir.path(),
            &time_hrs,
            &[100.0, 110.0, 120.0],
            &[100.0, 110.0, 120.0],
            &[0.0, 5.0, 0.0],
            &[0.0; 3],
            &[0.0; 3],
            DispatchSummary {
                n_points: 3,
                ..DispatchSummary::default()
            },
            -1,
        )
        .unwrap();
        assert!(dir.path().join("summary_results.md").exists());
        let csv_text =
            fs::read_to_string(dir.path().join("time_series_results.csv")).unwrap();
        assert_eq!(csv_text.lines().count(), 4);
    }

    #[test]
    fn test_missed_energy_integration() {
        let time = [0.0, 1.0, 3.0];
        let missed = [10.0, 20.0, 0.0];
        // 10*1 + 20*2 + 0*2
        assert!((missed_energy_kwh(&time, &missed) - 50.0).abs() < 1e-12);
    }
}
