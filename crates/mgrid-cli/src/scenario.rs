//! YAML scenario files: the full description of one simulation run.
//!
//! A scenario names the load file, the control settings, the resource
//! series, and the asset fleet. Asset blocks reuse the constructor input
//! structures directly, so every field a constructor accepts can be set
//! from the file, and every omitted field takes the constructor default.
//! Relative paths are resolved against the scenario file's directory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use mgrid_assets::{
    DieselInputs, HydroInputs, LiIonInputs, SolarInputs, TidalInputs, WaveInputs, WindInputs,
};
use mgrid_core::error::SimResult;
use mgrid_sim::{Model, ModelInputs};

fn default_control_mode() -> String {
    "load_following".into()
}

fn default_ratio() -> f64 {
    0.1
}

/// One exogenous resource series registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSpec {
    /// Resource family: solar, wind, tidal, hydro, or wave
    pub kind: String,
    pub key: u32,
    pub path: String,
}

/// A complete simulation scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub load_path: String,
    #[serde(default = "default_control_mode")]
    pub control_mode: String,
    #[serde(default = "default_ratio")]
    pub firm_dispatch_ratio: f64,
    #[serde(default = "default_ratio")]
    pub load_reserve_ratio: f64,
    #[serde(default)]
    pub resources: Vec<ResourceSpec>,
    #[serde(default)]
    pub diesel: Vec<DieselInputs>,
    #[serde(default)]
    pub solar: Vec<SolarInputs>,
    #[serde(default)]
    pub wind: Vec<WindInputs>,
    #[serde(default)]
    pub tidal: Vec<TidalInputs>,
    #[serde(default)]
    pub wave: Vec<WaveInputs>,
    #[serde(default)]
    pub hydro: Vec<HydroInputs>,
    #[serde(default)]
    pub liion: Vec<LiIonInputs>,
}

fn resolve(base: &Path, path: &str) -> String {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        path.to_string()
    } else {
        base.join(candidate).to_string_lossy().into_owned()
    }
}

fn resolve_opt(base: &Path, path: &mut Option<String>) {
    if let Some(inner) = path {
        *inner = resolve(base, inner);
    }
}

impl Scenario {
    /// Parse a scenario from a YAML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading scenario '{}'", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("parsing scenario '{}'", path.display()))
    }

    /// Build and populate a model, resolving relative paths against
    /// `base_dir`.
    pub fn build_model(&self, base_dir: &Path) -> SimResult<Model> {
        let model_inputs = ModelInputs {
            load_path: resolve(base_dir, &self.load_path),
            control_mode: self.control_mode.clone(),
            firm_dispatch_ratio: self.firm_dispatch_ratio,
            load_reserve_ratio: self.load_reserve_ratio,
        };
        let mut model = Model::new(&model_inputs)?;

        for resource in &self.resources {
            model.add_resource(
                &resource.kind,
                &resolve(base_dir, &resource.path),
                resource.key,
            )?;
        }

        for inputs in &self.diesel {
            let mut inputs = inputs.clone();
            resolve_opt(base_dir, &mut inputs.fuel_lookup_path);
            resolve_opt(base_dir, &mut inputs.normalized_production_path);
            model.add_diesel(&inputs)?;
        }
        for inputs in &self.solar {
            let mut inputs = inputs.clone();
            resolve_opt(base_dir, &mut inputs.normalized_production_path);
            model.add_solar(&inputs)?;
        }
        for inputs in &self.wind {
            let mut inputs = inputs.clone();
            resolve_opt(base_dir, &mut inputs.power_curve_path);
            resolve_opt(base_dir, &mut inputs.normalized_production_path);
            model.add_wind(&inputs)?;
        }
        for inputs in &self.tidal {
            let mut inputs = inputs.clone();
            resolve_opt(base_dir, &mut inputs.power_curve_path);
            resolve_opt(base_dir, &mut inputs.normalized_production_path);
            model.add_tidal(&inputs)?;
        }
        for inputs in &self.wave {
            let mut inputs = inputs.clone();
            resolve_opt(base_dir, &mut inputs.performance_matrix_path);
            resolve_opt(base_dir, &mut inputs.normalized_production_path);
            model.add_wave(&inputs)?;
        }
        for inputs in &self.hydro {
            let mut inputs = inputs.clone();
            resolve_opt(base_dir, &mut inputs.normalized_production_path);
            model.add_hydro(&inputs)?;
        }
        for inputs in &self.liion {
            model.add_liion(inputs)?;
        }

        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const SCENARIO_YAML: &str = "\
load_path: load.csv
control_mode: cycle_charging
load_reserve_ratio: 0.05
resources:
  - kind: solar
    key: 0
    path: ghi.csv
diesel:
  - capacity_kw: 150
    minimum_load_ratio: 0.25
solar:
  - capacity_kw: 80
    resource_key: 0
    derating: 0.85
liion:
  - power_capacity_kw: 50
    energy_capacity_kwh: 200
";

    fn write_data(dir: &Path) {
        fs::write(
            dir.join("load.csv"),
            "Time (since start of data) [hrs],Electrical Load [kW]\n0,100\n1,100\n2,100\n3,100\n",
        )
        .unwrap();
        fs::write(
            dir.join("ghi.csv"),
            "Time (since start of data) [hrs],Solar GHI [kW/m2]\n0,0.5\n1,0\n2,0.7\n3,0\n",
        )
        .unwrap();
    }

    #[test]
    fn test_parse_scenario() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scenario.yaml");
        fs::write(&path, SCENARIO_YAML).unwrap();
        let scenario = Scenario::from_path(&path).unwrap();
        assert_eq!(scenario.control_mode, "cycle_charging");
        assert_eq!(scenario.firm_dispatch_ratio, 0.1); // default
        assert_eq!(scenario.load_reserve_ratio, 0.05);
        assert_eq!(scenario.diesel.len(), 1);
        assert_eq!(scenario.diesel[0].minimum_load_ratio, 0.25);
        // constructor defaults survive omission
        assert_eq!(scenario.diesel[0].minimum_runtime_hrs, 4.0);
        assert_eq!(scenario.solar[0].power_model, "simple");
    }

    #[test]
    fn test_build_and_run_model() {
        let dir = tempdir().unwrap();
        write_data(dir.path());
        let path = dir.path().join("scenario.yaml");
        fs::write(&path, SCENARIO_YAML).unwrap();

        let scenario = Scenario::from_path(&path).unwrap();
        let mut model = scenario.build_model(dir.path()).unwrap();
        model.run().unwrap();
        assert_eq!(model.combustion.len(), 1);
        assert_eq!(model.renewables.len(), 1);
        assert_eq!(model.storage.len(), 1);
        assert!(model.totals.total_dispatch_kwh > 0.0);
    }

    #[test]
    fn test_missing_load_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scenario.yaml");
        fs::write(&path, SCENARIO_YAML).unwrap();
        let scenario = Scenario::from_path(&path).unwrap();
        assert!(scenario.build_model(dir.path()).is_err());
    }

    #[test]
    fn test_bad_yaml_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scenario.yaml");
        fs::write(&path, "load_path: [not, a, string").unwrap();
        let err = Scenario::from_path(&path).unwrap_err();
        assert!(format!("{err:#}").contains("scenario.yaml"));
    }
}
