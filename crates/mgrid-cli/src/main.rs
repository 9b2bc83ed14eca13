use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tabwriter::TabWriter;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

mod cli;
mod scenario;

use cli::{Cli, Commands};
use mgrid_sim::Model;
use scenario::Scenario;

fn configure_threads(spec: &str) {
    let count = if spec.eq_ignore_ascii_case("auto") {
        num_cpus::get()
    } else {
        spec.parse().unwrap_or_else(|_| num_cpus::get())
    };
    let _ = ThreadPoolBuilder::new().num_threads(count).build_global();
}

fn print_run_summary(model: &Model) -> Result<()> {
    let totals = &model.totals;
    let mut tw = TabWriter::new(io::stdout());
    writeln!(tw, "Steps:\t{}", model.profile.n_points())?;
    writeln!(tw, "Years modelled:\t{:.4}", model.profile.n_years())?;
    writeln!(tw, "Total dispatch:\t{:.2} kWh", totals.total_dispatch_kwh)?;
    writeln!(
        tw,
        "Total discharge:\t{:.2} kWh",
        totals.total_discharge_kwh
    )?;
    writeln!(
        tw,
        "Total fuel consumed:\t{:.2} L",
        totals.total_fuel_consumed_l
    )?;
    writeln!(
        tw,
        "Total CO2 emitted:\t{:.2} kg",
        totals.total_emissions.co2_kg
    )?;
    writeln!(
        tw,
        "Missed load:\t{:.2} kWh",
        totals.total_missed_load_kwh
    )?;
    writeln!(
        tw,
        "Renewable penetration:\t{:.4}",
        totals.renewable_penetration
    )?;
    writeln!(tw, "Net present cost:\t{:.2}", totals.net_present_cost)?;
    writeln!(
        tw,
        "Levellized cost of energy:\t{:.4} per kWh",
        totals.levellized_cost_of_energy_kwh
    )?;
    tw.flush()?;
    Ok(())
}

fn run_scenario(scenario_path: &Path, out: &Path, max_lines: i64) -> Result<Model> {
    let scenario = Scenario::from_path(scenario_path)?;
    let base_dir = scenario_path.parent().unwrap_or_else(|| Path::new("."));

    let mut model = scenario
        .build_model(base_dir)
        .with_context(|| format!("building model from '{}'", scenario_path.display()))?;
    model
        .run()
        .with_context(|| format!("running scenario '{}'", scenario_path.display()))?;
    model
        .write_results(out, max_lines)
        .with_context(|| format!("writing results to '{}'", out.display()))?;
    info!(
        scenario = %scenario_path.display(),
        results = %out.display(),
        "scenario complete"
    );
    Ok(model)
}

fn discover_scenarios(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut scenarios = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("reading scenario directory '{}'", dir.display()))?
    {
        let path = entry?.path();
        let is_yaml = path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case("yaml") || extension.eq_ignore_ascii_case("yml"));
        if is_yaml {
            scenarios.push(path);
        }
    }
    scenarios.sort();
    Ok(scenarios)
}

fn run_batch(dir: &Path, out: &Path, max_lines: i64, threads: &str) -> Result<()> {
    configure_threads(threads);
    let scenarios = discover_scenarios(dir)?;
    if scenarios.is_empty() {
        bail!("no scenario files found in '{}'", dir.display());
    }
    info!(count = scenarios.len(), "running scenario batch");

    // each worker owns its model; nothing is shared across runs
    let failures: Vec<String> = scenarios
        .par_iter()
        .filter_map(|scenario_path| {
            let stem = scenario_path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "scenario".into());
            let scenario_out = out.join(stem);
            match run_scenario(scenario_path, &scenario_out, max_lines) {
                Ok(_) => None,
                Err(err) => {
                    error!(
                        scenario = %scenario_path.display(),
                        "scenario failed: {err:#}"
                    );
                    Some(format!("{}: {err:#}", scenario_path.display()))
                }
            }
        })
        .collect();

    if !failures.is_empty() {
        bail!("{} of {} scenarios failed", failures.len(), scenarios.len());
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting tracing subscriber")?;

    match cli.command {
        Commands::Run {
            scenario,
            out,
            max_lines,
        } => {
            let model = run_scenario(&scenario, &out, max_lines)?;
            print_run_summary(&model)?;
        }
        Commands::Batch {
            dir,
            out,
            max_lines,
            threads,
        } => {
            run_batch(&dir, &out, max_lines, &threads)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_scenario(dir: &Path, name: &str) {
        fs::write(
            dir.join("load.csv"),
            "Time (since start of data) [hrs],Electrical Load [kW]\n0,50\n1,50\n2,50\n",
        )
        .unwrap();
        fs::write(
            dir.join(name),
            "load_path: load.csv\ndiesel:\n  - capacity_kw: 100\n",
        )
        .unwrap();
    }

    #[test]
    fn test_run_scenario_end_to_end() {
        let dir = tempdir().unwrap();
        write_scenario(dir.path(), "base.yaml");
        let out = dir.path().join("results");
        let model = run_scenario(&dir.path().join("base.yaml"), &out, -1).unwrap();
        assert!(out.join("summary_results.md").exists());
        assert!(model.totals.total_dispatch_kwh > 0.0);
    }

    #[test]
    fn test_discover_scenarios_filters_yaml() {
        let dir = tempdir().unwrap();
        write_scenario(dir.path(), "a.yaml");
        fs::write(dir.path().join("b.yml"), "load_path: load.csv\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let scenarios = discover_scenarios(dir.path()).unwrap();
        assert_eq!(scenarios.len(), 2);
    }

    #[test]
    fn test_batch_runs_all_scenarios() {
        let dir = tempdir().unwrap();
        write_scenario(dir.path(), "one.yaml");
        write_scenario(dir.path(), "two.yaml");
        let out = dir.path().join("results");
        run_batch(dir.path(), &out, 0, "2").unwrap();
        assert!(out.join("one/summary_results.md").exists());
        assert!(out.join("two/summary_results.md").exists());
    }
}
