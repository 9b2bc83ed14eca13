//! Per-asset economics: discounting, net present cost, levellised cost.
//!
//! Costs are nominal as recorded per step; discounting converts them at
//! the asset's real discount rate over `t / 8760` years. The levellised
//! cost of energy divides net present cost by discounted energy delivered.

use mgrid_assets::{BatteryAsset, ProductionBase};
use mgrid_core::HOURS_PER_YEAR;

/// Real (inflation-adjusted) annual discount rate.
pub fn real_discount_rate(nominal_inflation_annual: f64, nominal_discount_annual: f64) -> f64 {
    (nominal_discount_annual - nominal_inflation_annual) / (1.0 + nominal_inflation_annual)
}

/// Present-value factor for a cost incurred at `t_hrs`.
pub fn discount_factor(real_rate_annual: f64, t_hrs: f64) -> f64 {
    1.0 / (1.0 + real_rate_annual).powf(t_hrs / HOURS_PER_YEAR)
}

/// Discounted cost and energy aggregates for one asset.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetEconomics {
    pub net_present_cost: f64,
    pub levellized_cost_of_energy_kwh: f64,
    /// Discounted energy delivered [kWh], the LCOE denominator
    pub discounted_energy_kwh: f64,
}

/// Economics for a production asset. `fuel_cost` carries the per-step fuel
/// cost vector for combustion assets.
pub fn production_economics(
    base: &ProductionBase,
    fuel_cost: Option<&[f64]>,
    time_hrs: &[f64],
    dt_hrs: &[f64],
) -> AssetEconomics {
    let real_rate = real_discount_rate(
        base.nominal_inflation_annual,
        base.nominal_discount_annual,
    );

    let mut net_present_cost = 0.0;
    let mut discounted_energy_kwh = 0.0;

    for step in 0..time_hrs.len() {
        let factor = discount_factor(real_rate, time_hrs[step]);
        let mut cost = base.series.capital_cost[step] + base.series.om_cost[step];
        if let Some(fuel) = fuel_cost {
            cost += fuel[step];
        }
        net_present_cost += cost * factor;
        discounted_energy_kwh += base.series.dispatch_kw[step] * dt_hrs[step] * factor;
    }

    AssetEconomics {
        net_present_cost,
        levellized_cost_of_energy_kwh: levellize(net_present_cost, discounted_energy_kwh),
        discounted_energy_kwh,
    }
}

/// Economics for a battery, levellised per kWh discharged.
pub fn storage_economics(
    battery: &BatteryAsset,
    time_hrs: &[f64],
    dt_hrs: &[f64],
) -> AssetEconomics {
    let real_rate = real_discount_rate(
        battery.nominal_inflation_annual,
        battery.nominal_discount_annual,
    );

    let mut net_present_cost = 0.0;
    let mut discounted_energy_kwh = 0.0;

    for step in 0..time_hrs.len() {
        let factor = discount_factor(real_rate, time_hrs[step]);
        net_present_cost +=
            (battery.capital_cost_series[step] + battery.om_cost_series[step]) * factor;
        discounted_energy_kwh += battery.discharging_power_kw[step] * dt_hrs[step] * factor;
    }

    AssetEconomics {
        net_present_cost,
        levellized_cost_of_energy_kwh: levellize(net_present_cost, discounted_energy_kwh),
        discounted_energy_kwh,
    }
}

fn levellize(net_present_cost: f64, discounted_energy_kwh: f64) -> f64 {
    if discounted_energy_kwh > 0.0 {
        net_present_cost / discounted_energy_kwh
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mgrid_core::units::{Hours, Kilowatts};

    #[test]
    fn test_real_discount_rate() {
        let rate = real_discount_rate(0.02, 0.04);
        assert!((rate - 0.02 / 1.02).abs() < 1e-12);
    }

    #[test]
    fn test_discount_factor_decreases_with_time() {
        let rate = 0.05;
        assert!((discount_factor(rate, 0.0) - 1.0).abs() < 1e-12);
        let one_year = discount_factor(rate, HOURS_PER_YEAR);
        assert!((one_year - 1.0 / 1.05).abs() < 1e-12);
        assert!(discount_factor(rate, 2.0 * HOURS_PER_YEAR) < one_year);
    }

    #[test]
    fn test_production_economics_levellizes_dispatch() {
        let mut base = ProductionBase::new(2, 100.0, false, 1000.0, 0.0, 0.0, 0.0, 0.0, None);
        base.is_running = true;
        base.commit_production(0, Hours(1.0), Kilowatts(100.0), Kilowatts(100.0));
        base.commit_production(1, Hours(1.0), Kilowatts(100.0), Kilowatts(100.0));

        // zero rates: NPC is the nominal capital cost, energy undiscounted
        let economics = production_economics(&base, None, &[0.0, 1.0], &[1.0, 1.0]);
        assert!((economics.net_present_cost - 1000.0).abs() < 1e-9);
        assert!((economics.discounted_energy_kwh - 200.0).abs() < 1e-9);
        assert!((economics.levellized_cost_of_energy_kwh - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_energy_yields_zero_lcoe() {
        let base = ProductionBase::new(2, 100.0, false, 1000.0, 0.0, 0.0, 0.0, 0.0, None);
        let economics = production_economics(&base, None, &[0.0, 1.0], &[1.0, 1.0]);
        assert_eq!(economics.levellized_cost_of_energy_kwh, 0.0);
        assert!(economics.net_present_cost > 0.0);
    }
}
