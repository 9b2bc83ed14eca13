//! State and commit logic shared by every production asset.
//!
//! A production asset (combustion, renewable, or reservoir) is created once,
//! reset at step 0, mutated in place by the dispatcher each step, and
//! replaced in place when its replacement predicate fires. The commit split
//! is always the same: production goes to dispatch up to the remaining load,
//! the rest is curtailment; storage charging may later move curtailment into
//! the storage column.

use mgrid_core::units::{Hours, Kilowatts};

use crate::series::StepSeries;

/// Shared state for production assets.
#[derive(Debug, Clone)]
pub struct ProductionBase {
    /// Rated production capacity
    pub capacity_kw: Kilowatts,
    /// Sunk assets incur no capital cost at step 0
    pub is_sunk: bool,
    /// Capital cost incurred at construction and on each replacement
    pub capital_cost: f64,
    /// Operation and maintenance cost per kWh produced
    pub om_cost_kwh: f64,
    pub nominal_inflation_annual: f64,
    pub nominal_discount_annual: f64,
    /// Running hours at which the asset is replaced in place (0 disables)
    pub replace_running_hrs: f64,
    pub running_hours: f64,
    pub n_starts: u32,
    pub n_replacements: u32,
    pub is_running: bool,
    /// Normalised production override: production is `series[i] * capacity`,
    /// regardless of resource or constraints
    pub normalized_production: Option<Vec<f64>>,
    pub total_dispatch_kwh: f64,
    pub total_stored_kwh: f64,
    pub series: StepSeries,
}

impl ProductionBase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        n_points: usize,
        capacity_kw: f64,
        is_sunk: bool,
        capital_cost: f64,
        om_cost_kwh: f64,
        nominal_inflation_annual: f64,
        nominal_discount_annual: f64,
        replace_running_hrs: f64,
        normalized_production: Option<Vec<f64>>,
    ) -> Self {
        let mut base = Self {
            capacity_kw: Kilowatts(capacity_kw),
            is_sunk,
            capital_cost,
            om_cost_kwh,
            nominal_inflation_annual,
            nominal_discount_annual,
            replace_running_hrs,
            running_hours: 0.0,
            n_starts: 0,
            n_replacements: 0,
            is_running: false,
            normalized_production,
            total_dispatch_kwh: 0.0,
            total_stored_kwh: 0.0,
            series: StepSeries::new(n_points),
        };
        base.seed_capital_cost();
        base
    }

    fn seed_capital_cost(&mut self) {
        if !self.is_sunk {
            if let Some(first) = self.series.capital_cost.first_mut() {
                *first = self.capital_cost;
            }
        }
    }

    /// Production dictated by the normalised override series, if configured.
    pub fn override_production(&self, step: usize) -> Option<Kilowatts> {
        self.normalized_production
            .as_ref()
            .map(|series| Kilowatts(series[step] * self.capacity_kw.value()))
    }

    /// Record the production/dispatch/curtailment split for this step and
    /// return the load remaining after dispatch.
    ///
    /// Does not touch the running flag; callers drive their own state
    /// machines before committing.
    pub fn commit_production(
        &mut self,
        step: usize,
        dt: Hours,
        production: Kilowatts,
        load: Kilowatts,
    ) -> Kilowatts {
        let production_kw = production.value().max(0.0);
        let load_kw = load.value().max(0.0);

        let dispatch_kw = production_kw.min(load_kw);
        let curtailment_kw = production_kw - dispatch_kw;

        self.series.production_kw[step] = production_kw;
        self.series.dispatch_kw[step] = dispatch_kw;
        self.series.storage_kw[step] = 0.0;
        self.series.curtailment_kw[step] = curtailment_kw;
        self.series.is_running[step] = self.is_running;

        self.total_dispatch_kwh += dispatch_kw * dt.value();

        if self.is_running {
            self.running_hours += dt.value();
            self.series.om_cost[step] = self.om_cost_kwh * production_kw * dt.value();
        }

        Kilowatts(load_kw - dispatch_kw)
    }

    /// Whether the running-hours replacement predicate has fired.
    pub fn replacement_due(&self) -> bool {
        self.replace_running_hrs > 0.0 && self.running_hours >= self.replace_running_hrs
    }

    /// Replace the asset in place: costs accrue at the given step, running
    /// hours reset.
    pub fn handle_replacement(&mut self, step: usize) {
        self.n_replacements += 1;
        self.running_hours = 0.0;
        self.series.capital_cost[step] += self.capital_cost;
    }

    /// Return the asset to its pre-run state, keeping configuration.
    pub fn reset(&mut self) {
        self.running_hours = 0.0;
        self.n_starts = 0;
        self.n_replacements = 0;
        self.is_running = false;
        self.total_dispatch_kwh = 0.0;
        self.total_stored_kwh = 0.0;
        self.series.reset();
        self.seed_capital_cost();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(n: usize) -> ProductionBase {
        ProductionBase::new(n, 100.0, false, 50_000.0, 0.05, 0.02, 0.04, 0.0, None)
    }

    #[test]
    fn test_commit_splits_production() {
        let mut base = base(4);
        base.is_running = true;
        let remaining = base.commit_production(0, Hours(1.0), Kilowatts(80.0), Kilowatts(50.0));
        assert_eq!(remaining.value(), 0.0);
        assert_eq!(base.series.production_kw[0], 80.0);
        assert_eq!(base.series.dispatch_kw[0], 50.0);
        assert_eq!(base.series.curtailment_kw[0], 30.0);
        assert_eq!(base.series.storage_kw[0], 0.0);
    }

    #[test]
    fn test_commit_balance_invariant() {
        let mut base = base(1);
        base.is_running = true;
        base.commit_production(0, Hours(0.5), Kilowatts(65.0), Kilowatts(100.0));
        let s = &base.series;
        assert!(
            (s.production_kw[0] - (s.dispatch_kw[0] + s.storage_kw[0] + s.curtailment_kw[0])).abs()
                < 1e-12
        );
    }

    #[test]
    fn test_commit_accrues_running_hours_and_om() {
        let mut base = base(2);
        base.is_running = true;
        base.commit_production(0, Hours(2.0), Kilowatts(100.0), Kilowatts(100.0));
        assert_eq!(base.running_hours, 2.0);
        assert!((base.series.om_cost[0] - 0.05 * 100.0 * 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_idle_asset_accrues_nothing() {
        let mut base = base(1);
        base.commit_production(0, Hours(1.0), Kilowatts(0.0), Kilowatts(100.0));
        assert_eq!(base.running_hours, 0.0);
        assert_eq!(base.series.om_cost[0], 0.0);
        assert!(!base.series.is_running[0]);
    }

    #[test]
    fn test_capital_cost_seeded_unless_sunk() {
        let not_sunk = base(3);
        assert_eq!(not_sunk.series.capital_cost[0], 50_000.0);

        let sunk = ProductionBase::new(3, 100.0, true, 50_000.0, 0.05, 0.02, 0.04, 0.0, None);
        assert_eq!(sunk.series.capital_cost[0], 0.0);
    }

    #[test]
    fn test_replacement_resets_hours_and_charges_capital() {
        let mut base = ProductionBase::new(3, 100.0, false, 50_000.0, 0.05, 0.02, 0.04, 10.0, None);
        base.is_running = true;
        for step in 0..3 {
            base.commit_production(step, Hours(5.0), Kilowatts(100.0), Kilowatts(100.0));
            if base.replacement_due() {
                base.handle_replacement(step);
            }
        }
        assert_eq!(base.n_replacements, 1);
        assert_eq!(base.series.capital_cost[1], 50_000.0);
        assert_eq!(base.running_hours, 5.0);
    }

    #[test]
    fn test_override_production() {
        let mut base = base(2);
        base.normalized_production = Some(vec![0.25, 0.75]);
        assert_eq!(base.override_production(1).unwrap().value(), 75.0);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut base = base(2);
        base.is_running = true;
        base.commit_production(0, Hours(1.0), Kilowatts(50.0), Kilowatts(50.0));
        base.reset();
        assert_eq!(base.running_hours, 0.0);
        assert_eq!(base.total_dispatch_kwh, 0.0);
        assert_eq!(base.series.dispatch_kw[0], 0.0);
        assert_eq!(base.series.capital_cost[0], 50_000.0);
    }
}
