//! Per-asset step-level output vectors.
//!
//! Each production asset logs its per-step outputs into a struct-of-arrays:
//! the parallel vectors stay side by side (rather than an array of row
//! structs) so time-series CSV writing walks each column cheaply. Cost
//! vectors keep length N even though at most a few entries are non-zero, so
//! downstream economics can treat every asset uniformly.

/// Step-level output vectors common to every production asset.
///
/// Invariant, per step: `production = dispatch + storage + curtailment`,
/// all non-negative.
#[derive(Debug, Clone, Default)]
pub struct StepSeries {
    pub production_kw: Vec<f64>,
    pub dispatch_kw: Vec<f64>,
    pub storage_kw: Vec<f64>,
    pub curtailment_kw: Vec<f64>,
    pub is_running: Vec<bool>,
    pub capital_cost: Vec<f64>,
    pub om_cost: Vec<f64>,
}

impl StepSeries {
    pub fn new(n_points: usize) -> Self {
        Self {
            production_kw: vec![0.0; n_points],
            dispatch_kw: vec![0.0; n_points],
            storage_kw: vec![0.0; n_points],
            curtailment_kw: vec![0.0; n_points],
            is_running: vec![false; n_points],
            capital_cost: vec![0.0; n_points],
            om_cost: vec![0.0; n_points],
        }
    }

    pub fn n_points(&self) -> usize {
        self.production_kw.len()
    }

    /// Zero every vector in place, keeping length.
    pub fn reset(&mut self) {
        self.production_kw.fill(0.0);
        self.dispatch_kw.fill(0.0);
        self.storage_kw.fill(0.0);
        self.curtailment_kw.fill(0.0);
        self.is_running.fill(false);
        self.capital_cost.fill(0.0);
        self.om_cost.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_allocates_all_columns() {
        let series = StepSeries::new(5);
        assert_eq!(series.n_points(), 5);
        assert_eq!(series.dispatch_kw.len(), 5);
        assert_eq!(series.is_running.len(), 5);
    }

    #[test]
    fn test_reset_keeps_length() {
        let mut series = StepSeries::new(3);
        series.production_kw[1] = 40.0;
        series.is_running[1] = true;
        series.reset();
        assert_eq!(series.n_points(), 3);
        assert_eq!(series.production_kw[1], 0.0);
        assert!(!series.is_running[1]);
    }
}
