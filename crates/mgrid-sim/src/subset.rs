//! Pre-computed minimum-count combustion subsets keyed by capacity.
//!
//! All `2^M` on/off patterns across the M combustion assets are enumerated
//! once at init. For each distinct total installed capacity the table keeps
//! the pattern with the fewest running units (first one found wins ties).
//! At dispatch time the smallest key at or above the required allocation is
//! selected; when the requirement exceeds every key, the largest key is
//! used.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use tracing::info;

use mgrid_core::error::{SimError, SimResult};

/// Enumerating beyond 30 units (2^30 patterns) is refused outright.
pub const MAX_UNITS: usize = 30;

/// Unit count at which enumeration progress is logged.
const PROGRESS_LOG_UNITS: usize = 14;

/// Capacity-keyed table of minimum-count on/off patterns.
#[derive(Debug, Clone)]
pub struct CombustionSubsetTable {
    map: BTreeMap<OrderedFloat<f64>, Vec<bool>>,
}

impl CombustionSubsetTable {
    /// Enumerate all on/off patterns over the given unit capacities.
    pub fn build(capacities_kw: &[f64]) -> SimResult<Self> {
        let n_units = capacities_kw.len();
        if n_units > MAX_UNITS {
            return Err(SimError::InvalidConfig(format!(
                "{n_units} combustion units would enumerate 2^{n_units} subsets; the limit is {MAX_UNITS}"
            )));
        }

        let n_rows: u64 = 1 << n_units;
        let mut map: BTreeMap<OrderedFloat<f64>, Vec<bool>> = BTreeMap::new();

        for row in 0..n_rows {
            let mut pattern = vec![false; n_units];
            let mut total_capacity_kw = 0.0;
            let mut unit_count = 0usize;

            for (unit, on) in pattern.iter_mut().enumerate() {
                if row & (1 << unit) != 0 {
                    *on = true;
                    total_capacity_kw += capacities_kw[unit];
                    unit_count += 1;
                }
            }

            match map.entry(OrderedFloat(total_capacity_kw)) {
                Entry::Vacant(vacant) => {
                    vacant.insert(pattern);
                }
                Entry::Occupied(mut occupied) => {
                    let incumbent_count = occupied.get().iter().filter(|on| **on).count();
                    if unit_count < incumbent_count {
                        occupied.insert(pattern);
                    }
                }
            }

            if n_units >= PROGRESS_LOG_UNITS && (row + 1) % (1 << 16) == 0 {
                info!(
                    "combustion subset enumeration: {} / {} patterns",
                    row + 1,
                    n_rows
                );
            }
        }

        if n_units >= PROGRESS_LOG_UNITS {
            info!(
                "combustion subset enumeration complete: {} patterns, {} distinct capacities",
                n_rows,
                map.len()
            );
        }

        Ok(Self { map })
    }

    /// The pattern for the smallest capacity key at or above the required
    /// allocation, or the largest key if none reaches it. Returns the key
    /// and the on/off pattern.
    pub fn select(&self, allocation_kw: f64) -> (f64, &[bool]) {
        for (key, pattern) in &self.map {
            if key.0 >= allocation_kw {
                return (key.0, pattern);
            }
        }
        let (key, pattern) = self
            .map
            .iter()
            .next_back()
            .expect("subset table always holds the all-off pattern");
        (key.0, pattern)
    }

    /// Distinct capacity keys, ascending.
    pub fn keys_kw(&self) -> Vec<f64> {
        self.map.keys().map(|key| key.0).collect()
    }

    /// Pattern stored under an exact capacity key, if present.
    pub fn pattern_at(&self, capacity_kw: f64) -> Option<&[bool]> {
        self.map
            .get(&OrderedFloat(capacity_kw))
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_unit_keys() {
        let table = CombustionSubsetTable::build(&[100.0, 150.0, 250.0]).unwrap();
        assert_eq!(
            table.keys_kw(),
            vec![0.0, 100.0, 150.0, 250.0, 350.0, 400.0, 500.0]
        );
    }

    #[test]
    fn test_tie_prefers_fewest_running_units() {
        // 100 + 150 collides with the single 250 kW unit; the single unit
        // must win
        let table = CombustionSubsetTable::build(&[100.0, 150.0, 250.0]).unwrap();
        assert_eq!(table.pattern_at(250.0).unwrap(), &[false, false, true]);
    }

    #[test]
    fn test_no_key_has_denser_equal_capacity_pattern() {
        let capacities = [100.0, 150.0, 250.0, 100.0];
        let table = CombustionSubsetTable::build(&capacities).unwrap();
        for key in table.keys_kw() {
            let stored_count = table
                .pattern_at(key)
                .unwrap()
                .iter()
                .filter(|on| **on)
                .count();
            // re-enumerate and confirm nothing with this capacity runs
            // fewer units
            for row in 0u64..(1 << capacities.len()) {
                let mut total = 0.0;
                let mut count = 0;
                for (unit, capacity) in capacities.iter().enumerate() {
                    if row & (1 << unit) != 0 {
                        total += capacity;
                        count += 1;
                    }
                }
                if (total - key).abs() < 1e-9 {
                    assert!(stored_count <= count);
                }
            }
        }
    }

    #[test]
    fn test_selection_rules() {
        let table = CombustionSubsetTable::build(&[100.0, 150.0, 250.0]).unwrap();
        // smallest key at or above the request
        let (key, pattern) = table.select(180.0);
        assert_eq!(key, 250.0);
        assert_eq!(pattern, &[false, false, true]);

        let (key, pattern) = table.select(300.0);
        assert_eq!(key, 350.0);
        assert_eq!(pattern, &[true, false, true]);

        // beyond every key falls back to the largest
        let (key, pattern) = table.select(600.0);
        assert_eq!(key, 500.0);
        assert_eq!(pattern, &[true, true, true]);

        // zero or negative requirements resolve to the all-off pattern
        let (key, pattern) = table.select(0.0);
        assert_eq!(key, 0.0);
        assert!(pattern.iter().all(|on| !on));
    }

    #[test]
    fn test_empty_fleet() {
        let table = CombustionSubsetTable::build(&[]).unwrap();
        assert_eq!(table.len(), 1);
        let (key, pattern) = table.select(100.0);
        assert_eq!(key, 0.0);
        assert!(pattern.is_empty());
    }

    #[test]
    fn test_refuses_oversized_fleet() {
        let capacities = vec![100.0; 31];
        assert!(matches!(
            CombustionSubsetTable::build(&capacities),
            Err(SimError::InvalidConfig(_))
        ));
    }
}
