//! Keyed 1-D and 2-D piecewise-linear table lookup with bounds checking.
//!
//! Tables are registered once under an integer key and queried during the
//! run. Queries outside the table domain (or against an unknown key) fail
//! with [`SimError::OutOfDomain`] rather than extrapolating: a lookup model
//! has nothing defensible to say outside its data.
//!
//! Index lookup is a linear scan from the low end; a query equal to a grid
//! point resolves to the bracket on its left. 2-D interpolation is bilinear,
//! performed as two horizontal linear interpolations at the bracketing rows
//! followed by one vertical interpolation.

use std::collections::BTreeMap;

use crate::error::{SimError, SimResult};

#[derive(Debug, Clone)]
struct Table1d {
    x: Vec<f64>,
    y: Vec<f64>,
    min_x: f64,
    max_x: f64,
}

#[derive(Debug, Clone)]
struct Table2d {
    x: Vec<f64>,
    y: Vec<f64>,
    /// Row-major: z[j][i] is the value at (x[i], y[j])
    z: Vec<Vec<f64>>,
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

/// Keyed collection of 1-D and 2-D interpolation tables.
#[derive(Debug, Clone, Default)]
pub struct Interpolator {
    tables_1d: BTreeMap<u32, Table1d>,
    tables_2d: BTreeMap<u32, Table2d>,
}

/// Left-bracket index for a query into an ascending grid.
///
/// Assumes the query is already known to lie within [xs[0], xs[last]].
fn bracket(xs: &[f64], query: f64) -> usize {
    let mut idx = 0;
    while idx + 2 < xs.len() && query > xs[idx + 1] {
        idx += 1;
    }
    idx
}

fn lerp(x0: f64, x1: f64, y0: f64, y1: f64, x: f64) -> f64 {
    ((y1 - y0) / (x1 - x0)) * (x - x0) + y0
}

fn check_axis(name: &str, values: &[f64]) -> SimResult<()> {
    if values.len() < 2 {
        return Err(SimError::InvalidConfig(format!(
            "interpolation axis '{name}' needs at least two points, got {}",
            values.len()
        )));
    }
    for pair in values.windows(2) {
        if pair[1] <= pair[0] {
            return Err(SimError::InvalidConfig(format!(
                "interpolation axis '{name}' must be strictly increasing ({} then {})",
                pair[0], pair[1]
            )));
        }
    }
    Ok(())
}

impl Interpolator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a 1-D table under the given key.
    pub fn add_1d(&mut self, key: u32, x: Vec<f64>, y: Vec<f64>) -> SimResult<()> {
        if self.tables_1d.contains_key(&key) {
            return Err(SimError::InvalidConfig(format!(
                "1-D interpolation key {key} already registered"
            )));
        }
        check_axis("x", &x)?;
        if x.len() != y.len() {
            return Err(SimError::InvalidConfig(format!(
                "1-D table length mismatch under key {key}: {} x values, {} y values",
                x.len(),
                y.len()
            )));
        }
        let min_x = x[0];
        let max_x = x[x.len() - 1];
        self.tables_1d.insert(key, Table1d { x, y, min_x, max_x });
        Ok(())
    }

    /// Register a 2-D table under the given key.
    ///
    /// `z` is row-major with one row per `y` value and one column per `x`
    /// value.
    pub fn add_2d(&mut self, key: u32, x: Vec<f64>, y: Vec<f64>, z: Vec<Vec<f64>>) -> SimResult<()> {
        if self.tables_2d.contains_key(&key) {
            return Err(SimError::InvalidConfig(format!(
                "2-D interpolation key {key} already registered"
            )));
        }
        check_axis("x", &x)?;
        check_axis("y", &y)?;
        if z.len() != y.len() {
            return Err(SimError::InvalidConfig(format!(
                "2-D table under key {key} has {} rows, expected {}",
                z.len(),
                y.len()
            )));
        }
        for (j, row) in z.iter().enumerate() {
            if row.len() != x.len() {
                return Err(SimError::InvalidConfig(format!(
                    "2-D table under key {key}, row {j}: {} columns, expected {}",
                    row.len(),
                    x.len()
                )));
            }
        }
        let min_x = x[0];
        let max_x = x[x.len() - 1];
        let min_y = y[0];
        let max_y = y[y.len() - 1];
        self.tables_2d.insert(
            key,
            Table2d {
                x,
                y,
                z,
                min_x,
                max_x,
                min_y,
                max_y,
            },
        );
        Ok(())
    }

    /// Whether a 1-D table is registered under the key.
    pub fn has_1d(&self, key: u32) -> bool {
        self.tables_1d.contains_key(&key)
    }

    /// Whether a 2-D table is registered under the key.
    pub fn has_2d(&self, key: u32) -> bool {
        self.tables_2d.contains_key(&key)
    }

    /// Domain of a registered 1-D table, as `(min_x, max_x)`.
    pub fn domain_1d(&self, key: u32) -> SimResult<(f64, f64)> {
        let table = self
            .tables_1d
            .get(&key)
            .ok_or_else(|| SimError::OutOfDomain(format!("no 1-D table under key {key}")))?;
        Ok((table.min_x, table.max_x))
    }

    /// Domain of a registered 2-D table, as `((min_x, max_x), (min_y, max_y))`.
    pub fn domain_2d(&self, key: u32) -> SimResult<((f64, f64), (f64, f64))> {
        let table = self
            .tables_2d
            .get(&key)
            .ok_or_else(|| SimError::OutOfDomain(format!("no 2-D table under key {key}")))?;
        Ok(((table.min_x, table.max_x), (table.min_y, table.max_y)))
    }

    /// Piecewise-linear interpolation into the 1-D table under `key`.
    pub fn interp_1d(&self, key: u32, query_x: f64) -> SimResult<f64> {
        let table = self
            .tables_1d
            .get(&key)
            .ok_or_else(|| SimError::OutOfDomain(format!("no 1-D table under key {key}")))?;
        if query_x < table.min_x || query_x > table.max_x {
            return Err(SimError::OutOfDomain(format!(
                "1-D query {query_x} outside [{}, {}] under key {key}",
                table.min_x, table.max_x
            )));
        }
        let i = bracket(&table.x, query_x);
        Ok(lerp(
            table.x[i],
            table.x[i + 1],
            table.y[i],
            table.y[i + 1],
            query_x,
        ))
    }

    /// Bilinear interpolation into the 2-D table under `key`.
    pub fn interp_2d(&self, key: u32, query_x: f64, query_y: f64) -> SimResult<f64> {
        let table = self
            .tables_2d
            .get(&key)
            .ok_or_else(|| SimError::OutOfDomain(format!("no 2-D table under key {key}")))?;
        if query_x < table.min_x || query_x > table.max_x {
            return Err(SimError::OutOfDomain(format!(
                "2-D query x = {query_x} outside [{}, {}] under key {key}",
                table.min_x, table.max_x
            )));
        }
        if query_y < table.min_y || query_y > table.max_y {
            return Err(SimError::OutOfDomain(format!(
                "2-D query y = {query_y} outside [{}, {}] under key {key}",
                table.min_y, table.max_y
            )));
        }

        let i = bracket(&table.x, query_x);
        let j = bracket(&table.y, query_y);

        // two horizontal interps at the bracketing rows, then one vertical
        let z_low = lerp(
            table.x[i],
            table.x[i + 1],
            table.z[j][i],
            table.z[j][i + 1],
            query_x,
        );
        let z_high = lerp(
            table.x[i],
            table.x[i + 1],
            table.z[j + 1][i],
            table.z[j + 1][i + 1],
            query_x,
        );
        Ok(lerp(table.y[j], table.y[j + 1], z_low, z_high, query_y))
    }
}
