//! # mgrid-sim: Dispatch Control and the Model Facade
//!
//! The simulation engine proper: the per-step dispatch controller, the
//! pre-computed combustion subset table it selects from, per-asset
//! economics, and the [`Model`] facade that ties load, resources, assets,
//! and controller together behind the public operations
//! (`add_*`, `run`, `reset`, `clear`, `write_results`).
//!
//! ## Concurrency model
//!
//! A run is strictly single-threaded: the controller visits steps in
//! order, and within a step the dispatch stages execute sequentially,
//! mutating asset state in place. Independent runs may execute in
//! parallel threads provided each thread owns its own [`Model`]; the only
//! shared state is the read-only resource store.

pub mod controller;
pub mod economics;
pub mod model;
pub mod subset;

pub use controller::{ControlMode, Controller, MISSED_LOAD_THRESHOLD_KW};
pub use economics::{
    discount_factor, production_economics, real_discount_rate, storage_economics, AssetEconomics,
};
pub use model::{Model, ModelInputs, RunTotals};
pub use subset::{CombustionSubsetTable, MAX_UNITS};
