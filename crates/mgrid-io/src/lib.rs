//! # mgrid-io: File Ingestion and Results Writing
//!
//! CSV readers for the simulation inputs (electrical load, exogenous
//! resource series, lookup tables) and the writers that persist per-asset
//! and model-level results.
//!
//! Input failures are fatal at init: a missing file surfaces as
//! `SimError::Io`, a non-numeric cell anywhere but a header row as
//! `SimError::Parse` carrying the path and location, and a resource series
//! that does not match the load grid as `SimError::GridMismatch` (raised
//! by the resource store on registration).

pub mod load;
pub mod report;
pub mod resource;
pub mod table;

pub use load::read_load_profile;
pub use report::{
    write_combustion_results, write_dispatch_results, write_renewable_results,
    write_reservoir_results, write_storage_results, DispatchSummary, EconomicsSummary,
};
pub use resource::{read_resource_1d, read_resource_wave, ResourceSeries1d, ResourceSeries2d};
pub use table::{read_normalized_series, read_table_1d, read_table_2d};
