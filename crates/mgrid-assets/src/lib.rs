//! # mgrid-assets: Microgrid Asset State Machines
//!
//! The asset fleet the dispatch controller drives, one module per family:
//!
//! - [`combustion`]: fuel-burning gensets with on/off state, minimum load
//!   ratio, minimum runtime, fuel laws, and emissions.
//! - [`renewable`]: resource-driven production (solar, wind, tidal, wave)
//!   with per-model power curves and firmness factors.
//! - [`reservoir`]: hydro-like dispatchable production with reservoir
//!   volume accounting and spill.
//! - [`storage`]: batteries with SOC hysteresis, efficiency-adjusted
//!   energy flows, and state-of-health degradation.
//!
//! ## Design Philosophy
//!
//! Asset families are closed enums/structs rather than trait objects:
//! the dispatcher matches exhaustively on what it drives, so an unhandled
//! asset kind is unrepresentable once a scenario has been built. Unknown
//! *model tags* (strings in scenario files) are rejected at construction
//! with `SimError::UnknownKind`.
//!
//! Every production asset records its per-step outputs in a
//! struct-of-arrays [`series::StepSeries`]; per step,
//! `production = dispatch + storage + curtailment` with every term
//! non-negative. Assets are created once, reset at step 0, mutated in
//! place each step, and replaced in place (costs accrue, counters reset)
//! when their replacement predicate fires.

pub mod base;
pub mod combustion;
pub mod renewable;
pub mod reservoir;
pub mod series;
pub mod storage;

pub use base::ProductionBase;
pub use combustion::{
    CombustionAsset, DieselInputs, EmissionIntensities, Emissions, EmissionsSeries, FuelModel,
};
pub use renewable::{
    RenewableAsset, RenewableKind, RenewableModel, ResourceSample, SolarInputs, TidalInputs,
    WaveInputs, WindInputs,
};
pub use reservoir::{HydroInputs, ReservoirAsset, TurbineType};
pub use series::StepSeries;
pub use storage::{BatteryAsset, DegradationParams, LiIonInputs};
