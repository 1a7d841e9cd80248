// crates/cfd-turbulence/src/lib.rs

//! Two-equation turbulence closures and near-wall treatment.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

pub mod model;
pub mod sst;
pub mod wall;
pub mod walldistance;
pub mod wilcox;

pub use model::{ClosureCapability, ClosureState, Laminar, TurbulenceModel};
pub use sst::MenterSst;
pub use wall::{friction_velocity_spalding, resolve_wall_regime, y_plus, WallRegime};
pub use walldistance::{nearest_wall_distance, viscous_wall_centroids};
pub use wilcox::KOmegaWilcox;
