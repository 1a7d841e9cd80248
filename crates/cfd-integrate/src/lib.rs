//! Time-integration driver: per-iteration ghost fill, RHS assembly, explicit
//! or implicit update dispatch, and residual convergence bookkeeping.
//!
//! This crate owns the outer nonlinear loop ([`driver::run`]) and the pieces
//! it composes: spatial residual assembly ([`rhs`]), local/global time
//! stepping ([`timestep`]), the two update schemes ([`explicit`], [`lusgs`]),
//! and near-wall regime tracking for wall-function hysteresis
//! ([`wall_regime`]).

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

/// Outer nonlinear loop: ghost exchange, dt selection, update dispatch,
/// step-rejection retry, and cross-rank residual reduction.
pub mod driver;
/// Multi-stage explicit Runge-Kutta update.
pub mod explicit;
/// Simplified symmetric LU-SGS implicit update.
pub mod lusgs;
/// Spatial residual assembly: reconstruction, fluxes, viscous terms, sources.
pub mod rhs;
/// Per-cell CFL-driven and fixed time stepping.
pub mod timestep;
/// Near-wall y+ regime tracking with hysteresis.
pub mod wall_regime;

pub use crate::driver::{build_turbulence_model, run};
pub use crate::rhs::{assemble_rhs, Residual, WallDistanceField};
pub use crate::wall_regime::WallRegimeTracker;
