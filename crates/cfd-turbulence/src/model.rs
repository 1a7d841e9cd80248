//! The turbulence-closure capability set.

use cfd_core::{PrimitiveVars, TurbConservative, TurbPrimitive};
use cfd_grid::CellGradients;

/// One of the three services a closure contributes to the solver loop.
/// A closure implementation declares which it supports via
/// [`TurbulenceModel::capabilities`]; `Laminar` supports none of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClosureCapability {
    /// Supplies `mu_t` to the viscous-flux and gradient machinery.
    EddyViscosity,
    /// Supplies production/destruction source terms for `{k, omega}`.
    SourceTerms,
    /// Supplies the wall-adjacent ghost-cell `{k, omega}` state.
    BcGhostState,
}

/// Per-cell closure inputs: local state, its gradients, and distance to the
/// nearest viscous wall.
#[derive(Clone, Copy, Debug)]
pub struct ClosureState {
    pub prim: PrimitiveVars,
    pub gradients: CellGradients,
    pub wall_distance: f64,
    pub mu_molecular: f64,
}

/// A two-equation (or trivial laminar) turbulence closure.
pub trait TurbulenceModel: Send + Sync {
    fn name(&self) -> &'static str;

    #[must_use]
    fn capabilities(&self) -> &'static [ClosureCapability];

    /// Eddy viscosity `mu_t` at a cell (zero if `EddyViscosity` isn't supported).
    fn eddy_viscosity(&self, state: &ClosureState) -> f64;

    /// Net `{rho*k, rho*omega}` source (production minus destruction) per
    /// unit volume (zero if `SourceTerms` isn't supported).
    fn source_terms(&self, state: &ClosureState) -> TurbConservative;

    /// The wall-adjacent ghost cell's `{k, omega}`, given the first
    /// off-wall cell's distance and molecular viscosity (returns `None` if
    /// `BcGhostState` isn't supported, i.e. for laminar runs).
    fn wall_ghost_state(&self, first_cell_distance: f64, mu: f64, rho: f64) -> Option<TurbPrimitive>;
}

/// The trivial closure: no turbulence model running, `mu_t = 0` everywhere.
#[derive(Clone, Copy, Debug, Default)]
pub struct Laminar;

impl TurbulenceModel for Laminar {
    fn name(&self) -> &'static str {
        "laminar"
    }

    fn capabilities(&self) -> &'static [ClosureCapability] {
        &[]
    }

    fn eddy_viscosity(&self, _state: &ClosureState) -> f64 {
        0.0
    }

    fn source_terms(&self, _state: &ClosureState) -> TurbConservative {
        TurbConservative { rho_k: 0.0, rho_omega: 0.0 }
    }

    fn wall_ghost_state(&self, _first_cell_distance: f64, _mu: f64, _rho: f64) -> Option<TurbPrimitive> {
        None
    }
}
