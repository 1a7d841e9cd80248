//! Explicit per-run context, replacing the global mutable state (ostream
//! sinks, process-wide constants) design note 9 calls out.
//!
//! `cfd-core` only knows about configuration and thermodynamics; the
//! communicator and logger live above it (`cfd-parallel`, `cfd-integrate`)
//! so this crate stays a dependency-free leaf. Those crates embed a
//! `SolverContext` in their own, richer context type rather than duplicating
//! its fields.

use crate::config::Config;
use crate::state::Thermodynamics;

/// Read-only handles shared by every stage of one solver run. Borrowed, not
/// owned: its lifetime is the outer loop's scope (design note 9).
pub struct SolverContext<'a> {
    pub config: &'a Config,
    pub thermo: &'a dyn Thermodynamics,
}

impl<'a> SolverContext<'a> {
    #[must_use]
    pub fn new(config: &'a Config, thermo: &'a dyn Thermodynamics) -> Self {
        Self { config, thermo }
    }
}
