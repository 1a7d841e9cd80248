//! Error kinds surfaced across the solver.
//!
//! Policy: any error on any rank becomes global (see `cfd-parallel`'s abort
//! path). The time-integration driver (`cfd-integrate`) is the only
//! component allowed to *recover* from a [`NumericalError`], by step
//! rejection; every other crate propagates `SolverError` upward via `?`.

use thiserror::Error;

/// The sub-kinds of numerical failure the integrator can retry against.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum NumericalError {
    /// An accepted step would leave a cell with ρ≤0, p≤0, or T≤0 (invariant 2).
    #[error("non-positive state in cell ({block}, {i},{j},{k})")]
    NonPositiveState {
        block: u32,
        i: u32,
        j: u32,
        k: u32,
    },
    /// Both the limited and the first-order fallback face state were non-physical.
    #[error("reconstruction failure on face ({block}, {i},{j},{k}, dir={dir})")]
    ReconstructionFailure {
        block: u32,
        i: u32,
        j: u32,
        k: u32,
        dir: u8,
    },
    /// LU-SGS sweep budget exhausted without meeting the linear tolerance.
    #[error("linear solve diverged after {sweeps} sweeps (residual ratio {ratio:e})")]
    LinearSolveDivergence { sweeps: u32, ratio: f64 },
}

/// Transient failures in ghost-cell exchange; retried a bounded number of
/// times by `cfd-parallel` before escalating to fatal.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientError {
    #[error("message lost for patch {patch_id} between rank {from} and rank {to}")]
    MessageLost {
        patch_id: u32,
        from: u32,
        to: u32,
    },
    #[error("exchange wait timed out after {millis} ms")]
    Timeout { millis: u64 },
}

/// The top-level error type returned by every crate's public, fallible API.
#[derive(Error, Debug)]
pub enum SolverError {
    /// Malformed input deck or unknown output-variable name (fatal at startup).
    #[error("configuration error: {0}")]
    Config(String),

    /// Inconsistent block dimensions, negative cell volume, degenerate face (fatal).
    #[error("grid error: {0}")]
    Grid(String),

    /// Surfaced to the integrator; may trigger a retry with reduced CFL.
    #[error(transparent)]
    Numerical(#[from] NumericalError),

    /// Surfaced to `cfd-parallel`; retried a bounded number of times.
    #[error(transparent)]
    Transient(#[from] TransientError),

    /// Output file could not be opened or written (fatal: the computation has
    /// nowhere to land).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The integrator's retry budget was exhausted for an accepted step.
    #[error("step rejected after {retries} retries in block {block}")]
    StepRejection { block: u32, retries: u32 },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, SolverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numerical_error_converts_into_solver_error() {
        let e: SolverError = NumericalError::NonPositiveState {
            block: 0,
            i: 1,
            j: 2,
            k: 3,
        }
        .into();
        assert!(matches!(e, SolverError::Numerical(_)));
    }
}
