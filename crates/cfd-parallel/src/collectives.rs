//! Residual collectives: `Allreduce SUM` for L2 norms and `Allreduce MAXLOC`
//! for L∞ with its `(block, i, j, k, eqn)` locator.
//!
//! Because every rank lives in the same process (see the module docs on
//! [`crate::communicator`]), a collective here is just a fold over each
//! rank's locally computed contribution rather than a real network
//! reduction; the function boundary is what a multi-process implementation
//! would replace with `MPI_Allreduce`.

/// Sum one per-rank contribution (e.g. the squared L2 norm of a block's
/// residual) across every rank.
#[must_use]
pub fn allreduce_sum(per_rank: &[f64]) -> f64 {
    per_rank.iter().sum()
}

/// The minimum per-rank contribution (used for the global Δt Allreduce: the
/// most restrictive local CFL-limited step wins).
#[must_use]
pub fn allreduce_min(per_rank: &[f64]) -> f64 {
    per_rank.iter().copied().fold(f64::INFINITY, f64::min)
}

/// `Allreduce MAXLOC`: the maximum value across every rank's contribution,
/// paired with the locator that produced it (first one wins on ties, for
/// determinism).
#[must_use]
pub fn allreduce_maxloc<L: Copy>(per_rank: &[(f64, L)]) -> Option<(f64, L)> {
    per_rank.iter().copied().fold(None, |best, (value, locator)| match best {
        Some((best_value, _)) if best_value >= value => best,
        _ => Some((value, locator)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allreduce_sum_adds_every_rank() {
        assert!((allreduce_sum(&[1.0, 2.0, 3.5]) - 6.5).abs() < 1e-12);
    }

    #[test]
    fn allreduce_min_picks_smallest() {
        assert!((allreduce_min(&[4.0, 1.5, 9.0]) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn allreduce_maxloc_picks_first_on_tie() {
        let per_rank = [(1.0, "a"), (3.0, "b"), (3.0, "c")];
        assert_eq!(allreduce_maxloc(&per_rank), Some((3.0, "b")));
    }

    #[test]
    fn allreduce_maxloc_of_empty_is_none() {
        let per_rank: [(f64, u32); 0] = [];
        assert_eq!(allreduce_maxloc(&per_rank), None);
    }
}
