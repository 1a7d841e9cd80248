//! Every rank's owned block, modeled as an explicit `Vec<RankSlot>` living in
//! one process rather than one OS process per rank.

use cfd_core::error::{Result, SolverError};
use cfd_grid::ProcBlock;

/// Assign each decomposition leaf (as produced by
/// [`cfd_decomp::Decomposition::split_for_parallelism`]) to a rank in
/// leaf order, so rank 0 always owns the first leaf emitted by the split.
#[must_use]
pub fn assign_ranks(leaves: &[(u32, u32, u32, u32)]) -> Vec<(u32, u32)> {
    leaves.iter().enumerate().map(|(rank, &(block_id, ..))| (block_id, rank as u32)).collect()
}

/// One rank's owned block plus the stable id other blocks' patches
/// reference it by.
pub struct RankSlot {
    pub block_id: u32,
    pub rank: u32,
    pub block: ProcBlock,
}

/// Every rank's slot living in this process, addressable by `block_id`.
#[derive(Default)]
pub struct LocalDomain {
    pub slots: Vec<RankSlot>,
}

impl LocalDomain {
    #[must_use]
    pub fn new(slots: Vec<RankSlot>) -> Self {
        Self { slots }
    }

    pub(crate) fn index_of(&self, block_id: u32) -> Result<usize> {
        self.slots
            .iter()
            .position(|s| s.block_id == block_id)
            .ok_or_else(|| SolverError::Grid(format!("no rank slot owns block {block_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfd_core::{PerfectGasSutherland, PrimitiveVars, Vec3};
    use cfd_grid::meshgen::channel_box;
    use cfd_grid::{BcKind, BlockTag};

    #[test]
    fn assign_ranks_numbers_leaves_in_order() {
        let leaves = [(7, 2, 2, 2), (9, 2, 2, 2), (11, 2, 2, 2)];
        assert_eq!(assign_ranks(&leaves), vec![(7, 0), (9, 1), (11, 2)]);
    }

    #[test]
    fn index_of_finds_the_matching_slot_and_rejects_an_unknown_block() {
        let thermo = PerfectGasSutherland::air_nondimensional();
        let (geometry, bcs) = channel_box(2, 2, 2, 1.0, 1.0, 1.0, 2, BcKind::SubsonicInflow, BcKind::SubsonicOutflow);
        let freestream = PrimitiveVars::laminar(1.0, Vec3::new(0.1, 0.0, 0.0), 1.0);
        let block = ProcBlock::new(BlockTag { parent_block: 7, split_block: 0 }, 3, geometry, bcs, freestream, &thermo);
        let domain = LocalDomain::new(vec![RankSlot { block_id: 7, rank: 3, block }]);
        assert_eq!(domain.index_of(7).unwrap(), 0);
        assert!(domain.index_of(9).is_err());
    }
}
