//! Pack/orient/send/receive/apply ghost-cell exchange across inter-block
//! patches, driven through a [`Communicator`].

use crate::communicator::Communicator;
use crate::facelayer::{ghost_layer_indices, interior_layer_indices};
use crate::rank::LocalDomain;
use cfd_core::error::{Result, SolverError};
use cfd_core::{PrimitiveVars, TurbPrimitive, Vec3};
use cfd_grid::{BlockFace, InterblockPatch, Orientation, ProcBlock};

impl LocalDomain {
    /// Run the full pack/orient/send/receive/apply sequence for every patch,
    /// in list order. Ghosts are left consistent with the interior state as
    /// it stood at the start of this call (no overlap with RHS assembly).
    pub fn exchange_all(
        &mut self,
        patches: &[InterblockPatch],
        comm: &mut dyn Communicator,
        ghost_width: usize,
        turbulent: bool,
    ) -> Result<()> {
        for (idx, patch) in patches.iter().enumerate() {
            self.exchange_one(idx as u32, patch, comm, ghost_width, turbulent)?;
        }
        Ok(())
    }

    fn exchange_one(
        &mut self,
        patch_id: u32,
        patch: &InterblockPatch,
        comm: &mut dyn Communicator,
        ghost_width: usize,
        turbulent: bool,
    ) -> Result<()> {
        let ia = self.index_of(patch.block_a)?;
        let ib = self.index_of(patch.block_b)?;

        let face_a = surface_face(&self.slots[ia].block, patch.surface_a)?;
        let face_b = surface_face(&self.slots[ib].block, patch.surface_b)?;
        let (rank_a, rank_b) = (self.slots[ia].rank, self.slots[ib].rank);
        let (ext_a1, ext_a2) = surface_extents(&self.slots[ia].block, face_a);
        let (ext_b1, ext_b2) = surface_extents(&self.slots[ib].block, face_b);

        let send_a = pack_face(&self.slots[ia].block, face_a, ghost_width);
        let send_b = pack_face(&self.slots[ib].block, face_b, ghost_width);

        let req_send_a_to_b = comm.isend(patch_id, rank_a, rank_b, send_a);
        let req_send_b_to_a = comm.isend(patch_id, rank_b, rank_a, send_b);
        let req_recv_from_b = comm.irecv(patch_id, rank_b, rank_a);
        let req_recv_from_a = comm.irecv(patch_id, rank_a, rank_b);

        let recv_for_a = comm.wait(req_recv_from_b)?;
        let recv_for_b = comm.wait(req_recv_from_a)?;
        comm.wait(req_send_a_to_b)?;
        comm.wait(req_send_b_to_a)?;

        unpack_face(&mut self.slots[ia].block, face_a, ghost_width, &recv_for_a, turbulent, patch.orientation, (ext_b1, ext_b2));
        unpack_face(&mut self.slots[ib].block, face_b, ghost_width, &recv_for_b, turbulent, patch.orientation, (ext_a1, ext_a2));
        Ok(())
    }
}

fn surface_face(block: &ProcBlock, surface_index: usize) -> Result<BlockFace> {
    block
        .bcs
        .surfaces
        .get(surface_index)
        .map(cfd_grid::SurfaceBc::face)
        .ok_or_else(|| SolverError::Grid(format!("surface index {surface_index} out of range")))
}

fn surface_extents(block: &ProcBlock, face: BlockFace) -> (usize, usize) {
    let (ni, nj, nk) = block.dims();
    match face {
        BlockFace::ILo | BlockFace::IHi => (nj, nk),
        BlockFace::JLo | BlockFace::JHi => (ni, nk),
        BlockFace::KLo | BlockFace::KHi => (ni, nj),
    }
}

fn flatten(p: &PrimitiveVars) -> [f64; 7] {
    let (k, omega) = p.turb.map_or((0.0, 0.0), |t| (t.k, t.omega));
    [p.rho, p.vel.x, p.vel.y, p.vel.z, p.p, k, omega]
}

fn unflatten(buf: &[f64], turbulent: bool) -> PrimitiveVars {
    let turb = turbulent.then(|| TurbPrimitive { k: buf[5], omega: buf[6] });
    PrimitiveVars { rho: buf[0], vel: Vec3::new(buf[1], buf[2], buf[3]), p: buf[4], turb }
}

const STRIDE: usize = 7;

fn pack_face(block: &ProcBlock, face: BlockFace, ghost_width: usize) -> Vec<f64> {
    let idxs = interior_layer_indices(block, face, ghost_width);
    let mut out = Vec::with_capacity(idxs.len() * STRIDE);
    for (i, j, k) in idxs {
        out.extend_from_slice(&flatten(block.prim.get(i, j, k)));
    }
    out
}

/// True if this orientation's dihedral code swaps the two surface axes.
fn swaps_axes(orientation: Orientation) -> bool {
    (orientation.0 - 1) & 0b001 != 0
}

fn unpack_face(
    block: &mut ProcBlock,
    face: BlockFace,
    ghost_width: usize,
    payload: &[f64],
    turbulent: bool,
    orientation: Orientation,
    sender_extents: (usize, usize),
) {
    if payload.is_empty() {
        return;
    }
    let ghosts = ghost_layer_indices(block, face, ghost_width);
    let (sender_ext1, sender_ext2) = sender_extents;
    let (receiver_ext1, _receiver_ext2) =
        if swaps_axes(orientation) { (sender_ext2, sender_ext1) } else { (sender_ext1, sender_ext2) };
    let area = sender_ext1 * sender_ext2;

    for depth in 0..ghost_width {
        for d2 in 0..sender_ext2 {
            for d1 in 0..sender_ext1 {
                let sender_flat = d2 * sender_ext1 + d1;
                let value_offset = (depth * area + sender_flat) * STRIDE;
                if value_offset + STRIDE > payload.len() {
                    continue;
                }
                let (a, b) = orientation.map(d1, d2, sender_ext1, sender_ext2);
                let receiver_flat = b * receiver_ext1 + a;
                let ghost_idx = depth * area + receiver_flat;
                let Some(&(gi, gj, gk)) = ghosts.get(ghost_idx) else { continue };
                let prim = unflatten(&payload[value_offset..value_offset + STRIDE], turbulent);
                *block.prim.get_mut(gi, gj, gk) = prim;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communicator::LocalCommunicator;
    use crate::rank::RankSlot;
    use cfd_core::PerfectGasSutherland;
    use cfd_grid::meshgen::channel_box;
    use cfd_grid::{BcKind, BlockTag, SurfaceBc};

    fn slot(id: u32, rank: u32) -> RankSlot {
        let thermo = PerfectGasSutherland::air_nondimensional();
        let (geometry, mut bcs) = channel_box(4, 3, 2, 1.0, 1.0, 1.0, 2, BcKind::SubsonicInflow, BcKind::SubsonicOutflow);
        bcs.surfaces.push(SurfaceBc { kind: BcKind::Interblock, i_min: 4, i_max: 4, j_min: 0, j_max: 3, k_min: 0, k_max: 2, tag: 0, wall_temperature: 0.0 });
        let freestream = PrimitiveVars::laminar(1.0 + f64::from(id), Vec3::new(0.1, 0.0, 0.0), 1.0);
        RankSlot {
            block_id: id,
            rank,
            block: ProcBlock::new(BlockTag { parent_block: id, split_block: 0 }, rank, geometry, bcs, freestream, &thermo),
        }
    }

    #[test]
    fn identity_orientation_copies_neighbor_interior_into_ghost_exactly() {
        let slot_a = slot(0, 0);
        let slot_b = slot(1, 1);
        let surf_a = slot_a.block.bcs.surfaces.len() - 1;
        let surf_b = slot_b.block.bcs.surfaces.len() - 1;
        let mut domain = LocalDomain::new(vec![slot_a, slot_b]);
        let patch = InterblockPatch { block_a: 0, surface_a: surf_a, block_b: 1, surface_b: surf_b, orientation: Orientation::IDENTITY };
        let mut comm = LocalCommunicator::new();
        domain.exchange_all(std::slice::from_ref(&patch), &mut comm, 2, false).unwrap();

        let ghost = domain.slots[0].block.ghost();
        let p = *domain.slots[0].block.prim.get(ghost + 4, ghost, ghost);
        assert!((p.rho - 2.0).abs() < 1e-12, "expected block 1's freestream density, got {}", p.rho);
    }
}
