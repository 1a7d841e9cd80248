//! Synthetic single-block meshes used by the benchmark harness and by
//! scenario tests that don't need a real grid-input file.

use crate::bc::{BcKind, BlockFace, BoundaryConditions, InterblockPatch, Orientation, SurfaceBc};
use crate::geometry::{BlockGeometry, NodeGrid};

/// A rectangular box `[0,lx] x [0,ly] x [0,lz]` split into `ni x nj x nk`
/// cells, with slip walls on every face except `i_lo`/`i_hi` which take
/// `inlet`/`outlet` respectively. Good enough for a channel-flow smoke test.
#[must_use]
pub fn channel_box(
    ni: usize,
    nj: usize,
    nk: usize,
    lx: f64,
    ly: f64,
    lz: f64,
    ghost: usize,
    inlet: BcKind,
    outlet: BcKind,
) -> (BlockGeometry, BoundaryConditions) {
    let nodes = NodeGrid::uniform_box(ni, nj, nk, lx, ly, lz);
    let geometry = BlockGeometry::from_nodes(&nodes, ghost);
    let surfaces = vec![
        SurfaceBc { kind: inlet, i_min: 0, i_max: 0, j_min: 0, j_max: nj as u32, k_min: 0, k_max: nk as u32, tag: bc_tag(BlockFace::ILo), wall_temperature: 0.0 },
        SurfaceBc { kind: outlet, i_min: ni as u32, i_max: ni as u32, j_min: 0, j_max: nj as u32, k_min: 0, k_max: nk as u32, tag: bc_tag(BlockFace::IHi), wall_temperature: 0.0 },
        SurfaceBc { kind: BcKind::SlipWall, i_min: 0, i_max: ni as u32, j_min: 0, j_max: 0, k_min: 0, k_max: nk as u32, tag: bc_tag(BlockFace::JLo), wall_temperature: 0.0 },
        SurfaceBc { kind: BcKind::SlipWall, i_min: 0, i_max: ni as u32, j_min: nj as u32, j_max: nj as u32, k_min: 0, k_max: nk as u32, tag: bc_tag(BlockFace::JHi), wall_temperature: 0.0 },
        SurfaceBc { kind: BcKind::SlipWall, i_min: 0, i_max: ni as u32, j_min: 0, j_max: nj as u32, k_min: 0, k_max: 0, tag: bc_tag(BlockFace::KLo), wall_temperature: 0.0 },
        SurfaceBc { kind: BcKind::SlipWall, i_min: 0, i_max: ni as u32, j_min: 0, j_max: nj as u32, k_min: nk as u32, k_max: nk as u32, tag: bc_tag(BlockFace::KHi), wall_temperature: 0.0 },
    ];
    (geometry, BoundaryConditions { surfaces })
}

fn bc_tag(face: BlockFace) -> u32 {
    face as u32
}

/// A box identical in shape to [`channel_box`] but periodic in `i`: the
/// `i_lo`/`i_hi` faces are wired as a single self-referencing interblock
/// patch instead of an inlet/outlet pair, so a feature advected off one end
/// reappears at the other through the normal ghost-exchange path. `j`/`k`
/// stay slip walls.
#[must_use]
pub fn periodic_box(ni: usize, nj: usize, nk: usize, lx: f64, ly: f64, lz: f64, ghost: usize) -> (BlockGeometry, BoundaryConditions, InterblockPatch) {
    let nodes = NodeGrid::uniform_box(ni, nj, nk, lx, ly, lz);
    let geometry = BlockGeometry::from_nodes(&nodes, ghost);
    let i_lo = SurfaceBc { kind: BcKind::Interblock, i_min: 0, i_max: 0, j_min: 0, j_max: nj as u32, k_min: 0, k_max: nk as u32, tag: bc_tag(BlockFace::ILo), wall_temperature: 0.0 };
    let i_hi = SurfaceBc { kind: BcKind::Interblock, i_min: ni as u32, i_max: ni as u32, j_min: 0, j_max: nj as u32, k_min: 0, k_max: nk as u32, tag: bc_tag(BlockFace::IHi), wall_temperature: 0.0 };
    let surfaces = vec![
        i_lo,
        i_hi,
        SurfaceBc { kind: BcKind::SlipWall, i_min: 0, i_max: ni as u32, j_min: 0, j_max: 0, k_min: 0, k_max: nk as u32, tag: bc_tag(BlockFace::JLo), wall_temperature: 0.0 },
        SurfaceBc { kind: BcKind::SlipWall, i_min: 0, i_max: ni as u32, j_min: nj as u32, j_max: nj as u32, k_min: 0, k_max: nk as u32, tag: bc_tag(BlockFace::JHi), wall_temperature: 0.0 },
        SurfaceBc { kind: BcKind::SlipWall, i_min: 0, i_max: ni as u32, j_min: 0, j_max: nj as u32, k_min: 0, k_max: 0, tag: bc_tag(BlockFace::KLo), wall_temperature: 0.0 },
        SurfaceBc { kind: BcKind::SlipWall, i_min: 0, i_max: ni as u32, j_min: 0, j_max: nj as u32, k_min: nk as u32, k_max: nk as u32, tag: bc_tag(BlockFace::KHi), wall_temperature: 0.0 },
    ];
    let patch = InterblockPatch { block_a: 0, surface_a: 0, block_b: 0, surface_b: 1, orientation: Orientation::IDENTITY };
    (geometry, BoundaryConditions { surfaces }, patch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_box_has_six_surfaces_covering_every_face() {
        let (_, bcs) = channel_box(4, 3, 2, 1.0, 1.0, 1.0, 2, BcKind::SubsonicInflow, BcKind::SubsonicOutflow);
        assert_eq!(bcs.surfaces.len(), 6);
        for face in [BlockFace::ILo, BlockFace::IHi, BlockFace::JLo, BlockFace::JHi, BlockFace::KLo, BlockFace::KHi] {
            assert_eq!(bcs.surfaces_on(face).count(), 1);
        }
    }

    #[test]
    fn periodic_box_wires_a_self_patch_between_its_i_faces() {
        let (_, bcs, patch) = periodic_box(8, 1, 1, 1.0, 1.0, 1.0, 2);
        assert_eq!(bcs.surfaces_on(BlockFace::ILo).next().unwrap().kind, BcKind::Interblock);
        assert_eq!(bcs.surfaces_on(BlockFace::IHi).next().unwrap().kind, BcKind::Interblock);
        assert_eq!(patch.block_a, patch.block_b);
        assert_eq!(patch.orientation, Orientation::IDENTITY);
    }
}
