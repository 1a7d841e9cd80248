//! Nearest-viscous-wall distance for every interior cell.
//!
//! Wall patches are typically a tiny fraction of a block's total face count,
//! so a brute-force nearest-centroid search per cell is fast enough without
//! pulling in a spatial-index dependency; revisit if profiling on large
//! multi-block cases shows otherwise.

use cfd_core::Vec3;
use cfd_grid::{BcKind, BlockFace, BoundaryConditions, ProcBlock};

/// Collect the face centroids of every viscous-wall surface on a block.
#[must_use]
pub fn viscous_wall_centroids(block: &ProcBlock) -> Vec<Vec3> {
    wall_centroids_from(&block.bcs, block)
}

fn wall_centroids_from(bcs: &BoundaryConditions, block: &ProcBlock) -> Vec<Vec3> {
    let mut out = Vec::new();
    for surface in &bcs.surfaces {
        if !matches!(surface.kind, BcKind::ViscousWallIsothermal | BcKind::ViscousWallAdiabatic) {
            continue;
        }
        let (ni, nj, nk) = (block.geometry.ni, block.geometry.nj, block.geometry.nk);
        match surface.face() {
            BlockFace::ILo => push_i_face(&mut out, block, 0),
            BlockFace::IHi => push_i_face(&mut out, block, ni),
            BlockFace::JLo => push_j_face(&mut out, block, 0),
            BlockFace::JHi => push_j_face(&mut out, block, nj),
            BlockFace::KLo => push_k_face(&mut out, block, 0),
            BlockFace::KHi => push_k_face(&mut out, block, nk),
        }
    }
    out
}

fn push_i_face(out: &mut Vec<Vec3>, block: &ProcBlock, i: usize) {
    let (_, nj, nk) = (block.geometry.ni, block.geometry.nj, block.geometry.nk);
    for k in 0..nk {
        for j in 0..nj {
            out.push(*block.geometry.faces_i.centroid.get(i, j, k));
        }
    }
}

fn push_j_face(out: &mut Vec<Vec3>, block: &ProcBlock, j: usize) {
    let (ni, _, nk) = (block.geometry.ni, block.geometry.nj, block.geometry.nk);
    for k in 0..nk {
        for i in 0..ni {
            out.push(*block.geometry.faces_j.centroid.get(i, j, k));
        }
    }
}

fn push_k_face(out: &mut Vec<Vec3>, block: &ProcBlock, k: usize) {
    let (ni, nj, _) = (block.geometry.ni, block.geometry.nj, block.geometry.nk);
    for j in 0..nj {
        for i in 0..ni {
            out.push(*block.geometry.faces_k.centroid.get(i, j, k));
        }
    }
}

/// Distance from `point` to the nearest of `wall_centroids`, or `f64::MAX`
/// if the run has no viscous walls (laminar-inviscid or fully slip-wall).
#[must_use]
pub fn nearest_wall_distance(point: Vec3, wall_centroids: &[Vec3]) -> f64 {
    wall_centroids
        .iter()
        .map(|&w| (point - w).mag())
        .fold(f64::MAX, f64::min)
}
