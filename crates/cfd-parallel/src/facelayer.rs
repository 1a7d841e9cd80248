//! Logical-index enumeration of the ghost-adjacent interior layers and the
//! ghost layers themselves on one block face, ordered `(depth, d1, d2)` with
//! `depth=0` nearest the interface. Shared by packing and unpacking so both
//! sides agree on traversal order without re-deriving it.

use cfd_grid::{BlockFace, ProcBlock};

/// Logical `(i,j,k)` indices (already ghost-shifted) of the `ghost_width`
/// interior layers adjacent to `face`, in `(depth, d1, d2)` order.
#[must_use]
pub fn interior_layer_indices(block: &ProcBlock, face: BlockFace, ghost_width: usize) -> Vec<(usize, usize, usize)> {
    let (ni, nj, nk) = block.dims();
    let ghost = block.ghost();
    let mut out = Vec::with_capacity(ghost_width * surface_area(face, ni, nj, nk));
    for depth in 0..ghost_width {
        match face {
            BlockFace::ILo => {
                let i = ghost + depth;
                for k in 0..nk {
                    for j in 0..nj {
                        out.push((i, j + ghost, k + ghost));
                    }
                }
            }
            BlockFace::IHi => {
                let i = ghost + ni - 1 - depth;
                for k in 0..nk {
                    for j in 0..nj {
                        out.push((i, j + ghost, k + ghost));
                    }
                }
            }
            BlockFace::JLo => {
                let j = ghost + depth;
                for k in 0..nk {
                    for i in 0..ni {
                        out.push((i + ghost, j, k + ghost));
                    }
                }
            }
            BlockFace::JHi => {
                let j = ghost + nj - 1 - depth;
                for k in 0..nk {
                    for i in 0..ni {
                        out.push((i + ghost, j, k + ghost));
                    }
                }
            }
            BlockFace::KLo => {
                let k = ghost + depth;
                for j in 0..nj {
                    for i in 0..ni {
                        out.push((i + ghost, j + ghost, k));
                    }
                }
            }
            BlockFace::KHi => {
                let k = ghost + nk - 1 - depth;
                for j in 0..nj {
                    for i in 0..ni {
                        out.push((i + ghost, j + ghost, k));
                    }
                }
            }
        }
    }
    out
}

/// Logical `(i,j,k)` indices of the `ghost_width` ghost layers beyond
/// `face`, in the same `(depth, d1, d2)` order as [`interior_layer_indices`]
/// (`depth=0` nearest the interface).
#[must_use]
pub fn ghost_layer_indices(block: &ProcBlock, face: BlockFace, ghost_width: usize) -> Vec<(usize, usize, usize)> {
    let (ni, nj, nk) = block.dims();
    let ghost = block.ghost();
    let mut out = Vec::with_capacity(ghost_width * surface_area(face, ni, nj, nk));
    for depth in 0..ghost_width {
        match face {
            BlockFace::ILo => {
                let i = ghost - 1 - depth;
                for k in 0..nk {
                    for j in 0..nj {
                        out.push((i, j + ghost, k + ghost));
                    }
                }
            }
            BlockFace::IHi => {
                let i = ghost + ni + depth;
                for k in 0..nk {
                    for j in 0..nj {
                        out.push((i, j + ghost, k + ghost));
                    }
                }
            }
            BlockFace::JLo => {
                let j = ghost - 1 - depth;
                for k in 0..nk {
                    for i in 0..ni {
                        out.push((i + ghost, j, k + ghost));
                    }
                }
            }
            BlockFace::JHi => {
                let j = ghost + nj + depth;
                for k in 0..nk {
                    for i in 0..ni {
                        out.push((i + ghost, j, k + ghost));
                    }
                }
            }
            BlockFace::KLo => {
                let k = ghost - 1 - depth;
                for j in 0..nj {
                    for i in 0..ni {
                        out.push((i + ghost, j + ghost, k));
                    }
                }
            }
            BlockFace::KHi => {
                let k = ghost + nk + depth;
                for j in 0..nj {
                    for i in 0..ni {
                        out.push((i + ghost, j + ghost, k));
                    }
                }
            }
        }
    }
    out
}

fn surface_area(face: BlockFace, ni: usize, nj: usize, nk: usize) -> usize {
    match face {
        BlockFace::ILo | BlockFace::IHi => nj * nk,
        BlockFace::JLo | BlockFace::JHi => ni * nk,
        BlockFace::KLo | BlockFace::KHi => ni * nj,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfd_core::{PerfectGasSutherland, PrimitiveVars, Vec3};
    use cfd_grid::meshgen::channel_box;
    use cfd_grid::{BcKind, BlockTag};

    fn make_block() -> ProcBlock {
        let thermo = PerfectGasSutherland::air_nondimensional();
        let (geometry, bcs) = channel_box(4, 3, 2, 1.0, 1.0, 1.0, 2, BcKind::SubsonicInflow, BcKind::SubsonicOutflow);
        let freestream = PrimitiveVars::laminar(1.0, Vec3::new(0.5, 0.0, 0.0), 1.0);
        ProcBlock::new(BlockTag { parent_block: 0, split_block: 0 }, 0, geometry, bcs, freestream, &thermo)
    }

    #[test]
    fn interior_and_ghost_layers_have_matching_counts() {
        let block = make_block();
        for face in [BlockFace::ILo, BlockFace::IHi, BlockFace::JLo, BlockFace::JHi, BlockFace::KLo, BlockFace::KHi] {
            let interior = interior_layer_indices(&block, face, 2);
            let ghost = ghost_layer_indices(&block, face, 2);
            assert_eq!(interior.len(), ghost.len());
        }
    }

    #[test]
    fn ilo_ghost_indices_are_outside_the_interior_range() {
        let block = make_block();
        let ghost = ghost_layer_indices(&block, BlockFace::ILo, 2);
        for &(i, _, _) in &ghost {
            assert!(i < block.ghost());
        }
    }
}
