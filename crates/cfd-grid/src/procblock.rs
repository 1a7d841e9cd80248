//! `ProcBlock`: one structured block owned by one rank.

use crate::bc::BoundaryConditions;
use crate::geometry::BlockGeometry;
use cfd_core::{ConservativeVars, MultiArray3D, PrimitiveVars, Tensor3, Vec3};

/// Cell-centered gradients recomputed each nonlinear iteration. Scratch:
/// valid only during the iteration that produced it.
#[derive(Clone, Copy, Debug, Default)]
pub struct CellGradients {
    pub vel_grad: Tensor3,
    pub temp_grad: Vec3,
    pub k_grad: Vec3,
    pub omega_grad: Vec3,
}

/// A stable identifier distinguishing a block's position in the original
/// (pre-split) mesh from its current decomposition slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockTag {
    /// Id of the block as it exists in the recombined (pre-split) mesh.
    pub parent_block: u32,
    /// Id of this split-block within the current decomposition.
    pub split_block: u32,
}

/// One structured block, owned by exactly one rank.
///
/// State arrays are mutated by exactly one owning rank between exchange
/// barriers. `gradients` and `dt` are scratch.
pub struct ProcBlock {
    pub tag: BlockTag,
    pub rank: u32,
    pub geometry: BlockGeometry,
    pub prim: MultiArray3D<PrimitiveVars>,
    pub cons: MultiArray3D<ConservativeVars>,
    pub gradients: MultiArray3D<CellGradients>,
    pub dt: MultiArray3D<f64>,
    pub bcs: BoundaryConditions,
}

impl ProcBlock {
    /// Construct a block with every interior (and ghost) cell initialized to
    /// `freestream`.
    #[must_use]
    pub fn new(
        tag: BlockTag,
        rank: u32,
        geometry: BlockGeometry,
        bcs: BoundaryConditions,
        freestream: PrimitiveVars,
        thermo: &dyn cfd_core::Thermodynamics,
    ) -> Self {
        let (ni, nj, nk) = (geometry.ni, geometry.nj, geometry.nk);
        let ghost = geometry.ghost;
        let prim = MultiArray3D::filled(ni, nj, nk, ghost, freestream);
        let cons = MultiArray3D::filled(ni, nj, nk, ghost, freestream.to_cons(thermo));
        let gradients = MultiArray3D::new(ni, nj, nk, ghost);
        let dt = MultiArray3D::new(ni, nj, nk, ghost);
        Self { tag, rank, geometry, prim, cons, gradients, dt, bcs }
    }

    #[inline]
    #[must_use]
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.geometry.ni, self.geometry.nj, self.geometry.nk)
    }

    #[inline]
    #[must_use]
    pub fn ghost(&self) -> usize {
        self.geometry.ghost
    }

    /// Re-derive conservative state from primitive state for every interior
    /// and ghost cell (keeps invariant 1 after a ghost fill or BC update
    /// writes only `prim`).
    pub fn sync_conservative_from_primitive(&mut self, thermo: &dyn cfd_core::Thermodynamics) {
        let (ti, tj, tk) = (
            self.geometry.ni + 2 * self.geometry.ghost,
            self.geometry.nj + 2 * self.geometry.ghost,
            self.geometry.nk + 2 * self.geometry.ghost,
        );
        for k in 0..tk {
            for j in 0..tj {
                for i in 0..ti {
                    let p = *self.prim.get(i, j, k);
                    *self.cons.get_mut(i, j, k) = p.to_cons(thermo);
                }
            }
        }
    }

    /// True (invariant 2) when every *interior* cell has ρ>0 and p>0.
    #[must_use]
    pub fn interior_is_physical(&self) -> bool {
        for k in self.prim.interior_k() {
            for j in self.prim.interior_j() {
                for i in self.prim.interior_i() {
                    if !self.prim.get(i, j, k).is_physical() {
                        return false;
                    }
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::NodeGrid;
    use cfd_core::PerfectGasSutherland;

    fn make_block() -> ProcBlock {
        let nodes = NodeGrid::uniform_box(4, 3, 2, 1.0, 1.0, 1.0);
        let geometry = BlockGeometry::from_nodes(&nodes, 2);
        let thermo = PerfectGasSutherland::air_nondimensional();
        let freestream = PrimitiveVars::laminar(1.0, Vec3::new(0.5, 0.0, 0.0), 1.0);
        ProcBlock::new(
            BlockTag { parent_block: 0, split_block: 0 },
            0,
            geometry,
            BoundaryConditions::default(),
            freestream,
            &thermo,
        )
    }

    #[test]
    fn fresh_block_is_physical() {
        let b = make_block();
        assert!(b.interior_is_physical());
    }

    #[test]
    fn sync_preserves_state_roundtrip() {
        let mut b = make_block();
        let thermo = PerfectGasSutherland::air_nondimensional();
        b.sync_conservative_from_primitive(&thermo);
        let (i, j, k) = (b.geometry.ghost, b.geometry.ghost, b.geometry.ghost);
        let p = *b.prim.get(i, j, k);
        let u = *b.cons.get(i, j, k);
        let p2 = u.to_prim(&thermo);
        assert!((p.rho - p2.rho).abs() < 1e-12);
    }
}
