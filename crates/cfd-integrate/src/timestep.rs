//! Per-cell Δt from a CFL number (inviscid spectral radius over the six
//! bounding faces), or a fixed global Δt, written into [`ProcBlock::dt`].

use cfd_core::Thermodynamics;
use cfd_grid::ProcBlock;

/// `Δt_c = CFL * V_c / Σ_faces (|u·n|+a) * A`, the standard inviscid local
/// time step. The viscous spectral radius is not folded in: at the CFL
/// numbers this solver runs at for RANS meshes the inviscid limit dominates
/// away from the viscous sublayer, and the wall-treatment's y+ hysteresis
/// already guards the near-wall cells most exposed to that limit.
pub fn compute_local_dt(block: &mut ProcBlock, thermo: &dyn Thermodynamics, cfl: f64) {
    let (ni, nj, nk) = block.dims();
    let ghost = block.ghost();
    for k in 0..nk {
        for j in 0..nj {
            for i in 0..ni {
                let (gi, gj, gk) = (i + ghost, j + ghost, k + ghost);
                let prim = *block.prim.get(gi, gj, gk);
                let volume = *block.geometry.volume.get(gi, gj, gk);
                let c = thermo.sound_speed(prim.rho, prim.p);

                let faces = [
                    *block.geometry.faces_i.area_normal.get(i, j, k),
                    *block.geometry.faces_i.area_normal.get(i + 1, j, k),
                    *block.geometry.faces_j.area_normal.get(i, j, k),
                    *block.geometry.faces_j.area_normal.get(i, j + 1, k),
                    *block.geometry.faces_k.area_normal.get(i, j, k),
                    *block.geometry.faces_k.area_normal.get(i, j, k + 1),
                ];
                let mut sum_lambda = 0.0;
                for area_normal in faces {
                    let area = area_normal.mag();
                    if area <= 0.0 {
                        continue;
                    }
                    let n = area_normal * (1.0 / area);
                    let vn = prim.vel.dot(n);
                    sum_lambda += (vn.abs() + c) * area;
                }
                let dt_local = if sum_lambda > 0.0 { cfl * volume / sum_lambda } else { f64::MAX };
                *block.dt.get_mut(gi, gj, gk) = dt_local;
            }
        }
    }
}

/// Write a fixed Δt into every interior cell ([`cfd_core::TimeStepMode::GlobalFixed`]).
pub fn set_fixed_dt(block: &mut ProcBlock, dt: f64) {
    let (ni, nj, nk) = block.dims();
    let ghost = block.ghost();
    for k in 0..nk {
        for j in 0..nj {
            for i in 0..ni {
                *block.dt.get_mut(i + ghost, j + ghost, k + ghost) = dt;
            }
        }
    }
}

/// The minimum Δt over every interior cell of `block`, for the residual
/// log's reported time step and for the cross-rank Δt `Allreduce MIN`.
#[must_use]
pub fn block_min_dt(block: &ProcBlock) -> f64 {
    let (ni, nj, nk) = block.dims();
    let ghost = block.ghost();
    let mut min_dt = f64::MAX;
    for k in 0..nk {
        for j in 0..nj {
            for i in 0..ni {
                min_dt = min_dt.min(*block.dt.get(i + ghost, j + ghost, k + ghost));
            }
        }
    }
    min_dt
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfd_core::{PerfectGasSutherland, PrimitiveVars, Vec3};
    use cfd_grid::meshgen::channel_box;
    use cfd_grid::{BcKind, BlockTag};

    fn block() -> ProcBlock {
        let thermo = PerfectGasSutherland::air_nondimensional();
        let (geometry, bcs) = channel_box(4, 3, 2, 1.0, 1.0, 1.0, 2, BcKind::SubsonicInflow, BcKind::SubsonicOutflow);
        let freestream = PrimitiveVars::laminar(1.0, Vec3::new(0.5, 0.0, 0.0), 1.0);
        ProcBlock::new(BlockTag { parent_block: 0, split_block: 0 }, 0, geometry, bcs, freestream, &thermo)
    }

    #[test]
    fn local_dt_is_positive_and_scales_with_cfl() {
        let thermo = PerfectGasSutherland::air_nondimensional();
        let mut b = block();
        compute_local_dt(&mut b, &thermo, 1.0);
        let dt1 = block_min_dt(&b);
        compute_local_dt(&mut b, &thermo, 2.0);
        let dt2 = block_min_dt(&b);
        assert!(dt1 > 0.0);
        assert!((dt2 - 2.0 * dt1).abs() < 1e-9);
    }

    #[test]
    fn fixed_dt_is_uniform() {
        let mut b = block();
        set_fixed_dt(&mut b, 1.0e-3);
        let ghost = b.ghost();
        assert!((*b.dt.get(ghost, ghost, ghost) - 1.0e-3).abs() < 1e-15);
        assert!((block_min_dt(&b) - 1.0e-3).abs() < 1e-15);
    }
}
