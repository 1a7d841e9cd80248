//! Multi-stage explicit Runge-Kutta update, Jameson-style: every stage's
//! residual is evaluated from the evolving state but subtracted from the
//! fixed `U^n` this outer iteration started from.

use cfd_core::error::Result;
use cfd_core::{LimiterKind, StateVector, Thermodynamics};
use cfd_grid::ProcBlock;
use cfd_numerics::DiffusionCoefficients;
use cfd_turbulence::TurbulenceModel;

use crate::rhs::{assemble_rhs, WallDistanceField};

/// `U^(0) = U^n`; `U^(m) = U^n - alpha_m * (dt/V) * R(U^(m-1))` for
/// `m = 1..=stages`, with the low-storage coefficients `alpha_m = 1/(stages -
/// m + 1)` common to steady-state local-time-stepping solvers. Ghost cells
/// and gradients are not refreshed between stages: a documented simplification
/// that trades one order of sub-stage accuracy for not re-running the
/// exchange/gradient machinery `stages` times per outer iteration.
pub fn explicit_update(
    block: &mut ProcBlock,
    thermo: &dyn Thermodynamics,
    turb_model: &dyn TurbulenceModel,
    limiter: LimiterKind,
    diffusion: DiffusionCoefficients,
    wall_distance: &WallDistanceField,
    dt: &cfd_core::MultiArray3D<f64>,
    stages: u8,
) -> Result<()> {
    let stages = stages.max(1);
    let (ni, nj, nk) = block.dims();
    let ghost = block.ghost();

    let mut u0 = Vec::with_capacity(ni * nj * nk);
    for k in 0..nk {
        for j in 0..nj {
            for i in 0..ni {
                let cons = *block.cons.get(i + ghost, j + ghost, k + ghost);
                u0.push(StateVector::from_conservative(&cons));
            }
        }
    }

    for stage in 1..=stages {
        let alpha = 1.0 / f64::from(stages - stage + 1);
        let residual = assemble_rhs(block, thermo, turb_model, limiter, diffusion, wall_distance)?;

        let mut idx = 0;
        for k in 0..nk {
            for j in 0..nj {
                for i in 0..ni {
                    let (gi, gj, gk) = (i + ghost, j + ghost, k + ghost);
                    let volume = *block.geometry.volume.get(gi, gj, gk);
                    let dt_local = *dt.get(gi, gj, gk);
                    let r = residual.get(i, j, k);

                    let mut u = u0[idx].clone();
                    let scale = alpha * dt_local / volume;
                    for eq in 0..u.arity() {
                        u[eq] -= scale * r[eq];
                    }
                    let cons = u.to_conservative();
                    *block.cons.get_mut(gi, gj, gk) = cons;
                    *block.prim.get_mut(gi, gj, gk) = cons.to_prim(thermo);
                    idx += 1;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfd_core::{PerfectGasSutherland, PrimitiveVars, Vec3};
    use cfd_grid::meshgen::channel_box;
    use cfd_grid::{BcKind, BlockTag};
    use cfd_turbulence::Laminar;

    fn block() -> ProcBlock {
        let thermo = PerfectGasSutherland::air_nondimensional();
        let (geometry, bcs) = channel_box(4, 3, 2, 1.0, 1.0, 1.0, 2, BcKind::SubsonicInflow, BcKind::SubsonicOutflow);
        let freestream = PrimitiveVars::laminar(1.0, Vec3::new(0.5, 0.0, 0.0), 1.0);
        ProcBlock::new(BlockTag { parent_block: 0, split_block: 0 }, 0, geometry, bcs, freestream, &thermo)
    }

    #[test]
    fn uniform_flow_is_left_unchanged_by_a_multistage_step() {
        let thermo = PerfectGasSutherland::air_nondimensional();
        let mut b = block();
        cfd_grid::fill_local_ghosts(&mut b, &thermo, |_, _, _| None, |_, _, _| 1e-6);
        cfd_numerics::compute_gradients(&mut b, &thermo);
        let wall_distance = WallDistanceField::compute(&b);
        crate::timestep::compute_local_dt(&mut b, &thermo, 1.0);
        let dt = b.dt.clone();

        explicit_update(&mut b, &thermo, &Laminar, LimiterKind::VanAlbada, DiffusionCoefficients::default(), &wall_distance, &dt, 4).unwrap();

        let ghost = b.ghost();
        let p = *b.prim.get(ghost + 2, ghost + 1, ghost + 1);
        assert!((p.rho - 1.0).abs() < 1e-6, "uniform flow should remain at rest at steady state, got rho={}", p.rho);
    }
}
