//! Green-Gauss cell-centered gradients.

use cfd_core::{Tensor3, Thermodynamics, Vec3};
use cfd_grid::{CellGradients, ProcBlock};

/// Recompute every interior cell's velocity/temperature/turbulence
/// gradients from the current primitive field via the Green-Gauss theorem:
/// `grad(phi)_cell = (1/V) * sum_faces(phi_face * A_face)`.
///
/// Requires ghost cells to already carry valid mirrored/remote/BC state
/// (i.e. `FillGhosts` has run this iteration).
pub fn compute_gradients(block: &mut ProcBlock, thermo: &dyn Thermodynamics) {
    let (ni, nj, nk) = block.dims();
    let ghost = block.ghost();

    for k in 0..nk {
        for j in 0..nj {
            for i in 0..ni {
                let (gi, gj, gk) = (i + ghost, j + ghost, k + ghost);
                let volume = *block.geometry.volume.get(gi, gj, gk);

                let mut accum_u = Vec3::zero();
                let mut accum_v = Vec3::zero();
                let mut accum_w = Vec3::zero();
                let mut accum_t = Vec3::zero();
                let mut accum_k = Vec3::zero();
                let mut accum_omega = Vec3::zero();

                let add_face = |sign: f64, area_normal: Vec3, neighbor_i: usize, neighbor_j: usize, neighbor_k: usize, block: &ProcBlock| {
                    let pc = *block.prim.get(gi, gj, gk);
                    let pn = *block.prim.get(neighbor_i, neighbor_j, neighbor_k);
                    let face_u = 0.5 * (pc.vel.x + pn.vel.x);
                    let face_v = 0.5 * (pc.vel.y + pn.vel.y);
                    let face_w = 0.5 * (pc.vel.z + pn.vel.z);
                    let tc = thermo.temperature(pc.rho, pc.p);
                    let tn = thermo.temperature(pn.rho, pn.p);
                    let face_t = 0.5 * (tc + tn);
                    let (face_k, face_omega) = match (pc.turb, pn.turb) {
                        (Some(a), Some(b)) => (0.5 * (a.k + b.k), 0.5 * (a.omega + b.omega)),
                        _ => (0.0, 0.0),
                    };
                    let a = area_normal * sign;
                    (a * face_u, a * face_v, a * face_w, a * face_t, a * face_k, a * face_omega)
                };

                // Face-normal arrays carry no ghost halo, so they're indexed
                // by the raw `i,j,k` while cell-centered arrays use `gi,gj,gk`.
                let (au, av, aw, at, ak, ao) = add_face(
                    -1.0,
                    *block.geometry.faces_i.area_normal.get(i, j, k),
                    gi - 1,
                    gj,
                    gk,
                    block,
                );
                accum_u += au;
                accum_v += av;
                accum_w += aw;
                accum_t += at;
                accum_k += ak;
                accum_omega += ao;

                let (au, av, aw, at, ak, ao) = add_face(
                    1.0,
                    *block.geometry.faces_i.area_normal.get(i + 1, j, k),
                    gi + 1,
                    gj,
                    gk,
                    block,
                );
                accum_u += au;
                accum_v += av;
                accum_w += aw;
                accum_t += at;
                accum_k += ak;
                accum_omega += ao;

                let (au, av, aw, at, ak, ao) = add_face(
                    -1.0,
                    *block.geometry.faces_j.area_normal.get(i, j, k),
                    gi,
                    gj - 1,
                    gk,
                    block,
                );
                accum_u += au;
                accum_v += av;
                accum_w += aw;
                accum_t += at;
                accum_k += ak;
                accum_omega += ao;

                let (au, av, aw, at, ak, ao) = add_face(
                    1.0,
                    *block.geometry.faces_j.area_normal.get(i, j + 1, k),
                    gi,
                    gj + 1,
                    gk,
                    block,
                );
                accum_u += au;
                accum_v += av;
                accum_w += aw;
                accum_t += at;
                accum_k += ak;
                accum_omega += ao;

                let (au, av, aw, at, ak, ao) = add_face(
                    -1.0,
                    *block.geometry.faces_k.area_normal.get(i, j, k),
                    gi,
                    gj,
                    gk - 1,
                    block,
                );
                accum_u += au;
                accum_v += av;
                accum_w += aw;
                accum_t += at;
                accum_k += ak;
                accum_omega += ao;

                let (au, av, aw, at, ak, ao) = add_face(
                    1.0,
                    *block.geometry.faces_k.area_normal.get(i, j, k + 1),
                    gi,
                    gj,
                    gk + 1,
                    block,
                );
                accum_u += au;
                accum_v += av;
                accum_w += aw;
                accum_t += at;
                accum_k += ak;
                accum_omega += ao;

                let inv_v = 1.0 / volume;
                let grad = CellGradients {
                    vel_grad: Tensor3::from_rows(accum_u * inv_v, accum_v * inv_v, accum_w * inv_v),
                    temp_grad: accum_t * inv_v,
                    k_grad: accum_k * inv_v,
                    omega_grad: accum_omega * inv_v,
                };
                *block.gradients.get_mut(gi, gj, gk) = grad;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfd_core::PerfectGasSutherland;
    use cfd_grid::meshgen::channel_box;
    use cfd_grid::{BcKind, BlockTag};

    #[test]
    fn uniform_flow_has_zero_gradients() {
        let thermo = PerfectGasSutherland::air_nondimensional();
        let (geometry, bcs) =
            channel_box(4, 3, 2, 1.0, 1.0, 1.0, 2, BcKind::SubsonicInflow, BcKind::SubsonicOutflow);
        let freestream = cfd_core::PrimitiveVars::laminar(1.0, Vec3::new(0.5, 0.0, 0.0), 1.0);
        let mut block = ProcBlock::new(
            BlockTag { parent_block: 0, split_block: 0 },
            0,
            geometry,
            bcs,
            freestream,
            &thermo,
        );
        compute_gradients(&mut block, &thermo);
        let (ghost, _, _) = (block.ghost(), 0, 0);
        let g = *block.gradients.get(ghost + 1, ghost + 1, ghost);
        assert!(g.temp_grad.mag() < 1e-9);
        assert!(g.vel_grad.rows[0].mag() < 1e-9);
    }
}
