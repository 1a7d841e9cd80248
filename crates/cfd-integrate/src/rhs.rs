//! Right-hand-side assembly: MUSCL + Roe inviscid flux and Green-Gauss
//! viscous flux swept over every interior face in each logical direction,
//! plus the turbulence closure's volumetric source term.

use cfd_core::error::Result;
use cfd_core::{LimiterKind, StateVector, Thermodynamics};
use cfd_grid::ProcBlock;
use cfd_numerics::{reconstruct_face, roe_flux, viscous_flux, DiffusionCoefficients, Direction};
use cfd_turbulence::{ClosureState, TurbulenceModel};

/// One block's assembled residual: the net outward flux sum (excluding the
/// source term) per interior cell, in i-fastest, k-slowest order. The state
/// update applies `dU/dt = -residual/V + source`.
pub struct Residual {
    ni: usize,
    nj: usize,
    values: Vec<StateVector>,
}

impl Residual {
    fn zeros(ni: usize, nj: usize, nk: usize, neq: usize) -> Self {
        Self { ni, nj, values: (0..ni * nj * nk).map(|_| StateVector::zeros(neq)).collect() }
    }

    #[inline]
    fn index(&self, i: usize, j: usize, k: usize) -> usize {
        (k * self.nj + j) * self.ni + i
    }

    #[inline]
    #[must_use]
    pub fn get(&self, i: usize, j: usize, k: usize) -> &StateVector {
        &self.values[self.index(i, j, k)]
    }

    #[inline]
    fn add(&mut self, i: usize, j: usize, k: usize, flux: &StateVector) {
        let idx = self.index(i, j, k);
        self.values[idx] += flux;
    }

    #[inline]
    fn sub(&mut self, i: usize, j: usize, k: usize, flux: &StateVector) {
        let idx = self.index(i, j, k);
        for eq in 0..flux.arity() {
            self.values[idx][eq] -= flux[eq];
        }
    }
}

/// Nearest-wall distance for every interior cell, i-fastest k-slowest, as
/// produced once per mesh by [`cfd_turbulence::nearest_wall_distance`] over
/// [`cfd_turbulence::viscous_wall_centroids`].
pub struct WallDistanceField {
    ni: usize,
    nj: usize,
    nk: usize,
    values: Vec<f64>,
}

impl WallDistanceField {
    #[must_use]
    pub fn compute(block: &ProcBlock) -> Self {
        let (ni, nj, nk) = block.dims();
        let ghost = block.ghost();
        let walls = cfd_turbulence::viscous_wall_centroids(block);
        let mut values = Vec::with_capacity(ni * nj * nk);
        for k in 0..nk {
            for j in 0..nj {
                for i in 0..ni {
                    let p = *block.geometry.cell_center.get(i + ghost, j + ghost, k + ghost);
                    values.push(cfd_turbulence::nearest_wall_distance(p, &walls));
                }
            }
        }
        Self { ni, nj, nk, values }
    }

    /// Distance at an interior cell, clamped to the nearest valid interior
    /// index when `i`/`j`/`k` fall in the ghost halo (a face adjoining a
    /// ghost cell reuses its one interior neighbor's distance).
    #[must_use]
    pub(crate) fn at(&self, i: isize, j: isize, k: isize) -> f64 {
        let ci = i.clamp(0, self.ni as isize - 1) as usize;
        let cj = j.clamp(0, self.nj as isize - 1) as usize;
        let ck = k.clamp(0, self.nk as isize - 1) as usize;
        self.values[(ck * self.nj + cj) * self.ni + ci]
    }
}

/// Assemble one block's full residual (inviscid + viscous + turbulence
/// source). Requires `compute_gradients` and the ghost fill/exchange to
/// have already run this iteration.
pub fn assemble_rhs(
    block: &ProcBlock,
    thermo: &dyn Thermodynamics,
    turb_model: &dyn TurbulenceModel,
    limiter: LimiterKind,
    diffusion: DiffusionCoefficients,
    wall_distance: &WallDistanceField,
) -> Result<Residual> {
    let (ni, nj, nk) = block.dims();
    let ghost = block.ghost();
    let neq = block.prim.get(ghost, ghost, ghost).arity();
    let mut residual = Residual::zeros(ni, nj, nk, neq);

    sweep_i(block, thermo, limiter, diffusion, turb_model, wall_distance, &mut residual)?;
    sweep_j(block, thermo, limiter, diffusion, turb_model, wall_distance, &mut residual)?;
    sweep_k(block, thermo, limiter, diffusion, turb_model, wall_distance, &mut residual)?;
    add_source_terms(block, turb_model, wall_distance, &mut residual);

    Ok(residual)
}

fn closure_state(block: &ProcBlock, thermo: &dyn Thermodynamics, wall_distance: &WallDistanceField, i: usize, j: usize, k: usize, ghost: usize) -> ClosureState {
    let prim = *block.prim.get(i, j, k);
    let gradients = *block.gradients.get(i, j, k);
    let temperature = thermo.temperature(prim.rho, prim.p);
    ClosureState {
        prim,
        gradients,
        wall_distance: wall_distance.at(i as isize - ghost as isize, j as isize - ghost as isize, k as isize - ghost as isize),
        mu_molecular: thermo.dynamic_viscosity(temperature),
    }
}

fn face_contribution(
    block: &ProcBlock,
    thermo: &dyn Thermodynamics,
    turb_model: &dyn TurbulenceModel,
    limiter: LimiterKind,
    diffusion: DiffusionCoefficients,
    wall_distance: &WallDistanceField,
    ghost: usize,
    area_normal: cfd_core::Vec3,
    block_id: usize,
    face_i: usize,
    face_j: usize,
    face_k: usize,
    dir: Direction,
    (fl_i, fl_j, fl_k): (usize, usize, usize),
    (l_i, l_j, l_k): (usize, usize, usize),
    (r_i, r_j, r_k): (usize, usize, usize),
    (fr_i, fr_j, fr_k): (usize, usize, usize),
) -> Result<StateVector> {
    let far_left = *block.prim.get(fl_i, fl_j, fl_k);
    let left = *block.prim.get(l_i, l_j, l_k);
    let right = *block.prim.get(r_i, r_j, r_k);
    let far_right = *block.prim.get(fr_i, fr_j, fr_k);

    let (recon_l, recon_r) = reconstruct_face(limiter, far_left, left, right, far_right, block_id, face_i, face_j, face_k, dir)?;
    let inviscid = roe_flux(&recon_l, &recon_r, area_normal, thermo);

    let left_state = closure_state(block, thermo, wall_distance, l_i, l_j, l_k, ghost);
    let right_state = closure_state(block, thermo, wall_distance, r_i, r_j, r_k, ghost);
    let mu_t = 0.5 * (turb_model.eddy_viscosity(&left_state) + turb_model.eddy_viscosity(&right_state));
    let face_turb = match (left.turb, right.turb) {
        (Some(a), Some(b)) => Some(cfd_core::TurbPrimitive { k: 0.5 * (a.k + b.k), omega: 0.5 * (a.omega + b.omega) }),
        _ => None,
    };
    let face_prim = cfd_core::PrimitiveVars {
        rho: 0.5 * (left.rho + right.rho),
        vel: (left.vel + right.vel) * 0.5,
        p: 0.5 * (left.p + right.p),
        turb: face_turb,
    };
    let grad_l = *block.gradients.get(l_i, l_j, l_k);
    let grad_r = *block.gradients.get(r_i, r_j, r_k);
    let avg_vel_grad = grad_l.vel_grad.scale(0.5) + grad_r.vel_grad.scale(0.5);
    let avg_temp_grad = (grad_l.temp_grad + grad_r.temp_grad) * 0.5;
    let avg_k_grad = (grad_l.k_grad + grad_r.k_grad) * 0.5;
    let avg_omega_grad = (grad_l.omega_grad + grad_r.omega_grad) * 0.5;

    // Thin-shear-layer correction: replace the face-normal component of the
    // averaged gradient with the directional derivative taken straight from
    // the left/right state jump, to suppress odd-even decoupling along the
    // normal direction. Tangential components are left as the plain average.
    let n = area_normal.unit();
    let center_l = *block.geometry.cell_center.get(l_i, l_j, l_k);
    let center_r = *block.geometry.cell_center.get(r_i, r_j, r_k);
    let ds = (center_r - center_l).dot(n);
    let ds = if ds.abs() < 1e-12 { 1e-12 } else { ds };

    let t_l = thermo.temperature(left.rho, left.p);
    let t_r = thermo.temperature(right.rho, right.p);
    let dtemp_dn = (t_r - t_l) / ds;
    let temp_grad = avg_temp_grad + n * (dtemp_dn - avg_temp_grad.dot(n));

    let dvel_dn = (right.vel - left.vel) * (1.0 / ds);
    let vel_grad = avg_vel_grad + (dvel_dn - avg_vel_grad.apply(n)).outer(n);

    let (k_grad, omega_grad) = match (left.turb, right.turb) {
        (Some(a), Some(b)) => {
            let dk_dn = (b.k - a.k) / ds;
            let domega_dn = (b.omega - a.omega) / ds;
            (avg_k_grad + n * (dk_dn - avg_k_grad.dot(n)), avg_omega_grad + n * (domega_dn - avg_omega_grad.dot(n)))
        }
        _ => (avg_k_grad, avg_omega_grad),
    };

    let face_gradients = cfd_grid::CellGradients { vel_grad, temp_grad, k_grad, omega_grad };
    let viscous = viscous_flux(&face_prim, &face_gradients, area_normal, mu_t, thermo, diffusion);

    let mut net = Vec::with_capacity(inviscid.arity());
    for eq in 0..inviscid.arity() {
        net.push(inviscid[eq] - viscous[eq]);
    }
    Ok(StateVector::from_vals(net))
}

fn sweep_i(block: &ProcBlock, thermo: &dyn Thermodynamics, limiter: LimiterKind, diffusion: DiffusionCoefficients, turb_model: &dyn TurbulenceModel, wall_distance: &WallDistanceField, residual: &mut Residual) -> Result<()> {
    let (ni, nj, nk) = block.dims();
    let ghost = block.ghost();
    for k in 0..nk {
        for j in 0..nj {
            for face in 0..=ni {
                let area_normal = *block.geometry.faces_i.area_normal.get(face, j, k);
                let (gj, gk) = (j + ghost, k + ghost);
                let gface = face + ghost;
                let flux = face_contribution(
                    block, thermo, turb_model, limiter, diffusion, wall_distance, ghost, area_normal,
                    block.tag.parent_block as usize, face, j, k, Direction::I,
                    (gface - 2, gj, gk), (gface - 1, gj, gk), (gface, gj, gk), (gface + 1, gj, gk),
                )?;
                if face > 0 {
                    residual.add(face - 1, j, k, &flux);
                }
                if face < ni {
                    residual.sub(face, j, k, &flux);
                }
            }
        }
    }
    Ok(())
}

fn sweep_j(block: &ProcBlock, thermo: &dyn Thermodynamics, limiter: LimiterKind, diffusion: DiffusionCoefficients, turb_model: &dyn TurbulenceModel, wall_distance: &WallDistanceField, residual: &mut Residual) -> Result<()> {
    let (ni, nj, nk) = block.dims();
    let ghost = block.ghost();
    for k in 0..nk {
        for face in 0..=nj {
            for i in 0..ni {
                let area_normal = *block.geometry.faces_j.area_normal.get(i, face, k);
                let (gi, gk) = (i + ghost, k + ghost);
                let gface = face + ghost;
                let flux = face_contribution(
                    block, thermo, turb_model, limiter, diffusion, wall_distance, ghost, area_normal,
                    block.tag.parent_block as usize, i, face, k, Direction::J,
                    (gi, gface - 2, gk), (gi, gface - 1, gk), (gi, gface, gk), (gi, gface + 1, gk),
                )?;
                if face > 0 {
                    residual.add(i, face - 1, k, &flux);
                }
                if face < nj {
                    residual.sub(i, face, k, &flux);
                }
            }
        }
    }
    Ok(())
}

fn sweep_k(block: &ProcBlock, thermo: &dyn Thermodynamics, limiter: LimiterKind, diffusion: DiffusionCoefficients, turb_model: &dyn TurbulenceModel, wall_distance: &WallDistanceField, residual: &mut Residual) -> Result<()> {
    let (ni, nj, nk) = block.dims();
    let ghost = block.ghost();
    for face in 0..=nk {
        for j in 0..nj {
            for i in 0..ni {
                let area_normal = *block.geometry.faces_k.area_normal.get(i, j, face);
                let (gi, gj) = (i + ghost, j + ghost);
                let gface = face + ghost;
                let flux = face_contribution(
                    block, thermo, turb_model, limiter, diffusion, wall_distance, ghost, area_normal,
                    block.tag.parent_block as usize, i, j, face, Direction::K,
                    (gi, gj, gface - 2), (gi, gj, gface - 1), (gi, gj, gface), (gi, gj, gface + 1),
                )?;
                if face > 0 {
                    residual.add(i, j, face - 1, &flux);
                }
                if face < nk {
                    residual.sub(i, j, face, &flux);
                }
            }
        }
    }
    Ok(())
}

fn add_source_terms(block: &ProcBlock, turb_model: &dyn TurbulenceModel, wall_distance: &WallDistanceField, residual: &mut Residual) {
    if !turb_model.capabilities().contains(&cfd_turbulence::ClosureCapability::SourceTerms) {
        return;
    }
    let (ni, nj, nk) = block.dims();
    let ghost = block.ghost();
    for k in 0..nk {
        for j in 0..nj {
            for i in 0..ni {
                let (gi, gj, gk) = (i + ghost, j + ghost, k + ghost);
                let prim = *block.prim.get(gi, gj, gk);
                if prim.turb.is_none() {
                    continue;
                }
                let state = ClosureState {
                    prim,
                    gradients: *block.gradients.get(gi, gj, gk),
                    wall_distance: wall_distance.at(i as isize, j as isize, k as isize),
                    mu_molecular: 0.0,
                };
                let volume = *block.geometry.volume.get(gi, gj, gk);
                let src = turb_model.source_terms(&state);
                let idx = residual.index(i, j, k);
                residual.values[idx][5] -= src.rho_k * volume;
                residual.values[idx][6] -= src.rho_omega * volume;
            }
        }
    }
}
