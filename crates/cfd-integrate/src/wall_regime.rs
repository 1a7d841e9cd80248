//! Diagnostic near-wall-regime tracker: resolves each viscous-wall-adjacent
//! cell's [`WallRegime`] every outer iteration by solving Spalding's law for
//! `u_tau`, then feeding the resulting y+ through the configured
//! [`WallTreatment`]'s hysteresis. Exists alongside (not inside) the RHS
//! assembly because the regime itself is reporting/BC-selection state, not a
//! flux contribution.

use cfd_core::{Thermodynamics, Vec3, WallTreatment};
use cfd_grid::{BcKind, BlockFace, ProcBlock};
use cfd_turbulence::{friction_velocity_spalding, resolve_wall_regime, y_plus, WallRegime};

/// One tracked regime per viscous-wall-adjacent interior cell, visited in
/// the block's surface list order, then row-major `(d1, d2)` on each
/// surface. Stable across calls as long as the block's BC surfaces don't
/// change shape.
#[derive(Default)]
pub struct WallRegimeTracker {
    regimes: Vec<WallRegime>,
}

impl WallRegimeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute every tracked cell's regime from the block's current
    /// primitive state, growing the tracker on first use. Returns the count
    /// of cells currently resolved to [`WallRegime::WallFunction`].
    pub fn update(&mut self, block: &ProcBlock, thermo: &dyn Thermodynamics, wall_treatment: WallTreatment) -> usize {
        let ghost = block.ghost();
        let (ni, nj, nk) = block.dims();
        let mut idx = 0;
        let mut wall_function_count = 0;

        let wall_surfaces: Vec<_> = block
            .bcs
            .surfaces
            .iter()
            .filter(|s| matches!(s.kind, BcKind::ViscousWallIsothermal | BcKind::ViscousWallAdiabatic))
            .copied()
            .collect();

        for surface in wall_surfaces {
            let face = surface.face();
            let (d1_range, d2_range) = match face {
                BlockFace::ILo | BlockFace::IHi => (surface.j_min as usize..surface.j_max as usize, surface.k_min as usize..surface.k_max as usize),
                BlockFace::JLo | BlockFace::JHi => (surface.i_min as usize..surface.i_max as usize, surface.k_min as usize..surface.k_max as usize),
                BlockFace::KLo | BlockFace::KHi => (surface.i_min as usize..surface.i_max as usize, surface.j_min as usize..surface.j_max as usize),
            };

            for d2 in d2_range.clone() {
                for d1 in d1_range.clone() {
                    let (gi, gj, gk) = first_off_wall_cell(face, ghost, ni, nj, nk, d1, d2);
                    let prim = *block.prim.get(gi, gj, gk);
                    let normal = outward_unit_normal(block, face, d1, d2);
                    let u_n = prim.vel.dot(normal);
                    let u_tangential = prim.vel - normal * u_n;
                    let u_parallel = u_tangential.mag();
                    let y = wall_normal_distance(block, face, d1, d2, *block.geometry.cell_center.get(gi, gj, gk), normal);

                    let temperature = thermo.temperature(prim.rho, prim.p);
                    let mu = thermo.dynamic_viscosity(temperature);
                    let nu = mu / prim.rho;

                    let u_tau = friction_velocity_spalding(u_parallel, y, nu);
                    let yp = y_plus(u_tau, y, nu);

                    if idx == self.regimes.len() {
                        self.regimes.push(WallRegime::LowRe);
                    }
                    let previous = self.regimes[idx];
                    let next = resolve_wall_regime(wall_treatment, yp, previous);
                    if next != previous {
                        tracing::debug!(cell = idx, y_plus = yp, ?previous, ?next, "wall regime switch");
                    }
                    self.regimes[idx] = next;
                    if next == WallRegime::WallFunction {
                        wall_function_count += 1;
                    }
                    idx += 1;
                }
            }
        }
        wall_function_count
    }
}

fn first_off_wall_cell(face: BlockFace, ghost: usize, ni: usize, nj: usize, nk: usize, d1: usize, d2: usize) -> (usize, usize, usize) {
    match face {
        BlockFace::ILo => (ghost, d1 + ghost, d2 + ghost),
        BlockFace::IHi => (ghost + ni - 1, d1 + ghost, d2 + ghost),
        BlockFace::JLo => (d1 + ghost, ghost, d2 + ghost),
        BlockFace::JHi => (d1 + ghost, ghost + nj - 1, d2 + ghost),
        BlockFace::KLo => (d1 + ghost, d2 + ghost, ghost),
        BlockFace::KHi => (d1 + ghost, d2 + ghost, ghost + nk - 1),
    }
}

fn outward_unit_normal(block: &ProcBlock, face: BlockFace, d1: usize, d2: usize) -> Vec3 {
    let (ni, nj, nk) = block.dims();
    let raw = match face {
        BlockFace::ILo => *block.geometry.faces_i.area_normal.get(0, d1, d2) * -1.0,
        BlockFace::IHi => *block.geometry.faces_i.area_normal.get(ni, d1, d2),
        BlockFace::JLo => *block.geometry.faces_j.area_normal.get(d1, 0, d2) * -1.0,
        BlockFace::JHi => *block.geometry.faces_j.area_normal.get(d1, nj, d2),
        BlockFace::KLo => *block.geometry.faces_k.area_normal.get(d1, d2, 0) * -1.0,
        BlockFace::KHi => *block.geometry.faces_k.area_normal.get(d1, d2, nk),
    };
    let mag = raw.mag();
    if mag > 0.0 { raw * (1.0 / mag) } else { Vec3::new(1.0, 0.0, 0.0) }
}

/// Distance from the wall face to `cell_center`, projected onto the
/// outward normal (the relevant length for both Spalding's law and y+).
fn wall_normal_distance(block: &ProcBlock, face: BlockFace, d1: usize, d2: usize, cell_center: Vec3, normal: Vec3) -> f64 {
    let (ni, nj, nk) = block.dims();
    let wall_point = match face {
        BlockFace::ILo => *block.geometry.faces_i.centroid.get(0, d1, d2),
        BlockFace::IHi => *block.geometry.faces_i.centroid.get(ni, d1, d2),
        BlockFace::JLo => *block.geometry.faces_j.centroid.get(d1, 0, d2),
        BlockFace::JHi => *block.geometry.faces_j.centroid.get(d1, nj, d2),
        BlockFace::KLo => *block.geometry.faces_k.centroid.get(d1, d2, 0),
        BlockFace::KHi => *block.geometry.faces_k.centroid.get(d1, d2, nk),
    };
    (cell_center - wall_point).dot(normal).abs()
}
