//! Local ghost-cell fill for every boundary condition that is resolved
//! purely from the mirror interior cell (`BcKind::is_local`). Interblock and
//! periodic surfaces carry no local closure; they are filled by the
//! parallel ghost exchange instead.

use crate::bc::{BcKind, BlockFace, SurfaceBc};
use crate::procblock::ProcBlock;
use cfd_core::{PrimitiveVars, Thermodynamics, Vec3};

/// Resolve every local-BC surface's ghost layers from the current interior
/// state. Call once per iteration before [`crate`]'s gradient/flux
/// machinery reads the ghost halo. `wall_distance_at` looks up the distance
/// to the nearest wall for an interior cell, addressed by its ghost-inclusive
/// `(i, j, k)` (the same indexing as `block.prim`); callers with a real
/// per-cell wall-distance field thread it straight through.
pub fn fill_local_ghosts(
    block: &mut ProcBlock,
    thermo: &dyn Thermodynamics,
    wall_ghost_k_omega: impl Fn(f64, f64, f64) -> Option<cfd_core::TurbPrimitive>,
    wall_distance_at: impl Fn(usize, usize, usize) -> f64,
) {
    let surfaces: Vec<SurfaceBc> = block.bcs.surfaces.iter().copied().filter(|s| s.kind.is_local()).collect();
    for surface in surfaces {
        fill_surface(block, &surface, thermo, &wall_ghost_k_omega, &wall_distance_at);
    }
}

fn fill_surface(
    block: &mut ProcBlock,
    surface: &SurfaceBc,
    thermo: &dyn Thermodynamics,
    wall_ghost_k_omega: &impl Fn(f64, f64, f64) -> Option<cfd_core::TurbPrimitive>,
    wall_distance_at: &impl Fn(usize, usize, usize) -> f64,
) {
    let face = surface.face();
    let ghost = block.ghost();
    let (ni, nj, nk) = block.dims();
    let (d1_range, d2_range) = surface_ranges(face, surface);

    for d2 in d2_range {
        for d1 in d1_range.clone() {
            for depth in 0..ghost {
                let (interior, g) = interior_and_ghost_cell(face, ghost, ni, nj, nk, d1, d2, depth);
                let interior_prim = *block.prim.get(interior.0, interior.1, interior.2);
                let normal = outward_unit_normal(block, face, d1, d2);
                let dist = wall_distance_at(interior.0, interior.1, interior.2);
                let ghost_prim = apply_bc(surface, interior_prim, normal, thermo, wall_ghost_k_omega, dist);
                *block.prim.get_mut(g.0, g.1, g.2) = ghost_prim;
            }
        }
    }
}

fn surface_ranges(face: BlockFace, surface: &SurfaceBc) -> (std::ops::Range<usize>, std::ops::Range<usize>) {
    match face {
        BlockFace::ILo | BlockFace::IHi => (surface.j_min as usize..surface.j_max as usize, surface.k_min as usize..surface.k_max as usize),
        BlockFace::JLo | BlockFace::JHi => (surface.i_min as usize..surface.i_max as usize, surface.k_min as usize..surface.k_max as usize),
        BlockFace::KLo | BlockFace::KHi => (surface.i_min as usize..surface.i_max as usize, surface.j_min as usize..surface.j_max as usize),
    }
}

fn interior_and_ghost_cell(face: BlockFace, ghost: usize, ni: usize, nj: usize, nk: usize, d1: usize, d2: usize, depth: usize) -> ((usize, usize, usize), (usize, usize, usize)) {
    match face {
        BlockFace::ILo => ((ghost + depth, d1 + ghost, d2 + ghost), (ghost - 1 - depth, d1 + ghost, d2 + ghost)),
        BlockFace::IHi => ((ghost + ni - 1 - depth, d1 + ghost, d2 + ghost), (ghost + ni + depth, d1 + ghost, d2 + ghost)),
        BlockFace::JLo => ((d1 + ghost, ghost + depth, d2 + ghost), (d1 + ghost, ghost - 1 - depth, d2 + ghost)),
        BlockFace::JHi => ((d1 + ghost, ghost + nj - 1 - depth, d2 + ghost), (d1 + ghost, ghost + nj + depth, d2 + ghost)),
        BlockFace::KLo => ((d1 + ghost, d2 + ghost, ghost + depth), (d1 + ghost, d2 + ghost, ghost - 1 - depth)),
        BlockFace::KHi => ((d1 + ghost, d2 + ghost, ghost + nk - 1 - depth), (d1 + ghost, d2 + ghost, ghost + nk + depth)),
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

fn apply_bc(
    surface: &SurfaceBc,
    interior: PrimitiveVars,
    normal: Vec3,
    thermo: &dyn Thermodynamics,
    wall_ghost_k_omega: &impl Fn(f64, f64, f64) -> Option<cfd_core::TurbPrimitive>,
    wall_distance: f64,
) -> PrimitiveVars {
    match surface.kind {
        BcKind::SlipWall => {
            let vn = interior.vel.dot(normal);
            PrimitiveVars { vel: interior.vel - normal * (2.0 * vn), ..interior }
        }
        BcKind::ViscousWallAdiabatic => {
            // Zero-gradient extrapolation: no heat flux means the ghost
            // temperature mirrors the interior's, so rho/p pass through.
            let mut ghost = PrimitiveVars { vel: interior.vel * -1.0, ..interior };
            if let Some(turb) = interior.turb {
                let temperature = thermo.temperature(interior.rho, interior.p);
                let mu = thermo.dynamic_viscosity(temperature);
                let dist = wall_distance.max(0.0);
                ghost.turb = wall_ghost_k_omega(dist, mu, interior.rho).or(Some(turb));
            }
            ghost
        }
        BcKind::ViscousWallIsothermal => {
            // Pressure carries no normal gradient at a no-slip wall; pick
            // the ghost density so the face-averaged temperature equals the
            // prescribed wall temperature.
            let t_interior = thermo.temperature(interior.rho, interior.p);
            let t_ghost = (2.0 * surface.wall_temperature - t_interior).max(1e-6);
            let rho_ghost = interior.p / (t_ghost * thermo.gas_constant());
            let mut ghost = PrimitiveVars { vel: interior.vel * -1.0, rho: rho_ghost, ..interior };
            if let Some(turb) = interior.turb {
                let mu = thermo.dynamic_viscosity(surface.wall_temperature);
                let dist = wall_distance.max(0.0);
                ghost.turb = wall_ghost_k_omega(dist, mu, interior.rho).or(Some(turb));
            }
            ghost
        }
        BcKind::SubsonicInflow
        | BcKind::SupersonicInflow
        | BcKind::SubsonicOutflow
        | BcKind::SupersonicOutflow
        | BcKind::Farfield => interior,
        BcKind::Periodic | BcKind::Interblock => interior,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meshgen::channel_box;
    use crate::BlockTag;
    use cfd_core::PerfectGasSutherland;

    fn block() -> ProcBlock {
        let thermo = PerfectGasSutherland::air_nondimensional();
        let (geometry, bcs) = channel_box(4, 3, 2, 1.0, 1.0, 1.0, 2, BcKind::SlipWall, BcKind::SubsonicOutflow);
        let freestream = PrimitiveVars::laminar(1.0, Vec3::new(0.5, 0.2, 0.0), 1.0);
        ProcBlock::new(BlockTag { parent_block: 0, split_block: 0 }, 0, geometry, bcs, freestream, &thermo)
    }

    /// Same channel, but with the `j_lo` slip wall replaced by `kind`
    /// (expected to be one of the two viscous-wall kinds).
    fn viscous_wall_block(kind: BcKind, wall_temperature: f64) -> ProcBlock {
        let thermo = PerfectGasSutherland::air_nondimensional();
        let (geometry, mut bcs) = channel_box(4, 3, 2, 1.0, 1.0, 1.0, 2, BcKind::SlipWall, BcKind::SubsonicOutflow);
        let j_lo = bcs.surfaces.iter_mut().find(|s| s.face() == BlockFace::JLo).expect("channel_box always has a j_lo surface");
        j_lo.kind = kind;
        j_lo.wall_temperature = wall_temperature;
        let freestream = PrimitiveVars::laminar(1.0, Vec3::new(0.5, 0.2, 0.0), 1.0);
        ProcBlock::new(BlockTag { parent_block: 0, split_block: 0 }, 0, geometry, bcs, freestream, &thermo)
    }

    #[test]
    fn slip_wall_reflects_the_normal_velocity_component() {
        let mut b = block();
        let thermo = PerfectGasSutherland::air_nondimensional();
        fill_local_ghosts(&mut b, &thermo, |_, _, _| None, |_, _, _| 1e-6);
        let ghost = b.ghost();
        let p = *b.prim.get(ghost - 1, ghost, ghost);
        assert!((p.vel.x + 0.5).abs() < 1e-9, "expected reflected normal velocity, got {}", p.vel.x);
    }

    #[test]
    fn outflow_extrapolates_the_interior_state_unchanged() {
        let mut b = block();
        let thermo = PerfectGasSutherland::air_nondimensional();
        fill_local_ghosts(&mut b, &thermo, |_, _, _| None, |_, _, _| 1e-6);
        let ghost = b.ghost();
        let (ni, _, _) = b.dims();
        let p = *b.prim.get(ghost + ni, ghost, ghost);
        assert!((p.rho - 1.0).abs() < 1e-12);
    }

    #[test]
    fn adiabatic_wall_extrapolates_temperature_into_the_ghost() {
        let mut b = viscous_wall_block(BcKind::ViscousWallAdiabatic, 0.0);
        let thermo = PerfectGasSutherland::air_nondimensional();
        fill_local_ghosts(&mut b, &thermo, |_, _, _| None, |_, _, _| 1e-6);
        let ghost = b.ghost();
        let interior = *b.prim.get(ghost, ghost, ghost);
        let wall_ghost = *b.prim.get(ghost, ghost - 1, ghost);
        assert!((wall_ghost.vel.x + interior.vel.x).abs() < 1e-9, "no-slip must flip tangential velocity");
        assert!((wall_ghost.rho - interior.rho).abs() < 1e-12, "adiabatic wall must not perturb density");
        assert!((wall_ghost.p - interior.p).abs() < 1e-12, "adiabatic wall must not perturb pressure");
    }

    #[test]
    fn isothermal_wall_sets_the_face_averaged_temperature_to_the_wall_temperature() {
        let thermo = PerfectGasSutherland::air_nondimensional();
        let wall_temperature = 2.0 * thermo.temperature(1.0, 1.0);
        let mut b = viscous_wall_block(BcKind::ViscousWallIsothermal, wall_temperature);
        fill_local_ghosts(&mut b, &thermo, |_, _, _| None, |_, _, _| 1e-6);
        let ghost = b.ghost();
        let interior = *b.prim.get(ghost, ghost, ghost);
        let wall_ghost = *b.prim.get(ghost, ghost - 1, ghost);

        let t_interior = thermo.temperature(interior.rho, interior.p);
        let t_ghost = thermo.temperature(wall_ghost.rho, wall_ghost.p);
        let t_face = 0.5 * (t_interior + t_ghost);
        assert!((t_face - wall_temperature).abs() < 1e-9, "face-averaged temperature {t_face} should equal the wall temperature {wall_temperature}");
    }

    #[test]
    fn viscous_wall_uses_the_supplied_distance_for_the_wall_omega_ghost() {
        use cfd_core::TurbPrimitive;
        let thermo = PerfectGasSutherland::air_nondimensional();
        let mut b = viscous_wall_block(BcKind::ViscousWallAdiabatic, 0.0);
        for (i, j, k) in b.prim.interior_indices().collect::<Vec<_>>() {
            b.prim.get_mut(i, j, k).turb = Some(TurbPrimitive { k: 1e-3, omega: 1.0 });
        }
        fill_local_ghosts(&mut b, &thermo, |dist, _, _| Some(TurbPrimitive { k: 0.0, omega: dist }), |_, _, _| 42.0);
        let ghost = b.ghost();
        let wall_ghost = *b.prim.get(ghost, ghost - 1, ghost);
        assert!((wall_ghost.turb.unwrap().omega - 42.0).abs() < 1e-12, "wall-distance closure output must reach the ghost cell unmodified");
    }
}
