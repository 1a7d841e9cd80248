//! Roe-averaged approximate Riemann flux with a Harten entropy fix.

use cfd_core::{PrimitiveVars, StateVector, Thermodynamics, Vec3};

/// Physical inviscid flux of conservative state `U` through a face with
/// outward unit normal `n`.
#[must_use]
fn physical_flux(p: &PrimitiveVars, n: Vec3, thermo: &dyn Thermodynamics) -> StateVector {
    let vn = p.vel.dot(n);
    let rho_e = thermo.internal_energy(p.rho, p.p) + 0.5 * p.rho * p.vel.dot(p.vel);
    let h = (rho_e + p.p) / p.rho;
    let mut v = vec![p.rho * vn, (p.rho * p.vel.x).mul_add(vn, p.p * n.x), (p.rho * p.vel.y).mul_add(vn, p.p * n.y), (p.rho * p.vel.z).mul_add(vn, p.p * n.z), p.rho * h * vn];
    if let Some(t) = p.turb {
        v.push(p.rho * t.k * vn);
        v.push(p.rho * t.omega * vn);
    }
    StateVector::from_vals(v)
}

/// Harten's entropy-fix floor on a characteristic speed magnitude, keeping
/// the scheme from admitting expansion shocks near sonic points.
#[inline]
#[must_use]
fn harten_fix(lambda: f64, delta: f64) -> f64 {
    if lambda.abs() < delta {
        lambda.mul_add(lambda, delta * delta) / (2.0 * delta)
    } else {
        lambda.abs()
    }
}

/// An orthonormal right-handed basis `(n, t1, t2)` built from unit normal
/// `n`, used to resolve velocity into face-normal and tangential
/// components for the eigenvector decomposition.
fn tangent_basis(n: Vec3) -> (Vec3, Vec3) {
    let helper = if n.x.abs() < 0.9 { Vec3::new(1.0, 0.0, 0.0) } else { Vec3::new(0.0, 1.0, 0.0) };
    let t1 = n.cross(helper).unit();
    let t2 = n.cross(t1);
    (t1, t2)
}

/// Roe-averaged flux across a face with outward area-weighted normal
/// `area_normal` (its magnitude is the face area), given left/right
/// reconstructed primitive states.
///
/// Dissipation is the full Roe matrix `Sum_k |lambda_k| alpha_k r_k`: two
/// acoustic waves (`vn +/- c`, Harten-limited), a contact/entropy wave and
/// two shear waves (all at `vn`, left un-limited since the entropy fix only
/// guards against the acoustic expansion-shock mode), and one passive
/// advective wave per carried turbulence scalar.
#[must_use]
pub fn roe_flux(
    left: &PrimitiveVars,
    right: &PrimitiveVars,
    area_normal: Vec3,
    thermo: &dyn Thermodynamics,
) -> StateVector {
    let area = area_normal.mag();
    let n = if area > 0.0 { area_normal * (1.0 / area) } else { Vec3::new(1.0, 0.0, 0.0) };
    let (t1, t2) = tangent_basis(n);

    let fl = physical_flux(left, n, thermo);
    let fr = physical_flux(right, n, thermo);

    let sqrt_rho_l = left.rho.sqrt();
    let sqrt_rho_r = right.rho.sqrt();
    let denom = sqrt_rho_l + sqrt_rho_r;
    let rho = sqrt_rho_l * sqrt_rho_r;

    let vel = (left.vel * sqrt_rho_l + right.vel * sqrt_rho_r) * (1.0 / denom);
    let hl = enthalpy(left, thermo);
    let hr = enthalpy(right, thermo);
    let h = hl.mul_add(sqrt_rho_l, hr * sqrt_rho_r) / denom;
    let gamma = thermo.gamma();
    let q2 = vel.dot(vel);
    let c2 = (gamma - 1.0) * (h - 0.5 * q2);
    let c = c2.max(1e-12).sqrt();
    let vn = vel.dot(n);
    let ut1 = vel.dot(t1);
    let ut2 = vel.dot(t2);

    let delta = 0.05 * (c + vn.abs());
    let lambda_acoustic_lo = harten_fix(vn - c, delta);
    let lambda_mid = vn.abs();
    let lambda_acoustic_hi = harten_fix(vn + c, delta);

    let drho = right.rho - left.rho;
    let dp = right.p - left.p;
    let dvn = right.vel.dot(n) - left.vel.dot(n);
    let dut1 = right.vel.dot(t1) - left.vel.dot(t1);
    let dut2 = right.vel.dot(t2) - left.vel.dot(t2);

    let alpha_acoustic_lo = (dp - rho * c * dvn) / (2.0 * c2.max(1e-12));
    let alpha_entropy = drho - dp / c2.max(1e-12);
    let alpha_shear1 = rho * dut1;
    let alpha_shear2 = rho * dut2;
    let alpha_acoustic_hi = (dp + rho * c * dvn) / (2.0 * c2.max(1e-12));

    let r_acoustic_lo = [1.0, vel.x - c * n.x, vel.y - c * n.y, vel.z - c * n.z, h - c * vn];
    let r_entropy = [1.0, vel.x, vel.y, vel.z, 0.5 * q2];
    let r_shear1 = [0.0, t1.x, t1.y, t1.z, ut1];
    let r_shear2 = [0.0, t2.x, t2.y, t2.z, ut2];
    let r_acoustic_hi = [1.0, vel.x + c * n.x, vel.y + c * n.y, vel.z + c * n.z, h + c * vn];

    let mut dissipation = vec![0.0; fl.arity()];
    for idx in 0..5 {
        dissipation[idx] = lambda_acoustic_lo * alpha_acoustic_lo * r_acoustic_lo[idx]
            + lambda_mid * alpha_entropy * r_entropy[idx]
            + lambda_mid * alpha_shear1 * r_shear1[idx]
            + lambda_mid * alpha_shear2 * r_shear2[idx]
            + lambda_acoustic_hi * alpha_acoustic_hi * r_acoustic_hi[idx];
    }
    if let (Some(tl), Some(tr)) = (left.turb, right.turb) {
        dissipation[5] = lambda_mid * rho * (tr.k - tl.k);
        dissipation[6] = lambda_mid * rho * (tr.omega - tl.omega);
    }

    let mut out = Vec::with_capacity(fl.arity());
    for idx in 0..fl.arity() {
        out.push(0.5 * (fl[idx] + fr[idx]) - 0.5 * dissipation[idx]);
    }
    let flux = StateVector::from_vals(out);
    flux * area
}

fn enthalpy(p: &PrimitiveVars, thermo: &dyn Thermodynamics) -> f64 {
    let rho_e = thermo.internal_energy(p.rho, p.p) + 0.5 * p.rho * p.vel.dot(p.vel);
    (rho_e + p.p) / p.rho
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfd_core::PerfectGasSutherland;

    #[test]
    fn uniform_flow_flux_matches_physical_flux() {
        let thermo = PerfectGasSutherland::air_nondimensional();
        let p = PrimitiveVars::laminar(1.0, Vec3::new(2.0, 0.0, 0.0), 1.0);
        let n = Vec3::new(1.0, 0.0, 0.0);
        let f = roe_flux(&p, &p, n, &thermo);
        let expected = physical_flux(&p, n, &thermo);
        for idx in 0..f.arity() {
            assert!((f[idx] - expected[idx]).abs() < 1e-9, "component {idx} mismatch");
        }
    }

    #[test]
    fn flux_scales_linearly_with_face_area() {
        let thermo = PerfectGasSutherland::air_nondimensional();
        let l = PrimitiveVars::laminar(1.0, Vec3::new(1.0, 0.0, 0.0), 1.0);
        let r = PrimitiveVars::laminar(0.9, Vec3::new(0.8, 0.0, 0.0), 0.95);
        let n = Vec3::new(1.0, 0.0, 0.0);
        let f1 = roe_flux(&l, &r, n, &thermo);
        let f2 = roe_flux(&l, &r, n * 2.0, &thermo);
        for idx in 0..f1.arity() {
            assert!((f2[idx] - 2.0 * f1[idx]).abs() < 1e-9);
        }
    }
}
