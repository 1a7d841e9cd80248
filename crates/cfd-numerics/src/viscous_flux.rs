//! Newtonian stress tensor and Green-Gauss-gradient-based viscous flux.

use cfd_core::{PrimitiveVars, StateVector, Tensor3, Thermodynamics, Vec3};
use cfd_grid::CellGradients;

/// Molecular + turbulent diffusivity coefficients for the two-equation
/// closure's diffusion terms (standard k-omega sigma values).
#[derive(Clone, Copy, Debug)]
pub struct DiffusionCoefficients {
    pub sigma_k: f64,
    pub sigma_omega: f64,
}

impl Default for DiffusionCoefficients {
    fn default() -> Self {
        Self { sigma_k: 0.5, sigma_omega: 0.5 }
    }
}

/// Newtonian viscous stress tensor `tau = mu * (grad_u + grad_u^T) - (2/3) mu
/// * div(u) * I`, with `mu` the sum of molecular and eddy viscosity.
#[must_use]
pub fn stress_tensor(vel_grad: &Tensor3, mu_total: f64) -> Tensor3 {
    let sym = *vel_grad + vel_grad.transpose();
    let div_u = vel_grad.trace();
    let mut tau = sym.scale(mu_total);
    let deviatoric = (2.0 / 3.0) * mu_total * div_u;
    tau.rows[0].x -= deviatoric;
    tau.rows[1].y -= deviatoric;
    tau.rows[2].z -= deviatoric;
    tau
}

/// Viscous (diffusive) flux across a face with outward area-weighted normal
/// `area_normal`, given the face-averaged primitive state, gradients, molecular
/// viscosity (from Sutherland's law) and eddy viscosity `mu_t` (zero for a
/// laminar run).
#[must_use]
pub fn viscous_flux(
    face_prim: &PrimitiveVars,
    gradients: &CellGradients,
    area_normal: Vec3,
    mu_t: f64,
    thermo: &dyn Thermodynamics,
    diffusion: DiffusionCoefficients,
) -> StateVector {
    let temperature = thermo.temperature(face_prim.rho, face_prim.p);
    let mu = thermo.dynamic_viscosity(temperature);
    let mu_total = mu + mu_t;
    let tau = stress_tensor(&gradients.vel_grad, mu_total);

    let k_cond = thermo.thermal_conductivity(mu, temperature);
    let heat_flux = gradients.temp_grad * (-k_cond);

    let viscous_work = tau.apply(face_prim.vel) - heat_flux;
    let momentum = tau.apply(area_normal);
    let energy = viscous_work.dot(area_normal);

    let mut vals = vec![0.0, momentum.x, momentum.y, momentum.z, energy];
    if face_prim.turb.is_some() {
        let mu_k = mu + diffusion.sigma_k * mu_t;
        let mu_omega = mu + diffusion.sigma_omega * mu_t;
        vals.push(mu_k * gradients.k_grad.dot(area_normal));
        vals.push(mu_omega * gradients.omega_grad.dot(area_normal));
    }
    StateVector::from_vals(vals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfd_core::PerfectGasSutherland;

    #[test]
    fn zero_gradients_give_zero_viscous_flux() {
        let thermo = PerfectGasSutherland::air_nondimensional();
        let p = PrimitiveVars::laminar(1.0, Vec3::new(1.0, 0.0, 0.0), 1.0);
        let grads = CellGradients::default();
        let n = Vec3::new(1.0, 0.0, 0.0);
        let f = viscous_flux(&p, &grads, n, 0.0, &thermo, DiffusionCoefficients::default());
        for idx in 0..f.arity() {
            assert!(f[idx].abs() < 1e-12);
        }
    }

    #[test]
    fn stress_tensor_is_traceless_after_deviatoric_correction_for_pure_shear() {
        let grad = Tensor3::from_rows(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.0));
        let tau = stress_tensor(&grad, 1.0);
        assert!((tau.trace()).abs() < 1e-12);
    }
}
