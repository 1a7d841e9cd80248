//! Menter (1994) SST k-omega closure: blended k-epsilon/k-omega with the
//! Bradshaw eddy-viscosity limiter.

use cfd_core::{TurbConservative, TurbPrimitive};

use crate::model::{ClosureCapability, ClosureState, TurbulenceModel};

const CAPABILITIES: [ClosureCapability; 3] =
    [ClosureCapability::EddyViscosity, ClosureCapability::SourceTerms, ClosureCapability::BcGhostState];

/// Menter's original (1994) SST coefficient set.
#[derive(Clone, Copy, Debug)]
pub struct MenterSst {
    pub beta_star: f64,
    pub a1: f64,
    pub sigma_k1: f64,
    pub sigma_omega1: f64,
    pub beta1: f64,
    pub alpha1: f64,
    pub sigma_k2: f64,
    pub sigma_omega2: f64,
    pub beta2: f64,
    pub alpha2: f64,
}

impl Default for MenterSst {
    fn default() -> Self {
        Self {
            beta_star: 0.09,
            a1: 0.31,
            sigma_k1: 0.85,
            sigma_omega1: 0.5,
            beta1: 0.075,
            alpha1: 5.0 / 9.0,
            sigma_k2: 1.0,
            sigma_omega2: 0.856,
            beta2: 0.0828,
            alpha2: 0.44,
        }
    }
}

fn strain_rate_magnitude_sq(vel_grad: &cfd_core::Tensor3) -> f64 {
    let mut sum = 0.0;
    for a in 0..3 {
        for b in 0..3 {
            let s_ab = 0.5 * (vel_grad[a][b] + vel_grad[b][a]);
            sum += s_ab * s_ab;
        }
    }
    2.0 * sum
}

impl MenterSst {
    /// Blending function `F1`, 1 in the log layer switching to 0 away from the wall.
    fn f1(&self, state: &ClosureState, k: f64, omega: f64) -> f64 {
        let y = state.wall_distance.max(1e-12);
        let rho = state.prim.rho;
        let nu = state.mu_molecular / rho;
        let grad_dot = state.gradients.k_grad.dot(state.gradients.omega_grad);
        let cd_kw = (2.0 * rho * self.sigma_omega2 * grad_dot / omega.max(1e-12)).max(1e-10);

        let term1 = (k.sqrt() / (self.beta_star * omega.max(1e-12) * y)).max(500.0 * nu / (y * y * omega.max(1e-12)));
        let arg1 = (term1).min(4.0 * rho * self.sigma_omega2 * k / (cd_kw * y * y));
        arg1.powi(4).tanh()
    }

    /// Blending function `F2`, used only by the eddy-viscosity limiter.
    fn f2(&self, state: &ClosureState, k: f64, omega: f64) -> f64 {
        let y = state.wall_distance.max(1e-12);
        let nu = state.mu_molecular / state.prim.rho;
        let arg2 = (2.0 * k.sqrt() / (self.beta_star * omega.max(1e-12) * y)).max(500.0 * nu / (y * y * omega.max(1e-12)));
        arg2.powi(2).tanh()
    }

    fn blend(f1: f64, phi1: f64, phi2: f64) -> f64 {
        f1 * phi1 + (1.0 - f1) * phi2
    }
}

impl TurbulenceModel for MenterSst {
    fn name(&self) -> &'static str {
        "menter-sst-1994"
    }

    fn capabilities(&self) -> &'static [ClosureCapability] {
        &CAPABILITIES
    }

    fn eddy_viscosity(&self, state: &ClosureState) -> f64 {
        let Some(t) = state.prim.turb else { return 0.0 };
        if t.omega <= 0.0 {
            return 0.0;
        }
        let s = strain_rate_magnitude_sq(&state.gradients.vel_grad).sqrt();
        let f2 = self.f2(state, t.k, t.omega);
        let denom = (self.a1 * t.omega).max(f2 * s);
        if denom <= 0.0 {
            return 0.0;
        }
        self.a1 * state.prim.rho * t.k / denom
    }

    fn source_terms(&self, state: &ClosureState) -> TurbConservative {
        let Some(t) = state.prim.turb else {
            return TurbConservative { rho_k: 0.0, rho_omega: 0.0 };
        };
        let rho = state.prim.rho;
        let f1 = self.f1(state, t.k, t.omega);
        let sigma_omega2 = self.sigma_omega2;
        let beta = Self::blend(f1, self.beta1, self.beta2);
        let alpha = Self::blend(f1, self.alpha1, self.alpha2);

        let mu_t = self.eddy_viscosity(state);
        let s2 = strain_rate_magnitude_sq(&state.gradients.vel_grad);
        let production_raw = mu_t * s2;
        let production_cap = 10.0 * self.beta_star * rho * t.k * t.omega;
        let production_k = production_raw.min(production_cap.max(0.0));
        let destruction_k = self.beta_star * rho * t.k * t.omega;

        let production_omega = if mu_t > 0.0 { (alpha * rho / mu_t) * production_k } else { 0.0 };
        let destruction_omega = beta * rho * t.omega * t.omega;
        let grad_dot = state.gradients.k_grad.dot(state.gradients.omega_grad);
        let cross_diffusion = (1.0 - f1) * 2.0 * rho * sigma_omega2 * grad_dot / t.omega.max(1e-12);

        TurbConservative {
            rho_k: production_k - destruction_k,
            rho_omega: production_omega - destruction_omega + cross_diffusion,
        }
    }

    fn wall_ghost_state(&self, first_cell_distance: f64, mu: f64, rho: f64) -> Option<TurbPrimitive> {
        let nu = mu / rho;
        let y = first_cell_distance.max(1e-12);
        let omega_wall = 10.0 * 6.0 * nu / (self.beta1 * y * y);
        Some(TurbPrimitive { k: 0.0, omega: omega_wall })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfd_core::{PrimitiveVars, TurbPrimitive as Tp, Vec3};

    fn state_with(k: f64, omega: f64, distance: f64) -> ClosureState {
        ClosureState {
            prim: PrimitiveVars { rho: 1.0, vel: Vec3::zero(), p: 1.0, turb: Some(Tp { k, omega }) },
            gradients: cfd_grid::CellGradients::default(),
            wall_distance: distance,
            mu_molecular: 1.0,
        }
    }

    #[test]
    fn eddy_viscosity_is_nonnegative() {
        let model = MenterSst::default();
        let s = state_with(1.0, 10.0, 0.05);
        assert!(model.eddy_viscosity(&s) >= 0.0);
    }

    #[test]
    fn zero_strain_gives_pure_destruction() {
        let model = MenterSst::default();
        let s = state_with(1.0, 10.0, 0.05);
        let src = model.source_terms(&s);
        assert!(src.rho_k <= 0.0);
    }

    #[test]
    fn f1_blend_interpolates_coefficients() {
        let model = MenterSst::default();
        let s = state_with(1.0, 10.0, 0.001);
        let f1 = model.f1(&s, 1.0, 10.0);
        assert!((0.0..=1.0).contains(&f1));
    }
}
