//! Wilcox (2006) k-omega two-equation closure.

use cfd_core::{TurbConservative, TurbPrimitive};

use crate::model::{ClosureCapability, ClosureState, TurbulenceModel};

const CAPABILITIES: [ClosureCapability; 3] =
    [ClosureCapability::EddyViscosity, ClosureCapability::SourceTerms, ClosureCapability::BcGhostState];

/// Wilcox (2006) k-omega model with the production limiter that prevents
/// stagnation-point overproduction.
#[derive(Clone, Copy, Debug)]
pub struct KOmegaWilcox {
    pub beta_star: f64,
    pub alpha: f64,
    pub beta: f64,
    pub sigma_k: f64,
    pub sigma_omega: f64,
    /// Production cap as a multiple of `beta_star * rho * k * omega`.
    pub production_limiter: f64,
}

impl Default for KOmegaWilcox {
    fn default() -> Self {
        Self {
            beta_star: 0.09,
            alpha: 13.0 / 25.0,
            beta: 9.0 / 125.0,
            sigma_k: 0.6,
            sigma_omega: 0.5,
            production_limiter: 20.0,
        }
    }
}

/// `S_ij S_ij` contracted from the velocity gradient tensor's symmetric part.
fn strain_rate_magnitude_sq(vel_grad: &cfd_core::Tensor3) -> f64 {
    let mut sum = 0.0;
    for a in 0..3 {
        for b in 0..3 {
            let s_ab = 0.5 * (vel_grad[a][b] + vel_grad[b][a]);
            sum += s_ab * s_ab;
        }
    }
    sum
}

impl TurbulenceModel for KOmegaWilcox {
    fn name(&self) -> &'static str {
        "k-omega-wilcox-2006"
    }

    fn capabilities(&self) -> &'static [ClosureCapability] {
        &CAPABILITIES
    }

    fn eddy_viscosity(&self, state: &ClosureState) -> f64 {
        let Some(t) = state.prim.turb else { return 0.0 };
        if t.omega <= 0.0 {
            return 0.0;
        }
        state.prim.rho * t.k / t.omega
    }

    fn source_terms(&self, state: &ClosureState) -> TurbConservative {
        let Some(t) = state.prim.turb else {
            return TurbConservative { rho_k: 0.0, rho_omega: 0.0 };
        };
        let rho = state.prim.rho;
        let mu_t = self.eddy_viscosity(state);
        let s2 = strain_rate_magnitude_sq(&state.gradients.vel_grad);

        let production_raw = mu_t * 2.0 * s2;
        let production_cap = self.production_limiter * self.beta_star * rho * t.k * t.omega;
        let production_k = production_raw.min(production_cap.max(0.0));
        let destruction_k = self.beta_star * rho * t.k * t.omega;

        let production_omega = if t.k > 0.0 { self.alpha * (t.omega / t.k) * production_k } else { 0.0 };
        let destruction_omega = self.beta * rho * t.omega * t.omega;

        TurbConservative {
            rho_k: production_k - destruction_k,
            rho_omega: production_omega - destruction_omega,
        }
    }

    fn wall_ghost_state(&self, first_cell_distance: f64, mu: f64, rho: f64) -> Option<TurbPrimitive> {
        // Wilcox's analytic near-wall limit: omega -> 6*nu / (beta * y^2).
        let nu = mu / rho;
        let y = first_cell_distance.max(1e-12);
        let omega_wall = 6.0 * nu / (self.beta * y * y);
        Some(TurbPrimitive { k: 0.0, omega: omega_wall })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfd_core::{PrimitiveVars, Vec3};

    fn state_with(k: f64, omega: f64) -> ClosureState {
        ClosureState {
            prim: PrimitiveVars {
                rho: 1.0,
                vel: Vec3::zero(),
                p: 1.0,
                turb: Some(cfd_core::TurbPrimitive { k, omega }),
            },
            gradients: cfd_grid::CellGradients::default(),
            wall_distance: 0.01,
            mu_molecular: 1.0,
        }
    }

    #[test]
    fn eddy_viscosity_is_k_over_omega_scaled_by_density() {
        let model = KOmegaWilcox::default();
        let s = state_with(2.0, 4.0);
        assert!((model.eddy_viscosity(&s) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_strain_gives_pure_destruction() {
        let model = KOmegaWilcox::default();
        let s = state_with(1.0, 1.0);
        let src = model.source_terms(&s);
        assert!(src.rho_k < 0.0);
        assert!(src.rho_omega < 0.0);
    }

    #[test]
    fn wall_omega_increases_as_distance_shrinks() {
        let model = KOmegaWilcox::default();
        let far = model.wall_ghost_state(0.1, 1.0, 1.0).unwrap();
        let near = model.wall_ghost_state(0.001, 1.0, 1.0).unwrap();
        assert!(near.omega > far.omega);
    }
}
