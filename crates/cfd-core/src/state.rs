//! Primitive/conservative flow state, their algebraic residual/flux vector,
//! and the thermodynamics capability set they are converted through.

use crate::vecmath::Vec3;
use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, Sub};

/// Turbulence primitives `{k, ω}`, present only when the block runs a
/// two-equation closure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurbPrimitive {
    pub k: f64,
    pub omega: f64,
}

/// Turbulence conservative quantities `{ρk, ρω}`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurbConservative {
    pub rho_k: f64,
    pub rho_omega: f64,
}

/// Primitive flow state `P = {ρ, u, v, w, p}` (+ `{k, ω}` when turbulent).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrimitiveVars {
    pub rho: f64,
    pub vel: Vec3,
    pub p: f64,
    pub turb: Option<TurbPrimitive>,
}

/// Conservative flow state `U = {ρ, ρu, ρv, ρw, ρE}` (+ `{ρk, ρω}`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConservativeVars {
    pub rho: f64,
    pub rho_vel: Vec3,
    pub rho_e: f64,
    pub turb: Option<TurbConservative>,
}

impl PrimitiveVars {
    #[must_use]
    pub fn laminar(rho: f64, vel: Vec3, p: f64) -> Self {
        Self { rho, vel, p, turb: None }
    }

    /// Number of equations this state carries: 5, or 7 with turbulence.
    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        if self.turb.is_some() { 7 } else { 5 }
    }

    /// True when ρ>0 and p>0 (the half of invariant 2 that a primitive
    /// state alone can check; T>0 follows from the equation of state).
    #[inline]
    #[must_use]
    pub fn is_physical(&self) -> bool {
        self.rho > 0.0 && self.p > 0.0
    }

    /// `U = ToCons(P)` (invariant 1).
    #[must_use]
    pub fn to_cons(&self, thermo: &dyn Thermodynamics) -> ConservativeVars {
        let rho_vel = self.vel * self.rho;
        let kinetic = 0.5 * self.rho * self.vel.dot(self.vel);
        let internal = thermo.internal_energy(self.rho, self.p);
        let rho_e = internal + kinetic;
        let turb = self.turb.map(|t| TurbConservative {
            rho_k: self.rho * t.k,
            rho_omega: self.rho * t.omega,
        });
        ConservativeVars { rho: self.rho, rho_vel, rho_e, turb }
    }
}

impl ConservativeVars {
    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        if self.turb.is_some() { 7 } else { 5 }
    }

    /// `P = ToPrim(U)` (invariant 1); the inverse of [`PrimitiveVars::to_cons`].
    #[must_use]
    pub fn to_prim(&self, thermo: &dyn Thermodynamics) -> PrimitiveVars {
        let vel = self.rho_vel / self.rho;
        let kinetic = 0.5 * self.rho * vel.dot(vel);
        let internal = self.rho_e - kinetic;
        let p = thermo.pressure_from_internal_energy(self.rho, internal);
        let turb = self.turb.map(|t| TurbPrimitive {
            k: t.rho_k / self.rho,
            omega: t.rho_omega / self.rho,
        });
        PrimitiveVars { rho: self.rho, vel, p, turb }
    }
}

/// An algebraic state/residual/flux vector of runtime-determined arity (5 or
/// 7 equations). Mirrors the ordering `{ρ, ρu, ρv, ρw, ρE, [ρk, ρω]}`.
///
/// Arity is a runtime property (it depends on whether the run is turbulent)
/// rather than a type parameter, matching per-cell residual bookkeeping
/// where a single array of these is accumulated across every face of a
/// block without the block's turbulence flag appearing in its type.
#[derive(Clone, Debug, PartialEq)]
pub struct StateVector {
    vals: Vec<f64>,
}

impl StateVector {
    #[must_use]
    pub fn zeros(neq: usize) -> Self {
        Self { vals: vec![0.0; neq] }
    }

    #[must_use]
    pub fn from_vals(vals: Vec<f64>) -> Self {
        Self { vals }
    }

    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        self.vals.len()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.vals
    }

    #[must_use]
    pub fn l2_norm(&self) -> f64 {
        self.vals.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    #[must_use]
    pub fn linf_with_locator(&self) -> (f64, usize) {
        self.vals
            .iter()
            .enumerate()
            .map(|(i, v)| (v.abs(), i))
            .fold((0.0, 0), |acc, x| if x.0 > acc.0 { x } else { acc })
    }

    /// Flatten a conservative state into its equation-ordered vector.
    #[must_use]
    pub fn from_conservative(u: &ConservativeVars) -> Self {
        let mut vals = vec![u.rho, u.rho_vel.x, u.rho_vel.y, u.rho_vel.z, u.rho_e];
        if let Some(t) = u.turb {
            vals.push(t.rho_k);
            vals.push(t.rho_omega);
        }
        Self { vals }
    }

    /// Reconstruct a conservative state from an equation-ordered vector.
    ///
    /// # Panics
    /// Panics if `self.arity()` is neither 5 nor 7.
    #[must_use]
    pub fn to_conservative(&self) -> ConservativeVars {
        assert!(
            self.vals.len() == 5 || self.vals.len() == 7,
            "StateVector arity {} is neither 5 nor 7",
            self.vals.len()
        );
        let turb = if self.vals.len() == 7 {
            Some(TurbConservative {
                rho_k: self.vals[5],
                rho_omega: self.vals[6],
            })
        } else {
            None
        };
        ConservativeVars {
            rho: self.vals[0],
            rho_vel: Vec3::new(self.vals[1], self.vals[2], self.vals[3]),
            rho_e: self.vals[4],
            turb,
        }
    }
}

impl Index<usize> for StateVector {
    type Output = f64;
    #[inline]
    fn index(&self, i: usize) -> &f64 {
        &self.vals[i]
    }
}

impl IndexMut<usize> for StateVector {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.vals[i]
    }
}

impl Add for StateVector {
    type Output = Self;
    fn add(mut self, rhs: Self) -> Self {
        debug_assert_eq!(self.arity(), rhs.arity());
        for (a, b) in self.vals.iter_mut().zip(rhs.vals) {
            *a += b;
        }
        self
    }
}

impl AddAssign<&StateVector> for StateVector {
    fn add_assign(&mut self, rhs: &StateVector) {
        debug_assert_eq!(self.arity(), rhs.arity());
        for (a, b) in self.vals.iter_mut().zip(rhs.vals.iter()) {
            *a += *b;
        }
    }
}

impl Sub for StateVector {
    type Output = Self;
    fn sub(mut self, rhs: Self) -> Self {
        debug_assert_eq!(self.arity(), rhs.arity());
        for (a, b) in self.vals.iter_mut().zip(rhs.vals) {
            *a -= b;
        }
        self
    }
}

impl Mul<f64> for StateVector {
    type Output = Self;
    fn mul(mut self, rhs: f64) -> Self {
        for a in &mut self.vals {
            *a *= rhs;
        }
        self
    }
}

impl Div<f64> for StateVector {
    type Output = Self;
    fn div(mut self, rhs: f64) -> Self {
        for a in &mut self.vals {
            *a /= rhs;
        }
        self
    }
}

/// The capability set an equation-of-state / transport-property collaborator
/// must expose: equation-of-state tables and Sutherland-law coefficients
/// supplied as a thermodynamics object.
///
/// Sutherland's law itself is a closed two-coefficient formula, so it is
/// implemented directly by [`PerfectGasSutherland`] rather than treated as an
/// external table.
pub trait Thermodynamics: Send + Sync {
    /// Ratio of specific heats, γ.
    fn gamma(&self) -> f64;

    /// Specific gas constant in the nondimensional frame (ρ∞, a∞, L, μ_ref).
    fn gas_constant(&self) -> f64;

    /// Internal energy `ρe = p/(γ-1)` for the perfect gas.
    #[must_use]
    fn internal_energy(&self, _rho: f64, p: f64) -> f64 {
        p / (self.gamma() - 1.0)
    }

    /// Inverse of [`Thermodynamics::internal_energy`].
    #[must_use]
    fn pressure_from_internal_energy(&self, _rho: f64, internal: f64) -> f64 {
        internal * (self.gamma() - 1.0)
    }

    /// Temperature from the ideal-gas law `p = ρRT`.
    #[must_use]
    fn temperature(&self, rho: f64, p: f64) -> f64 {
        p / (rho * self.gas_constant())
    }

    /// Speed of sound `a = sqrt(γ p / ρ)`.
    #[must_use]
    fn sound_speed(&self, rho: f64, p: f64) -> f64 {
        (self.gamma() * p / rho).sqrt()
    }

    /// Dynamic viscosity from Sutherland's law, nondimensionalized by μ_ref.
    fn dynamic_viscosity(&self, temperature: f64) -> f64;

    /// Thermal conductivity, derived from viscosity via a (possibly
    /// constant) Prandtl number or a second Sutherland fit.
    fn thermal_conductivity(&self, mu: f64, temperature: f64) -> f64;
}

/// Perfect-gas equation of state with Sutherland's law for viscosity and a
/// constant turbulent/laminar Prandtl number for conductivity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerfectGasSutherland {
    pub gamma: f64,
    pub gas_constant: f64,
    /// Sutherland reference viscosity (nondimensional, typically 1.0).
    pub mu_ref: f64,
    /// Sutherland reference temperature (nondimensional).
    pub t_ref: f64,
    /// Sutherland constant S (nondimensional).
    pub sutherland_s: f64,
    pub prandtl: f64,
}

impl PerfectGasSutherland {
    /// Standard air constants in a nondimensional (ρ∞=1, a∞=1, T∞=1, μ_ref=1) frame.
    #[must_use]
    pub fn air_nondimensional() -> Self {
        Self {
            gamma: 1.4,
            gas_constant: 1.0 / 1.4,
            mu_ref: 1.0,
            t_ref: 1.0,
            sutherland_s: 198.6 / 518.67,
            prandtl: 0.72,
        }
    }
}

impl Thermodynamics for PerfectGasSutherland {
    fn gamma(&self) -> f64 {
        self.gamma
    }

    fn gas_constant(&self) -> f64 {
        self.gas_constant
    }

    fn dynamic_viscosity(&self, temperature: f64) -> f64 {
        let t = temperature.max(1.0e-12);
        self.mu_ref * (t / self.t_ref).powf(1.5) * (self.t_ref + self.sutherland_s)
            / (t + self.sutherland_s)
    }

    fn thermal_conductivity(&self, mu: f64, _temperature: f64) -> f64 {
        let cp = self.gamma * self.gas_constant / (self.gamma - 1.0);
        mu * cp / self.prandtl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thermo() -> PerfectGasSutherland {
        PerfectGasSutherland::air_nondimensional()
    }

    #[test]
    fn roundtrip_laminar_prim_cons() {
        let p = PrimitiveVars::laminar(1.0, Vec3::new(0.5, 0.1, -0.2), 1.0);
        let u = p.to_cons(&thermo());
        let p2 = u.to_prim(&thermo());
        assert!((p.rho - p2.rho).abs() < 1e-12);
        assert!((p.p - p2.p).abs() < 1e-10);
        assert!((p.vel.x - p2.vel.x).abs() < 1e-12);
    }

    #[test]
    fn roundtrip_turbulent_prim_cons() {
        let p = PrimitiveVars {
            rho: 1.2,
            vel: Vec3::new(1.0, 0.0, 0.0),
            p: 0.9,
            turb: Some(TurbPrimitive { k: 1e-3, omega: 5.0 }),
        };
        let u = p.to_cons(&thermo());
        let p2 = u.to_prim(&thermo());
        let tp = p.turb.unwrap();
        let tp2 = p2.turb.unwrap();
        assert!((tp.k - tp2.k).abs() < 1e-12);
        assert!((tp.omega - tp2.omega).abs() < 1e-9);
    }

    #[test]
    fn state_vector_flatten_roundtrip() {
        let u = ConservativeVars {
            rho: 1.0,
            rho_vel: Vec3::new(0.1, 0.2, 0.3),
            rho_e: 2.5,
            turb: Some(TurbConservative { rho_k: 0.01, rho_omega: 0.02 }),
        };
        let v = StateVector::from_conservative(&u);
        assert_eq!(v.arity(), 7);
        let u2 = v.to_conservative();
        assert_eq!(u, u2);
    }

    #[test]
    fn sutherland_is_monotonic_in_temperature() {
        let th = thermo();
        assert!(th.dynamic_viscosity(2.0) > th.dynamic_viscosity(1.0));
    }
}
