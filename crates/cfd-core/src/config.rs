//! The single configuration record supplied by the input-deck collaborator,
//! plus the two knobs that control positivity retries and residual
//! normalization.

use serde::{Deserialize, Serialize};

/// Reference (dimensional) state used to nondimensionalize the solve.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ReferenceState {
    pub rho_ref: f64,
    pub t_ref: f64,
    pub length_ref: f64,
}

impl Default for ReferenceState {
    fn default() -> Self {
        Self { rho_ref: 1.225, t_ref: 288.15, length_ref: 1.0 }
    }
}

/// CFL ramp: linear interpolation from `start` to `end` over `ramp_iters`
/// outer iterations, then held at `end`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct CflSchedule {
    pub start: f64,
    pub end: f64,
    pub ramp_iters: u32,
}

impl CflSchedule {
    #[must_use]
    pub fn constant(cfl: f64) -> Self {
        Self { start: cfl, end: cfl, ramp_iters: 0 }
    }

    #[must_use]
    pub fn at_iteration(&self, n: u32) -> f64 {
        if self.ramp_iters == 0 || n >= self.ramp_iters {
            self.end
        } else {
            let frac = f64::from(n) / f64::from(self.ramp_iters);
            self.start + frac * (self.end - self.start)
        }
    }
}

/// Local (per-cell Δt from CFL) or global (fixed Δt / synchronized min
/// across the domain) time-stepping selection.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub enum TimeStepMode {
    /// Each cell advances with its own Δt derived from `cfl` (steady marches).
    LocalCfl { cfl: CflSchedule },
    /// A single Δt, either fixed or derived from a global CFL Allreduce.
    GlobalFixed { dt: f64 },
}

/// Explicit vs. implicit update scheme.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum IntegrationScheme {
    /// Multi-stage SSP Runge-Kutta with `stages` stages.
    ExplicitRungeKutta { stages: u8 },
    /// LU-SGS implicit sweeps.
    ImplicitLuSgs,
}

/// Turbulence model selection.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TurbulenceModelKind {
    Laminar,
    KOmegaWilcox,
    MenterSst,
    SstDes,
    WaleLes,
}

/// Near-wall treatment. `AutoHysteresis` requires crossing
/// `y_plus_hysteresis` past the nominal 10.0 threshold before flipping, in
/// either direction, to avoid chatter near convergence.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub enum WallTreatment {
    LowRe,
    WallLaw,
    AutoHysteresis { y_plus_hysteresis: f64 },
}

/// LU-SGS / any future linear solver's sweep budget and tolerance.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct LinearSolverConfig {
    pub max_sweeps: u32,
    pub relative_tolerance: f64,
}

impl Default for LinearSolverConfig {
    fn default() -> Self {
        Self { max_sweeps: 10, relative_tolerance: 1.0e-3 }
    }
}

/// Uniform initial/freestream condition, specified the way an input deck
/// typically does: Mach number and flow angles rather than raw velocity
/// components. Also the reference state `Farfield`/`SubsonicInflow` ghost
/// fills fall back to.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct FreestreamState {
    pub mach: f64,
    pub alpha_deg: f64,
    pub beta_deg: f64,
    pub turbulent: bool,
    /// Freestream turbulence intensity as a fraction of freestream speed.
    pub turbulence_intensity: f64,
    /// Freestream eddy-to-laminar viscosity ratio, used to back out ω from k.
    pub turbulent_viscosity_ratio: f64,
}

impl Default for FreestreamState {
    fn default() -> Self {
        Self {
            mach: 0.2,
            alpha_deg: 0.0,
            beta_deg: 0.0,
            turbulent: false,
            turbulence_intensity: 0.01,
            turbulent_viscosity_ratio: 10.0,
        }
    }
}

impl FreestreamState {
    /// Nondimensional primitive state this freestream corresponds to,
    /// assuming `rho = 1`, `p = 1/gamma` (so that `a = 1`).
    #[must_use]
    pub fn to_primitive(&self, thermo: &dyn crate::state::Thermodynamics) -> crate::state::PrimitiveVars {
        let rho = 1.0;
        let p = 1.0 / thermo.gamma();
        let c = thermo.sound_speed(rho, p);
        let speed = self.mach * c;
        let alpha = self.alpha_deg.to_radians();
        let beta = self.beta_deg.to_radians();
        let vel = crate::vecmath::Vec3::new(speed * alpha.cos() * beta.cos(), speed * alpha.sin() * beta.cos(), speed * beta.sin());

        let turb = if self.turbulent {
            let k = (1.5 * (speed * self.turbulence_intensity).powi(2)).max(1.0e-12);
            let mu = thermo.dynamic_viscosity(thermo.temperature(rho, p));
            let mu_t = (self.turbulent_viscosity_ratio * mu).max(1.0e-12);
            let omega = (rho * k / mu_t).max(1.0e-6);
            Some(crate::state::TurbPrimitive { k, omega })
        } else {
            None
        };
        crate::state::PrimitiveVars { rho, vel, p, turb }
    }
}

/// Slope limiter used by MUSCL reconstruction.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum LimiterKind {
    MinMod,
    VanAlbada,
}

/// The top-level solver configuration: everything the CLI/config record
/// needs to describe one run.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub case_name: String,
    pub reference: ReferenceState,
    pub freestream: FreestreamState,
    pub time_step: TimeStepMode,
    pub scheme: IntegrationScheme,
    pub linear_solver: LinearSolverConfig,
    pub turbulence: TurbulenceModelKind,
    pub wall_treatment: WallTreatment,
    pub limiter: LimiterKind,
    pub ghost_width: usize,
    /// Outer iterations between solution-file writes.
    pub output_frequency: u32,
    pub output_variables: Vec<String>,
    pub max_outer_iterations: u32,
    /// Positivity-retry budget per implicit step.
    pub max_step_retries: u32,
    /// Number of leading outer iterations whose max L2 sets `L2_ref`
    /// (default 5).
    pub residual_reference_window: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            case_name: "case".to_string(),
            reference: ReferenceState::default(),
            freestream: FreestreamState::default(),
            time_step: TimeStepMode::LocalCfl { cfl: CflSchedule::constant(1.0) },
            scheme: IntegrationScheme::ImplicitLuSgs,
            linear_solver: LinearSolverConfig::default(),
            turbulence: TurbulenceModelKind::Laminar,
            wall_treatment: WallTreatment::LowRe,
            limiter: LimiterKind::VanAlbada,
            ghost_width: 2,
            output_frequency: 100,
            output_variables: vec![
                "density".to_string(),
                "pressure".to_string(),
                "vel_x".to_string(),
                "vel_y".to_string(),
                "vel_z".to_string(),
            ],
            max_outer_iterations: 1000,
            max_step_retries: 5,
            residual_reference_window: 5,
        }
    }
}

impl Config {
    /// Parse a `Config` from a JSON document.
    pub fn from_json(s: &str) -> Result<Self, crate::error::SolverError> {
        serde_json::from_str(s).map_err(|e| crate::error::SolverError::Config(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, crate::error::SolverError> {
        serde_json::to_string_pretty(self).map_err(|e| crate::error::SolverError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cfl_schedule_ramps_linearly() {
        let sched = CflSchedule { start: 1.0, end: 5.0, ramp_iters: 4 };
        assert!((sched.at_iteration(0) - 1.0).abs() < 1e-12);
        assert!((sched.at_iteration(2) - 3.0).abs() < 1e-12);
        assert!((sched.at_iteration(10) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn config_json_roundtrip() {
        let cfg = Config::default();
        let s = cfg.to_json_pretty().unwrap();
        let cfg2 = Config::from_json(&s).unwrap();
        assert_eq!(cfg, cfg2);
    }
}
