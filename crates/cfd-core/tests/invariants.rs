//! Algebraic invariants of the primitive/conservative state conversion and
//! of a few small value types that a physically meaningful run depends on
//! holding everywhere, not just on the examples exercised by unit tests.

use cfd_core::{Config, PerfectGasSutherland, PrimitiveVars, Thermodynamics, TurbPrimitive, Vec3};
use proptest::prelude::*;

fn admissible_state() -> impl Strategy<Value = (f64, f64, f64, f64, f64)> {
    (0.05_f64..20.0, -50.0_f64..50.0, -50.0_f64..50.0, -50.0_f64..50.0, 0.01_f64..50.0)
}

proptest! {
    /// Property 1: for every admissible primitive state, converting to
    /// conservative and back recovers the original state to 1e-9 relative.
    #[test]
    fn primitive_conservative_round_trip((rho, u, v, w, p) in admissible_state()) {
        let thermo = PerfectGasSutherland::air_nondimensional();
        let prim = PrimitiveVars::laminar(rho, Vec3::new(u, v, w), p);
        let cons = prim.to_cons(&thermo);
        let back = cons.to_prim(&thermo);

        prop_assert!((back.rho - prim.rho).abs() < 1e-9 * prim.rho.max(1.0));
        prop_assert!((back.vel.x - prim.vel.x).abs() < 1e-9 * prim.vel.x.abs().max(1.0));
        prop_assert!((back.vel.y - prim.vel.y).abs() < 1e-9 * prim.vel.y.abs().max(1.0));
        prop_assert!((back.vel.z - prim.vel.z).abs() < 1e-9 * prim.vel.z.abs().max(1.0));
        prop_assert!((back.p - prim.p).abs() < 1e-9 * prim.p.max(1.0));
    }

    /// Same round trip, with a turbulent `{k, omega}` pair carried along.
    #[test]
    fn primitive_conservative_round_trip_with_turbulence((rho, u, v, w, p) in admissible_state(), k in 1e-6_f64..10.0, omega in 1e-3_f64..1e4) {
        let thermo = PerfectGasSutherland::air_nondimensional();
        let mut prim = PrimitiveVars::laminar(rho, Vec3::new(u, v, w), p);
        prim.turb = Some(TurbPrimitive { k, omega });
        let back = prim.to_cons(&thermo).to_prim(&thermo);

        let turb_back = back.turb.expect("turbulence carried through to_cons/to_prim");
        prop_assert!((turb_back.k - k).abs() < 1e-9 * k.max(1.0));
        prop_assert!((turb_back.omega - omega).abs() < 1e-9 * omega.max(1.0));
    }
}

#[test]
fn non_positive_density_or_pressure_is_not_physical() {
    let thermo = PerfectGasSutherland::air_nondimensional();
    let good = PrimitiveVars::laminar(1.0, Vec3::new(0.1, 0.0, 0.0), 1.0);
    assert!(good.is_physical());
    let _ = good.to_cons(&thermo);

    assert!(!PrimitiveVars::laminar(0.0, Vec3::new(0.1, 0.0, 0.0), 1.0).is_physical());
    assert!(!PrimitiveVars::laminar(1.0, Vec3::new(0.1, 0.0, 0.0), -0.1).is_physical());
}

#[test]
fn default_config_round_trips_through_json() {
    let cfg = Config::default();
    let text = cfg.to_json_pretty().unwrap();
    let back = Config::from_json(&text).unwrap();
    assert_eq!(cfg, back);
}
