//! Slope limiters for MUSCL reconstruction.

use cfd_core::LimiterKind;

/// Evaluate a limiter on consecutive differences `a = u_i - u_{i-1}`,
/// `b = u_{i+1} - u_i`. Returns a limited slope magnitude with the sign of
/// `a`/`b` (zero when they disagree in sign, i.e. at a local extremum).
#[inline]
#[must_use]
pub fn limit(kind: LimiterKind, a: f64, b: f64) -> f64 {
    match kind {
        LimiterKind::MinMod => minmod(a, b),
        LimiterKind::VanAlbada => van_albada(a, b),
    }
}

#[inline]
#[must_use]
fn minmod(a: f64, b: f64) -> f64 {
    if a * b <= 0.0 {
        0.0
    } else if a.abs() < b.abs() {
        a
    } else {
        b
    }
}

#[inline]
#[must_use]
fn van_albada(a: f64, b: f64) -> f64 {
    if a * b <= 0.0 {
        return 0.0;
    }
    let eps = 1e-12;
    (a * b * (a + b)) / (a * a + b * b + eps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minmod_picks_smaller_magnitude_same_sign() {
        assert_eq!(minmod(1.0, 2.0), 1.0);
        assert_eq!(minmod(2.0, 1.0), 1.0);
        assert_eq!(minmod(-1.0, -2.0), -1.0);
    }

    #[test]
    fn limiters_vanish_at_local_extremum() {
        assert_eq!(minmod(1.0, -1.0), 0.0);
        assert_eq!(van_albada(1.0, -1.0), 0.0);
    }

    #[test]
    fn van_albada_is_bounded_by_inputs() {
        let v = van_albada(1.0, 3.0);
        assert!(v >= 0.0 && v <= 3.0);
    }
}
