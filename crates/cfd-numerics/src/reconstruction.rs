//! MUSCL reconstruction of left/right face states from a 4-point stencil.

use cfd_core::{LimiterKind, NumericalError, PrimitiveVars, TurbPrimitive};

use crate::limiter::limit;

/// The sweep direction a face belongs to, for error reporting only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    I,
    J,
    K,
}

impl Direction {
    /// Numeric code matching [`cfd_core::NumericalError::ReconstructionFailure`]'s `dir` field.
    #[must_use]
    pub fn as_code(self) -> u8 {
        match self {
            Direction::I => 0,
            Direction::J => 1,
            Direction::K => 2,
        }
    }
}

/// Flatten a [`PrimitiveVars`] into a fixed-size field array so the limiter
/// can be applied componentwise without duplicating code per field.
fn fields(p: &PrimitiveVars) -> [f64; 7] {
    let (k, omega) = match p.turb {
        Some(t) => (t.k, t.omega),
        None => (0.0, 0.0),
    };
    [p.rho, p.vel.x, p.vel.y, p.vel.z, p.p, k, omega]
}

fn from_fields(f: [f64; 7], turbulent: bool) -> PrimitiveVars {
    PrimitiveVars {
        rho: f[0],
        vel: cfd_core::Vec3::new(f[1], f[2], f[3]),
        p: f[4],
        turb: turbulent.then_some(TurbPrimitive { k: f[5], omega: f[6] }),
    }
}

/// MUSCL-reconstruct the left (from `left` side) and right (from `right`
/// side) states at the face between `left` and `right`, using `far_left` and
/// `far_right` as the extended stencil.
///
/// Falls back to first-order (piecewise-constant) on the side that would
/// otherwise produce a non-physical state; returns
/// [`NumericalError::ReconstructionFailure`] if first order is *also*
/// non-physical, which only happens from already-corrupted input state.
pub fn reconstruct_face(
    kind: LimiterKind,
    far_left: PrimitiveVars,
    left: PrimitiveVars,
    right: PrimitiveVars,
    far_right: PrimitiveVars,
    block: usize,
    i: usize,
    j: usize,
    k: usize,
    dir: Direction,
) -> Result<(PrimitiveVars, PrimitiveVars), NumericalError> {
    let turbulent = left.turb.is_some();
    let ffl = fields(&far_left);
    let fl = fields(&left);
    let fr = fields(&right);
    let ffr = fields(&far_right);

    let mut left_face = [0.0; 7];
    let mut right_face = [0.0; 7];
    for idx in 0..7 {
        let a_l = fl[idx] - ffl[idx];
        let b_l = fr[idx] - fl[idx];
        left_face[idx] = 0.5f64.mul_add(limit(kind, a_l, b_l), fl[idx]);

        let a_r = fr[idx] - fl[idx];
        let b_r = ffr[idx] - fr[idx];
        right_face[idx] = fr[idx] - 0.5 * limit(kind, a_r, b_r);
    }

    let mut state_l = from_fields(left_face, turbulent);
    let mut state_r = from_fields(right_face, turbulent);

    if !state_l.is_physical() {
        state_l = left;
    }
    if !state_r.is_physical() {
        state_r = right;
    }
    if !state_l.is_physical() || !state_r.is_physical() {
        return Err(NumericalError::ReconstructionFailure {
            block: block as u32,
            i: i as u32,
            j: j as u32,
            k: k as u32,
            dir: dir.as_code(),
        });
    }

    Ok((state_l, state_r))
}
