//! 3-component vector and 3x3 tensor algebra used by gradients and fluxes.

use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, Neg, Sub, SubAssign};

/// A 3-component vector (position, velocity, face normal, gradient of a scalar, ...).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    #[inline]
    #[must_use]
    pub fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline]
    #[must_use]
    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    #[inline]
    #[must_use]
    pub fn mag(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector along `self`. Returns the zero vector if `self` has zero magnitude.
    #[inline]
    #[must_use]
    pub fn unit(self) -> Self {
        let m = self.mag();
        if m > 0.0 {
            self / m
        } else {
            Self::zero()
        }
    }

    /// Outer product `self * rhs^T`, used to build stress-tensor-like dyads.
    #[inline]
    #[must_use]
    pub fn outer(self, rhs: Self) -> Tensor3 {
        Tensor3::from_rows(
            Vec3::new(self.x * rhs.x, self.x * rhs.y, self.x * rhs.z),
            Vec3::new(self.y * rhs.x, self.y * rhs.y, self.y * rhs.z),
            Vec3::new(self.z * rhs.x, self.z * rhs.y, self.z * rhs.z),
        )
    }
}

impl Add for Vec3 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vec3 {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Vec3 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;
    #[inline]
    fn div(self, rhs: f64) -> Self {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Index<usize> for Vec3 {
    type Output = f64;
    #[inline]
    fn index(&self, i: usize) -> &f64 {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vec3 index {i} out of range"),
        }
    }
}

/// A 3x3 tensor, used for velocity gradients and the viscous stress tensor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tensor3 {
    /// Rows of the tensor (row-major).
    pub rows: [Vec3; 3],
}

impl Tensor3 {
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            rows: [Vec3::zero(), Vec3::zero(), Vec3::zero()],
        }
    }

    #[inline]
    #[must_use]
    pub const fn from_rows(r0: Vec3, r1: Vec3, r2: Vec3) -> Self {
        Self { rows: [r0, r1, r2] }
    }

    #[inline]
    #[must_use]
    pub fn identity() -> Self {
        Self::from_rows(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        )
    }

    /// Trace (sum of diagonal entries); for a velocity gradient this is `∇·u`.
    #[inline]
    #[must_use]
    pub fn trace(&self) -> f64 {
        self.rows[0].x + self.rows[1].y + self.rows[2].z
    }

    #[inline]
    #[must_use]
    pub fn transpose(&self) -> Self {
        Self::from_rows(
            Vec3::new(self.rows[0].x, self.rows[1].x, self.rows[2].x),
            Vec3::new(self.rows[0].y, self.rows[1].y, self.rows[2].y),
            Vec3::new(self.rows[0].z, self.rows[1].z, self.rows[2].z),
        )
    }

    /// `self * v`, contracting a tensor against a vector.
    #[inline]
    #[must_use]
    pub fn apply(&self, v: Vec3) -> Vec3 {
        Vec3::new(self.rows[0].dot(v), self.rows[1].dot(v), self.rows[2].dot(v))
    }

    #[inline]
    #[must_use]
    pub fn scale(&self, s: f64) -> Self {
        Self::from_rows(self.rows[0] * s, self.rows[1] * s, self.rows[2] * s)
    }
}

impl Index<usize> for Tensor3 {
    type Output = Vec3;
    #[inline]
    fn index(&self, i: usize) -> &Vec3 {
        &self.rows[i]
    }
}

impl IndexMut<usize> for Tensor3 {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut Vec3 {
        &mut self.rows[i]
    }
}

impl Add for Tensor3 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::from_rows(
            self.rows[0] + rhs.rows[0],
            self.rows[1] + rhs.rows[1],
            self.rows[2] + rhs.rows[2],
        )
    }
}

impl Sub for Tensor3 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::from_rows(
            self.rows[0] - rhs.rows[0],
            self.rows[1] - rhs.rows[1],
            self.rows[2] - rhs.rows[2],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_and_cross() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(a.dot(b), 0.0);
        assert_eq!(a.cross(b), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn unit_of_zero_is_zero() {
        assert_eq!(Vec3::zero().unit(), Vec3::zero());
    }

    #[test]
    fn tensor_trace_of_identity() {
        assert_eq!(Tensor3::identity().trace(), 3.0);
    }

    #[test]
    fn tensor_transpose_involution() {
        let t = Tensor3::from_rows(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::new(7.0, 8.0, 9.0),
        );
        assert_eq!(t.transpose().transpose(), t);
    }
}
