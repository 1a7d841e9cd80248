//! Contiguous (i,j,k) storage with a uniform ghost halo, plus borrowed
//! subrange views.

use std::ops::{Add, AddAssign};

/// A dense (i,j,k) array with a uniform ghost halo of width `ghost` on all
/// six faces. Backed by one contiguous buffer, k-outermost (`i` has stride
/// 1) so that sweeps over `i` at fixed `(j,k)` are cache-friendly.
///
/// Interior cells live at logical indices `[ghost, ghost+n)` in each
/// dimension; indices `[0, ghost)` and `[ghost+n, n+2*ghost)` are the halo.
/// A halo-free field (e.g. a staggered face array) is just a
/// `MultiArray3D` with `ghost == 0`.
#[derive(Clone, Debug)]
pub struct MultiArray3D<T> {
    ni: usize,
    nj: usize,
    nk: usize,
    ghost: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> MultiArray3D<T> {
    /// Allocate an array of interior shape `(ni, nj, nk)` with ghost width
    /// `ghost`, filled with `T::default()`.
    #[must_use]
    pub fn new(ni: usize, nj: usize, nk: usize, ghost: usize) -> Self {
        Self::filled(ni, nj, nk, ghost, T::default())
    }
}

impl<T: Clone> MultiArray3D<T> {
    /// Allocate an array of interior shape `(ni, nj, nk)` with ghost width
    /// `ghost`, filled with a clone of `value` (for types without `Default`,
    /// e.g. a [`crate::state::StateVector`] of a particular arity).
    #[must_use]
    pub fn filled(ni: usize, nj: usize, nk: usize, ghost: usize, value: T) -> Self {
        let total = (ni + 2 * ghost) * (nj + 2 * ghost) * (nk + 2 * ghost);
        Self {
            ni,
            nj,
            nk,
            ghost,
            data: vec![value; total],
        }
    }
}

impl<T> MultiArray3D<T> {
    /// Interior extents `(Ni, Nj, Nk)` (not counting ghost cells).
    #[inline]
    #[must_use]
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.ni, self.nj, self.nk)
    }

    #[inline]
    #[must_use]
    pub fn ghost(&self) -> usize {
        self.ghost
    }

    #[inline]
    #[must_use]
    fn total_dims(&self) -> (usize, usize, usize) {
        (
            self.ni + 2 * self.ghost,
            self.nj + 2 * self.ghost,
            self.nk + 2 * self.ghost,
        )
    }

    /// Linear offset of logical index `(i,j,k)`, where `0` is the first
    /// ghost layer and interior cells start at `ghost`.
    #[inline]
    #[must_use]
    pub fn offset(&self, i: usize, j: usize, k: usize) -> usize {
        let (ti, tj, _tk) = self.total_dims();
        debug_assert!(i < ti, "i index {i} out of range {ti}");
        debug_assert!(j < tj, "j index {j} out of range {tj}");
        (k * tj + j) * ti + i
    }

    #[inline]
    #[must_use]
    pub fn get(&self, i: usize, j: usize, k: usize) -> &T {
        &self.data[self.offset(i, j, k)]
    }

    #[inline]
    pub fn get_mut(&mut self, i: usize, j: usize, k: usize) -> &mut T {
        let o = self.offset(i, j, k);
        &mut self.data[o]
    }

    /// The interior index range `[ghost, ghost+N)` for one dimension's
    /// extent `n`.
    #[inline]
    #[must_use]
    pub fn interior_range(&self, n: usize) -> std::ops::Range<usize> {
        self.ghost..(self.ghost + n)
    }

    #[inline]
    #[must_use]
    pub fn interior_i(&self) -> std::ops::Range<usize> {
        self.interior_range(self.ni)
    }

    #[inline]
    #[must_use]
    pub fn interior_j(&self) -> std::ops::Range<usize> {
        self.interior_range(self.nj)
    }

    #[inline]
    #[must_use]
    pub fn interior_k(&self) -> std::ops::Range<usize> {
        self.interior_range(self.nk)
    }

    /// Iterate over all interior `(i,j,k)` index triples in k-outer, i-inner order.
    pub fn interior_indices(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        let ir = self.interior_i();
        let jr = self.interior_j();
        let kr = self.interior_k();
        kr.flat_map(move |k| {
            let ir = ir.clone();
            jr.clone()
                .flat_map(move |j| ir.clone().map(move |i| (i, j, k)))
        })
    }

    /// Borrow a rectangular subrange as a read-only view with its own
    /// strides into the parent buffer.
    #[must_use]
    pub fn view(
        &self,
        i: std::ops::Range<usize>,
        j: std::ops::Range<usize>,
        k: std::ops::Range<usize>,
    ) -> View3<'_, T> {
        let (ti, tj, _tk) = self.total_dims();
        View3 {
            data: &self.data,
            base: (k.start * tj + j.start) * ti + i.start,
            strides: (1, ti, ti * tj),
            extents: (i.len(), j.len(), k.len()),
        }
    }

    /// Borrow a rectangular subrange as a mutable view; writes through the
    /// view mutate this array in place.
    #[must_use]
    pub fn view_mut(
        &mut self,
        i: std::ops::Range<usize>,
        j: std::ops::Range<usize>,
        k: std::ops::Range<usize>,
    ) -> View3Mut<'_, T> {
        let (ti, tj, _tk) = self.total_dims();
        let base = (k.start * tj + j.start) * ti + i.start;
        View3Mut {
            data: &mut self.data,
            base,
            strides: (1, ti, ti * tj),
            extents: (i.len(), j.len(), k.len()),
        }
    }
}

impl<T: Clone + Add<Output = T>> Add for MultiArray3D<T> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        debug_assert_eq!(self.dims(), rhs.dims(), "shape mismatch in MultiArray3D::add");
        debug_assert_eq!(self.ghost, rhs.ghost, "ghost mismatch in MultiArray3D::add");
        for (a, b) in self.data.iter_mut().zip(rhs.data.into_iter()) {
            *a = a.clone() + b;
        }
        self
    }
}

impl<T: Clone + AddAssign> AddAssign<&MultiArray3D<T>> for MultiArray3D<T> {
    fn add_assign(&mut self, rhs: &MultiArray3D<T>) {
        debug_assert_eq!(self.dims(), rhs.dims(), "shape mismatch in MultiArray3D::add_assign");
        debug_assert_eq!(self.ghost, rhs.ghost, "ghost mismatch in MultiArray3D::add_assign");
        for (a, b) in self.data.iter_mut().zip(rhs.data.iter()) {
            *a += b.clone();
        }
    }
}

/// A borrowed, read-only rectangular subrange of a [`MultiArray3D`], with its
/// own strides into the parent's buffer.
pub struct View3<'a, T> {
    data: &'a [T],
    base: usize,
    strides: (usize, usize, usize),
    extents: (usize, usize, usize),
}

impl<T> View3<'_, T> {
    #[inline]
    #[must_use]
    pub fn extents(&self) -> (usize, usize, usize) {
        self.extents
    }

    #[inline]
    #[must_use]
    pub fn get(&self, i: usize, j: usize, k: usize) -> &T {
        let (si, sj, sk) = self.strides;
        &self.data[self.base + i * si + j * sj + k * sk]
    }
}

/// A borrowed, mutable rectangular subrange of a [`MultiArray3D`]. Writes
/// through this view mutate the parent array.
pub struct View3Mut<'a, T> {
    data: &'a mut [T],
    base: usize,
    strides: (usize, usize, usize),
    extents: (usize, usize, usize),
}

impl<T> View3Mut<'_, T> {
    #[inline]
    #[must_use]
    pub fn extents(&self) -> (usize, usize, usize) {
        self.extents
    }

    #[inline]
    #[must_use]
    pub fn get(&self, i: usize, j: usize, k: usize) -> &T {
        let (si, sj, sk) = self.strides;
        &self.data[self.base + i * si + j * sj + k * sk]
    }

    #[inline]
    pub fn get_mut(&mut self, i: usize, j: usize, k: usize) -> &mut T {
        let (si, sj, sk) = self.strides;
        let idx = self.base + i * si + j * sj + k * sk;
        &mut self.data[idx]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, k: usize, value: T) {
        *self.get_mut(i, j, k) = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_range_matches_spec() {
        let a = MultiArray3D::<f64>::new(4, 3, 2, 2);
        assert_eq!(a.interior_i(), 2..6);
        assert_eq!(a.interior_j(), 2..5);
        assert_eq!(a.interior_k(), 2..4);
    }

    #[test]
    fn get_set_roundtrip() {
        let mut a = MultiArray3D::<f64>::new(2, 2, 2, 1);
        *a.get_mut(1, 1, 1) = 42.0;
        assert_eq!(*a.get(1, 1, 1), 42.0);
    }

    #[test]
    fn interior_indices_count() {
        let a = MultiArray3D::<f64>::new(3, 2, 1, 2);
        assert_eq!(a.interior_indices().count(), 3 * 2 * 1);
    }

    #[test]
    fn componentwise_add() {
        let mut a = MultiArray3D::<f64>::new(2, 2, 2, 0);
        let mut b = MultiArray3D::<f64>::new(2, 2, 2, 0);
        *a.get_mut(0, 0, 0) = 1.0;
        *b.get_mut(0, 0, 0) = 2.0;
        let c = a + b;
        assert_eq!(*c.get(0, 0, 0), 3.0);
    }

    #[test]
    fn view_mut_writes_through_to_parent() {
        let mut a = MultiArray3D::<f64>::new(4, 4, 4, 2);
        {
            let mut v = a.view_mut(2..4, 2..4, 2..4);
            v.set(0, 0, 0, 99.0);
        }
        assert_eq!(*a.get(2, 2, 2), 99.0);
    }

    #[test]
    fn view_extents_match_requested_range() {
        let a = MultiArray3D::<f64>::new(4, 4, 4, 2);
        let v = a.view(2..4, 2..3, 2..4);
        assert_eq!(v.extents(), (2, 1, 2));
    }
}
