//! Boundary-condition surfaces and inter-block patches.

use serde::{Deserialize, Serialize};

/// One of the six logical faces of a block, implied by which index range in
/// a [`SurfaceBc`] collapses to a single plane.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BlockFace {
    ILo,
    IHi,
    JLo,
    JHi,
    KLo,
    KHi,
}

/// Which physical condition a surface enforces.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BcKind {
    SlipWall,
    ViscousWallIsothermal,
    ViscousWallAdiabatic,
    SubsonicInflow,
    SupersonicInflow,
    SubsonicOutflow,
    SupersonicOutflow,
    Farfield,
    Periodic,
    Interblock,
}

impl BcKind {
    /// Whether this kind is resolved purely locally from the mirror
    /// interior cell, vs. needing a remote/partner block's state.
    #[must_use]
    pub fn is_local(&self) -> bool {
        !matches!(self, BcKind::Interblock | BcKind::Periodic)
    }
}

/// Inclusive index range on one block face: `(bcType, iMin, iMax, jMin,
/// jMax, kMin, kMax, tag)`. Exactly one of the three ranges is degenerate
/// (`lo == hi`); that pins the face this surface covers.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SurfaceBc {
    pub kind: BcKind,
    pub i_min: u32,
    pub i_max: u32,
    pub j_min: u32,
    pub j_max: u32,
    pub k_min: u32,
    pub k_max: u32,
    pub tag: u32,
    /// Prescribed wall temperature, read only by `ViscousWallIsothermal`
    /// surfaces; unused (and conventionally `0.0`) for every other kind.
    pub wall_temperature: f64,
}

impl SurfaceBc {
    /// Resolve which of the six faces this surface covers.
    ///
    /// # Panics
    /// Panics if zero or more than one axis is degenerate (malformed deck;
    /// callers ingesting untrusted decks should validate before construction
    /// and surface a `GridError` instead, see `cfd-io`).
    #[must_use]
    pub fn face(&self) -> BlockFace {
        let degenerate = [
            self.i_min == self.i_max,
            self.j_min == self.j_max,
            self.k_min == self.k_max,
        ];
        let count = degenerate.iter().filter(|&&b| b).count();
        assert_eq!(count, 1, "surface must be degenerate along exactly one axis");
        if degenerate[0] {
            if self.i_min == 0 { BlockFace::ILo } else { BlockFace::IHi }
        } else if degenerate[1] {
            if self.j_min == 0 { BlockFace::JLo } else { BlockFace::JHi }
        } else if self.k_min == 0 {
            BlockFace::KLo
        } else {
            BlockFace::KHi
        }
    }
}

/// One of the eight rotation/flip compositions relating two blocks' local
/// 2D `(d1, d2)` surface coordinate systems.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Orientation(pub u8);

impl Orientation {
    pub const IDENTITY: Orientation = Orientation(1);

    /// Map a `(d1, d2)` coordinate on the sending surface (each already
    /// reduced to `0..extent`) to the receiving surface's coordinate system.
    ///
    /// The eight compositions are the dihedral group of the square: swap the
    /// two axes and/or flip each axis.
    #[must_use]
    pub fn map(&self, d1: usize, d2: usize, ext1: usize, ext2: usize) -> (usize, usize) {
        let swap = (self.0 - 1) & 0b001 != 0;
        let flip1 = (self.0 - 1) & 0b010 != 0;
        let flip2 = (self.0 - 1) & 0b100 != 0;
        let (mut a, mut b, mut ea, mut eb) = (d1, d2, ext1, ext2);
        if swap {
            std::mem::swap(&mut a, &mut b);
            std::mem::swap(&mut ea, &mut eb);
        }
        let a = if flip1 { ea - 1 - a } else { a };
        let b = if flip2 { eb - 1 - b } else { b };
        (a, b)
    }

    /// The orientation that undoes `self` (property 6: orientation inversion).
    #[must_use]
    pub fn inverse(&self) -> Orientation {
        // Six of the eight compositions are involutions (swap and/or flip
        // alone square to the identity). Codes 4 and 6 compose a swap with
        // only one axis flip, an order-4 rotation whose square is a point
        // reflection, not the identity; they invert to each other.
        match self.0 {
            4 => Orientation(6),
            6 => Orientation(4),
            _ => *self,
        }
    }
}

/// Point-matched pairing between two blocks' surfaces.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InterblockPatch {
    pub block_a: u32,
    pub surface_a: usize,
    pub block_b: u32,
    pub surface_b: usize,
    pub orientation: Orientation,
}

/// The ordered list of BC surfaces on one block.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct BoundaryConditions {
    pub surfaces: Vec<SurfaceBc>,
}

impl BoundaryConditions {
    #[must_use]
    pub fn surfaces_on(&self, face: BlockFace) -> impl Iterator<Item = &SurfaceBc> {
        self.surfaces.iter().filter(move |s| s.face() == face)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_resolution() {
        let s = SurfaceBc {
            kind: BcKind::SlipWall,
            i_min: 0,
            i_max: 0,
            j_min: 0,
            j_max: 10,
            k_min: 0,
            k_max: 5,
            tag: 1,
            wall_temperature: 0.0,
        };
        assert_eq!(s.face(), BlockFace::ILo);
    }

    #[test]
    fn orientation_identity_is_noop() {
        let o = Orientation::IDENTITY;
        assert_eq!(o.map(2, 3, 10, 10), (2, 3));
    }

    #[test]
    fn every_orientation_inverts_to_itself_and_roundtrips() {
        // Property 6: applying orientation then its inverse yields the original.
        for code in 1u8..=8 {
            let o = Orientation(code);
            let inv = o.inverse();
            for d1 in 0..4 {
                for d2 in 0..6 {
                    let (a, b) = o.map(d1, d2, 4, 6);
                    // Map back using extents appropriate to the transformed space.
                    let (ext1, ext2) = if (code - 1) & 1 != 0 { (6, 4) } else { (4, 6) };
                    let (r1, r2) = inv.map(a, b, ext1, ext2);
                    assert_eq!((r1, r2), (d1, d2), "orientation {code} failed to invert");
                }
            }
        }
    }
}
