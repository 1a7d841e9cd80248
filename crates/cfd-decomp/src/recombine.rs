//! Replay a [`crate::split::Decomposition`] in reverse to merge per-leaf
//! field data back into the shape of its pre-split parent block. Geometry
//! is not re-derived here: the original node coordinates are the
//! authoritative source and splitting never destroys them, so recombination
//! only needs to place each leaf's cell values at the right offset.

use crate::split::{Axis, Decomposition};
use cfd_core::MultiArray3D;

/// One interior cell value collected from a leaf block, tagged with its
/// `(i, j, k)` position in the root block's interior index space.
#[derive(Clone, Copy, Debug)]
pub struct PlacedCell<T> {
    pub i: u32,
    pub j: u32,
    pub k: u32,
    pub value: T,
}

/// Gather every interior cell of `leaf` (an array with ghost width `ghost`)
/// into root-relative `PlacedCell`s, using `decomposition` to translate the
/// leaf's local offsets back to the root block's coordinate system.
pub fn place_leaf_cells<T: Clone>(
    decomposition: &Decomposition,
    leaf_block: u32,
    leaf: &MultiArray3D<T>,
) -> Vec<PlacedCell<T>> {
    let (root, oi, oj, ok) = decomposition.locate_in_root(leaf_block);
    let _ = root;
    let ghost = leaf.ghost();
    let (ni, nj, nk) = leaf.dims();
    let mut out = Vec::with_capacity(ni * nj * nk);
    for k in 0..nk {
        for j in 0..nj {
            for i in 0..ni {
                let value = leaf.get(i + ghost, j + ghost, k + ghost).clone();
                out.push(PlacedCell {
                    i: oi + i as u32,
                    j: oj + j as u32,
                    k: ok + k as u32,
                    value,
                });
            }
        }
    }
    out
}

/// Scatter a set of `PlacedCell`s produced across every leaf of one root
/// block into a freshly allocated root-shaped array (no ghost halo: this is
/// meant for output/reduction, not for further stencil computation).
pub fn recombine_into<T: Clone + Default>(
    root_ni: usize,
    root_nj: usize,
    root_nk: usize,
    placed: impl IntoIterator<Item = PlacedCell<T>>,
) -> MultiArray3D<T> {
    let mut out = MultiArray3D::new(root_ni, root_nj, root_nk, 0);
    for cell in placed {
        *out.get_mut(cell.i as usize, cell.j as usize, cell.k as usize) = cell.value;
    }
    out
}

/// Whether a [`Decomposition`]'s splits, replayed forward from the root,
/// exactly tile the root's interior with no gaps or overlaps along `axis`.
/// Used by tests and by `cfd-io` before trusting a decomposition to place
/// output.
#[must_use]
pub fn covers_axis_exactly(decomposition: &Decomposition, root_extent: u32, axis: Axis) -> bool {
    let mut endpoints: Vec<u32> = decomposition
        .splits
        .iter()
        .filter(|s| s.axis == axis)
        .flat_map(|s| [s.lower_span.lo, s.lower_span.hi, s.upper_span.lo, s.upper_span.hi])
        .collect();
    if endpoints.is_empty() {
        return true;
    }
    endpoints.sort_unstable();
    endpoints.dedup();
    endpoints.first() == Some(&0) && endpoints.last() == Some(&root_extent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::Decomposition;

    #[test]
    fn placing_then_recombining_every_leaf_reproduces_the_root_field() {
        let mut decomp = Decomposition::new();
        let mut next_id = 1;
        let leaves = decomp.split_for_parallelism(0, 6, 4, 1, 3, &mut next_id);

        let mut placed_all = Vec::new();
        for &(id, ni, nj, nk) in &leaves {
            let mut leaf_field: MultiArray3D<f64> =
                MultiArray3D::new(ni as usize, nj as usize, nk as usize, 1);
            for k in 0..nk {
                for j in 0..nj {
                    for i in 0..ni {
                        *leaf_field.get_mut((i + 1) as usize, (j + 1) as usize, (k + 1) as usize) =
                            f64::from(id);
                    }
                }
            }
            placed_all.extend(place_leaf_cells(&decomp, id, &leaf_field));
        }

        let root = recombine_into(6, 4, 1, placed_all);
        for k in 0..1 {
            for j in 0..4 {
                for i in 0..6 {
                    assert!(*root.get(i, j, k) > 0.0, "cell ({i},{j},{k}) was never written");
                }
            }
        }
    }

    #[test]
    fn covers_axis_exactly_is_true_for_a_clean_split_and_false_for_a_gap() {
        let mut decomp = Decomposition::new();
        let mut next_id = 1;
        decomp.split_for_parallelism(0, 8, 1, 1, 4, &mut next_id);
        assert!(covers_axis_exactly(&decomp, 8, Axis::I));
        assert!(!covers_axis_exactly(&decomp, 9, Axis::I));
    }
}
