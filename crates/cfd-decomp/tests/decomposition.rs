//! Properties of recursive block splitting that should hold for arbitrary
//! block extents and rank counts, not just the fixed examples in each
//! module's own inline tests.

use cfd_core::MultiArray3D;
use cfd_decomp::{covers_axis_exactly, place_leaf_cells, recombine_into, Axis, Decomposition};
use proptest::prelude::*;

proptest! {
    /// Property 4 (decomposition bijection): splitting a block into leaves
    /// and recombining every leaf's interior cells reproduces a field over
    /// the full root extent exactly once per cell, for any extents and any
    /// target rank count.
    #[test]
    fn split_then_recombine_covers_every_cell_exactly_once(
        ni in 1u32..24, nj in 1u32..24, nk in 1u32..12, target_ranks in 1u32..16,
    ) {
        let mut decomp = Decomposition::new();
        let mut next_id = 1;
        let leaves = decomp.split_for_parallelism(0, ni, nj, nk, target_ranks, &mut next_id);

        let total_cells: u64 = leaves.iter().map(|&(_, li, lj, lk)| u64::from(li) * u64::from(lj) * u64::from(lk)).sum();
        prop_assert_eq!(total_cells, u64::from(ni) * u64::from(nj) * u64::from(nk));

        let mut placed = Vec::new();
        for &(id, li, lj, lk) in &leaves {
            let mut field: MultiArray3D<u32> = MultiArray3D::new(li as usize, lj as usize, lk as usize, 0);
            for k in 0..lk as usize {
                for j in 0..lj as usize {
                    for i in 0..li as usize {
                        *field.get_mut(i, j, k) = id;
                    }
                }
            }
            placed.extend(place_leaf_cells(&decomp, id, &field));
        }

        let mut seen = vec![false; (ni as usize) * (nj as usize) * (nk as usize)];
        for cell in &placed {
            let idx = (cell.k as usize * nj as usize + cell.j as usize) * ni as usize + cell.i as usize;
            prop_assert!(!seen[idx], "cell ({}, {}, {}) covered twice", cell.i, cell.j, cell.k);
            seen[idx] = true;
        }
        prop_assert!(seen.iter().all(|&s| s), "every cell of the root must be covered");

        let root = recombine_into(ni as usize, nj as usize, nk as usize, placed);
        for k in 0..nk as usize {
            for j in 0..nj as usize {
                for i in 0..ni as usize {
                    prop_assert!(leaves.iter().any(|&(id, ..)| id == *root.get(i, j, k)));
                }
            }
        }
    }

    /// Property 5 (split-locator correctness): `locate_in_root` resolves
    /// every leaf back to block 0 with an offset inside the root's extent,
    /// for any extents and rank count.
    #[test]
    fn locate_in_root_stays_within_bounds(ni in 1u32..24, nj in 1u32..24, nk in 1u32..12, target_ranks in 1u32..16) {
        let mut decomp = Decomposition::new();
        let mut next_id = 1;
        let leaves = decomp.split_for_parallelism(0, ni, nj, nk, target_ranks, &mut next_id);

        for &(id, li, lj, lk) in &leaves {
            let (root, oi, oj, ok) = decomp.locate_in_root(id);
            prop_assert_eq!(root, 0);
            prop_assert!(oi + li <= ni);
            prop_assert!(oj + lj <= nj);
            prop_assert!(ok + lk <= nk);
        }
    }

    /// `SplitBlockNumber`: every global cell in the root queried forward
    /// through `split_block_number` resolves to a leaf that `locate_in_root`
    /// agrees owns it, for any extents and rank count.
    #[test]
    fn split_block_number_agrees_with_locate_in_root_for_every_cell(
        ni in 1u32..16, nj in 1u32..16, nk in 1u32..8, target_ranks in 1u32..16,
    ) {
        let mut decomp = Decomposition::new();
        let mut next_id = 1;
        let leaves = decomp.split_for_parallelism(0, ni, nj, nk, target_ranks, &mut next_id);

        for i in 0..ni {
            for j in 0..nj {
                for k in 0..nk {
                    let (leaf, li, lj, lk) = decomp.split_block_number(0, i, j, k);
                    let (_, leaf_ni, leaf_nj, leaf_nk) = *leaves.iter().find(|&&(id, ..)| id == leaf).expect("resolved leaf must be an actual leaf");
                    prop_assert!(li < leaf_ni && lj < leaf_nj && lk < leaf_nk);

                    let (root, oi, oj, ok) = decomp.locate_in_root(leaf);
                    prop_assert_eq!(root, 0);
                    prop_assert_eq!((oi + li, oj + lj, ok + lk), (i, j, k));
                }
            }
        }
    }

    /// A clean split always tiles its axis with no gaps; an extent that
    /// doesn't match the decomposition's own root extent never does.
    #[test]
    fn covers_axis_exactly_agrees_with_the_decomposition_s_own_extent(ni in 2u32..32, target_ranks in 2u32..8) {
        let mut decomp = Decomposition::new();
        let mut next_id = 1;
        decomp.split_for_parallelism(0, ni, 1, 1, target_ranks, &mut next_id);
        prop_assert!(covers_axis_exactly(&decomp, ni, Axis::I));
        prop_assert!(!covers_axis_exactly(&decomp, ni + 1, Axis::I));
    }
}
