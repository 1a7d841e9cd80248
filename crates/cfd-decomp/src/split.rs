//! Recursive balanced splitting of blocks across ranks, and the split
//! history used to recombine results or locate a leaf block's position in
//! the original (pre-split) mesh.

use crate::span::Span;

/// The axis a [`Split`] cut along.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    I,
    J,
    K,
}

/// One axis-aligned cut of `parent_block` into two children, each owning a
/// contiguous [`Span`] of the parent's interior index range along `axis`
/// (the other two axes are untouched and span the parent's full extent).
#[derive(Clone, Copy, Debug)]
pub struct Split {
    pub parent_block: u32,
    pub lower_block: u32,
    pub upper_block: u32,
    pub axis: Axis,
    pub lower_span: Span,
    pub upper_span: Span,
}

/// The full history of cuts applied to reach the current set of leaf blocks
/// from some original (pre-split) mesh, in the order they were applied.
#[derive(Clone, Debug, Default)]
pub struct Decomposition {
    pub splits: Vec<Split>,
}

impl Decomposition {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recursively split `block_id` (with interior extents `ni, nj, nk`)
    /// into `target_ranks` leaf blocks of roughly equal cell count, cutting
    /// the longest remaining axis at each step (a simple, deterministic
    /// load-balancing heuristic). Leaf block ids are assigned depth-first
    /// starting at `next_id`.
    ///
    /// Returns the leaf blocks as `(block_id, ni, nj, nk)` in assignment
    /// order, alongside the recorded splits (self is mutated to append them).
    pub fn split_for_parallelism(
        &mut self,
        block_id: u32,
        ni: u32,
        nj: u32,
        nk: u32,
        target_ranks: u32,
        next_id: &mut u32,
    ) -> Vec<(u32, u32, u32, u32)> {
        if target_ranks <= 1 || (ni <= 1 && nj <= 1 && nk <= 1) {
            return vec![(block_id, ni, nj, nk)];
        }

        let axis = if ni >= nj && ni >= nk {
            Axis::I
        } else if nj >= ni && nj >= nk {
            Axis::J
        } else {
            Axis::K
        };

        let full_extent = match axis {
            Axis::I => ni,
            Axis::J => nj,
            Axis::K => nk,
        };
        let (lower_span, upper_span) = Span::new(0, full_extent).split_mid();

        let lower_ranks = target_ranks.div_ceil(2);
        let upper_ranks = target_ranks - lower_ranks;

        let lower_id = *next_id;
        *next_id += 1;
        let upper_id = *next_id;
        *next_id += 1;

        self.splits.push(Split { parent_block: block_id, lower_block: lower_id, upper_block: upper_id, axis, lower_span, upper_span });

        let (lni, lnj, lnk) = dims_with_axis(axis, lower_span.len(), ni, nj, nk);
        let (uni, unj, unk) = dims_with_axis(axis, upper_span.len(), ni, nj, nk);

        let mut leaves = self.split_for_parallelism(lower_id, lni, lnj, lnk, lower_ranks, next_id);
        leaves.extend(self.split_for_parallelism(upper_id, uni, unj, unk, upper_ranks, next_id));
        leaves
    }

    /// Walk the split tree from `root_block` downward to find the leaf that
    /// owns global cell `(i, j, k)`, returning `(leaf_block, local_i,
    /// local_j, local_k)`. This is `SplitBlockNumber`: given a queried cell
    /// coordinate in the original (pre-split) mesh, it answers which leaf
    /// block owns that cell and at what local offset.
    ///
    /// Panics if `(i, j, k)` falls outside `root_block`'s recorded extent.
    #[must_use]
    pub fn split_block_number(&self, root_block: u32, i: u32, j: u32, k: u32) -> (u32, u32, u32, u32) {
        let (mut current, mut i, mut j, mut k) = (root_block, i, j, k);
        loop {
            let Some(split) = self.splits.iter().find(|s| s.parent_block == current) else {
                return (current, i, j, k);
            };
            let (component, lower, upper) = match split.axis {
                Axis::I => (&mut i, split.lower_span, split.upper_span),
                Axis::J => (&mut j, split.lower_span, split.upper_span),
                Axis::K => (&mut k, split.lower_span, split.upper_span),
            };
            assert!(*component < upper.hi, "cell coordinate {component} outside block {current}'s extent");
            if *component < upper.lo {
                *component -= lower.lo;
                current = split.lower_block;
            } else {
                *component -= upper.lo;
                current = split.upper_block;
            }
        }
    }

    /// Walk the split history from a leaf block back to its root ancestor,
    /// accumulating the `(i, j, k)` offset of the leaf's origin within the
    /// root's interior index space. Used by [`crate::recombine`] to place a
    /// leaf's cells in the original mesh without re-deriving geometry.
    #[must_use]
    pub fn locate_in_root(&self, leaf_block: u32) -> (u32, u32, u32, u32) {
        let mut current = leaf_block;
        let (mut oi, mut oj, mut ok) = (0u32, 0u32, 0u32);
        loop {
            let Some(split) = self.splits.iter().find(|s| s.lower_block == current || s.upper_block == current) else {
                return (current, oi, oj, ok);
            };
            let offset = if split.lower_block == current { split.lower_span.lo } else { split.upper_span.lo };
            match split.axis {
                Axis::I => oi += offset,
                Axis::J => oj += offset,
                Axis::K => ok += offset,
            }
            current = split.parent_block;
        }
    }
}

fn dims_with_axis(axis: Axis, along: u32, ni: u32, nj: u32, nk: u32) -> (u32, u32, u32) {
    match axis {
        Axis::I => (along, nj, nk),
        Axis::J => (ni, along, nk),
        Axis::K => (ni, nj, along),
    }
}
