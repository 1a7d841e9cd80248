// crates/cfd-decomp/src/lib.rs

//! Balanced recursive decomposition of structured blocks across MPI ranks,
//! and replay of that decomposition to recombine leaf results.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

pub mod recombine;
pub mod span;
pub mod split;

pub use recombine::{covers_axis_exactly, place_leaf_cells, recombine_into, PlacedCell};
pub use span::Span;
pub use split::{Axis, Decomposition, Split};
