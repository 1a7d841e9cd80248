// crates/cfd-grid/src/lib.rs

//! Structured blocks: ghost-haloed storage, cell/face geometry, boundary
//! condition surfaces, and the per-rank `ProcBlock`.

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

pub mod bc;
pub mod fill_ghosts;
pub mod geometry;
pub mod meshgen;
pub mod procblock;

pub use bc::{BcKind, BlockFace, BoundaryConditions, InterblockPatch, Orientation, SurfaceBc};
pub use fill_ghosts::fill_local_ghosts;
pub use geometry::{BlockGeometry, FaceGeometry, NodeGrid};
pub use procblock::{BlockTag, CellGradients, ProcBlock};
