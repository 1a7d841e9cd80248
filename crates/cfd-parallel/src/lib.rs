// crates/cfd-parallel/src/lib.rs

//! In-process simulation of MPI ranks: explicit `Vec<RankSlot>` domains,
//! inter-block ghost exchange, and the residual/Δt collectives the outer
//! time-integration loop folds over every rank.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery, clippy::unwrap_used, clippy::expect_used)]

pub mod collectives;
pub mod communicator;
pub mod exchange;
pub mod facelayer;
pub mod rank;

pub use collectives::{allreduce_maxloc, allreduce_min, allreduce_sum};
pub use communicator::{Communicator, LocalCommunicator, RequestId};
pub use facelayer::{ghost_layer_indices, interior_layer_indices};
pub use rank::{assign_ranks, LocalDomain, RankSlot};
