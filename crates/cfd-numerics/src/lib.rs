// crates/cfd-numerics/src/lib.rs

//! MUSCL reconstruction + Roe flux (inviscid), and Green-Gauss gradients +
//! Newtonian stress tensor (viscous).

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

pub mod gradients;
pub mod limiter;
pub mod reconstruction;
pub mod roe_flux;
pub mod viscous_flux;

pub use gradients::compute_gradients;
pub use reconstruction::{reconstruct_face, Direction};
pub use roe_flux::roe_flux;
pub use viscous_flux::{stress_tensor, viscous_flux, DiffusionCoefficients};
