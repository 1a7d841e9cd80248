// crates/cfd-io/src/lib.rs

//! Grid and boundary-condition input, mesh/solution output, and the
//! residual log: the solver's only points of contact with the filesystem.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery, clippy::unwrap_used, clippy::expect_used)]

pub mod bc_input;
pub mod grid_input;
pub mod mesh_output;
pub mod residual_log;
pub mod solution_output;

pub use bc_input::read_bc_descriptor;
pub use grid_input::read_plot3d_grid;
pub use mesh_output::write_cell_center_mesh;
pub use residual_log::{ResidualLog, ResidualRow};
pub use solution_output::{scale_factor, write_function_file, write_result_index, BlockVariable};
