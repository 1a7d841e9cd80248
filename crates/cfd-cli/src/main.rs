// crates/cfd-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms, clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::todo)]

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use cfd_core::{Config, PerfectGasSutherland, Thermodynamics, TurbulenceModelKind};
use cfd_grid::meshgen::channel_box;
use cfd_grid::{BcKind, BlockTag, InterblockPatch, ProcBlock};
use cfd_io::{scale_factor, write_cell_center_mesh, write_function_file, write_result_index, BlockVariable, ResidualLog};
use cfd_parallel::{LocalCommunicator, LocalDomain, RankSlot};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "cfd-cli",
    about = "Structured multi-block compressible Navier-Stokes solver",
    long_about = "Run, configure, and inspect a structured multi-block compressible Navier-Stokes solve.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Write a default `Config` record as JSON, a starting point to edit by hand.
    Init {
        /// Output path for the config JSON.
        #[arg(long, default_value = "config.json")]
        out: PathBuf,
    },

    /// Run the solver to `max_outer_iterations` or until a step exhausts its
    /// retry budget, writing mesh, solution, result-index and residual-log
    /// outputs into `out_dir`.
    Run {
        /// Path to a `Config` JSON file; defaults to `Config::default()` if omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// PLOT3D-format multi-block grid file. Omit to run a synthetic
        /// single-block channel box instead (see `--ni`/`--nj`/`--nk`).
        #[arg(long)]
        grid: Option<PathBuf>,

        /// ASCII boundary-condition descriptor, required alongside `--grid`.
        #[arg(long)]
        bc: Option<PathBuf>,

        /// Interior cell counts for the synthetic channel box, used only
        /// when `--grid` is omitted.
        #[arg(long, default_value_t = 32)]
        ni: usize,
        #[arg(long, default_value_t = 16)]
        nj: usize,
        #[arg(long, default_value_t = 1)]
        nk: usize,

        /// Directory solution/mesh/residual-log outputs are written to.
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Init { out } => init_config(&out),
        Cmd::Run { config, grid, bc, ni, nj, nk, out_dir } => run(config.as_deref(), grid.as_deref(), bc.as_deref(), ni, nj, nk, &out_dir),
    }
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    let _ = tracing_subscriber::registry().with(filter).with(fmt_layer).try_init();
}

/// Ensure the parent directory for a file, or a directory itself, exists.
fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).with_context(|| format!("creating directory {}", path.display()))
}

fn init_config(out: &Path) -> Result<()> {
    let cfg = Config::default();
    let text = cfg.to_json_pretty()?;
    if let Some(dir) = out.parent() {
        if !dir.as_os_str().is_empty() {
            ensure_dir(dir)?;
        }
    }
    std::fs::write(out, text).with_context(|| format!("writing {}", out.display()))?;
    println!("Wrote default config → {}", out.display());
    Ok(())
}

/// Build the block geometries, boundary conditions, and interblock patches
/// this run will solve, either from `--grid`/`--bc` files or a synthetic
/// single-block channel box.
fn build_mesh(
    grid: Option<&Path>,
    bc: Option<&Path>,
    ni: usize,
    nj: usize,
    nk: usize,
    config: &Config,
) -> Result<(Vec<cfd_grid::BlockGeometry>, Vec<cfd_grid::BoundaryConditions>, Vec<InterblockPatch>)> {
    match (grid, bc) {
        (Some(grid_path), Some(bc_path)) => {
            let nodes = cfd_io::read_plot3d_grid(grid_path).context("reading grid file")?;
            let geometries: Vec<_> = nodes.iter().map(|n| cfd_grid::BlockGeometry::from_nodes(n, config.ghost_width)).collect();
            let (bcs, patches) = cfd_io::read_bc_descriptor(bc_path, geometries.len()).context("reading boundary-condition descriptor")?;
            Ok((geometries, bcs, patches))
        }
        (None, None) => {
            let (geometry, bcs) = channel_box(ni, nj, nk, 1.0, 1.0, 1.0, config.ghost_width, BcKind::SubsonicInflow, BcKind::SubsonicOutflow);
            Ok((vec![geometry], vec![bcs], Vec::new()))
        }
        _ => bail!("--grid and --bc must be supplied together"),
    }
}

#[allow(clippy::too_many_arguments)]
fn run(config_path: Option<&Path>, grid: Option<&Path>, bc: Option<&Path>, ni: usize, nj: usize, nk: usize, out_dir: &Path) -> Result<()> {
    let config = match config_path {
        Some(p) => {
            let text = std::fs::read_to_string(p).with_context(|| format!("reading config {}", p.display()))?;
            Config::from_json(&text)?
        }
        None => Config::default(),
    };

    ensure_dir(out_dir)?;
    let thermo = PerfectGasSutherland::air_nondimensional();
    let freestream = config.freestream.to_primitive(&thermo);

    let (geometries, bcs, patches) = build_mesh(grid, bc, ni, nj, nk, &config)?;
    info!(case = %config.case_name, n_blocks = geometries.len(), "starting run");

    write_cell_center_mesh(&out_dir.join("mesh.bin"), &geometries, config.reference.length_ref).context("writing mesh output")?;

    let slots: Vec<RankSlot> = geometries
        .into_iter()
        .zip(bcs)
        .enumerate()
        .map(|(idx, (geometry, surface_bcs))| {
            let tag = BlockTag { parent_block: idx as u32, split_block: 0 };
            let block = ProcBlock::new(tag, idx as u32, geometry, surface_bcs, freestream, &thermo);
            RankSlot { block_id: idx as u32, rank: idx as u32, block }
        })
        .collect();
    let mut domain = LocalDomain::new(slots);
    let mut comm = LocalCommunicator::new();

    let turbulent = !matches!(config.turbulence, TurbulenceModelKind::Laminar);
    let mut residual_log = ResidualLog::create(&out_dir.join("residual.log"), turbulent).context("opening residual log")?;

    cfd_integrate::run(&mut domain, &patches, &mut comm, &config, &thermo, &mut residual_log).context("solver run failed")?;

    write_final_solution(&domain, &config, &thermo, out_dir)?;

    println!("Completed {} outer iterations → {}", config.max_outer_iterations, out_dir.display());
    Ok(())
}

/// Write the requested output variables at the final solution state.
fn write_final_solution(domain: &LocalDomain, config: &Config, thermo: &dyn Thermodynamics, out_dir: &Path) -> Result<()> {
    let mut block_vars: Vec<(usize, usize, usize, Vec<Vec<f64>>)> = Vec::with_capacity(domain.slots.len());
    for slot in &domain.slots {
        let (ni, nj, nk) = slot.block.dims();
        let mut per_variable = Vec::with_capacity(config.output_variables.len());
        for name in &config.output_variables {
            let scale = scale_factor(name, &config.reference, thermo).with_context(|| format!("unscaled variable {name:?}"))?;
            per_variable.push(extract_variable(&slot.block, thermo, name)?.into_iter().map(|v| v * scale).collect());
        }
        block_vars.push((ni, nj, nk, per_variable));
    }

    let blocks: Vec<(usize, usize, usize, Vec<BlockVariable<'_>>)> = block_vars
        .iter()
        .map(|(ni, nj, nk, vars)| {
            let named = config
                .output_variables
                .iter()
                .zip(vars)
                .map(|(name, values)| BlockVariable { name: name.as_str(), values: values.as_slice() })
                .collect();
            (*ni, *nj, *nk, named)
        })
        .collect();
    write_function_file(&out_dir.join("solution.fun"), &blocks).context("writing solution output")?;

    let names: Vec<&str> = config.output_variables.iter().map(String::as_str).collect();
    let vector_binding = match (names.contains(&"vel_x"), names.contains(&"vel_y"), names.contains(&"vel_z")) {
        (true, true, true) => Some(("velocity", ["vel_x", "vel_y", "vel_z"])),
        _ => None,
    };
    write_result_index(&out_dir.join("result.idx"), &[0.0], config.output_frequency, &names, vector_binding).context("writing result index")?;
    Ok(())
}

/// Pull one named output variable's values out of a block's interior cells,
/// in i-fastest, k-slowest order (the layout [`cfd_io::write_function_file`]
/// expects).
fn extract_variable(block: &ProcBlock, thermo: &dyn Thermodynamics, name: &str) -> Result<Vec<f64>> {
    let (ni, nj, nk) = block.dims();
    let ghost = block.ghost();
    let mut out = Vec::with_capacity(ni * nj * nk);
    for k in 0..nk {
        for j in 0..nj {
            for i in 0..ni {
                let prim = *block.prim.get(i + ghost, j + ghost, k + ghost);
                let value = match name {
                    "density" => prim.rho,
                    "pressure" => prim.p,
                    "vel_x" => prim.vel.x,
                    "vel_y" => prim.vel.y,
                    "vel_z" => prim.vel.z,
                    "temperature" => thermo.temperature(prim.rho, prim.p),
                    "sos" => thermo.sound_speed(prim.rho, prim.p),
                    "tke" => prim.turb.map_or(0.0, |t| t.k),
                    "sdr" => prim.turb.map_or(0.0, |t| t.omega),
                    other => bail!("cannot extract output variable {other:?} from solver state"),
                };
                out.push(value);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_writes_a_config_that_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        init_config(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let cfg = Config::from_json(&text).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn run_on_a_synthetic_channel_completes_and_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.max_outer_iterations = 2;
        config.scheme = cfd_core::IntegrationScheme::ExplicitRungeKutta { stages: 2 };
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, config.to_json_pretty().unwrap()).unwrap();

        let out_dir = dir.path().join("out");
        run(Some(&config_path), None, None, 4, 3, 2, &out_dir).unwrap();

        assert!(out_dir.join("mesh.bin").exists());
        assert!(out_dir.join("solution.fun").exists());
        assert!(out_dir.join("result.idx").exists());
        assert!(out_dir.join("residual.log").exists());
    }

    #[test]
    fn run_rejects_a_grid_without_a_matching_bc_file() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("out");
        let err = run(None, Some(Path::new("grid.p3d")), None, 4, 3, 2, &out_dir).unwrap_err();
        assert!(err.to_string().contains("together"));
    }
}
