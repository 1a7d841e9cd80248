//! cfd-bench-harness
//!
//! Run named solver scenarios end to end (mesh build -> initial condition ->
//! time integration) and append CSV rows into `benchmarks/reports/bench-<unix>.csv`.
//!
//! Usage examples:
//!   cargo run -p cfd-bench-harness -- --profile configs/profiles/sod.toml --scenario sod
//!   cargo run -p cfd-bench-harness -- --profile configs/profiles/pulse.toml --scenario pulse

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::Deserialize;

use cfd_core::{CflSchedule, Config, IntegrationScheme, PerfectGasSutherland, PrimitiveVars, Thermodynamics, TimeStepMode, Vec3};
use cfd_grid::meshgen::{channel_box, periodic_box};
use cfd_grid::{BcKind, BlockTag, InterblockPatch, ProcBlock};
use cfd_io::ResidualLog;
use cfd_parallel::{LocalCommunicator, LocalDomain, RankSlot};

#[derive(Debug, Deserialize)]
struct Profile {
    /// Interior cell count along the solved axis (the other two are 1).
    ni: usize,
    /// CFL number driving local time stepping.
    cfl: f64,
    /// Outer (explicit, 2-stage RK) iterations to run.
    steps: u32,
    /// Repetitions of the whole scenario.
    repeats: u32,
}

#[derive(Clone, Copy, Debug)]
enum ScenarioSel {
    Sod,
    Pulse,
}

fn parse_flag(name: &str, default: &str) -> String {
    let mut it = std::env::args().skip(1);
    while let Some(k) = it.next() {
        if k == format!("--{name}") {
            return it.next().unwrap_or_else(|| default.to_string());
        }
    }
    default.to_string()
}

fn dur_ms(d: Duration) -> u128 {
    d.as_millis()
}

fn main() -> Result<()> {
    let profile_path = PathBuf::from(parse_flag("profile", "configs/profiles/sod.toml"));
    let scenario_str = parse_flag("scenario", "sod");
    let scenario = match scenario_str.as_str() {
        "sod" => ScenarioSel::Sod,
        "pulse" => ScenarioSel::Pulse,
        other => anyhow::bail!("unknown --scenario {other} (use sod|pulse)"),
    };

    let profile_src = fs::read_to_string(&profile_path).with_context(|| format!("read profile {:?}", profile_path))?;
    let profile: Profile = toml::from_str(&profile_src).context("parse profile toml")?;
    println!(
        "Profile: ni={}, cfl={}, steps={}, repeats={}, scenario={scenario_str}",
        profile.ni, profile.cfl, profile.steps, profile.repeats
    );

    fs::create_dir_all("benchmarks/reports").ok();

    let ts = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
    let csv_path = PathBuf::from(format!("benchmarks/reports/bench-{ts}.csv"));
    let mut csv = fs::OpenOptions::new().create(true).append(true).open(&csv_path)?;
    writeln!(csv, "timestamp,scenario,ni,cfl,steps,repeat,stage,ms,extra")?;

    let thermo = PerfectGasSutherland::air_nondimensional();

    for rep in 0..profile.repeats {
        let t0 = Instant::now();
        let (mut domain, patches, initial_density) = match scenario {
            ScenarioSel::Sod => build_sod(profile.ni, &thermo),
            ScenarioSel::Pulse => build_pulse(profile.ni, &thermo),
        };
        let t_setup = t0.elapsed();
        writeln!(csv, "{ts},{scenario_str},{},{},{},{rep},setup,{},", profile.ni, profile.cfl, profile.steps, dur_ms(t_setup))?;

        let config = scenario_config(&scenario_str, &profile);
        let mut comm = LocalCommunicator::new();
        let log_path = PathBuf::from(format!("benchmarks/tmp-residual-{ts}-{rep}.log"));
        let mut residual_log = ResidualLog::create(&log_path, false)?;

        let t0 = Instant::now();
        cfd_integrate::run(&mut domain, &patches, &mut comm, &config, &thermo, &mut residual_log)?;
        let t_run = t0.elapsed();
        residual_log.flush()?;
        writeln!(csv, "{ts},{scenario_str},{},{},{},{rep},integrate,{},", profile.ni, profile.cfl, profile.steps, dur_ms(t_run))?;

        if let ScenarioSel::Pulse = scenario {
            let err = pulse_l2_error(&domain, &initial_density);
            writeln!(csv, "{ts},{scenario_str},{},{},{},{rep},l2_error,0,error={err:.6e}", profile.ni, profile.cfl, profile.steps)?;
        }

        let _ = fs::remove_file(&log_path);
    }

    println!("Wrote report → {}", csv_path.display());
    Ok(())
}

fn scenario_config(scenario_str: &str, profile: &Profile) -> Config {
    let mut config = Config::default();
    config.case_name = scenario_str.to_string();
    config.scheme = IntegrationScheme::ExplicitRungeKutta { stages: 2 };
    config.time_step = TimeStepMode::LocalCfl { cfl: CflSchedule::constant(profile.cfl) };
    config.max_outer_iterations = profile.steps;
    config
}

/// Sod's shock tube: left/right states split at the domain midpoint, held
/// between two non-reflecting ends so the rarefaction and shock never reach
/// a wall within the run length.
fn build_sod(ni: usize, thermo: &PerfectGasSutherland) -> (LocalDomain, Vec<InterblockPatch>, Vec<f64>) {
    let ghost_width = Config::default().ghost_width;
    let (geometry, bcs) = channel_box(ni, 1, 1, 1.0, 1.0, 1.0, ghost_width, BcKind::SubsonicOutflow, BcKind::SubsonicOutflow);
    let left = PrimitiveVars::laminar(1.0, Vec3::new(0.0, 0.0, 0.0), 1.0);
    let right = PrimitiveVars::laminar(0.125, Vec3::new(0.0, 0.0, 0.0), 0.1);

    let tag = BlockTag { parent_block: 0, split_block: 0 };
    let mut block = ProcBlock::new(tag, 0, geometry, bcs, left, thermo);
    let ghost = block.ghost();
    for i in (ni / 2)..ni {
        let cell = (i + ghost, ghost, ghost);
        *block.prim.get_mut(cell.0, cell.1, cell.2) = right;
        *block.cons.get_mut(cell.0, cell.1, cell.2) = right.to_cons(thermo);
    }

    let slots = vec![RankSlot { block_id: 0, rank: 0, block }];
    (LocalDomain::new(slots), Vec::new(), Vec::new())
}

/// A Gaussian density pulse riding a uniform Mach-0.2 background flow
/// through a domain wired periodic in `i`.
fn build_pulse(ni: usize, thermo: &PerfectGasSutherland) -> (LocalDomain, Vec<InterblockPatch>, Vec<f64>) {
    let ghost_width = Config::default().ghost_width;
    let (geometry, bcs, patch) = periodic_box(ni, 1, 1, 1.0, 1.0, 1.0, ghost_width);

    let rho0 = 1.0;
    let p0 = 1.0 / thermo.gamma();
    let c0 = thermo.sound_speed(rho0, p0);
    let mach = 0.2;
    let background = PrimitiveVars::laminar(rho0, Vec3::new(mach * c0, 0.0, 0.0), p0);

    let tag = BlockTag { parent_block: 0, split_block: 0 };
    let mut block = ProcBlock::new(tag, 0, geometry, bcs, background, thermo);
    let ghost = block.ghost();
    let mut initial_density = Vec::with_capacity(ni);
    let sigma = 0.05;
    let x0 = 0.5;
    for i in 0..ni {
        let x = block.geometry.cell_center.get(i + ghost, ghost, ghost).x;
        let bump = 0.1 * (-((x - x0) * (x - x0)) / (2.0 * sigma * sigma)).exp();
        let rho = rho0 + bump;
        let prim = PrimitiveVars::laminar(rho, background.vel, p0);
        *block.prim.get_mut(i + ghost, ghost, ghost) = prim;
        *block.cons.get_mut(i + ghost, ghost, ghost) = prim.to_cons(thermo);
        initial_density.push(rho);
    }

    let slots = vec![RankSlot { block_id: 0, rank: 0, block }];
    (LocalDomain::new(slots), vec![patch], initial_density)
}

/// L2 norm of the final density field against the pulse's initial shape,
/// normalized by the initial field's own L2 norm (the pulse should have
/// advected exactly one period and landed back where it started).
fn pulse_l2_error(domain: &LocalDomain, initial_density: &[f64]) -> f64 {
    let block = &domain.slots[0].block;
    let ghost = block.ghost();
    let (ni, _, _) = block.dims();
    let mut num = 0.0;
    let mut den = 0.0;
    for i in 0..ni {
        let rho = block.prim.get(i + ghost, ghost, ghost).rho;
        let diff = rho - initial_density[i];
        num += diff * diff;
        den += initial_density[i] * initial_density[i];
    }
    (num / den.max(1e-300)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sod_build_splits_left_and_right_states_at_the_midpoint() {
        let thermo = PerfectGasSutherland::air_nondimensional();
        let (domain, patches, _) = build_sod(10, &thermo);
        assert!(patches.is_empty());
        let block = &domain.slots[0].block;
        let ghost = block.ghost();
        assert!((block.prim.get(ghost, ghost, ghost).rho - 1.0).abs() < 1e-12);
        assert!((block.prim.get(ghost + 9, ghost, ghost).rho - 0.125).abs() < 1e-12);
    }

    #[test]
    fn pulse_build_wires_a_periodic_patch_and_centers_the_bump() {
        let thermo = PerfectGasSutherland::air_nondimensional();
        let (domain, patches, initial_density) = build_pulse(20, &thermo);
        assert_eq!(patches.len(), 1);
        assert_eq!(initial_density.len(), 20);
        let peak = initial_density.iter().cloned().fold(f64::MIN, f64::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn pulse_l2_error_is_zero_against_its_own_initial_density() {
        let thermo = PerfectGasSutherland::air_nondimensional();
        let (domain, _, initial_density) = build_pulse(16, &thermo);
        let err = pulse_l2_error(&domain, &initial_density);
        assert!(err < 1e-12);
    }
}
