//! Outer time-integration loop: per-iteration ghost fill/exchange, gradient
//! computation, explicit or implicit update dispatch, positivity-triggered
//! step rejection, and cross-rank residual bookkeeping via
//! [`cfd_parallel`]'s collectives.

use anyhow::Result;
use cfd_core::error::SolverError;
use cfd_core::{Config, IntegrationScheme, MultiArray3D, TimeStepMode, Thermodynamics, TurbulenceModelKind};
use cfd_grid::InterblockPatch;
use cfd_io::{ResidualLog, ResidualRow};
use cfd_parallel::{allreduce_maxloc, allreduce_min, allreduce_sum, Communicator, LocalDomain};
use cfd_turbulence::{KOmegaWilcox, Laminar, MenterSst, TurbulenceModel};

use crate::explicit::explicit_update;
use crate::lusgs::implicit_update;
use crate::rhs::{assemble_rhs, WallDistanceField};
use crate::timestep::{block_min_dt, compute_local_dt, set_fixed_dt};
use crate::wall_regime::WallRegimeTracker;

/// Resolve the configured [`TurbulenceModelKind`] to a concrete closure.
///
/// `SstDes` and `WaleLes` have no implementing closure yet (design note: the
/// two-equation crate only carries RANS closures today); a run that
/// requests either falls back to [`MenterSst`] with a one-time warning
/// rather than refusing to start, since both are SST-family extensions and
/// the RANS-mode SST closure is the closest available approximation.
#[must_use]
pub fn build_turbulence_model(kind: TurbulenceModelKind) -> Box<dyn TurbulenceModel> {
    match kind {
        TurbulenceModelKind::Laminar => Box::new(Laminar),
        TurbulenceModelKind::KOmegaWilcox => Box::new(KOmegaWilcox::default()),
        TurbulenceModelKind::MenterSst => Box::new(MenterSst::default()),
        TurbulenceModelKind::SstDes | TurbulenceModelKind::WaleLes => {
            tracing::warn!(?kind, "no closure implements this model yet; falling back to Menter SST");
            Box::new(MenterSst::default())
        }
    }
}

/// One rank's outer-loop state: its slot index into the shared
/// [`LocalDomain`], a per-cell wall-distance field computed once at startup,
/// and a wall-regime tracker carried across iterations for hysteresis.
struct RankState {
    slot: usize,
    wall_distance: WallDistanceField,
    wall_regime: WallRegimeTracker,
}

/// Run the outer nonlinear loop to `config.max_outer_iterations` or until a
/// step exhausts its retry budget, writing one [`ResidualRow`] per iteration.
///
/// `domain` owns every rank's block in this process; `patches` is the full
/// interblock connectivity; `comm` is the (possibly in-process) exchange
/// transport.
pub fn run(
    domain: &mut LocalDomain,
    patches: &[InterblockPatch],
    comm: &mut dyn Communicator,
    config: &Config,
    thermo: &dyn Thermodynamics,
    residual_log: &mut ResidualLog,
) -> Result<()> {
    let turbulent = !matches!(config.turbulence, TurbulenceModelKind::Laminar);
    let turb_model = build_turbulence_model(config.turbulence);
    let diffusion = cfd_numerics::DiffusionCoefficients::default();

    let wall_ghost = |dist: f64, mu: f64, rho: f64| turb_model.wall_ghost_state(dist, mu, rho);

    let mut states: Vec<RankState> = (0..domain.slots.len())
        .map(|slot| RankState {
            slot,
            wall_distance: WallDistanceField::compute(&domain.slots[slot].block),
            wall_regime: WallRegimeTracker::new(),
        })
        .collect();

    let mut l2_ref: Option<Vec<f64>> = None;
    let mut l2_window: Vec<Vec<f64>> = Vec::new();

    for iter in 0..config.max_outer_iterations {
        for (rank, state) in domain.slots.iter_mut().zip(states.iter()) {
            let ghost = rank.block.ghost();
            let wall_distance_at = |i: usize, j: usize, k: usize| state.wall_distance.at(i as isize - ghost as isize, j as isize - ghost as isize, k as isize - ghost as isize);
            cfd_grid::fill_local_ghosts(&mut rank.block, thermo, wall_ghost, wall_distance_at);
        }
        domain.exchange_all(patches, comm, config.ghost_width, turbulent)?;
        for rank in domain.slots.iter_mut() {
            rank.block.sync_conservative_from_primitive(thermo);
            cfd_numerics::compute_gradients(&mut rank.block, thermo);
        }

        let cfl = match config.time_step {
            TimeStepMode::LocalCfl { cfl } => Some(cfl.at_iteration(iter)),
            TimeStepMode::GlobalFixed { .. } => None,
        };

        let mut per_block_l2: Vec<Vec<f64>> = Vec::with_capacity(domain.slots.len());
        let mut per_block_linf: Vec<(f64, usize)> = Vec::with_capacity(domain.slots.len());
        let mut per_block_dt: Vec<f64> = Vec::with_capacity(domain.slots.len());
        let mut per_block_linear_ratio: Vec<f64> = Vec::with_capacity(domain.slots.len());
        let mut n_wall_function = 0usize;

        for state in &mut states {
            let rank = &mut domain.slots[state.slot];

            match config.time_step {
                TimeStepMode::LocalCfl { .. } => compute_local_dt(&mut rank.block, thermo, cfl.unwrap_or(1.0)),
                TimeStepMode::GlobalFixed { dt } => set_fixed_dt(&mut rank.block, dt),
            }

            n_wall_function += state.wall_regime.update(&rank.block, thermo, config.wall_treatment);

            let saved = snapshot(&rank.block.cons);
            let mut retries = 0;
            let (l2, linf, linear_ratio) = loop {
                let dt = rank.block.dt.clone();
                let residual = assemble_rhs(&rank.block, thermo, turb_model.as_ref(), config.limiter, diffusion, &state.wall_distance)?;
                let l2 = equation_l2(&residual, rank.block.dims());
                let linf = equation_linf(&residual, rank.block.dims());

                let linear_ratio = match config.scheme {
                    IntegrationScheme::ExplicitRungeKutta { stages } => {
                        explicit_update(&mut rank.block, thermo, turb_model.as_ref(), config.limiter, diffusion, &state.wall_distance, &dt, stages)?;
                        0.0
                    }
                    IntegrationScheme::ImplicitLuSgs => implicit_update(&mut rank.block, &residual, thermo, &dt, config.linear_solver)?,
                };

                if rank.block.interior_is_physical() {
                    break (l2, linf, linear_ratio);
                }

                retries += 1;
                if retries > config.max_step_retries {
                    return Err(SolverError::StepRejection { block: rank.block.tag.parent_block, retries }.into());
                }
                tracing::warn!(block = rank.block.tag.parent_block, retries, "non-positive state after step; halving dt and retrying");
                restore(&mut rank.block.cons, &saved);
                rank.block.sync_conservative_from_primitive(thermo);
                halve(&mut rank.block.dt);
            };

            per_block_l2.push(l2);
            per_block_linf.push(linf);
            per_block_dt.push(block_min_dt(&rank.block));
            per_block_linear_ratio.push(linear_ratio);
        }

        let neq = per_block_l2.first().map_or(5, Vec::len);
        let mut l2_global = vec![0.0; neq];
        for eq in 0..neq {
            let per_rank: Vec<f64> = per_block_l2.iter().map(|row| row[eq]).collect();
            l2_global[eq] = allreduce_sum(&per_rank).sqrt();
        }

        let window = config.residual_reference_window.max(1);
        if l2_window.len() < window as usize {
            l2_window.push(l2_global.clone());
        }
        if l2_ref.is_none() && l2_window.len() == window as usize {
            let mut reference = vec![0.0_f64; neq];
            for row in &l2_window {
                for eq in 0..neq {
                    reference[eq] = reference[eq].max(row[eq]);
                }
            }
            l2_ref = Some(reference);
        }
        let reference = l2_ref.clone().unwrap_or_else(|| l2_global.clone());
        let normalized: Vec<f64> = l2_global
            .iter()
            .zip(&reference)
            .map(|(&l2, &l2r)| (l2 + 1e-30) / (l2r + 1e-30))
            .collect();

        let global_dt = allreduce_min(&per_block_dt);
        let linear_ratio = per_block_linear_ratio.iter().copied().fold(0.0_f64, f64::max);

        let labeled_linf: Vec<(f64, (u32, usize, u32, u32, u32))> = per_block_linf
            .iter()
            .zip(&states)
            .map(|(&(value, eqn), state)| {
                let block_id = domain.slots[state.slot].block.tag.parent_block;
                (value, (block_id, eqn, 0, 0, 0))
            })
            .collect();
        let (max_residual, (max_block, max_eqn, mi, mj, mk)) =
            allreduce_maxloc(&labeled_linf).unwrap_or((0.0, (0, 0, 0, 0, 0)));

        residual_log.log(&ResidualRow {
            step: u64::from(iter),
            nl_iter: 1,
            time_step: global_dt,
            l2: normalized,
            max_eqn: max_eqn as u32,
            max_block,
            max_ijk: (mi, mj, mk),
            max_residual,
            linear_solve_ratio: linear_ratio,
        })?;

        if n_wall_function == 0 && turbulent {
            tracing::trace!(iter, "every tracked wall cell resolved to low-Re this step");
        }
    }

    residual_log.flush()?;
    Ok(())
}

fn snapshot(cons: &MultiArray3D<cfd_core::ConservativeVars>) -> Vec<cfd_core::ConservativeVars> {
    let (ni, nj, nk) = cons.dims();
    let ghost = cons.ghost();
    let mut out = Vec::with_capacity((ni + 2 * ghost) * (nj + 2 * ghost) * (nk + 2 * ghost));
    for k in 0..nk + 2 * ghost {
        for j in 0..nj + 2 * ghost {
            for i in 0..ni + 2 * ghost {
                out.push(*cons.get(i, j, k));
            }
        }
    }
    out
}

fn restore(cons: &mut MultiArray3D<cfd_core::ConservativeVars>, saved: &[cfd_core::ConservativeVars]) {
    let (ni, nj, nk) = cons.dims();
    let ghost = cons.ghost();
    let mut idx = 0;
    for k in 0..nk + 2 * ghost {
        for j in 0..nj + 2 * ghost {
            for i in 0..ni + 2 * ghost {
                *cons.get_mut(i, j, k) = saved[idx];
                idx += 1;
            }
        }
    }
}

fn halve(dt: &mut MultiArray3D<f64>) {
    let (ni, nj, nk) = dt.dims();
    let ghost = dt.ghost();
    for k in 0..nk + 2 * ghost {
        for j in 0..nj + 2 * ghost {
            for i in 0..ni + 2 * ghost {
                *dt.get_mut(i, j, k) *= 0.5;
            }
        }
    }
}

fn equation_l2(residual: &crate::rhs::Residual, (ni, nj, nk): (usize, usize, usize)) -> Vec<f64> {
    let neq = residual.get(0, 0, 0).arity();
    let mut sum_sq = vec![0.0; neq];
    for k in 0..nk {
        for j in 0..nj {
            for i in 0..ni {
                let r = residual.get(i, j, k);
                for eq in 0..neq {
                    sum_sq[eq] += r[eq] * r[eq];
                }
            }
        }
    }
    sum_sq
}

fn equation_linf(residual: &crate::rhs::Residual, (ni, nj, nk): (usize, usize, usize)) -> (f64, usize) {
    let mut best = (0.0_f64, 0usize);
    for k in 0..nk {
        for j in 0..nj {
            for i in 0..ni {
                let (value, eqn) = residual.get(i, j, k).linf_with_locator();
                if value > best.0 {
                    best = (value, eqn);
                }
            }
        }
    }
    best
}
