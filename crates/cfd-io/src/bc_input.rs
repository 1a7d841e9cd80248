//! ASCII boundary-condition descriptor reader.
//!
//! Per block: a line with the i-, j-, k-surface counts, then one line per
//! surface `bcType iMin iMax jMin jMax kMin kMax tag [wallTemperature]`; the
//! trailing wall temperature is only meaningful for `ViscousWallIsothermal`
//! and defaults to `0.0` when omitted. After every block's surfaces, a
//! block of interblock patch lines: `blockA surfaceA blockB surfaceB
//! orientation`, terminated by a line containing only `0`.

use anyhow::{bail, Context, Result};
use cfd_grid::{BcKind, BoundaryConditions, InterblockPatch, Orientation, SurfaceBc};
use std::io::BufRead;
use std::path::Path;

fn parse_bc_kind(token: &str) -> Result<BcKind> {
    Ok(match token {
        "SlipWall" => BcKind::SlipWall,
        "ViscousWallIsothermal" => BcKind::ViscousWallIsothermal,
        "ViscousWallAdiabatic" => BcKind::ViscousWallAdiabatic,
        "SubsonicInflow" => BcKind::SubsonicInflow,
        "SupersonicInflow" => BcKind::SupersonicInflow,
        "SubsonicOutflow" => BcKind::SubsonicOutflow,
        "SupersonicOutflow" => BcKind::SupersonicOutflow,
        "Farfield" => BcKind::Farfield,
        "Periodic" => BcKind::Periodic,
        "Interblock" => BcKind::Interblock,
        other => bail!("unrecognized boundary condition kind {other:?}"),
    })
}

fn next_line(lines: &mut impl Iterator<Item = std::io::Result<String>>) -> Result<String> {
    loop {
        let raw = lines.next().context("unexpected end of boundary-condition descriptor")??;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        return Ok(trimmed.to_string());
    }
}

fn parse_surface_line(line: &str) -> Result<SurfaceBc> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let (kind, i_min, i_max, j_min, j_max, k_min, k_max, tag, wall_temperature) = match fields.as_slice() {
        [kind, i_min, i_max, j_min, j_max, k_min, k_max, tag] => (kind, i_min, i_max, j_min, j_max, k_min, k_max, tag, None),
        [kind, i_min, i_max, j_min, j_max, k_min, k_max, tag, t_wall] => (kind, i_min, i_max, j_min, j_max, k_min, k_max, tag, Some(t_wall)),
        _ => bail!("surface line {line:?} does not have 8 or 9 fields"),
    };
    Ok(SurfaceBc {
        kind: parse_bc_kind(kind)?,
        i_min: i_min.parse().context("iMin")?,
        i_max: i_max.parse().context("iMax")?,
        j_min: j_min.parse().context("jMin")?,
        j_max: j_max.parse().context("jMax")?,
        k_min: k_min.parse().context("kMin")?,
        k_max: k_max.parse().context("kMax")?,
        tag: tag.parse().context("tag")?,
        wall_temperature: wall_temperature.map_or(Ok(0.0), |t| t.parse().context("wallTemperature"))?,
    })
}

/// Read the per-block boundary conditions and the global interblock patch
/// list from an ASCII descriptor file.
pub fn read_bc_descriptor(path: &Path, num_blocks: usize) -> Result<(Vec<BoundaryConditions>, Vec<InterblockPatch>)> {
    let file = std::fs::File::open(path).with_context(|| format!("open BC descriptor {}", path.display()))?;
    let mut lines = std::io::BufReader::new(file).lines();

    let mut per_block = Vec::with_capacity(num_blocks);
    for block in 0..num_blocks {
        let counts_line = next_line(&mut lines).with_context(|| format!("surface counts for block {block}"))?;
        let counts: Vec<&str> = counts_line.split_whitespace().collect();
        let [n_i, n_j, n_k] = counts.as_slice() else {
            bail!("block {block} surface-count line {counts_line:?} does not have 3 fields");
        };
        let total: usize = n_i.parse::<usize>()? + n_j.parse::<usize>()? + n_k.parse::<usize>()?;
        let mut surfaces = Vec::with_capacity(total);
        for s in 0..total {
            let line = next_line(&mut lines).with_context(|| format!("surface {s} of block {block}"))?;
            surfaces.push(parse_surface_line(&line)?);
        }
        per_block.push(BoundaryConditions { surfaces });
    }

    let patch_count_line = next_line(&mut lines).context("interblock patch count")?;
    let patch_count: usize = patch_count_line.trim().parse().context("interblock patch count")?;
    let mut patches = Vec::with_capacity(patch_count);
    for p in 0..patch_count {
        let line = next_line(&mut lines).with_context(|| format!("interblock patch {p}"))?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [block_a, surface_a, block_b, surface_b, orientation] = fields.as_slice() else {
            bail!("interblock patch line {line:?} does not have 5 fields");
        };
        patches.push(InterblockPatch {
            block_a: block_a.parse().context("blockA")?,
            surface_a: surface_a.parse().context("surfaceA")?,
            block_b: block_b.parse().context("blockB")?,
            surface_b: surface_b.parse().context("surfaceB")?,
            orientation: Orientation(orientation.parse().context("orientation")?),
        });
    }

    Ok((per_block, patches))
}
