//! Binary solution (function file) writer, the ASCII result index file, and
//! the dimensionalizing scale factor for each recognized output variable.

use anyhow::{bail, Context, Result};
use cfd_core::{ReferenceState, Thermodynamics};
use std::io::Write;
use std::path::Path;

/// One output variable, already evaluated at every cell of one block in
/// i-fastest, k-slowest order.
pub struct BlockVariable<'a> {
    pub name: &'a str,
    pub values: &'a [f64],
}

/// The scale factor recognized output variables are multiplied by before
/// being written, derived from the reference state and equation of state.
#[must_use]
pub fn scale_factor(name: &str, reference: &ReferenceState, thermo: &dyn Thermodynamics) -> Result<f64> {
    let a_ref = (thermo.gamma() * thermo.gas_constant() * reference.t_ref).sqrt();
    let rho = reference.rho_ref;
    let l = reference.length_ref;
    Ok(match name {
        "density" => rho,
        "vel_x" | "vel_y" | "vel_z" | "sos" => a_ref,
        "pressure" => rho * a_ref * a_ref,
        "dt" => l / a_ref,
        "temperature" => reference.t_ref,
        "tke" => a_ref * a_ref,
        "sdr" => rho * a_ref * a_ref,
        "wall_distance" => l,
        "vel_grad_x" | "vel_grad_y" | "vel_grad_z" => a_ref / l,
        "temp_grad_x" | "temp_grad_y" | "temp_grad_z" => reference.t_ref / l,
        "tke_grad_x" | "tke_grad_y" | "tke_grad_z" => a_ref * a_ref / l,
        "sdr_grad_x" | "sdr_grad_y" | "sdr_grad_z" => rho * a_ref * a_ref / l,
        "resid_mass" => rho * a_ref * l * l,
        "resid_mom_x" | "resid_mom_y" | "resid_mom_z" => rho * a_ref * a_ref * l * l,
        "resid_energy" | "resid_tke" => rho * a_ref * a_ref * a_ref * l * l,
        "resid_sdr" => rho * rho * a_ref.powi(4) * l * l,
        "rank" | "global_position" | "viscosity_ratio" => 1.0,
        other => bail!("unrecognized output variable {other:?}"),
    })
}

/// Write one block's worth of already-dimensionalized variables.
pub fn write_function_file(path: &Path, blocks: &[(usize, usize, usize, Vec<BlockVariable<'_>>)]) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("create function file {}", path.display()))?;
    let mut writer = std::io::BufWriter::new(file);

    writer.write_all(&(blocks.len() as i32).to_le_bytes())?;
    for (ni, nj, nk, vars) in blocks {
        writer.write_all(&(*ni as i32).to_le_bytes())?;
        writer.write_all(&(*nj as i32).to_le_bytes())?;
        writer.write_all(&(*nk as i32).to_le_bytes())?;
        writer.write_all(&(vars.len() as i32).to_le_bytes())?;
    }
    for (ni, nj, nk, vars) in blocks {
        let expected = ni * nj * nk;
        for var in vars {
            if var.values.len() != expected {
                bail!("variable {:?} has {} values, expected {expected}", var.name, var.values.len());
            }
            for value in var.values {
                writer.write_all(&value.to_le_bytes())?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

/// Write the ASCII result index file binding variable names to the scalar
/// slots written by [`write_function_file`].
pub fn write_result_index(path: &Path, solution_times: &[f64], out_freq: u32, scalar_names: &[&str], vector_binding: Option<(&str, [&str; 3])>) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("create result index {}", path.display()))?;
    let mut writer = std::io::BufWriter::new(file);

    let num_vector = usize::from(vector_binding.is_some());
    writeln!(writer, "{} {} 0", scalar_names.len(), num_vector)?;
    writeln!(writer, "{}", solution_times.len())?;
    for chunk in solution_times.chunks(6) {
        let line: Vec<String> = chunk.iter().map(|t| format!("{t:.8e}")).collect();
        writeln!(writer, "{}", line.join(" "))?;
    }
    writeln!(writer, "{out_freq} {out_freq}")?;
    for (idx, name) in scalar_names.iter().enumerate() {
        writeln!(writer, "F {name} {idx:04}")?;
    }
    if let Some((vector_name, [vx, vy, vz])) = vector_binding {
        let idx_of = |n: &str| -> Result<usize> {
            scalar_names.iter().position(|s| *s == n).with_context(|| format!("vector component {n:?} is not a bound scalar"))
        };
        writeln!(writer, "F {vector_name} {:04} {:04} {:04}", idx_of(vx)?, idx_of(vy)?, idx_of(vz)?)?;
    }
    writer.flush()?;
    Ok(())
}
