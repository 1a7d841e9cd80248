//! ASCII residual log, written to stdout and a file simultaneously, with the
//! column header reprinted every 100 outer iterations.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

const HEADER_PERIOD: u64 = 100;

const HEADER_LAMINAR: &str =
    "Step NL-Iter Time-Step Res-Mass Res-Mom-X Res-Mom-Y Res-Mom-Z Res-Energy Max-Eqn Max-Blk Max-I Max-J Max-K Max-Res Res-Matrix";
const HEADER_TURBULENT: &str =
    "Step NL-Iter Time-Step Res-Mass Res-Mom-X Res-Mom-Y Res-Mom-Z Res-Energy Res-Tke Res-Omega Max-Eqn Max-Blk Max-I Max-J Max-K Max-Res Res-Matrix";

/// One outer-iteration residual row. `l2` holds the per-equation residuals
/// (5 entries laminar, 7 with turbulence) already normalized as `(L2 +
/// eps)/(L2_ref + eps)`.
pub struct ResidualRow {
    pub step: u64,
    pub nl_iter: u32,
    pub time_step: f64,
    pub l2: Vec<f64>,
    pub max_eqn: u32,
    pub max_block: u32,
    pub max_ijk: (u32, u32, u32),
    pub max_residual: f64,
    pub linear_solve_ratio: f64,
}

/// Writes residual rows to stdout and an append-mode log file, reprinting
/// the column header every [`HEADER_PERIOD`] outer iterations.
pub struct ResidualLog {
    file: std::io::BufWriter<std::fs::File>,
    rows_written: u64,
    turbulent: bool,
}

impl ResidualLog {
    /// Open (truncating) `path` for the duration of a run.
    pub fn create(path: &Path, turbulent: bool) -> Result<Self> {
        let file = std::fs::File::create(path).with_context(|| format!("create residual log {}", path.display()))?;
        Ok(Self { file: std::io::BufWriter::new(file), rows_written: 0, turbulent })
    }

    fn header(&self) -> &'static str {
        if self.turbulent { HEADER_TURBULENT } else { HEADER_LAMINAR }
    }

    /// Append one row, writing the header first if this is the first row or
    /// a multiple of [`HEADER_PERIOD`] rows have been written since the last
    /// header.
    pub fn log(&mut self, row: &ResidualRow) -> Result<()> {
        if self.rows_written % HEADER_PERIOD == 0 {
            writeln!(self.file, "{}", self.header())?;
            println!("{}", self.header());
        }
        let l2_text: Vec<String> = row.l2.iter().map(|v| format!("{v:.6e}")).collect();
        let (mi, mj, mk) = row.max_ijk;
        let line = format!(
            "{} {} {:.6e} {} {} {} {} {:.6e}",
            row.step,
            row.nl_iter,
            row.time_step,
            l2_text.join(" "),
            row.max_eqn,
            row.max_block,
            format_args!("{mi} {mj} {mk}"),
            row.max_residual,
        );
        let line = format!("{line} {:.6e}", row.linear_solve_ratio);
        writeln!(self.file, "{line}")?;
        println!("{line}");
        self.rows_written += 1;
        Ok(())
    }

    /// Ensure buffered rows reach disk.
    pub fn flush(&mut self) -> Result<()> {
        self.file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_row_and_the_hundredth_both_print_a_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("residual.log");
        let mut log = ResidualLog::create(&path, false).unwrap();
        for step in 0..101u64 {
            log.log(&ResidualRow {
                step,
                nl_iter: 1,
                time_step: 1e-3,
                l2: vec![1.0, 1.0, 1.0, 1.0, 1.0],
                max_eqn: 0,
                max_block: 0,
                max_ijk: (1, 1, 1),
                max_residual: 1.0,
                linear_solve_ratio: 0.1,
            })
            .unwrap();
        }
        log.flush().unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches(HEADER_LAMINAR).count(), 2);
    }
}
