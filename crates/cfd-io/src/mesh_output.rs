//! Binary cell-center mesh writer.
//!
//! Layout: `numBlocks:i32`; per block `(Ni,Nj,Nk):i32x3` (cell counts, no
//! ghosts); then per block all x, then all y, then all z cell-center
//! coordinates as `f64`, dimensionalized by the reference length.

use anyhow::{Context, Result};
use cfd_grid::BlockGeometry;
use std::io::Write;
use std::path::Path;

/// Write cell-center coordinates for every block, scaled by `length_ref`.
pub fn write_cell_center_mesh(path: &Path, blocks: &[BlockGeometry], length_ref: f64) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("create mesh output {}", path.display()))?;
    let mut writer = std::io::BufWriter::new(file);

    writer.write_all(&(blocks.len() as i32).to_le_bytes())?;
    for block in blocks {
        writer.write_all(&(block.ni as i32).to_le_bytes())?;
        writer.write_all(&(block.nj as i32).to_le_bytes())?;
        writer.write_all(&(block.nk as i32).to_le_bytes())?;
    }
    for block in blocks {
        for axis in 0..3 {
            for k in 0..block.nk {
                for j in 0..block.nj {
                    for i in 0..block.ni {
                        let gi = i + block.ghost;
                        let gj = j + block.ghost;
                        let gk = k + block.ghost;
                        let p = block.cell_center.get(gi, gj, gk);
                        let value = match axis {
                            0 => p.x,
                            1 => p.y,
                            _ => p.z,
                        };
                        writer.write_all(&(value * length_ref).to_le_bytes())?;
                    }
                }
            }
        }
    }
    writer.flush()?;
    Ok(())
}
