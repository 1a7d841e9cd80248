//! PLOT3D-style multi-block binary grid reader.
//!
//! Layout: `numBlocks:i32`, then per block `(Ni_node,Nj_node,Nk_node):i32x3`,
//! then per block a contiguous `x[]`, `y[]`, `z[]` dump of `f64` node
//! coordinates in i-fastest, k-slowest order.

use anyhow::{bail, Context, Result};
use cfd_grid::NodeGrid;
use std::io::Read;
use std::path::Path;

/// Read every block's node grid from a PLOT3D-format binary file.
pub fn read_plot3d_grid(path: &Path) -> Result<Vec<NodeGrid>> {
    let file = std::fs::File::open(path).with_context(|| format!("open grid file {}", path.display()))?;
    let mut reader = std::io::BufReader::new(file);

    let num_blocks = read_i32(&mut reader).context("read numBlocks")?;
    if num_blocks < 0 {
        bail!("grid file declares a negative block count ({num_blocks})");
    }
    let num_blocks = num_blocks as usize;

    let mut dims = Vec::with_capacity(num_blocks);
    for b in 0..num_blocks {
        let ni = read_i32(&mut reader).with_context(|| format!("read Ni_node for block {b}"))?;
        let nj = read_i32(&mut reader).with_context(|| format!("read Nj_node for block {b}"))?;
        let nk = read_i32(&mut reader).with_context(|| format!("read Nk_node for block {b}"))?;
        if ni < 2 || nj < 2 || nk < 2 {
            bail!("block {b} has a degenerate node count ({ni},{nj},{nk})");
        }
        dims.push((ni as usize, nj as usize, nk as usize));
    }

    let mut blocks = Vec::with_capacity(num_blocks);
    for (b, &(ni_node, nj_node, nk_node)) in dims.iter().enumerate() {
        let count = ni_node * nj_node * nk_node;
        let xs = read_f64_array(&mut reader, count).with_context(|| format!("read x[] for block {b}"))?;
        let ys = read_f64_array(&mut reader, count).with_context(|| format!("read y[] for block {b}"))?;
        let zs = read_f64_array(&mut reader, count).with_context(|| format!("read z[] for block {b}"))?;

        let mut grid = NodeGrid::new(ni_node, nj_node, nk_node);
        for k in 0..nk_node {
            for j in 0..nj_node {
                for i in 0..ni_node {
                    let idx = (k * nj_node + j) * ni_node + i;
                    grid.set_node(i, j, k, cfd_core::Vec3::new(xs[idx], ys[idx], zs[idx]));
                }
            }
        }
        blocks.push(grid);
    }
    Ok(blocks)
}

fn read_i32(reader: &mut impl Read) -> Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_f64_array(reader: &mut impl Read, count: usize) -> Result<Vec<f64>> {
    let mut out = Vec::with_capacity(count);
    let mut buf = [0u8; 8];
    for _ in 0..count {
        reader.read_exact(&mut buf)?;
        out.push(f64::from_le_bytes(buf));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_single_block_grid(path: &Path, ni: usize, nj: usize, nk: usize) {
        let mut buf = Vec::new();
        buf.extend_from_slice(&1i32.to_le_bytes());
        buf.extend_from_slice(&(ni as i32).to_le_bytes());
        buf.extend_from_slice(&(nj as i32).to_le_bytes());
        buf.extend_from_slice(&(nk as i32).to_le_bytes());
        let count = ni * nj * nk;
        for axis in 0..3 {
            for idx in 0..count {
                buf.extend_from_slice(&(f64::from(axis) * 100.0 + idx as f64).to_le_bytes());
            }
        }
        std::fs::File::create(path).unwrap().write_all(&buf).unwrap();
    }

    #[test]
    fn reads_back_the_node_count_and_coordinates_it_wrote() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.p3d");
        write_single_block_grid(&path, 3, 2, 2);

        let blocks = read_plot3d_grid(&path).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].cell_dims(), (2, 1, 1));
        assert!((blocks[0].node(0, 0, 0).x - 0.0).abs() < 1e-12);
        assert!((blocks[0].node(0, 0, 0).y - 100.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_a_negative_block_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.p3d");
        std::fs::File::create(&path).unwrap().write_all(&(-1i32).to_le_bytes()).unwrap();
        assert!(read_plot3d_grid(&path).is_err());
    }
}
