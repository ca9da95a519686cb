//! Binary encode/decode for field dumps.
//!
//! All integers are little-endian. The format has no compression and no
//! alignment padding; a dump of `n` cells is `58 + 16·n` bytes.

use std::io::{Read, Write};

use dendrite_core::{Axis, Dimensionality, GridError, GridSpec, StepId};
use dendrite_engine::OutputFrame;

use crate::error::IoError;
use crate::{FORMAT_VERSION, MAGIC};

/// Bytes before the first array element.
pub const HEADER_LEN: usize = 4 + 1 + 1 + 3 * 4 + 3 * 8 + 8 + 8;

// ── Primitive writers ───────────────────────────────────────────

fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), IoError> {
    w.write_all(&[v])?;
    Ok(())
}

fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), IoError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), IoError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn write_f64_le(w: &mut dyn Write, v: f64) -> Result<(), IoError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn write_f64_array(w: &mut dyn Write, values: &[f64]) -> Result<(), IoError> {
    for &v in values {
        write_f64_le(w, v)?;
    }
    Ok(())
}

// ── Primitive readers ───────────────────────────────────────────

fn read_u8(r: &mut dyn Read) -> Result<u8, IoError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u32_le(r: &mut dyn Read) -> Result<u32, IoError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64_le(r: &mut dyn Read) -> Result<u64, IoError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_f64_le(r: &mut dyn Read) -> Result<f64, IoError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

/// Reads element by element so a corrupt header cannot trigger a huge
/// up-front allocation; truncation surfaces as an I/O error.
fn read_f64_array(r: &mut dyn Read, n: usize) -> Result<Vec<f64>, IoError> {
    let mut out = Vec::with_capacity(n.min(1 << 20));
    for _ in 0..n {
        out.push(read_f64_le(r)?);
    }
    Ok(out)
}

fn cells_u32(n: usize) -> Result<u32, IoError> {
    u32::try_from(n).map_err(|_| IoError::Grid(GridError::CellCountOverflow))
}

// ── Dump encode/decode ──────────────────────────────────────────

/// Write one frame as a complete dump.
pub fn write_dump(w: &mut dyn Write, frame: &OutputFrame) -> Result<(), IoError> {
    let grid = &frame.grid;
    w.write_all(&MAGIC)?;
    write_u8(w, FORMAT_VERSION)?;
    write_u8(w, grid.dim().as_u32() as u8)?;
    for axis in Axis::ALL {
        write_u32_le(w, cells_u32(grid.cells(axis))?)?;
    }
    for axis in Axis::ALL {
        write_f64_le(w, grid.extent(axis))?;
    }
    write_u64_le(w, frame.step.0)?;
    write_f64_le(w, frame.time)?;
    write_f64_array(w, &frame.p)?;
    write_f64_array(w, &frame.t)?;
    Ok(())
}

/// Decode a dump written by [`write_dump`].
///
/// # Errors
///
/// [`IoError::InvalidMagic`] or [`IoError::UnsupportedVersion`] for a
/// foreign file, [`IoError::Grid`] for an impossible header and
/// [`IoError::Io`] for truncated data.
pub fn read_dump(r: &mut dyn Read) -> Result<OutputFrame, IoError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(IoError::InvalidMagic);
    }
    let version = read_u8(r)?;
    if version != FORMAT_VERSION {
        return Err(IoError::UnsupportedVersion { found: version });
    }

    let dim = Dimensionality::try_from(u32::from(read_u8(r)?))?;
    let mut cells = [0usize; 3];
    for c in &mut cells {
        *c = read_u32_le(r)? as usize;
    }
    let mut extent = [0.0; 3];
    for e in &mut extent {
        *e = read_f64_le(r)?;
    }
    let grid = GridSpec::new(dim, cells, extent)?;

    let step = StepId(read_u64_le(r)?);
    let time = read_f64_le(r)?;
    let n = grid.cell_count();
    let p = read_f64_array(r, n)?;
    let t = read_f64_array(r, n)?;

    Ok(OutputFrame {
        step,
        time,
        grid,
        shape: grid.shape(),
        p,
        t,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dendrite_core::FieldState;

    fn frame(grid: GridSpec) -> OutputFrame {
        let mut state = FieldState::seeded(grid, 0.25);
        state.temperature_mut()[3] = -1.5;
        OutputFrame::capture(StepId(40), 4e-3, &state)
    }

    #[test]
    fn dump_size_matches_layout() {
        let grid = GridSpec::planar(5, 4, 1.0, 2.0).unwrap();
        let mut buf = Vec::new();
        write_dump(&mut buf, &frame(grid)).unwrap();
        assert_eq!(buf.len(), HEADER_LEN + 16 * 20);
        assert_eq!(HEADER_LEN, 58);
        assert_eq!(&buf[..4], b"DNDR");
        assert_eq!(buf[4], FORMAT_VERSION);
        assert_eq!(buf[5], 2);
    }

    #[test]
    fn volume_dump_reads_back() {
        let grid = GridSpec::volume(3, 2, 4, 1.0, 1.0, 2.0).unwrap();
        let original = frame(grid);
        let mut buf = Vec::new();
        write_dump(&mut buf, &original).unwrap();
        let decoded = read_dump(&mut buf.as_slice()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn wrong_magic_rejected() {
        let mut buf = Vec::new();
        write_dump(&mut buf, &frame(GridSpec::planar(2, 2, 1.0, 1.0).unwrap())).unwrap();
        buf[0] = b'X';
        assert!(matches!(read_dump(&mut buf.as_slice()), Err(IoError::InvalidMagic)));
    }

    #[test]
    fn future_version_rejected() {
        let mut buf = Vec::new();
        write_dump(&mut buf, &frame(GridSpec::planar(2, 2, 1.0, 1.0).unwrap())).unwrap();
        buf[4] = 9;
        assert!(matches!(
            read_dump(&mut buf.as_slice()),
            Err(IoError::UnsupportedVersion { found: 9 })
        ));
    }

    #[test]
    fn bad_dimension_rejected() {
        let mut buf = Vec::new();
        write_dump(&mut buf, &frame(GridSpec::planar(2, 2, 1.0, 1.0).unwrap())).unwrap();
        buf[5] = 4;
        assert!(matches!(
            read_dump(&mut buf.as_slice()),
            Err(IoError::Grid(GridError::InvalidDimension { value: 4 }))
        ));
    }

    #[test]
    fn truncated_dump_is_io_error() {
        let mut buf = Vec::new();
        write_dump(&mut buf, &frame(GridSpec::planar(3, 3, 1.0, 1.0).unwrap())).unwrap();
        buf.truncate(buf.len() - 5);
        assert!(matches!(read_dump(&mut buf.as_slice()), Err(IoError::Io(_))));
    }
}
