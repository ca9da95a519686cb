//! File-backed output.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use dendrite_core::{FieldState, StepId};
use dendrite_engine::{OutputError, OutputFrame, OutputSink};
use log::info;

use crate::codec::{read_dump, write_dump};
use crate::error::IoError;

/// Writes every frame to `<dir>/step_NNNNNN.dndr`.
///
/// Wrap it in a [`BackgroundSink`](dendrite_engine::BackgroundSink) to
/// keep disk writes off the stepping thread.
#[derive(Debug)]
pub struct DumpSink {
    dir: PathBuf,
    written: u64,
}

impl DumpSink {
    /// Create `dir` (and parents) if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, IoError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, written: 0 })
    }

    /// Path of the dump for `step`.
    pub fn path_for(&self, step: StepId) -> PathBuf {
        self.dir.join(format!("step_{:06}.dndr", step.0))
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Frames written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    fn write(&mut self, frame: &OutputFrame) -> Result<PathBuf, IoError> {
        let path = self.path_for(frame.step);
        let mut w = BufWriter::new(File::create(&path)?);
        write_dump(&mut w, frame)?;
        w.flush()?;
        self.written += 1;
        Ok(path)
    }
}

impl OutputSink for DumpSink {
    fn accept(&mut self, frame: OutputFrame) -> Result<(), OutputError> {
        let path = self.write(&frame)?;
        info!(
            "step {} (t = {:.6}) written to {}",
            frame.step,
            frame.time,
            path.display()
        );
        Ok(())
    }
}

/// Read a dump back into a [`FieldState`] for restarting a run.
///
/// Returns the state and the step index the dump was taken at. The
/// integrator continues with the step after it.
pub fn restore_fields(path: impl AsRef<Path>) -> Result<(FieldState, StepId), IoError> {
    let mut r = BufReader::new(File::open(path)?);
    let frame = read_dump(&mut r)?;
    let state = FieldState::from_arrays(frame.grid, frame.p, frame.t)?;
    Ok((state, frame.step))
}
