//! Output handoff: frames, the sink contract and a background writer.
//!
//! The integrator never lends its buffers out. At each output step it
//! deep-copies `p` and `T` into an [`OutputFrame`] and moves the frame
//! into the sink, so a sink may keep or ship the data anywhere while the
//! next step mutates the live fields.

use std::error::Error;
use std::fmt;
use std::io;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Sender};
use dendrite_core::{FieldState, GridSpec, StepId};
use log::{debug, warn};
use smallvec::SmallVec;

// ── OutputFrame ────────────────────────────────────────────────────

/// Owned copy of the fields at an output step.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputFrame {
    /// Index of the step that produced the frame.
    pub step: StepId,
    /// Time stamp, `step · dt`.
    pub time: f64,
    /// Grid the arrays live on.
    pub grid: GridSpec,
    /// Array shape: `[nx, ny]` or `[nx, ny, nz]`.
    pub shape: SmallVec<[usize; 3]>,
    /// Phase field, row-major.
    pub p: Vec<f64>,
    /// Temperature, row-major.
    pub t: Vec<f64>,
}

impl OutputFrame {
    /// Deep-copy the current fields of `state`.
    pub fn capture(step: StepId, time: f64, state: &FieldState) -> Self {
        let grid = *state.grid();
        Self {
            step,
            time,
            grid,
            shape: grid.shape(),
            p: state.phase().to_vec(),
            t: state.temperature().to_vec(),
        }
    }
}

// ── OutputError ────────────────────────────────────────────────────

/// Failures reported by an [`OutputSink`].
#[derive(Debug)]
pub enum OutputError {
    /// The sink hit an I/O error.
    Io(io::Error),
    /// The sink refused the frame.
    Rejected {
        /// Why.
        reason: String,
    },
    /// A background worker stopped accepting frames.
    Disconnected,
    /// A background worker panicked.
    WorkerPanicked,
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "output i/o: {e}"),
            Self::Rejected { reason } => write!(f, "output rejected: {reason}"),
            Self::Disconnected => write!(f, "output worker is no longer accepting frames"),
            Self::WorkerPanicked => write!(f, "output worker panicked"),
        }
    }
}

impl Error for OutputError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for OutputError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

// ── OutputSink ─────────────────────────────────────────────────────

/// Consumer of output frames.
pub trait OutputSink {
    /// Take ownership of one frame.
    fn accept(&mut self, frame: OutputFrame) -> Result<(), OutputError>;
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn accept(&mut self, frame: OutputFrame) -> Result<(), OutputError> {
        (**self).accept(frame)
    }
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn accept(&mut self, frame: OutputFrame) -> Result<(), OutputError> {
        (**self).accept(frame)
    }
}

/// Discards every frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn accept(&mut self, _frame: OutputFrame) -> Result<(), OutputError> {
        Ok(())
    }
}

// ── BackgroundSink ─────────────────────────────────────────────────

/// Runs another sink on a dedicated thread.
///
/// Frames travel over a bounded channel; when the worker falls behind by
/// `capacity` frames, [`accept`](OutputSink::accept) blocks. If the inner
/// sink fails, the worker stops, later `accept` calls return
/// [`OutputError::Disconnected`] and [`finish`](Self::finish) returns the
/// original error.
pub struct BackgroundSink {
    tx: Option<Sender<OutputFrame>>,
    handle: Option<JoinHandle<Result<u64, OutputError>>>,
}

impl BackgroundSink {
    /// Move `inner` onto a new thread named `dendrite-output`.
    pub fn spawn<S>(mut inner: S, capacity: usize) -> Result<Self, OutputError>
    where
        S: OutputSink + Send + 'static,
    {
        let (tx, rx) = bounded::<OutputFrame>(capacity.max(1));
        let handle = thread::Builder::new()
            .name("dendrite-output".into())
            .spawn(move || {
                let mut written = 0u64;
                for frame in rx {
                    let step = frame.step;
                    if let Err(e) = inner.accept(frame) {
                        warn!("output worker stopping at step {step}: {e}");
                        return Err(e);
                    }
                    written += 1;
                }
                debug!("output worker drained {written} frames");
                Ok(written)
            })?;
        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    /// Close the channel, wait for queued frames to be written and return
    /// how many the inner sink accepted.
    pub fn finish(mut self) -> Result<u64, OutputError> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<u64, OutputError> {
        drop(self.tx.take());
        match self.handle.take() {
            Some(handle) => match handle.join() {
                Ok(result) => result,
                Err(_) => Err(OutputError::WorkerPanicked),
            },
            None => Ok(0),
        }
    }
}

impl OutputSink for BackgroundSink {
    fn accept(&mut self, frame: OutputFrame) -> Result<(), OutputError> {
        match &self.tx {
            Some(tx) => tx.send(frame).map_err(|_| OutputError::Disconnected),
            None => Err(OutputError::Disconnected),
        }
    }
}

impl Drop for BackgroundSink {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("output worker ended with error: {e}");
        }
    }
}

impl fmt::Debug for BackgroundSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackgroundSink")
            .field("open", &self.tx.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Collect(Arc<Mutex<Vec<u64>>>);

    impl OutputSink for Collect {
        fn accept(&mut self, frame: OutputFrame) -> Result<(), OutputError> {
            self.0.lock().unwrap().push(frame.step.0);
            Ok(())
        }
    }

    struct FailAfter(u64);

    impl OutputSink for FailAfter {
        fn accept(&mut self, frame: OutputFrame) -> Result<(), OutputError> {
            if frame.step.0 >= self.0 {
                return Err(OutputError::Rejected {
                    reason: "disk full".into(),
                });
            }
            Ok(())
        }
    }

    fn frame(step: u64) -> OutputFrame {
        let grid = GridSpec::planar(3, 2, 1.0, 1.0).unwrap();
        OutputFrame::capture(StepId(step), step as f64, &FieldState::seeded(grid, 0.0))
    }

    #[test]
    fn capture_is_deep_copy() {
        let grid = GridSpec::volume(2, 2, 2, 1.0, 1.0, 1.0).unwrap();
        let mut state = FieldState::uniform(grid, 0.5);
        let f = OutputFrame::capture(StepId(3), 0.3, &state);
        let p_before = state.phase().to_vec();
        state.temperature_mut().fill(9.0);
        state.phase_mut().fill(9.0);
        assert!(f.t.iter().all(|&t| t == 0.5));
        assert_eq!(f.p, p_before);
        assert_eq!(f.shape.as_slice(), &[2, 2, 2]);
        assert_eq!(f.step, StepId(3));
    }

    #[test]
    fn background_preserves_order() {
        let collect = Collect::default();
        let seen = Arc::clone(&collect.0);
        let mut sink = BackgroundSink::spawn(collect, 2).unwrap();
        for s in 0..10 {
            sink.accept(frame(s)).unwrap();
        }
        assert_eq!(sink.finish().unwrap(), 10);
        assert_eq!(*seen.lock().unwrap(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn background_reports_inner_failure() {
        let mut sink = BackgroundSink::spawn(FailAfter(2), 1).unwrap();
        let mut disconnected = false;
        for s in 0..50 {
            if let Err(e) = sink.accept(frame(s)) {
                assert!(matches!(e, OutputError::Disconnected));
                disconnected = true;
                break;
            }
        }
        assert!(disconnected);
        assert!(matches!(sink.finish(), Err(OutputError::Rejected { .. })));
    }

    #[test]
    fn null_sink_accepts_everything() {
        assert!(NullSink.accept(frame(0)).is_ok());
    }
}
