//! Test fixtures for Dendrite development.
//!
//! Provides recording and failing [`OutputSink`]s, a [`ScriptedSolver`]
//! whose outcome is chosen by the test, and stock configurations for the
//! standard scenarios.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::{Arc, Mutex};

use dendrite_core::{GridSpec, SimulationParameters};
use dendrite_engine::{OutputError, OutputFrame, OutputSink, SimConfig};

pub use fixtures::ScriptedSolver;

/// Sink that keeps every frame it receives.
///
/// Clones share the same storage, so a test can hand one clone to a
/// [`BackgroundSink`](dendrite_engine::BackgroundSink) and inspect the
/// other afterwards.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    frames: Arc<Mutex<Vec<OutputFrame>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies of the frames received so far, in arrival order.
    pub fn frames(&self) -> Vec<OutputFrame> {
        self.lock().clone()
    }

    /// Step indices of the frames received so far.
    pub fn steps(&self) -> Vec<u64> {
        self.lock().iter().map(|f| f.step.0).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<OutputFrame>> {
        // A panicking test thread poisons the lock; the data is still usable.
        self.frames.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl OutputSink for RecordingSink {
    fn accept(&mut self, frame: OutputFrame) -> Result<(), OutputError> {
        self.lock().push(frame);
        Ok(())
    }
}

/// Sink that rejects the `n`-th frame (zero-based) and every later one.
#[derive(Clone, Debug)]
pub struct FailingSink {
    accepted: usize,
    fail_at: usize,
}

impl FailingSink {
    pub fn new(fail_at: usize) -> Self {
        Self {
            accepted: 0,
            fail_at,
        }
    }

    pub fn accepted(&self) -> usize {
        self.accepted
    }
}

impl OutputSink for FailingSink {
    fn accept(&mut self, frame: OutputFrame) -> Result<(), OutputError> {
        if self.accepted >= self.fail_at {
            return Err(OutputError::Rejected {
                reason: format!("test sink refuses step {}", frame.step),
            });
        }
        self.accepted += 1;
        Ok(())
    }
}

/// The reference 2D scenario: 20×20 cells on a unit square, five steps,
/// output every step, all other parameters at their defaults.
pub fn scenario_config() -> SimConfig {
    let grid = GridSpec::planar(20, 20, 1.0, 1.0).expect("valid grid");
    SimConfig::new(grid, SimulationParameters::default())
}

/// [`scenario_config`] with a different step count and output interval.
pub fn short_run(steps: u64, output_interval: u64) -> SimConfig {
    let mut config = scenario_config();
    config.params.steps = steps;
    config.params.output_interval = output_interval;
    config
}

/// A small planar grid for unit-level checks.
pub fn tiny_grid() -> GridSpec {
    GridSpec::planar(8, 6, 1.0, 1.0).expect("valid grid")
}
