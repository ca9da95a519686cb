//! Strongly-typed step counter.

use std::fmt;

/// Zero-based index of a time step.
///
/// Step `s` advances the state from time `s * dt` to `(s + 1) * dt`.
/// Output frames are labelled with the index of the step that produced
/// them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepId(pub u64);

impl StepId {
    /// The step that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Simulation time associated with this step index.
    pub fn time(self, dt: f64) -> f64 {
        self.0 as f64 * dt
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StepId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
