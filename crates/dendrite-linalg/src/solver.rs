//! Solver configuration, outcome reporting and the [`LinearSolver`] trait.

use std::fmt;
use std::time::{Duration, Instant};

use crate::csr::CsrMatrix;

/// Stopping criteria shared by every Krylov method.
///
/// A solve has converged when `‖b - Ax‖₂ <= max(atol, rtol · ‖b‖₂)`.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfig {
    /// Relative tolerance against `‖b‖₂`.
    pub rtol: f64,
    /// Absolute residual floor.
    pub atol: f64,
    /// Iteration cap.
    pub max_iterations: usize,
    /// Wall-clock budget per solve. `None` disables the check.
    pub deadline: Option<Duration>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            rtol: 1e-10,
            atol: 1e-14,
            max_iterations: 10_000,
            deadline: None,
        }
    }
}

impl SolverConfig {
    /// Set the relative tolerance.
    pub fn with_rtol(mut self, rtol: f64) -> Self {
        self.rtol = rtol;
        self
    }

    /// Set the absolute tolerance.
    pub fn with_atol(mut self, atol: f64) -> Self {
        self.atol = atol;
        self
    }

    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set a per-solve wall-clock budget.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Residual norm at which a system with right-hand side norm `b_norm`
    /// counts as solved.
    pub fn threshold(&self, b_norm: f64) -> f64 {
        self.atol.max(self.rtol * b_norm)
    }

    pub(crate) fn clock(&self) -> Clock {
        Clock {
            start: Instant::now(),
            deadline: self.deadline,
        }
    }
}

pub(crate) struct Clock {
    start: Instant,
    deadline: Option<Duration>,
}

impl Clock {
    pub(crate) fn expired(&self) -> bool {
        self.deadline.is_some_and(|d| self.start.elapsed() >= d)
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// How a solve ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveStatus {
    /// Residual reached the tolerance.
    Converged,
    /// Iteration cap hit first.
    MaxIterations,
    /// A Krylov scalar vanished or went non-finite.
    Breakdown,
    /// The wall-clock budget ran out.
    DeadlineExceeded,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Converged => write!(f, "converged"),
            Self::MaxIterations => write!(f, "max iterations reached"),
            Self::Breakdown => write!(f, "breakdown"),
            Self::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

/// Outcome of one [`LinearSolver::solve`] call.
///
/// `x` always holds the last iterate, whatever the status.
#[derive(Clone, Debug, PartialEq)]
pub struct SolveReport {
    /// How the solve ended.
    pub status: SolveStatus,
    /// Iterations performed.
    pub iterations: usize,
    /// `‖b - Ax‖₂` at the returned iterate.
    pub residual_norm: f64,
    /// Residual norm of the initial guess.
    pub initial_residual_norm: f64,
    /// `‖b‖₂`.
    pub rhs_norm: f64,
    /// Wall-clock time spent.
    pub elapsed: Duration,
}

impl SolveReport {
    /// Whether the status is [`SolveStatus::Converged`].
    pub fn converged(&self) -> bool {
        self.status == SolveStatus::Converged
    }

    /// `residual_norm / rhs_norm`, or the absolute residual when `b = 0`.
    pub fn relative_residual(&self) -> f64 {
        if self.rhs_norm > 0.0 {
            self.residual_norm / self.rhs_norm
        } else {
            self.residual_norm
        }
    }
}

impl fmt::Display for SolveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} after {} iterations (residual {:.3e}, relative {:.3e})",
            self.status,
            self.iterations,
            self.residual_norm,
            self.relative_residual()
        )
    }
}

/// An iterative solver for `A x = b` with a square CSR matrix.
///
/// `x` carries the initial guess in and the solution out. Implementations
/// keep their scratch vectors between calls, hence `&mut self`.
pub trait LinearSolver: Send {
    /// Short human-readable name for logs.
    fn name(&self) -> &'static str;

    /// Stopping criteria in effect.
    fn config(&self) -> &SolverConfig;

    /// Solve in place.
    ///
    /// # Panics
    ///
    /// If `b` or `x` do not have length `a.n()`.
    fn solve(&mut self, a: &CsrMatrix, b: &[f64], x: &mut [f64]) -> SolveReport;
}

impl LinearSolver for Box<dyn LinearSolver> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn config(&self) -> &SolverConfig {
        (**self).config()
    }

    fn solve(&mut self, a: &CsrMatrix, b: &[f64], x: &mut [f64]) -> SolveReport {
        (**self).solve(a, b, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_picks_larger_bound() {
        let c = SolverConfig::default();
        assert_eq!(c.threshold(0.0), 1e-14);
        assert_eq!(c.threshold(1e6), 1e-4);
    }

    #[test]
    fn builder_sets_fields() {
        let c = SolverConfig::default()
            .with_rtol(1e-6)
            .with_atol(0.0)
            .with_max_iterations(3)
            .with_deadline(Duration::from_millis(5));
        assert_eq!(c.rtol, 1e-6);
        assert_eq!(c.atol, 0.0);
        assert_eq!(c.max_iterations, 3);
        assert_eq!(c.deadline, Some(Duration::from_millis(5)));
    }

    #[test]
    fn zero_deadline_expires_immediately() {
        let c = SolverConfig::default().with_deadline(Duration::ZERO);
        assert!(c.clock().expired());
        assert!(!SolverConfig::default().clock().expired());
    }

    #[test]
    fn report_display() {
        let r = SolveReport {
            status: SolveStatus::MaxIterations,
            iterations: 7,
            residual_norm: 0.5,
            initial_residual_norm: 1.0,
            rhs_norm: 2.0,
            elapsed: Duration::ZERO,
        };
        assert!(!r.converged());
        assert_eq!(r.relative_residual(), 0.25);
        assert!(r.to_string().starts_with("max iterations reached after 7"));
    }
}
