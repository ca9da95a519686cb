//! Linear solvers with scripted outcomes.
//!
//! [`ScriptedSolver`] does no Krylov work. It leaves the initial guess in
//! place, optionally poisons one cell with NaN on a chosen call, and
//! reports whatever status the test asked for. The reported residual is
//! the true residual of the returned iterate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dendrite_linalg::vector::norm2;
use dendrite_linalg::{CsrMatrix, LinearSolver, SolveReport, SolveStatus, SolverConfig};

/// A [`LinearSolver`] that returns a fixed status.
#[derive(Clone, Debug)]
pub struct ScriptedSolver {
    config: SolverConfig,
    status: SolveStatus,
    iterations: usize,
    poison: Option<(usize, usize)>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedSolver {
    pub fn new(status: SolveStatus) -> Self {
        Self {
            config: SolverConfig::default(),
            status,
            iterations: 0,
            poison: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Reports convergence without iterating.
    pub fn converging() -> Self {
        Self::new(SolveStatus::Converged)
    }

    /// Reports [`SolveStatus::MaxIterations`] after `iterations`.
    pub fn stalled(iterations: usize) -> Self {
        Self {
            iterations,
            ..Self::new(SolveStatus::MaxIterations)
        }
    }

    /// Write NaN into `x[cell]` on the `call`-th solve (zero-based).
    pub fn poison_on_call(mut self, call: usize, cell: usize) -> Self {
        self.poison = Some((call, cell));
        self
    }

    /// Shared counter of `solve` calls; survives moving the solver into a
    /// stepper.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl LinearSolver for ScriptedSolver {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn solve(&mut self, a: &CsrMatrix, b: &[f64], x: &mut [f64]) -> SolveReport {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let mut r = vec![0.0; a.n()];
        a.residual(x, b, &mut r);
        let initial_residual_norm = norm2(&r);
        if let Some((at, cell)) = self.poison {
            if at == call {
                x[cell] = f64::NAN;
            }
        }
        a.residual(x, b, &mut r);
        SolveReport {
            status: self.status,
            iterations: self.iterations,
            residual_norm: norm2(&r),
            initial_residual_norm,
            rhs_norm: norm2(b),
            elapsed: Duration::ZERO,
        }
    }
}
