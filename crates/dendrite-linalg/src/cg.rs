//! Jacobi-preconditioned conjugate gradient.

use log::trace;

use crate::csr::CsrMatrix;
use crate::precond::Jacobi;
use crate::solver::{LinearSolver, SolveReport, SolveStatus, SolverConfig};
use crate::vector::{axpy, dot, norm2};

/// Preconditioned CG for symmetric positive definite systems.
///
/// On a non-SPD matrix the method may report
/// [`Breakdown`](SolveStatus::Breakdown) when the search direction loses
/// positive curvature.
#[derive(Debug, Default)]
pub struct ConjugateGradient {
    config: SolverConfig,
    precond: Jacobi,
    r: Vec<f64>,
    z: Vec<f64>,
    p: Vec<f64>,
    ap: Vec<f64>,
}

impl ConjugateGradient {
    /// Solver with the given stopping criteria.
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    fn ensure_workspace(&mut self, n: usize) {
        for v in [&mut self.r, &mut self.z, &mut self.p, &mut self.ap] {
            v.resize(n, 0.0);
        }
    }
}

impl LinearSolver for ConjugateGradient {
    fn name(&self) -> &'static str {
        "cg"
    }

    fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn solve(&mut self, a: &CsrMatrix, b: &[f64], x: &mut [f64]) -> SolveReport {
        let n = a.n();
        assert_eq!(b.len(), n, "b length must equal matrix order");
        assert_eq!(x.len(), n, "x length must equal matrix order");
        let clock = self.config.clock();
        self.ensure_workspace(n);
        self.precond.update(a);

        let rhs_norm = norm2(b);
        let tol = self.config.threshold(rhs_norm);

        a.residual(x, b, &mut self.r);
        let initial = norm2(&self.r);
        let mut res = initial;

        let finish = |status, iterations, residual_norm| SolveReport {
            status,
            iterations,
            residual_norm,
            initial_residual_norm: initial,
            rhs_norm,
            elapsed: clock.elapsed(),
        };

        if res <= tol {
            return finish(SolveStatus::Converged, 0, res);
        }
        if !res.is_finite() {
            return finish(SolveStatus::Breakdown, 0, res);
        }

        self.precond.apply(&self.r, &mut self.z);
        self.p.copy_from_slice(&self.z);
        let mut rz = dot(&self.r, &self.z);

        for iter in 1..=self.config.max_iterations {
            if clock.expired() {
                return finish(SolveStatus::DeadlineExceeded, iter - 1, res);
            }

            a.mul_vec(&self.p, &mut self.ap);
            let pap = dot(&self.p, &self.ap);
            if !(pap.is_finite() && pap > 0.0) {
                return finish(SolveStatus::Breakdown, iter - 1, res);
            }
            let alpha = rz / pap;
            axpy(alpha, &self.p, x);
            axpy(-alpha, &self.ap, &mut self.r);

            res = norm2(&self.r);
            trace!("cg iter {iter}: residual {res:.3e}");
            if res <= tol {
                return finish(SolveStatus::Converged, iter, res);
            }
            if !res.is_finite() {
                return finish(SolveStatus::Breakdown, iter, res);
            }

            self.precond.apply(&self.r, &mut self.z);
            let rz_next = dot(&self.r, &self.z);
            if rz == 0.0 {
                return finish(SolveStatus::Breakdown, iter, res);
            }
            let beta = rz_next / rz;
            rz = rz_next;
            for (pi, &zi) in self.p.iter_mut().zip(&self.z) {
                *pi = zi + beta * *pi;
            }
        }

        finish(SolveStatus::MaxIterations, self.config.max_iterations, res)
    }
}
