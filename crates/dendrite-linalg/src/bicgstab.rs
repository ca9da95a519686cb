//! Jacobi-preconditioned BiCGStab.

use log::trace;

use crate::csr::CsrMatrix;
use crate::precond::Jacobi;
use crate::solver::{LinearSolver, SolveReport, SolveStatus, SolverConfig};
use crate::vector::{axpy, dot, norm2};

/// Below this magnitude a Krylov inner product counts as zero.
const BREAKDOWN_EPS: f64 = 1e-300;

/// Right-preconditioned BiCGStab for general non-symmetric systems.
///
/// The shadow residual is the initial residual and stays fixed for the
/// whole solve. Rows of `A` that are identity rows with a consistent
/// initial guess keep a zero residual throughout, so `x` is never
/// perturbed on them.
#[derive(Debug, Default)]
pub struct BiCgStab {
    config: SolverConfig,
    precond: Jacobi,
    r: Vec<f64>,
    r0: Vec<f64>,
    p: Vec<f64>,
    v: Vec<f64>,
    s: Vec<f64>,
    t: Vec<f64>,
    z: Vec<f64>,
}

impl BiCgStab {
    /// Solver with the given stopping criteria.
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    fn ensure_workspace(&mut self, n: usize) {
        for v in [
            &mut self.r,
            &mut self.r0,
            &mut self.p,
            &mut self.v,
            &mut self.s,
            &mut self.t,
            &mut self.z,
        ] {
            v.resize(n, 0.0);
        }
    }
}

impl LinearSolver for BiCgStab {
    fn name(&self) -> &'static str {
        "bicgstab"
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

        self.r0.copy_from_slice(&self.r);
        self.p.fill(0.0);
        self.v.fill(0.0);
        let mut rho_old = 1.0;
        let mut alpha = 1.0;
        let mut omega = 1.0;

        for iter in 1..=self.config.max_iterations {
            if clock.expired() {
                return finish(SolveStatus::DeadlineExceeded, iter - 1, res);
            }

            let rho = dot(&self.r0, &self.r);
            if rho.abs() < BREAKDOWN_EPS || !rho.is_finite() {
                return finish(SolveStatus::Breakdown, iter - 1, res);
            }
            let beta = if iter == 1 {
                0.0
            } else {
                (rho / rho_old) * (alpha / omega)
            };
            rho_old = rho;

            for ((pi, &ri), &vi) in self.p.iter_mut().zip(&self.r).zip(&self.v) {
                *pi = ri + beta * (*pi - omega * vi);
            }

            // v = A M^{-1} p
            self.precond.apply(&self.p, &mut self.z);
            a.mul_vec(&self.z, &mut self.v);
            let r0v = dot(&self.r0, &self.v);
            if r0v.abs() < BREAKDOWN_EPS || !r0v.is_finite() {
                return finish(SolveStatus::Breakdown, iter - 1, res);
            }
            alpha = rho / r0v;

            for ((si, &ri), &vi) in self.s.iter_mut().zip(&self.r).zip(&self.v) {
                *si = ri - alpha * vi;
            }
            axpy(alpha, &self.z, x);

            let s_norm = norm2(&self.s);
            if s_norm <= tol {
                self.r.copy_from_slice(&self.s);
                return finish(SolveStatus::Converged, iter, s_norm);
            }

            // t = A M^{-1} s
            self.precond.apply(&self.s, &mut self.z);
            a.mul_vec(&self.z, &mut self.t);
            let tt = dot(&self.t, &self.t);
            if tt < BREAKDOWN_EPS || !tt.is_finite() {
                self.r.copy_from_slice(&self.s);
                return finish(SolveStatus::Breakdown, iter, s_norm);
            }
            omega = dot(&self.t, &self.s) / tt;
            axpy(omega, &self.z, x);

            for ((ri, &si), &ti) in self.r.iter_mut().zip(&self.s).zip(&self.t) {
                *ri = si - omega * ti;
            }
            res = norm2(&self.r);
            trace!("bicgstab iter {iter}: residual {res:.3e}");
            if res <= tol {
                return finish(SolveStatus::Converged, iter, res);
            }
            if !res.is_finite() || omega.abs() < BREAKDOWN_EPS {
                return finish(SolveStatus::Breakdown, iter, res);
            }
        }

        finish(SolveStatus::MaxIterations, self.config.max_iterations, res)
    }
}
