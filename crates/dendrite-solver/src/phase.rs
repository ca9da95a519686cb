//! Semi-implicit phase-field step.

use dendrite_core::{GridSpec, SimulationParameters};
use dendrite_linalg::{ConjugateGradient, LinearSolver, SolveReport, SolverConfig};
use log::warn;

use crate::noise::NoiseField;
use crate::operator::OperatorCache;

/// Advances `p` by one IMEX step.
///
/// The reaction term `p(1-p)(p - 1/2 + m + noise)` is explicit, the
/// diffusion term implicit:
///
/// ```text
/// A_p · p_new = τ·p + dt·p·(1-p)·(p - 0.5 + m(T) + noise)
/// ```
///
/// The solve starts from the current `p`. A solve that does not converge
/// is logged and its last iterate is kept.
pub struct PhaseFieldStepper {
    solver: Box<dyn LinearSolver>,
    noise: NoiseField,
    cache: OperatorCache,
    noise_buf: Vec<f64>,
    rhs: Vec<f64>,
}

impl PhaseFieldStepper {
    /// Stepper using conjugate gradient, the natural fit for the
    /// symmetric phase operator.
    pub fn new(seed: u64, config: SolverConfig) -> Self {
        Self::with_solver(seed, Box::new(ConjugateGradient::new(config)))
    }

    /// Stepper using a caller-supplied solver.
    pub fn with_solver(seed: u64, solver: Box<dyn LinearSolver>) -> Self {
        Self {
            solver,
            noise: NoiseField::new(seed),
            cache: OperatorCache::new(),
            noise_buf: Vec::new(),
            rhs: Vec::new(),
        }
    }

    /// Solve for `p_new`. `step` selects the noise draw.
    ///
    /// # Panics
    ///
    /// If any slice length differs from the grid's cell count.
    pub fn step(
        &mut self,
        grid: &GridSpec,
        params: &SimulationParameters,
        step: u64,
        p: &[f64],
        m_t: &[f64],
        p_new: &mut [f64],
    ) -> SolveReport {
        let n = grid.cell_count();
        assert_eq!(p.len(), n, "p does not match the grid");
        assert_eq!(m_t.len(), n, "m(T) does not match the grid");
        assert_eq!(p_new.len(), n, "p_new does not match the grid");

        self.noise_buf.resize(n, 0.0);
        self.noise
            .fill(step, params.noise_amplitude, &mut self.noise_buf);

        let (tau, dt) = (params.tau, params.dt);
        self.rhs.clear();
        self.rhs.extend(
            p.iter()
                .zip(m_t)
                .zip(&self.noise_buf)
                .map(|((&pi, &m), &xi)| tau * pi + dt * pi * (1.0 - pi) * (pi - 0.5 + m + xi)),
        );

        let op = self.cache.phase(grid, tau, params.epsilon, dt);
        p_new.copy_from_slice(p);
        let report = self.solver.solve(&op, &self.rhs, p_new);
        if !report.converged() {
            warn!(
                "phase solve ({}) at step {step} did not converge: {report}",
                self.solver.name()
            );
        }
        report
    }

    /// The operator cache backing this stepper.
    pub fn cache(&self) -> &OperatorCache {
        &self.cache
    }

    /// Name of the linear solver in use.
    pub fn solver_name(&self) -> &'static str {
        self.solver.name()
    }

    /// The noise source.
    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }
}

impl std::fmt::Debug for PhaseFieldStepper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseFieldStepper")
            .field("solver", &self.solver.name())
            .field("noise", &self.noise)
            .field("cache", &self.cache)
            .finish()
    }
}
