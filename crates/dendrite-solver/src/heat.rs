//! Backward-Euler heat step with latent-heat release.

use dendrite_core::{GridSpec, SimulationParameters};
use dendrite_linalg::{BiCgStab, LinearSolver, SolveReport, SolverConfig};
use log::warn;

use crate::boundary::apply_dirichlet_low_x;
use crate::operator::OperatorCache;

/// Advances `T` by one implicit step:
///
/// ```text
/// A_T · T_new = T + dt·K·dpdt,   with b[i = 0] = T_cool
/// ```
///
/// The Dirichlet face is enforced twice, by the operator's identity rows
/// and by pinning the right-hand side. The solve starts from the pinned
/// right-hand side, so those rows hold their value exactly.
pub struct HeatStepper {
    solver: Box<dyn LinearSolver>,
    cache: OperatorCache,
    rhs: Vec<f64>,
}

impl HeatStepper {
    /// Stepper using BiCGStab; the heat operator is not symmetric.
    pub fn new(config: SolverConfig) -> Self {
        Self::with_solver(Box::new(BiCgStab::new(config)))
    }

    /// Stepper using a caller-supplied solver.
    pub fn with_solver(solver: Box<dyn LinearSolver>) -> Self {
        Self {
            solver,
            cache: OperatorCache::new(),
            rhs: Vec::new(),
        }
    }

    /// Solve for `t_new`.
    ///
    /// # Panics
    ///
    /// If any slice length differs from the grid's cell count.
    pub fn step(
        &mut self,
        grid: &GridSpec,
        params: &SimulationParameters,
        t: &[f64],
        dpdt: &[f64],
        t_new: &mut [f64],
    ) -> SolveReport {
        let n = grid.cell_count();
        assert_eq!(t.len(), n, "T does not match the grid");
        assert_eq!(dpdt.len(), n, "dpdt does not match the grid");
        assert_eq!(t_new.len(), n, "T_new does not match the grid");

        let coupling = params.dt * params.latent_heat;
        self.rhs.clear();
        self.rhs
            .extend(t.iter().zip(dpdt).map(|(&ti, &di)| ti + coupling * di));
        apply_dirichlet_low_x(grid, &mut self.rhs, params.t_cool);

        let op = self.cache.heat(grid, params.dt);
        t_new.copy_from_slice(&self.rhs);
        let report = self.solver.solve(&op, &self.rhs, t_new);
        if !report.converged() {
            warn!("heat solve ({}) did not converge: {report}", self.solver.name());
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
}

impl std::fmt::Debug for HeatStepper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeatStepper")
            .field("solver", &self.solver.name())
            .field("cache", &self.cache)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dendrite_core::Axis;
    use dendrite_linalg::{CsrMatrix, SolveStatus};
    use std::time::Duration;

    /// Reports a stall and leaves the initial guess in place.
    struct Stalled(SolverConfig);

    impl LinearSolver for Stalled {
        fn name(&self) -> &'static str {
            "stalled"
        }
        fn config(&self) -> &SolverConfig {
            &self.0
        }
        fn solve(&mut self, _a: &CsrMatrix, _b: &[f64], _x: &mut [f64]) -> SolveReport {
            SolveReport {
                status: SolveStatus::MaxIterations,
                iterations: 7,
                residual_norm: 1.0,
                initial_residual_norm: 1.0,
                rhs_norm: 1.0,
                elapsed: Duration::ZERO,
            }
        }
    }

    #[test]
    fn dirichlet_face_is_exactly_cool() {
        let grid = GridSpec::planar(10, 7, 1.0, 1.0).unwrap();
        let params = SimulationParameters::default();
        let n = grid.cell_count();
        let t: Vec<f64> = (0..n).map(|i| 0.3 + (i as f64 * 0.7).sin()).collect();
        let dpdt: Vec<f64> = (0..n).map(|i| (i as f64 * 1.3).cos() * 50.0).collect();
        let mut t_new = vec![f64::NAN; n];

        let report = HeatStepper::new(SolverConfig::default()).step(&grid, &params, &t, &dpdt, &mut t_new);
        assert!(report.converged(), "{report}");
        grid.for_each_in_layer(Axis::X, 0, |idx| assert_eq!(t_new[idx], 0.0));
        assert!(t_new.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn nonzero_cooling_temperature_is_pinned() {
        let grid = GridSpec::volume(5, 4, 3, 1.0, 1.0, 1.0).unwrap();
        let params = SimulationParameters {
            t_cool: -0.5,
            ..Default::default()
        };
        let n = grid.cell_count();
        let mut t_new = vec![0.0; n];
        HeatStepper::new(SolverConfig::default()).step(&grid, &params, &vec![0.2; n], &vec![0.0; n], &mut t_new);
        grid.for_each_in_layer(Axis::X, 0, |idx| assert_eq!(t_new[idx], -0.5));
        // Heat flows toward the cold face.
        assert!(t_new[grid.index(1, 0, 0)] < 0.2);
    }

    #[test]
    fn latent_source_heats_the_interior() {
        let grid = GridSpec::planar(6, 6, 1.0, 1.0).unwrap();
        let params = SimulationParameters::default();
        let n = grid.cell_count();
        let mut dpdt = vec![0.0; n];
        let centre = grid.index(3, 3, 0);
        dpdt[centre] = 100.0;
        let mut t_new = vec![0.0; n];
        let mut stepper = HeatStepper::new(SolverConfig::default());
        stepper.step(&grid, &params, &vec![0.0; n], &dpdt, &mut t_new);
        assert!(t_new[centre] > 0.0);
        assert!(t_new[grid.index(3, 4, 0)] > 0.0);
        assert_eq!(stepper.cache().misses(), 1);
        assert_eq!(stepper.solver_name(), "bicgstab");
    }

    #[test]
    fn non_convergence_keeps_pinned_guess() {
        let grid = GridSpec::planar(5, 4, 1.0, 1.0).unwrap();
        let params = SimulationParameters {
            t_cool: -0.25,
            ..Default::default()
        };
        let n = grid.cell_count();
        let t = vec![0.4; n];
        let dpdt = vec![10.0; n];
        let mut t_new = vec![f64::NAN; n];
        let mut stepper = HeatStepper::with_solver(Box::new(Stalled(SolverConfig::default())));
        let report = stepper.step(&grid, &params, &t, &dpdt, &mut t_new);

        assert_eq!(report.status, SolveStatus::MaxIterations);
        assert_eq!(report.iterations, 7);
        assert_eq!(stepper.solver_name(), "stalled");
        // The last iterate is the pinned right-hand side.
        let interior = 0.4 + params.dt * params.latent_heat * 10.0;
        for j in 0..4 {
            assert_eq!(t_new[grid.index(0, j, 0)], -0.25);
            for i in 1..5 {
                assert_eq!(t_new[grid.index(i, j, 0)], interior);
            }
        }
    }
}
