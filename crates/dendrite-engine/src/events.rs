//! Structured notifications published by the integrator.

use dendrite_core::{FieldKind, StepId};
use dendrite_linalg::SolveReport;
use dendrite_solver::Equation;

/// Something a caller may want to know about that is not an error.
///
/// Events are published on a bounded channel with `try_send`; when the
/// channel is full further events are dropped (and counted) rather than
/// stalling the run.
#[derive(Clone, Debug, PartialEq)]
pub enum SolverEvent {
    /// A linear solve stopped without converging. The step continued with
    /// the solver's last iterate.
    NonConvergence {
        /// Step being computed.
        step: StepId,
        /// Which equation.
        equation: Equation,
        /// The solver's report.
        report: SolveReport,
    },
    /// A freshly solved field contains NaN or infinity.
    NonFinite {
        /// Step being computed.
        step: StepId,
        /// Which field.
        field: FieldKind,
        /// Flat index of the first offending cell.
        cell: usize,
    },
    /// A frame was accepted by the output sink.
    OutputDelivered {
        /// Step the frame was taken at.
        step: StepId,
        /// Simulation time stamped on the frame.
        time: f64,
    },
}
