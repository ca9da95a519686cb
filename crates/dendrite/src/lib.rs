//! Dendrite: phase-field simulation of dendritic solidification.
//!
//! Solves the Kobayashi model, a phase field `p` (0 liquid, 1 solid)
//! coupled to a dimensionless temperature `T`, on a uniform 2D or 3D grid
//! with semi-implicit time stepping and sparse Krylov solves. This is the
//! facade crate; it re-exports the public API of the sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use dendrite::prelude::*;
//!
//! let grid = GridSpec::planar(20, 20, 1.0, 1.0).unwrap();
//! let params = SimulationParameters { steps: 3, ..Default::default() };
//! let mut sim = TimeIntegrator::new(SimConfig::new(grid, params)).unwrap();
//!
//! let summary = sim.run(&mut NullSink).unwrap();
//! assert_eq!(summary.steps, 3);
//! assert_eq!(sim.state(), IntegratorState::Done);
//! // The cold face stays pinned.
//! assert_eq!(sim.fields().temperature()[grid.index(0, 7, 0)], 0.0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `dendrite-core` | Grid, parameters, field state, step ids |
//! | [`linalg`] | `dendrite-linalg` | CSR matrices, CG and BiCGStab |
//! | [`solver`] | `dendrite-solver` | Boundary conditions, operators, steppers |
//! | [`engine`] | `dendrite-engine` | Time integrator, output sinks, events |
//! | [`io`] | `dendrite-io` | YAML parameters, binary dumps |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Grid, parameters and field storage (`dendrite-core`).
pub use dendrite_core as types;

/// Sparse matrices and iterative solvers (`dendrite-linalg`).
///
/// Implement [`linalg::LinearSolver`] to plug in another solver.
pub use dendrite_linalg as linalg;

/// Boundary conditions, implicit operators and per-equation steppers
/// (`dendrite-solver`).
pub use dendrite_solver as solver;

/// The time integrator and its collaborators (`dendrite-engine`).
pub use dendrite_engine as engine;

/// Parameter files and field dumps (`dendrite-io`).
pub use dendrite_io as io;

/// Common imports for typical Dendrite usage.
///
/// ```rust
/// use dendrite::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use dendrite_core::{
        Axis, Dimensionality, FieldKind, FieldState, GridSpec, SimulationParameters, StepId,
    };

    // Solvers
    pub use dendrite_linalg::{LinearSolver, SolveReport, SolveStatus, SolverConfig};

    // Engine
    pub use dendrite_engine::{
        BackgroundSink, CancelToken, IntegratorState, NullSink, OutputFrame, OutputSink,
        RunSummary, SanityPolicy, SimConfig, SolverEvent, StepError, StepMetrics, StepReport,
        TimeIntegrator,
    };

    // Files
    pub use dendrite_io::{load_config, DumpSink};
}
