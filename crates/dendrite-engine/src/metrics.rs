//! Per-step timing and solver metrics.

/// Timing and solver data collected during a single step.
///
/// Durations are in microseconds. Cache counters are cumulative over the
/// run; everything else refers to the step just taken.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepMetrics {
    /// Wall-clock time for the whole step.
    pub total_us: u64,
    /// Boundary conditions and driving force.
    pub boundary_us: u64,
    /// Phase RHS assembly and solve.
    pub phase_solve_us: u64,
    /// Latent-heat source, heat RHS assembly and solve.
    pub heat_solve_us: u64,
    /// Snapshot copy and sink handoff (zero on non-output steps).
    pub output_us: u64,
    /// Iterations of the phase solve.
    pub phase_iterations: usize,
    /// Iterations of the heat solve.
    pub heat_iterations: usize,
    /// Operator lookups served from cache, both equations.
    pub operator_cache_hits: u64,
    /// Operator assemblies, both equations.
    pub operator_cache_misses: u64,
}
