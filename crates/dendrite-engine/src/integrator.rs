//! The time-stepping state machine.
//!
//! ```text
//!   Init ──step()──▶ Stepping ──(steps taken | cancel | abort)──▶ Done
//! ```
//!
//! Each call to [`TimeIntegrator::step`] runs one strictly sequential
//! step body:
//!
//! 1. boundary conditions on `p` and `T`,
//! 2. driving force `m(T)`,
//! 3. phase solve into `p_next`,
//! 4. latent-heat source `dpdt`,
//! 5. heat solve into `T_next`,
//! 6. sanity scan of the new fields,
//! 7. commit (`p ← p_next`, `T ← T_next`),
//! 8. output handoff when `s % output_interval == 0`.
//!
//! Non-converged solves never abort the run; they surface as
//! [`SolverEvent::NonConvergence`].

use std::error::Error;
use std::fmt;
use std::time::Instant;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use dendrite_core::{FieldKind, FieldState, StepId};
use dendrite_linalg::{LinearSolver, SolveReport};
use dendrite_solver::{
    apply_boundary_conditions, fill_driving_force, latent_heat_source, Equation, HeatStepper,
    PhaseFieldStepper,
};
use log::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::config::{ConfigError, SimConfig};
use crate::events::SolverEvent;
use crate::metrics::StepMetrics;
use crate::output::{OutputError, OutputFrame, OutputSink};
use crate::sanity::{first_non_finite, SanityPolicy};

/// Events buffered before further ones are dropped.
const EVENT_CAPACITY: usize = 1024;

// ── StepError ──────────────────────────────────────────────────────

/// Why a call to [`TimeIntegrator::step`] did not produce a step.
#[derive(Debug)]
pub enum StepError {
    /// All configured steps have been taken, or the run was stopped
    /// earlier; the integrator is [`Done`](IntegratorState::Done).
    Finished,
    /// The [`CancelToken`] was set. The integrator is now `Done`.
    Cancelled,
    /// A new field contained NaN or infinity under
    /// [`SanityPolicy::Abort`]. The step was not committed.
    NumericalInstability {
        /// Step that produced the values.
        step: StepId,
        /// Which field.
        field: FieldKind,
        /// Flat index of the first offending cell.
        cell: usize,
    },
    /// The sink refused the frame. The step itself was committed and
    /// counts toward the run, so the final step still ends in `Done`.
    Output(OutputError),
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finished => write!(f, "run is finished"),
            Self::Cancelled => write!(f, "run was cancelled"),
            Self::NumericalInstability { step, field, cell } => {
                write!(f, "non-finite {field} at cell {cell} in step {step}")
            }
            Self::Output(e) => write!(f, "output: {e}"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Output(e) => Some(e),
            _ => None,
        }
    }
}

impl From<OutputError> for StepError {
    fn from(e: OutputError) -> Self {
        Self::Output(e)
    }
}

// ── Reports ────────────────────────────────────────────────────────

/// Lifecycle of a [`TimeIntegrator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntegratorState {
    /// Fields seeded, no step taken yet.
    Init,
    /// At least one step taken, more remain.
    Stepping,
    /// Terminal: no further mutation.
    Done,
}

/// Outcome of one successful step.
#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    /// Index of the step just taken.
    pub step: StepId,
    /// Phase solve outcome.
    pub phase: SolveReport,
    /// Heat solve outcome.
    pub heat: SolveReport,
    /// Whether a frame was handed to the sink.
    pub output: bool,
    /// Timing and solver counters.
    pub metrics: StepMetrics,
}

/// Totals of a [`TimeIntegrator::run`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    /// Steps taken by this call.
    pub steps: u64,
    /// Frames handed to the sink by this call.
    pub outputs: u64,
    /// Solves (either equation) that did not converge.
    pub non_converged: u64,
    /// Whether the run stopped on the cancel token.
    pub cancelled: bool,
}

// ── TimeIntegrator ─────────────────────────────────────────────────

/// Owns the field state and advances it one step at a time.
pub struct TimeIntegrator {
    config: SimConfig,
    state: IntegratorState,
    fields: FieldState,
    next_step: u64,
    phase: PhaseFieldStepper,
    heat: HeatStepper,
    m_t: Vec<f64>,
    dpdt: Vec<f64>,
    events_tx: Sender<SolverEvent>,
    events_rx: Receiver<SolverEvent>,
    dropped_events: u64,
    cancel: CancelToken,
    last_metrics: StepMetrics,
}

// Compile-time assertion: the integrator can be moved to a worker thread.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<TimeIntegrator>();
    }
};

impl TimeIntegrator {
    /// Validate `config` and seed the initial condition.
    ///
    /// Uses conjugate gradient for the phase equation and BiCGStab for the
    /// heat equation.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        let phase = PhaseFieldStepper::new(config.seed, config.solver.clone());
        let heat = HeatStepper::new(config.solver.clone());
        Self::assemble(config, phase, heat, None)
    }

    /// Like [`new`](Self::new) with caller-supplied linear solvers.
    pub fn with_solvers(
        config: SimConfig,
        phase_solver: Box<dyn LinearSolver>,
        heat_solver: Box<dyn LinearSolver>,
    ) -> Result<Self, ConfigError> {
        let phase = PhaseFieldStepper::with_solver(config.seed, phase_solver);
        let heat = HeatStepper::with_solver(heat_solver);
        Self::assemble(config, phase, heat, None)
    }

    /// Continue a run from a stored state. `next_step` is the index of the
    /// first step still to take.
    pub fn restart(
        config: SimConfig,
        fields: FieldState,
        next_step: u64,
    ) -> Result<Self, ConfigError> {
        let phase = PhaseFieldStepper::new(config.seed, config.solver.clone());
        let heat = HeatStepper::new(config.solver.clone());
        Self::resume(config, phase, heat, fields, next_step)
    }

    /// Like [`restart`](Self::restart) with caller-supplied linear solvers.
    pub fn restart_with_solvers(
        config: SimConfig,
        fields: FieldState,
        next_step: u64,
        phase_solver: Box<dyn LinearSolver>,
        heat_solver: Box<dyn LinearSolver>,
    ) -> Result<Self, ConfigError> {
        let phase = PhaseFieldStepper::with_solver(config.seed, phase_solver);
        let heat = HeatStepper::with_solver(heat_solver);
        Self::resume(config, phase, heat, fields, next_step)
    }

    fn resume(
        config: SimConfig,
        phase: PhaseFieldStepper,
        heat: HeatStepper,
        fields: FieldState,
        next_step: u64,
    ) -> Result<Self, ConfigError> {
        if *fields.grid() != config.grid {
            return Err(ConfigError::StateGridMismatch);
        }
        Self::assemble(config, phase, heat, Some((fields, next_step)))
    }

    fn assemble(
        config: SimConfig,
        phase: PhaseFieldStepper,
        heat: HeatStepper,
        resume: Option<(FieldState, u64)>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let (fields, next_step) = match resume {
            Some(r) => r,
            None => (FieldState::seeded(config.grid, config.params.t_liquid), 0),
        };
        let n = config.grid.cell_count();
        let (events_tx, events_rx) = bounded(EVENT_CAPACITY);
        info!(
            "dendrite run: {} grid {:?}, {} steps of dt = {}, output every {}",
            config.grid.dim(),
            config.grid.shape().as_slice(),
            config.params.steps,
            config.params.dt,
            config.params.output_interval,
        );
        Ok(Self {
            config,
            state: IntegratorState::Init,
            fields,
            next_step,
            phase,
            heat,
            m_t: vec![0.0; n],
            dpdt: vec![0.0; n],
            events_tx,
            events_rx,
            dropped_events: 0,
            cancel: CancelToken::new(),
            last_metrics: StepMetrics::default(),
        })
    }

    /// Replace the cancel token (e.g. with one shared across runs).
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// A handle that cancels this run between steps.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Receiver for [`SolverEvent`]s. Clones share one queue.
    pub fn events(&self) -> Receiver<SolverEvent> {
        self.events_rx.clone()
    }

    /// Events that could not be queued because the channel was full.
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events
    }

    /// Current lifecycle state.
    pub fn state(&self) -> IntegratorState {
        self.state
    }

    /// The run configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Read access to the committed fields.
    pub fn fields(&self) -> &FieldState {
        &self.fields
    }

    /// Index of the next step to take.
    pub fn next_step(&self) -> StepId {
        StepId(self.next_step)
    }

    /// Metrics of the most recent step.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    /// Take one step and, on output steps, hand a frame to `sink`.
    ///
    /// # Errors
    ///
    /// See [`StepError`]. Solver non-convergence is not an error.
    pub fn step<S: OutputSink + ?Sized>(&mut self, sink: &mut S) -> Result<StepReport, StepError> {
        match self.state {
            IntegratorState::Done => return Err(StepError::Finished),
            IntegratorState::Init => self.state = IntegratorState::Stepping,
            IntegratorState::Stepping => {}
        }
        if self.next_step >= self.config.params.steps {
            self.state = IntegratorState::Done;
            return Err(StepError::Finished);
        }
        if self.cancel.is_cancelled() {
            info!("run cancelled before step {}", self.next_step);
            self.state = IntegratorState::Done;
            return Err(StepError::Cancelled);
        }

        let s = self.next_step;
        let step = StepId(s);
        let grid = self.config.grid;
        let params = &self.config.params;
        let mut metrics = StepMetrics::default();
        let start = Instant::now();

        let bufs = self.fields.buffers_mut();

        let t0 = Instant::now();
        apply_boundary_conditions(&grid, Some(&mut *bufs.p), &mut *bufs.t, params.t_cool);
        fill_driving_force(bufs.t, params.alpha, params.gamma, &mut self.m_t);
        metrics.boundary_us = micros(t0);

        let t0 = Instant::now();
        let phase = self.phase.step(&grid, params, s, bufs.p, &self.m_t, bufs.p_next);
        metrics.phase_solve_us = micros(t0);

        let t0 = Instant::now();
        latent_heat_source(bufs.p, bufs.p_next, params.dt, &mut self.dpdt);
        let heat = self.heat.step(&grid, params, bufs.t, &self.dpdt, bufs.t_next);
        metrics.heat_solve_us = micros(t0);

        metrics.phase_iterations = phase.iterations;
        metrics.heat_iterations = heat.iterations;
        metrics.operator_cache_hits = self.phase.cache().hits() + self.heat.cache().hits();
        metrics.operator_cache_misses = self.phase.cache().misses() + self.heat.cache().misses();

        for (equation, report) in [(Equation::Phase, &phase), (Equation::Heat, &heat)] {
            if !report.converged() {
                self.publish(SolverEvent::NonConvergence {
                    step,
                    equation,
                    report: report.clone(),
                });
            }
        }

        if let Some((field, cell)) = self.scan_new_fields() {
            warn!("step {step}: non-finite {field} at cell {cell}");
            self.publish(SolverEvent::NonFinite { step, field, cell });
            if self.config.sanity == SanityPolicy::Abort {
                self.state = IntegratorState::Done;
                return Err(StepError::NumericalInstability { step, field, cell });
            }
        }

        self.fields.commit();
        self.next_step += 1;
        // Set before the handoff: a sink error on the last step still ends the run.
        if self.next_step >= self.config.params.steps {
            self.state = IntegratorState::Done;
        }

        let output = self.config.params.is_output_step(s);
        if output {
            let t0 = Instant::now();
            let time = step.time(self.config.params.dt);
            sink.accept(OutputFrame::capture(step, time, &self.fields))?;
            self.publish(SolverEvent::OutputDelivered { step, time });
            metrics.output_us = micros(t0);
        }

        metrics.total_us = micros(start);
        debug!(
            "step {step}: phase {} it, heat {} it, {} us",
            metrics.phase_iterations, metrics.heat_iterations, metrics.total_us
        );
        self.last_metrics = metrics.clone();
        Ok(StepReport {
            step,
            phase,
            heat,
            output,
            metrics,
        })
    }

    /// Step until `Done` or cancelled.
    ///
    /// Cancellation ends the run without an error; check
    /// [`RunSummary::cancelled`].
    pub fn run<S: OutputSink + ?Sized>(&mut self, sink: &mut S) -> Result<RunSummary, StepError> {
        let mut summary = RunSummary::default();
        loop {
            match self.step(sink) {
                Ok(report) => {
                    summary.steps += 1;
                    summary.outputs += u64::from(report.output);
                    summary.non_converged +=
                        u64::from(!report.phase.converged()) + u64::from(!report.heat.converged());
                }
                Err(StepError::Finished) => break,
                Err(StepError::Cancelled) => {
                    summary.cancelled = true;
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        info!(
            "dendrite run finished: {} steps, {} outputs, {} unconverged solves{}",
            summary.steps,
            summary.outputs,
            summary.non_converged,
            if summary.cancelled { " (cancelled)" } else { "" }
        );
        Ok(summary)
    }

    fn scan_new_fields(&self) -> Option<(FieldKind, usize)> {
        if self.config.sanity == SanityPolicy::Off {
            return None;
        }
        first_non_finite(self.fields.phase_next())
            .map(|cell| (FieldKind::Phase, cell))
            .or_else(|| {
                first_non_finite(self.fields.temperature_next())
                    .map(|cell| (FieldKind::Temperature, cell))
            })
    }

    fn publish(&mut self, event: SolverEvent) {
        match self.events_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => self.dropped_events += 1,
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

impl fmt::Debug for TimeIntegrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeIntegrator")
            .field("state", &self.state)
            .field("next_step", &self.next_step)
            .field("phase", &self.phase)
            .field("heat", &self.heat)
            .finish_non_exhaustive()
    }
}

fn micros(since: Instant) -> u64 {
    since.elapsed().as_micros() as u64
}
